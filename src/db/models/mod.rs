//! Domain models split into per-collection modules.
//!
//! Everything is re-exported so callers can use `crate::db::Task` and friends.

pub mod activity;
pub mod common;
pub mod notification;
pub mod project;
pub mod task;
pub mod team;
pub mod user;

pub use activity::*;
pub use common::*;
pub use notification::*;
pub use project::*;
pub use task::*;
pub use team::*;
pub use user::*;
