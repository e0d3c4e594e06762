//! Error types for the state layer.
//!
//! Store operations fail only for unknown ids, rejected kanban moves and
//! storage problems. Field validation belongs to the caller and is collected
//! with [`ValidationErrorBuilder`].

use std::collections::BTreeMap;
use thiserror::Error;

use crate::db::TaskStatus;

/// Kind of record an operation could not find
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Project,
    Task,
    Subtask,
    TeamMember,
    Notification,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntityKind::Project => write!(f, "Project"),
            EntityKind::Task => write!(f, "Task"),
            EntityKind::Subtask => write!(f, "Subtask"),
            EntityKind::TeamMember => write!(f, "Team member"),
            EntityKind::Notification => write!(f, "Notification"),
        }
    }
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("{kind} not found: {id}")]
    NotFound { kind: EntityKind, id: String },

    #[error("Cannot move task from {from} to {to}: {reason}")]
    TransitionRejected {
        from: TaskStatus,
        to: TaskStatus,
        reason: String,
    },

    #[error("Password hashing failed: {0}")]
    PasswordHash(String),

    #[error("Failed to serialize state: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Unsupported snapshot version {found} in '{namespace}' (expected {expected})")]
    UnsupportedVersion {
        namespace: String,
        found: u32,
        expected: u32,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    pub fn not_found(kind: EntityKind, id: impl Into<String>) -> Self {
        StoreError::NotFound {
            kind,
            id: id.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Field-level validation failures, keyed by field name
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{message}")]
pub struct ValidationErrors {
    message: String,
    fields: BTreeMap<String, Vec<String>>,
}

impl ValidationErrors {
    pub fn fields(&self) -> &BTreeMap<String, Vec<String>> {
        &self.fields
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Builder for collecting multiple validation errors
#[derive(Debug, Default)]
pub struct ValidationErrorBuilder {
    errors: BTreeMap<String, Vec<String>>,
}

impl ValidationErrorBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a validation error for a field
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) -> &mut Self {
        self.errors
            .entry(field.into())
            .or_default()
            .push(message.into());
        self
    }

    /// Record the error of a field validator, if any
    pub fn check(&mut self, field: &str, result: Result<(), String>) -> &mut Self {
        if let Err(message) = result {
            self.add(field, message);
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn build(self) -> Option<ValidationErrors> {
        if self.errors.is_empty() {
            return None;
        }

        let message = if self.errors.len() == 1 {
            self.errors
                .values()
                .next()
                .and_then(|v| v.first())
                .cloned()
                .unwrap_or_else(|| "Validation failed".to_string())
        } else {
            format!("Validation failed for {} fields", self.errors.len())
        };

        Some(ValidationErrors {
            message,
            fields: self.errors,
        })
    }

    /// Return Ok(()) if no errors were collected
    pub fn finish(self) -> Result<(), ValidationErrors> {
        match self.build() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}
