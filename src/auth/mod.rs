//! Authentication: the pluggable [`Authenticator`] capability, the built-in
//! credential table and the session store.

mod session;

pub use session::AuthStore;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::OnceLock;
use tracing::{debug, warn};

use crate::db::{User, UserRole};
use crate::error::{StoreError, StoreResult};
use crate::utils::avatar_url;

/// Something that can check a password and hand back the matching user.
///
/// Swap in a real identity provider by implementing this trait; the stores
/// and the controller only ever talk to it through `Arc<dyn Authenticator>`.
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// The user owning `email` if `password` matches, `None` otherwise
    async fn validate(&self, email: &str, password: &str) -> Option<User>;

    /// Make a freshly signed-up user known to the provider
    async fn register(&self, _email: &str, _password: &str, _user: &User) {}

    /// Number of accounts the provider knows about
    fn account_count(&self) -> usize {
        0
    }
}

/// Hash a password using Argon2
pub fn hash_password(password: &str) -> StoreResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| StoreError::PasswordHash(e.to_string()))?;
    Ok(hash.to_string())
}

/// Verify a password against a hash
pub fn verify_password(password: &str, hash: &str) -> bool {
    let parsed_hash = match PasswordHash::new(hash) {
        Ok(h) => h,
        Err(_) => return false,
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

#[derive(Debug, Clone)]
struct Account {
    password_hash: String,
    user: User,
}

/// In-memory table of email → (password hash, user)
pub struct CredentialTable {
    accounts: RwLock<HashMap<String, Account>>,
}

/// (id, email, password, name, role)
const DEMO_ACCOUNTS: [(&str, &str, &str, &str, UserRole); 3] = [
    ("1", "admin@taskflow.com", "admin123", "Rajesh", UserRole::Admin),
    ("2", "manager@taskflow.com", "manager123", "Priya", UserRole::Manager),
    ("3", "member@taskflow.com", "member123", "Amit", UserRole::Member),
];

const DEMO_SURNAMES: [&str; 3] = ["Kumar", "Sharma", "Patel"];

impl CredentialTable {
    pub fn new() -> Self {
        Self {
            accounts: RwLock::new(HashMap::new()),
        }
    }

    /// The three fixed demo accounts (admin, manager, member)
    pub fn demo() -> StoreResult<Self> {
        static DEMO_HASHES: OnceLock<Vec<String>> = OnceLock::new();

        // Hash once per process; argon2 is deliberately slow
        let hashes = match DEMO_HASHES.get() {
            Some(hashes) => hashes,
            None => {
                let computed = DEMO_ACCOUNTS
                    .iter()
                    .map(|(_, _, password, _, _)| hash_password(password))
                    .collect::<StoreResult<Vec<_>>>()?;
                DEMO_HASHES.get_or_init(|| computed)
            }
        };

        let table = Self::new();
        let created_at = Utc::now();
        for (((id, email, _, first_name, role), surname), hash) in DEMO_ACCOUNTS
            .iter()
            .zip(DEMO_SURNAMES.iter())
            .zip(hashes.iter())
        {
            let user = User {
                id: id.to_string(),
                email: email.to_string(),
                name: format!("{} {}", first_name, surname),
                avatar: Some(avatar_url(first_name)),
                role: *role,
                created_at,
            };
            table.insert_hashed(email, hash.clone(), user);
        }

        Ok(table)
    }

    /// Add or replace an account, hashing the password
    pub fn insert(&self, email: &str, password: &str, user: User) -> StoreResult<()> {
        let hash = hash_password(password)?;
        self.insert_hashed(email, hash, user);
        Ok(())
    }

    /// Add an account only if the email is unknown. Returns whether it was
    /// added; existing accounts are never replaced.
    pub fn insert_new(&self, email: &str, password: &str, user: User) -> StoreResult<bool> {
        if self.contains(email) {
            return Ok(false);
        }
        let hash = hash_password(password)?;
        let mut accounts = self.accounts.write();
        if accounts.contains_key(email) {
            return Ok(false);
        }
        accounts.insert(
            email.to_string(),
            Account {
                password_hash: hash,
                user,
            },
        );
        Ok(true)
    }

    fn insert_hashed(&self, email: &str, password_hash: String, user: User) {
        self.accounts.write().insert(
            email.to_string(),
            Account {
                password_hash,
                user,
            },
        );
    }

    pub fn contains(&self, email: &str) -> bool {
        self.accounts.read().contains_key(email)
    }
}

impl Default for CredentialTable {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Authenticator for CredentialTable {
    async fn validate(&self, email: &str, password: &str) -> Option<User> {
        let account = self.accounts.read().get(email).cloned()?;
        if verify_password(password, &account.password_hash) {
            Some(account.user)
        } else {
            debug!(email, "Password mismatch");
            None
        }
    }

    async fn register(&self, email: &str, password: &str, user: &User) {
        match self.insert_new(email, password, user.clone()) {
            Ok(true) => {}
            Ok(false) => warn!(email, "Email already registered, keeping existing credentials"),
            Err(e) => warn!(email, error = %e, "Failed to register credentials"),
        }
    }

    fn account_count(&self) -> usize {
        self.accounts.read().len()
    }
}
