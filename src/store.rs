use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::{self, File, create_dir_all};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default location of the user table.
const USERS_FILE: &str = "database/users.json";

/// A stored user record.
///
/// Passwords are stored as Argon2 hashes with a per-record salt; the
/// plaintext never touches disk. The optional fields default to `None`
/// when a table written by an older revision is read back, so the
/// migration is loss-free.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct UserRecord {
    /// Username (unique key for the record)
    pub username: String,

    /// Argon2 hash of the user's password
    pub password_hash: String,

    /// Email address, if one was supplied at sign-up
    #[serde(default)]
    pub email: Option<String>,

    /// Date the account was created; immutable after sign-up
    #[serde(default)]
    pub member_since: Option<NaiveDate>,
}

/// Fatal storage failures.
///
/// Expected outcomes (username taken, bad credentials, unknown user) are
/// reported as `Ok(false)` / `Ok(None)`, never through this type.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to access users file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse users data: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("password hashing failed")]
    Hash,
}

/// Single-table credential store backed by a JSON file.
///
/// Every operation opens the file, performs one read or one
/// read-modify-write, and closes it again; no state is held between
/// calls and no transaction spans more than one operation.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    /// Create a store over the given user-table path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Create a store over the default `database/users.json` path.
    pub fn open_default() -> Self {
        Self::new(USERS_FILE)
    }

    /// Ensure the user table exists.
    ///
    /// Creates the parent directory and an empty table if absent;
    /// idempotent. Tables written by older revisions need no rewriting:
    /// newly added optional fields deserialize as `None`.
    pub fn initialize(&self) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                create_dir_all(parent)?;
            }
        }

        if !Path::new(&self.path).exists() {
            let mut file = File::create(&self.path)?;
            file.write_all(b"{}")?;
        }

        Ok(())
    }

    /// Insert a new user record.
    ///
    /// `member_since` is set to the current date. Returns `Ok(false)`
    /// without touching the table when the username is already taken -
    /// callers must treat that as "username taken", not a fatal error.
    pub fn create_user(
        &self,
        username: &str,
        password: &str,
        email: Option<&str>,
    ) -> Result<bool, StoreError> {
        let mut users = self.read_users()?;
        if users.contains_key(username) {
            return Ok(false);
        }

        let record = UserRecord {
            username: username.to_string(),
            password_hash: hash_password(password)?,
            email: email.map(|e| e.to_string()),
            member_since: Some(Utc::now().date_naive()),
        };

        users.insert(username.to_string(), record);
        self.write_users(&users)?;
        Ok(true)
    }

    /// True iff a record exists whose username and password both match.
    pub fn verify_credentials(&self, username: &str, password: &str) -> Result<bool, StoreError> {
        let users = self.read_users()?;
        match users.get(username) {
            Some(user) => verify_password(password, &user.password_hash),
            None => Ok(false),
        }
    }

    /// Email for the given user; `Ok(None)` signals an unknown user or a
    /// record without one, not an error.
    pub fn get_email(&self, username: &str) -> Result<Option<String>, StoreError> {
        let users = self.read_users()?;
        Ok(users.get(username).and_then(|u| u.email.clone()))
    }

    /// Join date for the given user; `Ok(None)` signals an unknown user.
    pub fn get_member_since(&self, username: &str) -> Result<Option<NaiveDate>, StoreError> {
        let users = self.read_users()?;
        Ok(users.get(username).and_then(|u| u.member_since))
    }

    /// Overwrite the stored password after re-verifying the current one.
    ///
    /// Returns `Ok(false)` - leaving the record untouched - when the
    /// current password does not verify or the user is unknown.
    pub fn change_password(
        &self,
        username: &str,
        current_password: &str,
        new_password: &str,
    ) -> Result<bool, StoreError> {
        let mut users = self.read_users()?;

        let verified = match users.get(username) {
            Some(user) => verify_password(current_password, &user.password_hash)?,
            None => false,
        };
        if !verified {
            return Ok(false);
        }

        let new_hash = hash_password(new_password)?;
        if let Some(user) = users.get_mut(username) {
            user.password_hash = new_hash;
        }
        self.write_users(&users)?;
        Ok(true)
    }

    fn read_users(&self) -> Result<HashMap<String, UserRecord>, StoreError> {
        let mut file = File::open(&self.path)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;
        Ok(serde_json::from_str(&contents)?)
    }

    fn write_users(&self, users: &HashMap<String, UserRecord>) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(users)?;
        fs::write(&self.path, json)?;
        Ok(())
    }
}

/// Hash a password with Argon2id and a fresh per-record salt.
fn hash_password(password: &str) -> Result<String, StoreError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    match argon2.hash_password(password.as_bytes(), &salt) {
        Ok(hash) => Ok(hash.to_string()),
        Err(_) => Err(StoreError::Hash),
    }
}

/// Verify a password against a stored Argon2 hash.
fn verify_password(password: &str, hash: &str) -> Result<bool, StoreError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| StoreError::Hash)?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
        Ok(_) => Ok(true),
        Err(_) => Ok(false), // Password didn't match
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store() -> (tempfile::TempDir, CredentialStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = CredentialStore::new(dir.path().join("users.json"));
        store.initialize().unwrap();
        (dir, store)
    }

    #[test]
    fn initialize_is_idempotent() {
        let (_dir, store) = temp_store();
        store.initialize().unwrap();
        assert!(store.create_user("alice", "pw1", None).unwrap());
    }

    #[test]
    fn create_then_verify_succeeds() {
        let (_dir, store) = temp_store();
        assert!(store.create_user("alice", "pw1", Some("a@x.com")).unwrap());
        assert!(store.verify_credentials("alice", "pw1").unwrap());
        assert!(!store.verify_credentials("alice", "wrong").unwrap());
    }

    #[test]
    fn duplicate_username_is_rejected_without_damage() {
        let (_dir, store) = temp_store();
        assert!(store.create_user("alice", "pw1", Some("a@x.com")).unwrap());
        assert!(!store.create_user("alice", "other", Some("b@y.com")).unwrap());

        // Original record, including the original password, is unchanged
        assert!(store.verify_credentials("alice", "pw1").unwrap());
        assert!(!store.verify_credentials("alice", "other").unwrap());
        assert_eq!(store.get_email("alice").unwrap().as_deref(), Some("a@x.com"));
    }

    #[test]
    fn lookups_on_unknown_user_are_absent_not_errors() {
        let (_dir, store) = temp_store();
        assert_eq!(store.get_email("nobody").unwrap(), None);
        assert_eq!(store.get_member_since("nobody").unwrap(), None);
        assert!(!store.verify_credentials("nobody", "pw").unwrap());
    }

    #[test]
    fn member_since_is_set_at_creation() {
        let (_dir, store) = temp_store();
        store.create_user("alice", "pw1", None).unwrap();
        assert_eq!(
            store.get_member_since("alice").unwrap(),
            Some(Utc::now().date_naive())
        );
    }

    #[test]
    fn change_password_requires_current_password() {
        let (_dir, store) = temp_store();
        store.create_user("alice", "pw1", None).unwrap();

        assert!(!store.change_password("alice", "wrong", "pw2").unwrap());
        assert!(store.verify_credentials("alice", "pw1").unwrap());

        assert!(store.change_password("alice", "pw1", "pw2").unwrap());
        assert!(store.verify_credentials("alice", "pw2").unwrap());
        assert!(!store.verify_credentials("alice", "pw1").unwrap());
    }

    #[test]
    fn older_revision_table_gains_optional_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("users.json");
        let hash = hash_password("pw1").unwrap();
        let legacy = format!(
            "{{\"alice\":{{\"username\":\"alice\",\"password_hash\":\"{}\"}}}}",
            hash
        );
        fs::write(&path, legacy).unwrap();

        let store = CredentialStore::new(&path);
        store.initialize().unwrap();
        assert!(store.verify_credentials("alice", "pw1").unwrap());
        assert_eq!(store.get_email("alice").unwrap(), None);
        assert_eq!(store.get_member_since("alice").unwrap(), None);
    }

    #[test]
    fn end_to_end_signup_login_change() {
        let (_dir, store) = temp_store();
        assert!(store.create_user("alice", "pw1", Some("a@x.com")).unwrap());
        assert!(store.verify_credentials("alice", "pw1").unwrap());
        assert!(!store.verify_credentials("alice", "wrong").unwrap());
        assert!(store.change_password("alice", "pw1", "pw2").unwrap());
        assert!(!store.verify_credentials("alice", "pw1").unwrap());
        assert!(store.verify_credentials("alice", "pw2").unwrap());
    }
}
