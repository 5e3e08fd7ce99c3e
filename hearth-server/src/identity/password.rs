use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use super::{IdentityError, IdentityResult};
use crate::config::PasswordPolicy;

/// Hash a password into a PHC string (argon2id, random salt).
pub fn hash_password(password: &str) -> IdentityResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Ok(Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| IdentityError::Hash(e.to_string()))?
        .to_string())
}

lazy_static::lazy_static! {
    // Same argon2 parameters as stored hashes, so an unknown account costs as much as a wrong password.
    static ref DECOY_HASH: Option<String> = hash_password("decoy password").ok();
}

/// Run a full verification that can never succeed.
pub fn verify_against_decoy(password: &str) -> bool {
    match DECOY_HASH.as_deref() {
        Some(decoy) => {
            verify_password(password, decoy);
        }
        None => tracing::warn!("No decoy password hash available"),
    }
    false
}

/// False for a wrong password and for a hash that cannot be parsed.
pub fn verify_password(password: &str, password_hash: &str) -> bool {
    match PasswordHash::new(password_hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            tracing::warn!("Stored password hash is unreadable: {}", e);
            false
        }
    }
}

impl PasswordPolicy {
    /// Every rule the password breaks, worded for the person registering.
    pub fn violations(&self, password: &str) -> Vec<String> {
        let mut problems = vec![];
        if password.chars().count() < self.required_length {
            problems.push(format!(
                "Passwords must be at least {} characters.",
                self.required_length
            ));
        }
        if self.require_non_alphanumeric && password.chars().all(|c| c.is_ascii_alphanumeric()) {
            problems.push("Passwords must have at least one non alphanumeric character.".into());
        }
        if self.require_digit && !password.chars().any(|c| c.is_ascii_digit()) {
            problems.push("Passwords must have at least one digit ('0'-'9').".into());
        }
        if self.require_lowercase && !password.chars().any(|c| c.is_ascii_lowercase()) {
            problems.push("Passwords must have at least one lowercase ('a'-'z').".into());
        }
        if self.require_uppercase && !password.chars().any(|c| c.is_ascii_uppercase()) {
            problems.push("Passwords must have at least one uppercase ('A'-'Z').".into());
        }
        problems
    }

    pub fn check(&self, password: &str) -> IdentityResult<()> {
        let problems = self.violations(password);
        if problems.is_empty() {
            Ok(())
        } else {
            Err(IdentityError::WeakPassword(problems))
        }
    }
}
