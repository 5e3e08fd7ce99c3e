//! Users, passwords and bearer tokens for the secure API.

pub mod extractor;
pub mod models;
pub mod password;
pub mod routes;
pub mod store;
pub mod token;

use crate::database::Migrations;

pub const MIGRATIONS: Migrations = &[include_str!("migrations/01-initial.sql")];

pub type IdentityResult<T> = std::result::Result<T, IdentityError>;

#[derive(thiserror::Error, Debug)]
pub enum IdentityError {
    #[error("Username '{0}' is already taken.")]
    DuplicateUserName(String),
    #[error("Password rejected: {}", .0.join(" "))]
    WeakPassword(Vec<String>),
    #[error("Password hashing failed: {0}")]
    Hash(String),
    #[error("User storage error: {0:#}")]
    Storage(#[from] anyhow::Error),
}

impl IdentityError {
    /// Messages that are safe to show to whoever is registering.
    pub fn descriptions(&self) -> Option<Vec<String>> {
        match self {
            IdentityError::DuplicateUserName(_) => Some(vec![self.to_string()]),
            IdentityError::WeakPassword(problems) => Some(problems.clone()),
            IdentityError::Hash(_) | IdentityError::Storage(_) => None,
        }
    }
}
