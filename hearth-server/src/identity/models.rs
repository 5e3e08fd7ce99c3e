use chrono::{DateTime, Utc};

use crate::database::FromRow;

/// Identity frameworks compare names and emails upper-cased.
pub fn normalize(value: &str) -> String {
    value.to_uppercase()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplicationUser {
    pub user_id: String,
    pub user_name: String,
    pub normalized_user_name: String,
    pub email: String,
    pub normalized_email: String,
    pub password_hash: String,
    pub account_creation_date: DateTime<Utc>,
}

impl ApplicationUser {
    /// A new user whose name is their email address.
    pub fn new(email: &str, password_hash: String) -> Self {
        Self {
            user_id: uuid::Uuid::new_v4().to_string(),
            user_name: email.to_string(),
            normalized_user_name: normalize(email),
            email: email.to_string(),
            normalized_email: normalize(email),
            password_hash,
            account_creation_date: Utc::now(),
        }
    }
}

impl FromRow for ApplicationUser {
    fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
        Ok(Self {
            user_id: row.get("user_id")?,
            user_name: row.get("user_name")?,
            normalized_user_name: row.get("normalized_user_name")?,
            email: row.get("email")?,
            normalized_email: row.get("normalized_email")?,
            password_hash: row.get("password_hash")?,
            account_creation_date: row.get("account_creation_date")?,
        })
    }
}
