use rusqlite::params;

use super::models::{normalize, ApplicationUser};
use super::{IdentityError, IdentityResult};
use crate::database::{collect_rows, is_constraint_violation, Database};

/// Users table access. Users are only ever created and read.
#[derive(Clone)]
pub struct UserStore {
    db: Database,
}

impl UserStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub async fn create(&self, user: ApplicationUser) -> IdentityResult<()> {
        let user_name = user.user_name.clone();
        self.db
            .run(move |conn| {
                conn.execute(
                    "INSERT INTO ApplicationUser (
                        user_id, user_name, normalized_user_name, email, normalized_email,
                        password_hash, account_creation_date
                    ) VALUES (?, ?, ?, ?, ?, ?, ?)",
                    params![
                        user.user_id,
                        user.user_name,
                        user.normalized_user_name,
                        user.email,
                        user.normalized_email,
                        user.password_hash,
                        user.account_creation_date
                    ],
                )?;
                Ok(())
            })
            .await
            .map_err(|err| {
                if is_constraint_violation(&err) {
                    IdentityError::DuplicateUserName(user_name)
                } else {
                    IdentityError::Storage(err)
                }
            })
    }

    pub async fn find_by_email(&self, email: &str) -> IdentityResult<Option<ApplicationUser>> {
        let normalized = normalize(email);
        let user = self
            .db
            .run(move |conn| {
                Ok(collect_rows(
                    conn,
                    "SELECT * FROM ApplicationUser WHERE normalized_email = ? LIMIT 1",
                    params![normalized],
                )?
                .pop())
            })
            .await?;
        Ok(user)
    }
}
