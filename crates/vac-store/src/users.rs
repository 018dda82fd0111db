use rusqlite::{ErrorCode, OptionalExtension, Row, params};

use vac_model::User;

use crate::error::{StoreError, StoreResult};
use crate::store::Store;

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        username: row.get(0)?,
        password_hash: row.get(1)?,
        is_admin: row.get(2)?,
        created_at: row.get(3)?,
    })
}

impl Store {
    pub fn create_user(&self, username: &str, password_hash: &str) -> StoreResult<()> {
        let conn = self.conn();
        let result = conn.execute(
            "INSERT INTO users (username, password_hash) VALUES (?1, ?2)",
            params![username, password_hash],
        );
        match result {
            Ok(_) => Ok(()),
            Err(rusqlite::Error::SqliteFailure(e, _))
                if e.code == ErrorCode::ConstraintViolation =>
            {
                Err(StoreError::UsernameTaken(username.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Create the user if missing, e.g. when an SSO identity logs in for the
    /// first time. Returns whether a row was inserted.
    pub fn ensure_user(&self, username: &str, placeholder_hash: &str) -> StoreResult<bool> {
        let conn = self.conn();
        let inserted = conn.execute(
            "INSERT OR IGNORE INTO users (username, password_hash) VALUES (?1, ?2)",
            params![username, placeholder_hash],
        )?;
        Ok(inserted > 0)
    }

    pub fn user(&self, username: &str) -> StoreResult<Option<User>> {
        let conn = self.conn();
        let user = conn
            .query_row(
                "SELECT username, password_hash, is_admin, created_at
                 FROM users WHERE username = ?1",
                params![username],
                user_from_row,
            )
            .optional()?;
        Ok(user)
    }

    pub fn list_users(&self) -> StoreResult<Vec<User>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT username, password_hash, is_admin, created_at
             FROM users ORDER BY username",
        )?;
        let users = stmt
            .query_map([], user_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(users)
    }

    /// Returns false when no such user exists.
    pub fn set_admin(&self, username: &str, is_admin: bool) -> StoreResult<bool> {
        let conn = self.conn();
        let changed = conn.execute(
            "UPDATE users SET is_admin = ?1 WHERE username = ?2",
            params![is_admin, username],
        )?;
        Ok(changed > 0)
    }

    /// Returns false when no such user exists.
    pub fn set_password_hash(&self, username: &str, password_hash: &str) -> StoreResult<bool> {
        let conn = self.conn();
        let changed = conn.execute(
            "UPDATE users SET password_hash = ?1 WHERE username = ?2",
            params![password_hash, username],
        )?;
        Ok(changed > 0)
    }

    /// Remove a user together with all their bookings, atomically.
    pub fn delete_user(&self, username: &str) -> StoreResult<bool> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;
        tx.execute(
            "DELETE FROM vacations WHERE username = ?1",
            params![username],
        )?;
        let deleted = tx.execute("DELETE FROM users WHERE username = ?1", params![username])?;
        tx.commit()?;
        Ok(deleted > 0)
    }
}
