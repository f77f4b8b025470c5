//! Account and session storage for the local identity gateway
//!
//! Credentials stay on this side of the backend boundary; application
//! code only ever sees the sessions handed out by the gateway.

use chrono::Utc;
use rusqlite::{params, Connection};
use tracing::instrument;
use uuid::Uuid;

use super::parse::{parse_datetime, parse_uuid, OptionalExt};
use crate::error::{is_unique_violation, Error, Result};
use crate::models::{Account, Session};

pub struct AccountStore<'a> {
    conn: &'a Connection,
}

impl<'a> AccountStore<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Create a new account; a duplicate email is a typed conflict
    #[instrument(skip(self, account), fields(email = %account.email))]
    pub fn create(&self, account: &Account) -> Result<()> {
        self.conn
            .execute(
                "INSERT INTO accounts (id, email, password_hash, display_name, created_at) VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    account.id.to_string(),
                    account.email,
                    account.password_hash,
                    account.display_name,
                    account.created_at.to_rfc3339(),
                ],
            )
            .map_err(|err| {
                if is_unique_violation(&err) {
                    Error::Conflict(format!("an account for {} already exists", account.email))
                } else {
                    Error::Database(err)
                }
            })?;
        Ok(())
    }

    /// Find account by email
    #[instrument(skip(self))]
    pub fn find_by_email(&self, email: &str) -> Result<Option<Account>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, email, password_hash, display_name, created_at FROM accounts WHERE email = ?1",
        )?;

        let account = stmt
            .query_row(params![email], |row| {
                Ok(Account {
                    id: parse_uuid(&row.get::<_, String>(0)?)?,
                    email: row.get(1)?,
                    password_hash: row.get(2)?,
                    display_name: row.get(3)?,
                    created_at: parse_datetime(&row.get::<_, String>(4)?)?,
                })
            })
            .optional()?;

        Ok(account)
    }

    /// Replace the password hash for an account
    pub fn update_password(&self, user_id: Uuid, password_hash: &str) -> Result<()> {
        let updated = self.conn.execute(
            "UPDATE accounts SET password_hash = ?1 WHERE id = ?2",
            params![password_hash, user_id.to_string()],
        )?;
        if updated == 0 {
            return Err(Error::NotFound(format!("account {user_id}")));
        }
        Ok(())
    }

    /// Create a session
    #[instrument(skip(self, session), fields(user_id = %session.user_id))]
    pub fn create_session(&self, session: &Session) -> Result<()> {
        self.conn.execute(
            "INSERT INTO sessions (id, user_id, created_at, expires_at) VALUES (?1, ?2, ?3, ?4)",
            params![
                session.id.to_string(),
                session.user_id.to_string(),
                session.created_at.to_rfc3339(),
                session.expires_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// Find valid session
    #[instrument(skip(self))]
    pub fn find_valid_session(&self, session_id: Uuid) -> Result<Option<Session>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, user_id, created_at, expires_at FROM sessions WHERE id = ?1 AND expires_at > ?2",
        )?;

        let now = Utc::now().to_rfc3339();
        let session = stmt
            .query_row(params![session_id.to_string(), now], |row| {
                Ok(Session {
                    id: parse_uuid(&row.get::<_, String>(0)?)?,
                    user_id: parse_uuid(&row.get::<_, String>(1)?)?,
                    created_at: parse_datetime(&row.get::<_, String>(2)?)?,
                    expires_at: parse_datetime(&row.get::<_, String>(3)?)?,
                })
            })
            .optional()?;

        Ok(session)
    }

    /// Delete session
    pub fn delete_session(&self, session_id: Uuid) -> Result<()> {
        self.conn.execute(
            "DELETE FROM sessions WHERE id = ?1",
            params![session_id.to_string()],
        )?;
        Ok(())
    }

    /// Clean up expired sessions
    pub fn cleanup_expired_sessions(&self) -> Result<u64> {
        let count = self.conn.execute(
            "DELETE FROM sessions WHERE expires_at < ?1",
            params![Utc::now().to_rfc3339()],
        )?;
        Ok(count as u64)
    }
}
