//! Local session gateway
//!
//! A self-hosted implementation of the session endpoint, backed by the
//! accounts and sessions tables. Passwords are stored as argon2 PHC
//! strings and never leave this module. A hosted identity provider can
//! replace all of it behind the same [`SessionGateway`] trait.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use tracing::instrument;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::{Account, Session};
use crate::storage::{Database, SessionGateway};

/// Default session lifetime: one week
pub const DEFAULT_SESSION_HOURS: i64 = 24 * 7;

fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| Error::Authentication(format!("failed to hash password: {e}")))
}

fn verify_password(password: &str, stored_hash: &str) -> Result<()> {
    let parsed = PasswordHash::new(stored_hash)
        .map_err(|_| Error::Authentication("stored password hash is invalid".into()))?;
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .map_err(|_| Error::Authentication("invalid email or password".into()))
}

impl SessionGateway for Database {
    #[instrument(skip(self, password, display_name))]
    fn sign_up(&self, email: &str, password: &str, display_name: &str) -> Result<Session> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(Error::Validation(
                "email and password must not be empty".into(),
            ));
        }

        let accounts = self.accounts();
        if accounts.find_by_email(email)?.is_some() {
            return Err(Error::Conflict(format!(
                "an account for {email} already exists"
            )));
        }

        let display_name = display_name.trim();
        let account = Account::new(
            email.to_string(),
            hash_password(password)?,
            (!display_name.is_empty()).then(|| display_name.to_string()),
        );
        // The UNIQUE constraint still backstops a concurrent sign-up
        accounts.create(&account)?;

        let session = Session::new(account.id, self.session_hours());
        accounts.create_session(&session)?;
        Ok(session)
    }

    #[instrument(skip(self, password))]
    fn sign_in(&self, email: &str, password: &str) -> Result<Session> {
        let accounts = self.accounts();
        accounts.cleanup_expired_sessions()?;

        let account = accounts
            .find_by_email(email)?
            .ok_or_else(|| Error::Authentication("invalid email or password".into()))?;
        verify_password(password, &account.password_hash)?;

        let session = Session::new(account.id, self.session_hours());
        accounts.create_session(&session)?;
        Ok(session)
    }

    fn sign_out(&self, session_id: Uuid) -> Result<()> {
        self.accounts().delete_session(session_id)
    }

    fn current_session(&self, session_id: Uuid) -> Result<Option<Session>> {
        self.accounts().find_valid_session(session_id)
    }

    #[instrument(skip(self, new_password))]
    fn update_password(&self, session_id: Uuid, new_password: &str) -> Result<()> {
        if new_password.is_empty() {
            return Err(Error::Validation("password must not be empty".into()));
        }

        let session = self
            .current_session(session_id)?
            .ok_or_else(|| Error::Authentication("session expired or unknown".into()))?;
        self.accounts()
            .update_password(session.user_id, &hash_password(new_password)?)
    }
}
