//! Composed application context.
//!
//! One object owns the backend handle, the signed-in session, and the
//! feature services. The session lives here and nowhere else; signing
//! out tears every service cache down with it.

use std::sync::{Arc, Mutex};

use tracing::info;
use uuid::Uuid;

use hearth_core::{Backend, Database, Error, Result, Session, UserProfile};

use crate::config::AppConfig;
use crate::services::{ChoreService, ExpenseService, HouseService, NoteService, ProfileService};

/// Application context generic over the backend, SQLite by default
pub struct AppContext<B: Backend = Database> {
    backend: Arc<Mutex<B>>,
    session: Option<Session>,
    pub profiles: ProfileService<B>,
    pub houses: HouseService<B>,
    pub chores: ChoreService<B>,
    pub expenses: ExpenseService<B>,
    pub notes: NoteService<B>,
}

impl AppContext<Database> {
    /// Open the configured on-disk database and compose the context
    pub fn open(config: &AppConfig) -> Result<Self> {
        let path = config.database_path()?;
        let mut db = Database::open(&path)?;
        db.set_session_hours(config.session_hours);
        Ok(Self::with_backend(db))
    }

    /// In-memory variant for tests and previews
    pub fn open_in_memory(config: &AppConfig) -> Result<Self> {
        let mut db = Database::open_in_memory()?;
        db.set_session_hours(config.session_hours);
        Ok(Self::with_backend(db))
    }
}

impl<B: Backend> AppContext<B> {
    /// Compose the context around an already-open backend
    pub fn with_backend(backend: B) -> Self {
        let backend = Arc::new(Mutex::new(backend));
        Self {
            profiles: ProfileService::new(Arc::clone(&backend)),
            houses: HouseService::new(Arc::clone(&backend)),
            chores: ChoreService::new(Arc::clone(&backend)),
            expenses: ExpenseService::new(Arc::clone(&backend)),
            notes: NoteService::new(Arc::clone(&backend)),
            backend,
            session: None,
        }
    }

    /// The live session, if signed in
    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// The signed-in user's id
    pub fn current_user(&self) -> Option<Uuid> {
        self.session.as_ref().map(|s| s.user_id)
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }

    /// Register an account and bring the context up for it
    pub fn sign_up(
        &mut self,
        email: &str,
        password: &str,
        display_name: &str,
    ) -> Result<UserProfile> {
        let backend = self.backend.lock().unwrap();
        let session = backend.sign_up(email, password, display_name)?;
        drop(backend);

        self.establish(session, Some(email), Some(display_name))
    }

    /// Authenticate an existing account and bring the context up for it
    pub fn sign_in(&mut self, email: &str, password: &str) -> Result<UserProfile> {
        let backend = self.backend.lock().unwrap();
        let session = backend.sign_in(email, password)?;
        drop(backend);

        self.establish(session, Some(email), None)
    }

    /// Resynchronize from a stored session id after a restart
    ///
    /// Where the id was stored is the platform's concern; here an
    /// expired or unknown id is an authentication failure, prompting a
    /// fresh sign-in.
    pub fn restore(&mut self, session_id: Uuid) -> Result<UserProfile> {
        let backend = self.backend.lock().unwrap();
        let session = backend
            .current_session(session_id)?
            .ok_or_else(|| Error::Authentication("session expired, sign in again".into()))?;
        drop(backend);

        self.establish(session, None, None)
    }

    /// Invalidate the session and clear every service cache
    ///
    /// If the gateway call fails the session is kept, so the caller can
    /// retry; nothing is torn down on that path.
    pub fn sign_out(&mut self) -> Result<()> {
        let Some(session) = self.session.as_ref() else {
            return Ok(());
        };
        let session_id = session.id;

        let backend = self.backend.lock().unwrap();
        backend.sign_out(session_id)?;
        drop(backend);

        self.teardown();
        info!("signed out");
        Ok(())
    }

    /// Change the signed-in account's password
    pub fn update_password(&mut self, new_password: &str) -> Result<()> {
        let session = self
            .session
            .as_ref()
            .ok_or_else(|| Error::Authentication("not signed in".into()))?;

        let backend = self.backend.lock().unwrap();
        backend.update_password(session.id, new_password)
    }

    /// Adopt a session: resolve the profile, then prime the services.
    ///
    /// Profile resolution failing is fatal and unwinds the session.
    /// Membership and list loading are best-effort; a failure there
    /// leaves the user signed in with caches empty and the error on the
    /// owning service.
    fn establish(
        &mut self,
        session: Session,
        email: Option<&str>,
        display_name: Option<&str>,
    ) -> Result<UserProfile> {
        let user_id = session.user_id;
        self.session = Some(session);

        let profile = match self.profiles.resolve(user_id, email, display_name) {
            Ok(profile) => profile,
            Err(err) => {
                self.teardown();
                return Err(err);
            }
        };

        let _ = self.houses.fetch_current_membership(user_id);
        let house_id = self.houses.membership().house().map(|h| h.id);
        if let Some(house_id) = house_id {
            let _ = self.houses.refresh_members();
            let _ = self.chores.fetch(house_id);
            let _ = self.expenses.fetch(house_id, user_id);
            let _ = self.notes.fetch(house_id);
        }

        info!(user_id = %user_id, "session established");
        Ok(profile)
    }

    fn teardown(&mut self) {
        self.session = None;
        self.profiles.clear();
        self.houses.clear();
        self.chores.clear();
        self.expenses.clear();
        self.notes.clear();
    }
}
