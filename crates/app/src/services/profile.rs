//! Profile resolution
//!
//! Maps an authenticated identity to its application profile row. The
//! backend normally creates the row at sign-up; when it has not, the
//! resolver compensates by inserting defaults and re-fetching exactly
//! once. A profile still missing after that is a fatal error, never a
//! retry loop.

use std::sync::{Arc, Mutex};

use tracing::warn;
use uuid::Uuid;

use hearth_core::invariants::assert_profile_invariants;
use hearth_core::{Error, ProfileRepository, Result, UserProfile};

use super::ServiceStatus;

/// Display name used when sign-up provided none
const FALLBACK_DISPLAY_NAME: &str = "User";

pub struct ProfileService<B: ProfileRepository> {
    backend: Arc<Mutex<B>>,
    profile: Option<UserProfile>,
    status: ServiceStatus,
}

impl<B: ProfileRepository> ProfileService<B> {
    pub fn new(backend: Arc<Mutex<B>>) -> Self {
        Self {
            backend,
            profile: None,
            status: ServiceStatus::default(),
        }
    }

    /// The resolved profile, if any
    pub fn profile(&self) -> Option<&UserProfile> {
        self.profile.as_ref()
    }

    pub fn is_busy(&self) -> bool {
        self.status.is_busy()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.status.last_error()
    }

    /// Resolve the profile for an authenticated user, creating it if absent
    ///
    /// `email` and `display_name_hint` seed the compensating insert; both
    /// may be absent when restoring a session, in which case the fallback
    /// name is used.
    pub fn resolve(
        &mut self,
        user_id: Uuid,
        email: Option<&str>,
        display_name_hint: Option<&str>,
    ) -> Result<UserProfile> {
        self.status.begin();
        let result = self.resolve_inner(user_id, email, display_name_hint);
        self.status.finish(result)
    }

    fn resolve_inner(
        &mut self,
        user_id: Uuid,
        email: Option<&str>,
        display_name_hint: Option<&str>,
    ) -> Result<UserProfile> {
        let backend = self.backend.lock().unwrap();

        if let Some(profile) = backend.find_profile(user_id)? {
            drop(backend);
            assert_profile_invariants(&profile);
            self.profile = Some(profile.clone());
            return Ok(profile);
        }

        warn!(%user_id, "no profile row for authenticated user, creating defaults");
        let display_name = display_name_hint
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(FALLBACK_DISPLAY_NAME);
        let fresh = UserProfile::new(
            user_id,
            email.map(str::to_string),
            Some(display_name.to_string()),
        );
        if let Err(err) = backend.create_profile(&fresh) {
            // A concurrent resolver may have inserted the row first; the
            // re-fetch below settles it either way
            if !err.is_conflict() {
                return Err(err);
            }
        }

        // Exactly one re-fetch; a still-missing row is fatal
        match backend.find_profile(user_id)? {
            Some(profile) => {
                drop(backend);
                assert_profile_invariants(&profile);
                self.profile = Some(profile.clone());
                Ok(profile)
            }
            None => Err(Error::Profile(format!(
                "profile for {user_id} still missing after creation"
            ))),
        }
    }

    /// Rename the signed-in user, then re-fetch the authoritative row
    pub fn update_display_name(&mut self, user_id: Uuid, display_name: &str) -> Result<UserProfile> {
        self.status.begin();
        let result = self.update_inner(user_id, display_name);
        self.status.finish(result)
    }

    fn update_inner(&mut self, user_id: Uuid, display_name: &str) -> Result<UserProfile> {
        let display_name = display_name.trim();
        if display_name.is_empty() {
            return Err(Error::Validation("display name must not be empty".into()));
        }

        let backend = self.backend.lock().unwrap();
        backend.update_display_name(user_id, display_name)?;
        let profile = backend
            .find_profile(user_id)?
            .ok_or_else(|| Error::NotFound(format!("profile {user_id}")))?;
        drop(backend);

        self.profile = Some(profile.clone());
        Ok(profile)
    }

    pub(crate) fn clear(&mut self) {
        self.profile = None;
        self.status.reset();
    }
}
