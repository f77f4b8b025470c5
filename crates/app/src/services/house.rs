//! House membership
//!
//! Owns the single-house-per-user rule as a state machine over `NoHouse`
//! and `InHouse`. Every transition round-trips through the backend before
//! local state changes, so a failed call leaves the previous state intact.

use std::sync::{Arc, Mutex};

use tracing::info;
use uuid::Uuid;

use hearth_core::invariants::{assert_house_invariants, assert_user_id_valid};
use hearth_core::{Error, House, HouseRepository, ProfileRepository, Result, UserProfile};

use super::ServiceStatus;

/// Attempts at a fresh invite code before giving up
const INVITE_CODE_ATTEMPTS: u32 = 5;

/// The viewer's current membership state
#[derive(Debug, Clone, Default)]
pub enum Membership {
    #[default]
    NoHouse,
    InHouse(House),
}

impl Membership {
    pub fn house(&self) -> Option<&House> {
        match self {
            Membership::NoHouse => None,
            Membership::InHouse(house) => Some(house),
        }
    }
}

pub struct HouseService<B: ProfileRepository + HouseRepository> {
    backend: Arc<Mutex<B>>,
    membership: Membership,
    members: Vec<UserProfile>,
    status: ServiceStatus,
}

impl<B: ProfileRepository + HouseRepository> HouseService<B> {
    pub fn new(backend: Arc<Mutex<B>>) -> Self {
        Self {
            backend,
            membership: Membership::NoHouse,
            members: Vec::new(),
            status: ServiceStatus::default(),
        }
    }

    pub fn membership(&self) -> &Membership {
        &self.membership
    }

    pub fn current_house(&self) -> Option<&House> {
        self.membership.house()
    }

    /// Members of the current house from the last refresh
    pub fn members(&self) -> &[UserProfile] {
        &self.members
    }

    pub fn is_busy(&self) -> bool {
        self.status.is_busy()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.status.last_error()
    }

    /// Create a house and join it as the creator
    ///
    /// Valid only while in no house. Invite-code collisions are retried
    /// with a fresh code a bounded number of times.
    pub fn create_house(&mut self, viewer: Uuid, name: &str) -> Result<House> {
        self.status.begin();
        let result = self.create_house_inner(viewer, name);
        self.status.finish(result)
    }

    fn create_house_inner(&mut self, viewer: Uuid, name: &str) -> Result<House> {
        assert_user_id_valid(viewer, "create_house");
        if let Membership::InHouse(current) = &self.membership {
            return Err(Error::Membership(format!(
                "already a member of {}; leave it before creating another",
                current.name
            )));
        }
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::Validation("house name must not be empty".into()));
        }

        let backend = self.backend.lock().unwrap();
        let house = Self::insert_with_fresh_code(&backend, viewer, name)?;
        backend.set_house(viewer, Some(house.id))?;
        drop(backend);

        assert_house_invariants(&house);
        info!(house_id = %house.id, "created house");
        self.membership = Membership::InHouse(house.clone());
        self.members.clear();
        Ok(house)
    }

    /// Insert a house row, regenerating the invite code on a collision
    fn insert_with_fresh_code(backend: &B, viewer: Uuid, name: &str) -> Result<House> {
        for _ in 0..INVITE_CODE_ATTEMPTS {
            let house = House::new(name.to_string(), viewer);
            match backend.create_house(&house) {
                Ok(()) => return Ok(house),
                // Code already taken, roll again
                Err(Error::Conflict(_)) => continue,
                Err(err) => return Err(err),
            }
        }
        Err(Error::Conflict(
            "could not allocate an unused invite code".into(),
        ))
    }

    /// Join the house matching an invite code
    ///
    /// The lookup is exact and case-sensitive; callers normalize user
    /// input to uppercase before calling.
    pub fn join_house(&mut self, viewer: Uuid, invite_code: &str) -> Result<House> {
        self.status.begin();
        let result = self.join_house_inner(viewer, invite_code);
        self.status.finish(result)
    }

    fn join_house_inner(&mut self, viewer: Uuid, invite_code: &str) -> Result<House> {
        assert_user_id_valid(viewer, "join_house");
        if let Membership::InHouse(current) = &self.membership {
            return Err(Error::Membership(format!(
                "already a member of {}; leave it before joining another",
                current.name
            )));
        }

        let backend = self.backend.lock().unwrap();
        let house = backend
            .find_house_by_code(invite_code)?
            .ok_or_else(|| Error::NotFound(format!("no house with invite code {invite_code}")))?;
        backend.set_house(viewer, Some(house.id))?;
        drop(backend);

        info!(house_id = %house.id, "joined house");
        self.membership = Membership::InHouse(house.clone());
        self.members.clear();
        Ok(house)
    }

    /// Leave the current house
    ///
    /// The house row and its chores, expenses, and notes stay behind, and
    /// the invite code keeps working, including for the user who left.
    pub fn leave_house(&mut self, viewer: Uuid) -> Result<()> {
        self.status.begin();
        let result = self.leave_house_inner(viewer);
        self.status.finish(result)
    }

    fn leave_house_inner(&mut self, viewer: Uuid) -> Result<()> {
        if matches!(self.membership, Membership::NoHouse) {
            return Err(Error::Membership("not a member of any house".into()));
        }

        let backend = self.backend.lock().unwrap();
        backend.set_house(viewer, None)?;
        drop(backend);

        info!(%viewer, "left house");
        self.membership = Membership::NoHouse;
        self.members.clear();
        Ok(())
    }

    /// Resynchronize membership from the backend
    ///
    /// Idempotent; used after restart or sign-in. On failure the previous
    /// state stays in place.
    pub fn fetch_current_membership(&mut self, viewer: Uuid) -> Result<Membership> {
        self.status.begin();
        let result = self.fetch_membership_inner(viewer);
        self.status.finish(result)
    }

    fn fetch_membership_inner(&mut self, viewer: Uuid) -> Result<Membership> {
        let backend = self.backend.lock().unwrap();
        let profile = backend
            .find_profile(viewer)?
            .ok_or_else(|| Error::NotFound(format!("profile {viewer}")))?;

        let membership = match profile.house_id {
            Some(house_id) => {
                let house = backend
                    .find_house(house_id)?
                    .ok_or_else(|| Error::NotFound(format!("house {house_id}")))?;
                assert_house_invariants(&house);
                Membership::InHouse(house)
            }
            None => Membership::NoHouse,
        };
        drop(backend);

        self.membership = membership.clone();
        self.members.clear();
        Ok(membership)
    }

    /// Refresh the member list for the current house
    ///
    /// With no current house this clears the list and succeeds.
    pub fn refresh_members(&mut self) -> Result<Vec<UserProfile>> {
        self.status.begin();
        let result = self.refresh_members_inner();
        self.status.finish(result)
    }

    fn refresh_members_inner(&mut self) -> Result<Vec<UserProfile>> {
        let Some(house_id) = self.membership.house().map(|h| h.id) else {
            self.members.clear();
            return Ok(Vec::new());
        };

        let backend = self.backend.lock().unwrap();
        let members = backend.list_members(house_id)?;
        drop(backend);

        self.members = members.clone();
        Ok(members)
    }

    pub(crate) fn clear(&mut self) {
        self.membership = Membership::NoHouse;
        self.members.clear();
        self.status.reset();
    }
}
