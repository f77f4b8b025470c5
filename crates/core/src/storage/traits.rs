//! Backend repository traits
//!
//! These traits define the narrow backend interface the services consume:
//! table-scoped CRUD with equality filters and fixed orderings, plus the
//! session endpoint. The bundled SQLite [`Database`](super::Database)
//! implements all of them; a hosted store or mock can stand in behind the
//! same interface.

use uuid::Uuid;

use crate::error::Result;
use crate::models::{Chore, Expense, House, Note, Session, UserProfile};

/// User profile operations
pub trait ProfileRepository {
    /// Create a profile row; a duplicate id is a typed conflict
    fn create_profile(&self, profile: &UserProfile) -> Result<()>;

    /// Find a profile by user id
    fn find_profile(&self, id: Uuid) -> Result<Option<UserProfile>>;

    /// Update the display name
    fn update_display_name(&self, id: Uuid, display_name: &str) -> Result<()>;

    /// Set or clear the house a user belongs to
    fn set_house(&self, id: Uuid, house_id: Option<Uuid>) -> Result<()>;

    /// List profiles belonging to a house
    fn list_members(&self, house_id: Uuid) -> Result<Vec<UserProfile>>;
}

/// House operations
pub trait HouseRepository {
    /// Insert a house row; a taken invite code is a typed conflict
    fn create_house(&self, house: &House) -> Result<()>;

    /// Find a house by id
    fn find_house(&self, id: Uuid) -> Result<Option<House>>;

    /// Exact, case-sensitive invite-code lookup
    fn find_house_by_code(&self, invite_code: &str) -> Result<Option<House>>;
}

/// Chore operations
pub trait ChoreRepository {
    /// List chores for a house, soonest due first with undated chores at
    /// the top
    fn list_chores(&self, house_id: Uuid) -> Result<Vec<Chore>>;

    /// Create a chore
    fn create_chore(&self, chore: &Chore) -> Result<()>;

    /// Replace the editable fields of a chore
    fn update_chore(&self, chore: &Chore) -> Result<()>;

    /// Mark a chore complete or not
    fn set_chore_completed(&self, id: Uuid, is_completed: bool) -> Result<()>;

    /// Assign a chore to a member, or unassign it
    fn assign_chore(&self, id: Uuid, assigned_user_id: Option<Uuid>) -> Result<()>;

    /// Delete a chore
    fn delete_chore(&self, id: Uuid) -> Result<()>;
}

/// Expense operations
pub trait ExpenseRepository {
    /// List expenses for a house, newest first
    fn list_expenses(&self, house_id: Uuid) -> Result<Vec<Expense>>;

    /// Create an expense
    fn create_expense(&self, expense: &Expense) -> Result<()>;

    /// Replace the editable fields of an expense
    fn update_expense(&self, expense: &Expense) -> Result<()>;

    /// Delete an expense
    fn delete_expense(&self, id: Uuid) -> Result<()>;
}

/// Note operations
pub trait NoteRepository {
    /// List notes for a house, pinned first, then newest
    fn list_notes(&self, house_id: Uuid) -> Result<Vec<Note>>;

    /// Create a note
    fn create_note(&self, note: &Note) -> Result<()>;

    /// Replace the editable fields of a note
    fn update_note(&self, note: &Note) -> Result<()>;

    /// Pin or unpin a note
    fn set_note_pinned(&self, id: Uuid, is_pinned: bool) -> Result<()>;

    /// Delete a note
    fn delete_note(&self, id: Uuid) -> Result<()>;
}

/// Session endpoint of the identity gateway
pub trait SessionGateway {
    /// Register a new account; a duplicate email is a typed conflict
    fn sign_up(&self, email: &str, password: &str, display_name: &str) -> Result<Session>;

    /// Authenticate an existing account
    fn sign_in(&self, email: &str, password: &str) -> Result<Session>;

    /// Invalidate a session
    fn sign_out(&self, session_id: Uuid) -> Result<()>;

    /// Return the session iff it exists and has not expired
    fn current_session(&self, session_id: Uuid) -> Result<Option<Session>>;

    /// Replace the password for the session's account
    fn update_password(&self, session_id: Uuid, new_password: &str) -> Result<()>;
}

/// Combined backend interface
///
/// Everything the application context needs from a backend.
/// Implementations may be backed by SQLite, mocks, or a remote service.
pub trait Backend:
    ProfileRepository
    + HouseRepository
    + ChoreRepository
    + ExpenseRepository
    + NoteRepository
    + SessionGateway
{
}

// Blanket implementation: any type implementing all traits implements Backend
impl<T> Backend for T where
    T: ProfileRepository
        + HouseRepository
        + ChoreRepository
        + ExpenseRepository
        + NoteRepository
        + SessionGateway
{
}
