//! SQLite storage layer for Hearth

mod accounts;
mod chores;
mod expenses;
mod houses;
mod migrations;
mod notes;
mod parse;
mod profiles;
mod traits;

use std::path::Path;

use rusqlite::Connection;
use tracing::instrument;
use uuid::Uuid;

use crate::auth::DEFAULT_SESSION_HOURS;
use crate::error::Result;
use crate::models::{Chore, Expense, House, Note, UserProfile};

pub use accounts::AccountStore;
pub use chores::ChoreStore;
pub use expenses::ExpenseStore;
pub use houses::HouseStore;
pub use notes::NoteStore;
pub use profiles::ProfileStore;
pub use traits::{
    Backend, ChoreRepository, ExpenseRepository, HouseRepository, NoteRepository,
    ProfileRepository, SessionGateway,
};

/// Main database handle
///
/// Implements every repository trait plus [`SessionGateway`], making it a
/// complete self-hosted backend.
pub struct Database {
    conn: Connection,
    session_hours: i64,
}

impl Database {
    /// Open or create database at the given path
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA foreign_keys = ON")?;
        let db = Self {
            conn,
            session_hours: DEFAULT_SESSION_HOURS,
        };
        db.init()?;
        Ok(db)
    }

    /// Open in-memory database (for testing)
    #[instrument]
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON")?;
        let db = Self {
            conn,
            session_hours: DEFAULT_SESSION_HOURS,
        };
        db.init()?;
        Ok(db)
    }

    /// Initialize database schema via migrations
    fn init(&self) -> Result<()> {
        migrations::run_migrations(&self.conn)?;
        Ok(())
    }

    /// Get current schema version
    pub fn schema_version(&self) -> u32 {
        self.conn
            .query_row("SELECT MAX(version) FROM schema_migrations", [], |row| {
                row.get(0)
            })
            .unwrap_or(0)
    }

    /// Lifetime of sessions issued by the gateway
    pub fn session_hours(&self) -> i64 {
        self.session_hours
    }

    /// Override the session lifetime (configuration hook)
    pub fn set_session_hours(&mut self, hours: i64) {
        self.session_hours = hours;
    }

    /// Get profile store
    pub fn profiles(&self) -> ProfileStore<'_> {
        ProfileStore::new(&self.conn)
    }

    /// Get house store
    pub fn houses(&self) -> HouseStore<'_> {
        HouseStore::new(&self.conn)
    }

    /// Get chore store
    pub fn chores(&self) -> ChoreStore<'_> {
        ChoreStore::new(&self.conn)
    }

    /// Get expense store
    pub fn expenses(&self) -> ExpenseStore<'_> {
        ExpenseStore::new(&self.conn)
    }

    /// Get note store
    pub fn notes(&self) -> NoteStore<'_> {
        NoteStore::new(&self.conn)
    }

    /// Get account store (gateway side)
    pub fn accounts(&self) -> AccountStore<'_> {
        AccountStore::new(&self.conn)
    }
}

// Implement repository traits for Database
// This enables using Database through the trait interface

impl ProfileRepository for Database {
    fn create_profile(&self, profile: &UserProfile) -> Result<()> {
        self.profiles().create(profile)
    }

    fn find_profile(&self, id: Uuid) -> Result<Option<UserProfile>> {
        self.profiles().find_by_id(id)
    }

    fn update_display_name(&self, id: Uuid, display_name: &str) -> Result<()> {
        self.profiles().update_display_name(id, display_name)
    }

    fn set_house(&self, id: Uuid, house_id: Option<Uuid>) -> Result<()> {
        self.profiles().set_house(id, house_id)
    }

    fn list_members(&self, house_id: Uuid) -> Result<Vec<UserProfile>> {
        self.profiles().list_for_house(house_id)
    }
}

impl HouseRepository for Database {
    fn create_house(&self, house: &House) -> Result<()> {
        self.houses().create(house)
    }

    fn find_house(&self, id: Uuid) -> Result<Option<House>> {
        self.houses().find_by_id(id)
    }

    fn find_house_by_code(&self, invite_code: &str) -> Result<Option<House>> {
        self.houses().find_by_code(invite_code)
    }
}

impl ChoreRepository for Database {
    fn list_chores(&self, house_id: Uuid) -> Result<Vec<Chore>> {
        self.chores().list_for_house(house_id)
    }

    fn create_chore(&self, chore: &Chore) -> Result<()> {
        self.chores().create(chore)
    }

    fn update_chore(&self, chore: &Chore) -> Result<()> {
        self.chores().update(chore)
    }

    fn set_chore_completed(&self, id: Uuid, is_completed: bool) -> Result<()> {
        self.chores().set_completed(id, is_completed)
    }

    fn assign_chore(&self, id: Uuid, assigned_user_id: Option<Uuid>) -> Result<()> {
        self.chores().assign(id, assigned_user_id)
    }

    fn delete_chore(&self, id: Uuid) -> Result<()> {
        self.chores().delete(id)
    }
}

impl ExpenseRepository for Database {
    fn list_expenses(&self, house_id: Uuid) -> Result<Vec<Expense>> {
        self.expenses().list_for_house(house_id)
    }

    fn create_expense(&self, expense: &Expense) -> Result<()> {
        self.expenses().create(expense)
    }

    fn update_expense(&self, expense: &Expense) -> Result<()> {
        self.expenses().update(expense)
    }

    fn delete_expense(&self, id: Uuid) -> Result<()> {
        self.expenses().delete(id)
    }
}

impl NoteRepository for Database {
    fn list_notes(&self, house_id: Uuid) -> Result<Vec<Note>> {
        self.notes().list_for_house(house_id)
    }

    fn create_note(&self, note: &Note) -> Result<()> {
        self.notes().create(note)
    }

    fn update_note(&self, note: &Note) -> Result<()> {
        self.notes().update(note)
    }

    fn set_note_pinned(&self, id: Uuid, is_pinned: bool) -> Result<()> {
        self.notes().set_pinned(id, is_pinned)
    }

    fn delete_note(&self, id: Uuid) -> Result<()> {
        self.notes().delete(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_creates_schema_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hearth.db");

        let db = Database::open(&path).unwrap();
        assert!(db.schema_version() >= 2);
        drop(db);

        // Reopening an existing file applies nothing new
        let db = Database::open(&path).unwrap();
        assert!(db.schema_version() >= 2);
    }

    #[test]
    fn database_is_a_complete_backend() {
        fn assert_backend<B: Backend>(_b: &B) {}
        let db = Database::open_in_memory().unwrap();
        assert_backend(&db);
    }
}
