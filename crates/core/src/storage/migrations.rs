//! Database migration system
//!
//! Tracks schema versions and applies migrations in order.

use rusqlite::Connection;
use tracing::{info, instrument};

use crate::error::Result;

/// A database migration
pub struct Migration {
    /// Version number (must be sequential starting from 1)
    pub version: u32,
    /// Description of what this migration does
    pub description: &'static str,
    /// SQL to run for this migration
    pub sql: &'static str,
}

/// All migrations in order
const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        description: "Initial schema",
        sql: r#"
            -- Gateway accounts table (credentials only; app tables never
            -- reference it)
            CREATE TABLE IF NOT EXISTS accounts (
                id TEXT PRIMARY KEY,
                email TEXT NOT NULL UNIQUE,
                password_hash TEXT NOT NULL,
                display_name TEXT,
                created_at TEXT NOT NULL
            );

            -- Gateway sessions table
            CREATE TABLE IF NOT EXISTS sessions (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                created_at TEXT NOT NULL,
                expires_at TEXT NOT NULL,
                FOREIGN KEY (user_id) REFERENCES accounts(id) ON DELETE CASCADE
            );

            -- Houses table
            CREATE TABLE IF NOT EXISTS houses (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                invite_code TEXT NOT NULL UNIQUE,
                created_at TEXT NOT NULL,
                created_by TEXT NOT NULL
            );

            -- User profiles; ids mirror gateway identities
            CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                email TEXT,
                display_name TEXT,
                house_id TEXT,
                created_at TEXT NOT NULL,
                FOREIGN KEY (house_id) REFERENCES houses(id)
            );

            -- Chores table
            CREATE TABLE IF NOT EXISTS chores (
                id TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                description TEXT,
                due_date TEXT,
                is_completed INTEGER NOT NULL DEFAULT 0,
                assigned_user_id TEXT,
                house_id TEXT NOT NULL,
                created_by TEXT NOT NULL,
                created_at TEXT NOT NULL,
                recurrence TEXT NOT NULL DEFAULT 'none',
                points INTEGER,
                FOREIGN KEY (house_id) REFERENCES houses(id) ON DELETE CASCADE
            );

            -- Expenses table; amount is exact decimal text
            CREATE TABLE IF NOT EXISTS expenses (
                id TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                amount TEXT NOT NULL,
                description TEXT,
                paid_by TEXT NOT NULL,
                house_id TEXT NOT NULL,
                created_at TEXT NOT NULL,
                category TEXT,
                shared_with TEXT NOT NULL DEFAULT '[]',
                FOREIGN KEY (house_id) REFERENCES houses(id) ON DELETE CASCADE
            );

            -- Notes table; tags is a JSON array
            CREATE TABLE IF NOT EXISTS notes (
                id TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                content TEXT NOT NULL,
                house_id TEXT NOT NULL,
                created_by TEXT NOT NULL,
                created_at TEXT NOT NULL,
                is_pinned INTEGER NOT NULL DEFAULT 0,
                tags TEXT NOT NULL DEFAULT '[]',
                FOREIGN KEY (house_id) REFERENCES houses(id) ON DELETE CASCADE
            );
        "#,
    },
    Migration {
        version: 2,
        description: "Add indexes for query performance",
        sql: r#"
            -- Session indexes
            CREATE INDEX IF NOT EXISTS idx_sessions_user ON sessions(user_id);
            CREATE INDEX IF NOT EXISTS idx_sessions_expires ON sessions(expires_at);

            -- Membership lookups
            CREATE INDEX IF NOT EXISTS idx_users_house ON users(house_id);

            -- Invite code lookups
            CREATE INDEX IF NOT EXISTS idx_houses_code ON houses(invite_code);

            -- Per-house listings
            CREATE INDEX IF NOT EXISTS idx_chores_house ON chores(house_id);
            CREATE INDEX IF NOT EXISTS idx_chores_house_due ON chores(house_id, due_date);
            CREATE INDEX IF NOT EXISTS idx_expenses_house ON expenses(house_id);
            CREATE INDEX IF NOT EXISTS idx_expenses_house_created ON expenses(house_id, created_at);
            CREATE INDEX IF NOT EXISTS idx_notes_house ON notes(house_id);
            CREATE INDEX IF NOT EXISTS idx_notes_house_pinned ON notes(house_id, is_pinned, created_at);
        "#,
    },
];

/// Initialize the migrations table
fn init_migrations_table(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            description TEXT NOT NULL,
            applied_at TEXT NOT NULL
        )",
        [],
    )?;
    Ok(())
}

/// Get the current schema version
fn get_current_version(conn: &Connection) -> Result<u32> {
    let version: Option<u32> = conn
        .query_row("SELECT MAX(version) FROM schema_migrations", [], |row| {
            row.get(0)
        })
        .unwrap_or(None);
    Ok(version.unwrap_or(0))
}

/// Record that a migration was applied
fn record_migration(conn: &Connection, migration: &Migration) -> Result<()> {
    conn.execute(
        "INSERT INTO schema_migrations (version, description, applied_at) VALUES (?1, ?2, ?3)",
        rusqlite::params![
            migration.version,
            migration.description,
            chrono::Utc::now().to_rfc3339()
        ],
    )?;
    Ok(())
}

/// Run all pending migrations
#[instrument(skip(conn))]
pub fn run_migrations(conn: &Connection) -> Result<()> {
    init_migrations_table(conn)?;

    let current_version = get_current_version(conn)?;
    info!(current_version, "Checking for pending migrations");

    for migration in MIGRATIONS {
        if migration.version > current_version {
            info!(
                version = migration.version,
                description = migration.description,
                "Applying migration"
            );

            conn.execute_batch(migration.sql)?;
            record_migration(conn, migration)?;

            info!(version = migration.version, "Migration complete");
        }
    }

    let new_version = get_current_version(conn)?;
    if new_version > current_version {
        info!(
            from = current_version,
            to = new_version,
            "Database schema updated"
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Get the latest migration version (test helper)
    fn latest_version() -> u32 {
        MIGRATIONS.last().map(|m| m.version).unwrap_or(0)
    }

    #[test]
    fn test_migrations_run() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();

        let version = get_current_version(&conn).unwrap();
        assert_eq!(version, latest_version());
    }

    #[test]
    fn test_migrations_idempotent() {
        let conn = Connection::open_in_memory().unwrap();

        // Run twice
        run_migrations(&conn).unwrap();
        run_migrations(&conn).unwrap();

        let version = get_current_version(&conn).unwrap();
        assert_eq!(version, latest_version());
    }

    #[test]
    fn test_migrations_sequential() {
        // Verify migrations are numbered sequentially
        for (i, migration) in MIGRATIONS.iter().enumerate() {
            assert_eq!(
                migration.version as usize,
                i + 1,
                "Migration {} should have version {}",
                migration.description,
                i + 1
            );
        }
    }

    #[test]
    fn test_duplicate_invite_code_rejected() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();

        let insert = "INSERT INTO houses (id, name, invite_code, created_at, created_by)
                      VALUES (?1, ?2, ?3, ?4, ?5)";
        conn.execute(
            insert,
            rusqlite::params!["h1", "First", "ABC123", "2026-01-01T00:00:00Z", "u1"],
        )
        .unwrap();

        let err = conn
            .execute(
                insert,
                rusqlite::params!["h2", "Second", "ABC123", "2026-01-01T00:00:00Z", "u2"],
            )
            .unwrap_err();
        assert!(crate::error::is_unique_violation(&err));
    }
}
