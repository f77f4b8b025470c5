//! Chore storage operations

use rusqlite::{params, Connection, Row};
use tracing::instrument;
use uuid::Uuid;

use super::parse::{parse_datetime, parse_datetime_opt, parse_uuid, parse_uuid_opt, recurrence_from_str};
use crate::error::{Error, Result};
use crate::models::Chore;

pub struct ChoreStore<'a> {
    conn: &'a Connection,
}

fn row_to_chore(row: &Row<'_>) -> std::result::Result<Chore, rusqlite::Error> {
    Ok(Chore {
        id: parse_uuid(&row.get::<_, String>(0)?)?,
        title: row.get(1)?,
        description: row.get(2)?,
        due_date: parse_datetime_opt(row.get::<_, Option<String>>(3)?)?,
        is_completed: row.get(4)?,
        assigned_user_id: parse_uuid_opt(row.get::<_, Option<String>>(5)?)?,
        house_id: parse_uuid(&row.get::<_, String>(6)?)?,
        created_by: parse_uuid(&row.get::<_, String>(7)?)?,
        created_at: parse_datetime(&row.get::<_, String>(8)?)?,
        recurrence: recurrence_from_str(&row.get::<_, String>(9)?),
        points: row.get(10)?,
    })
}

impl<'a> ChoreStore<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Create a chore
    #[instrument(skip(self, chore), fields(chore_id = %chore.id, house_id = %chore.house_id))]
    pub fn create(&self, chore: &Chore) -> Result<()> {
        self.conn.execute(
            "INSERT INTO chores (id, title, description, due_date, is_completed, assigned_user_id,
             house_id, created_by, created_at, recurrence, points)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                chore.id.to_string(),
                chore.title,
                chore.description,
                chore.due_date.map(|t| t.to_rfc3339()),
                chore.is_completed,
                chore.assigned_user_id.map(|id| id.to_string()),
                chore.house_id.to_string(),
                chore.created_by.to_string(),
                chore.created_at.to_rfc3339(),
                chore.recurrence.as_str(),
                chore.points,
            ],
        )?;
        Ok(())
    }

    /// List chores for a house, soonest due first
    ///
    /// Undated chores sort before dated ones: with no due date a chore is
    /// treated as due now. RFC3339 text compares chronologically.
    #[instrument(skip(self))]
    pub fn list_for_house(&self, house_id: Uuid) -> Result<Vec<Chore>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, title, description, due_date, is_completed, assigned_user_id,
             house_id, created_by, created_at, recurrence, points
             FROM chores WHERE house_id = ?1
             ORDER BY due_date IS NOT NULL, due_date ASC, created_at ASC",
        )?;

        let chores = stmt
            .query_map(params![house_id.to_string()], row_to_chore)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(chores)
    }

    /// Replace the editable fields of a chore
    ///
    /// house_id, created_by, and created_at never change after creation.
    #[instrument(skip(self, chore), fields(chore_id = %chore.id))]
    pub fn update(&self, chore: &Chore) -> Result<()> {
        let updated = self.conn.execute(
            "UPDATE chores SET title = ?1, description = ?2, due_date = ?3, is_completed = ?4,
             assigned_user_id = ?5, recurrence = ?6, points = ?7 WHERE id = ?8",
            params![
                chore.title,
                chore.description,
                chore.due_date.map(|t| t.to_rfc3339()),
                chore.is_completed,
                chore.assigned_user_id.map(|id| id.to_string()),
                chore.recurrence.as_str(),
                chore.points,
                chore.id.to_string(),
            ],
        )?;
        if updated == 0 {
            return Err(Error::NotFound(format!("chore {}", chore.id)));
        }
        Ok(())
    }

    /// Mark a chore complete or not
    #[instrument(skip(self))]
    pub fn set_completed(&self, id: Uuid, is_completed: bool) -> Result<()> {
        let updated = self.conn.execute(
            "UPDATE chores SET is_completed = ?1 WHERE id = ?2",
            params![is_completed, id.to_string()],
        )?;
        if updated == 0 {
            return Err(Error::NotFound(format!("chore {id}")));
        }
        Ok(())
    }

    /// Assign a chore to a member, or unassign it
    #[instrument(skip(self))]
    pub fn assign(&self, id: Uuid, assigned_user_id: Option<Uuid>) -> Result<()> {
        let updated = self.conn.execute(
            "UPDATE chores SET assigned_user_id = ?1 WHERE id = ?2",
            params![assigned_user_id.map(|u| u.to_string()), id.to_string()],
        )?;
        if updated == 0 {
            return Err(Error::NotFound(format!("chore {id}")));
        }
        Ok(())
    }

    /// Delete a chore
    #[instrument(skip(self))]
    pub fn delete(&self, id: Uuid) -> Result<()> {
        self.conn
            .execute("DELETE FROM chores WHERE id = ?1", params![id.to_string()])?;
        Ok(())
    }
}
