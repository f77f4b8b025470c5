//! Note storage operations

use rusqlite::{params, Connection, Row};
use tracing::instrument;
use uuid::Uuid;

use super::parse::{parse_datetime, parse_string_set, parse_uuid};
use crate::error::{Error, Result};
use crate::models::Note;

pub struct NoteStore<'a> {
    conn: &'a Connection,
}

fn row_to_note(row: &Row<'_>) -> std::result::Result<Note, rusqlite::Error> {
    Ok(Note {
        id: parse_uuid(&row.get::<_, String>(0)?)?,
        title: row.get(1)?,
        content: row.get(2)?,
        house_id: parse_uuid(&row.get::<_, String>(3)?)?,
        created_by: parse_uuid(&row.get::<_, String>(4)?)?,
        created_at: parse_datetime(&row.get::<_, String>(5)?)?,
        is_pinned: row.get(6)?,
        tags: parse_string_set(&row.get::<_, String>(7)?)?,
    })
}

impl<'a> NoteStore<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Create a note
    #[instrument(skip(self, note), fields(note_id = %note.id, house_id = %note.house_id))]
    pub fn create(&self, note: &Note) -> Result<()> {
        self.conn.execute(
            "INSERT INTO notes (id, title, content, house_id, created_by, created_at,
             is_pinned, tags)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                note.id.to_string(),
                note.title,
                note.content,
                note.house_id.to_string(),
                note.created_by.to_string(),
                note.created_at.to_rfc3339(),
                note.is_pinned,
                serde_json::to_string(&note.tags)?,
            ],
        )?;
        Ok(())
    }

    /// List notes for a house, pinned first, then newest
    #[instrument(skip(self))]
    pub fn list_for_house(&self, house_id: Uuid) -> Result<Vec<Note>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, title, content, house_id, created_by, created_at, is_pinned, tags
             FROM notes WHERE house_id = ?1
             ORDER BY is_pinned DESC, created_at DESC",
        )?;

        let notes = stmt
            .query_map(params![house_id.to_string()], row_to_note)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(notes)
    }

    /// Replace the editable fields of a note
    ///
    /// Pinning has its own operation; house_id, created_by, and
    /// created_at never change after creation.
    #[instrument(skip(self, note), fields(note_id = %note.id))]
    pub fn update(&self, note: &Note) -> Result<()> {
        let updated = self.conn.execute(
            "UPDATE notes SET title = ?1, content = ?2, tags = ?3 WHERE id = ?4",
            params![
                note.title,
                note.content,
                serde_json::to_string(&note.tags)?,
                note.id.to_string(),
            ],
        )?;
        if updated == 0 {
            return Err(Error::NotFound(format!("note {}", note.id)));
        }
        Ok(())
    }

    /// Pin or unpin a note
    #[instrument(skip(self))]
    pub fn set_pinned(&self, id: Uuid, is_pinned: bool) -> Result<()> {
        let updated = self.conn.execute(
            "UPDATE notes SET is_pinned = ?1 WHERE id = ?2",
            params![is_pinned, id.to_string()],
        )?;
        if updated == 0 {
            return Err(Error::NotFound(format!("note {id}")));
        }
        Ok(())
    }

    /// Delete a note
    #[instrument(skip(self))]
    pub fn delete(&self, id: Uuid) -> Result<()> {
        self.conn
            .execute("DELETE FROM notes WHERE id = ?1", params![id.to_string()])?;
        Ok(())
    }
}
