//! Shared notes service.
//!
//! Mirrors the backend's pinned-first ordering and layers search and
//! tag filtering on top of the cached list, so typing in a search box
//! never hits the database.

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};

use uuid::Uuid;

use hearth_core::{Error, Note, NoteRepository, Result};

use super::ServiceStatus;

/// Fields collected when creating a note. Notes always start unpinned.
#[derive(Debug, Clone, Default)]
pub struct NewNote {
    pub title: String,
    pub content: String,
    pub tags: BTreeSet<String>,
}

/// Holds the note list for the current house
pub struct NoteService<B: NoteRepository> {
    backend: Arc<Mutex<B>>,
    notes: Vec<Note>,
    status: ServiceStatus,
}

impl<B: NoteRepository> NoteService<B> {
    pub fn new(backend: Arc<Mutex<B>>) -> Self {
        Self {
            backend,
            notes: Vec::new(),
            status: ServiceStatus::default(),
        }
    }

    /// The note list from the last refresh, pinned notes first
    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    /// Only the pinned notes
    pub fn pinned(&self) -> Vec<&Note> {
        self.notes.iter().filter(|n| n.is_pinned).collect()
    }

    /// Notes matching a query across title, content, and tags. An empty
    /// query matches everything.
    pub fn search(&self, query: &str) -> Vec<&Note> {
        let query = query.trim();
        if query.is_empty() {
            return self.notes.iter().collect();
        }
        self.notes.iter().filter(|n| n.matches(query)).collect()
    }

    /// Notes carrying an exact tag
    pub fn with_tag(&self, tag: &str) -> Vec<&Note> {
        self.notes
            .iter()
            .filter(|n| n.tags.contains(tag))
            .collect()
    }

    /// Every tag in use across the cached notes, deduplicated and sorted
    pub fn all_tags(&self) -> Vec<String> {
        let mut tags: Vec<String> = self
            .notes
            .iter()
            .flat_map(|n| n.tags.iter().cloned())
            .collect();
        tags.sort();
        tags.dedup();
        tags
    }

    pub fn is_busy(&self) -> bool {
        self.status.is_busy()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.status.last_error()
    }

    /// Load the note list for a house
    pub fn fetch(&mut self, house_id: Uuid) -> Result<Vec<Note>> {
        self.status.begin();
        let result = self.fetch_inner(house_id);
        self.status.finish(result)
    }

    fn fetch_inner(&mut self, house_id: Uuid) -> Result<Vec<Note>> {
        let backend = self.backend.lock().unwrap();
        let fresh = backend.list_notes(house_id)?;
        drop(backend);

        self.notes = fresh.clone();
        Ok(fresh)
    }

    /// Create a note, then re-list
    pub fn create(&mut self, house_id: Uuid, viewer: Uuid, fields: NewNote) -> Result<Vec<Note>> {
        self.status.begin();
        let result = self.create_inner(house_id, viewer, fields);
        self.status.finish(result)
    }

    fn create_inner(&mut self, house_id: Uuid, viewer: Uuid, fields: NewNote) -> Result<Vec<Note>> {
        let title = fields.title.trim();
        if title.is_empty() {
            return Err(Error::Validation("note title must not be empty".into()));
        }

        let note =
            Note::new(house_id, viewer, title.to_string(), fields.content).with_tags(fields.tags);

        let backend = self.backend.lock().unwrap();
        backend.create_note(&note)?;
        let fresh = backend.list_notes(house_id)?;
        drop(backend);

        self.notes = fresh.clone();
        Ok(fresh)
    }

    /// Update a note's title, content, or tags, then re-list
    pub fn update(&mut self, note: &Note) -> Result<Vec<Note>> {
        self.status.begin();
        let result = self.update_inner(note);
        self.status.finish(result)
    }

    fn update_inner(&mut self, note: &Note) -> Result<Vec<Note>> {
        if note.title.trim().is_empty() {
            return Err(Error::Validation("note title must not be empty".into()));
        }

        let backend = self.backend.lock().unwrap();
        backend.update_note(note)?;
        let fresh = backend.list_notes(note.house_id)?;
        drop(backend);

        self.notes = fresh.clone();
        Ok(fresh)
    }

    /// Pin or unpin a note, then re-list
    pub fn set_pinned(&mut self, house_id: Uuid, id: Uuid, is_pinned: bool) -> Result<Vec<Note>> {
        self.status.begin();
        let result = self.set_pinned_inner(house_id, id, is_pinned);
        self.status.finish(result)
    }

    fn set_pinned_inner(
        &mut self,
        house_id: Uuid,
        id: Uuid,
        is_pinned: bool,
    ) -> Result<Vec<Note>> {
        let backend = self.backend.lock().unwrap();
        backend.set_note_pinned(id, is_pinned)?;
        let fresh = backend.list_notes(house_id)?;
        drop(backend);

        self.notes = fresh.clone();
        Ok(fresh)
    }

    /// Delete a note, then re-list
    pub fn delete(&mut self, house_id: Uuid, id: Uuid) -> Result<Vec<Note>> {
        self.status.begin();
        let result = self.delete_inner(house_id, id);
        self.status.finish(result)
    }

    fn delete_inner(&mut self, house_id: Uuid, id: Uuid) -> Result<Vec<Note>> {
        let backend = self.backend.lock().unwrap();
        backend.delete_note(id)?;
        let fresh = backend.list_notes(house_id)?;
        drop(backend);

        self.notes = fresh.clone();
        Ok(fresh)
    }

    /// Forget cached notes, e.g. after leaving a house
    pub(crate) fn clear(&mut self) {
        self.notes.clear();
        self.status.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hearth_core::{Database, House, HouseRepository};

    fn service_with_house() -> (NoteService<Database>, Uuid, Uuid) {
        let viewer = Uuid::new_v4();
        let house = House::new("Test House".to_string(), viewer);
        let house_id = house.id;

        let db = Database::open_in_memory().unwrap();
        db.create_house(&house).unwrap();

        (NoteService::new(Arc::new(Mutex::new(db))), house_id, viewer)
    }

    fn new_note(title: &str, content: &str) -> NewNote {
        NewNote {
            title: title.to_string(),
            content: content.to_string(),
            ..NewNote::default()
        }
    }

    #[test]
    fn pinned_notes_lead_the_list() {
        let (mut service, house_id, viewer) = service_with_house();

        service
            .create(house_id, viewer, new_note("First", ""))
            .unwrap();
        let notes = service
            .create(house_id, viewer, new_note("Second", ""))
            .unwrap();

        // Newest first while nothing is pinned.
        assert_eq!(notes[0].title, "Second");

        let first_id = notes.iter().find(|n| n.title == "First").unwrap().id;
        let notes = service.set_pinned(house_id, first_id, true).unwrap();

        assert_eq!(notes[0].title, "First");
        assert!(notes[0].is_pinned);
        assert_eq!(service.pinned().len(), 1);

        let notes = service.set_pinned(house_id, first_id, false).unwrap();
        assert_eq!(notes[0].title, "Second");
        assert!(service.pinned().is_empty());
    }

    #[test]
    fn search_spans_title_content_and_tags() {
        let (mut service, house_id, viewer) = service_with_house();

        service
            .create(house_id, viewer, new_note("Shopping list", "Milk and eggs"))
            .unwrap();
        service
            .create(
                house_id,
                viewer,
                NewNote {
                    title: "Wifi password".to_string(),
                    content: "hunter2".to_string(),
                    tags: BTreeSet::from(["household".to_string()]),
                },
            )
            .unwrap();

        assert_eq!(service.search("milk").len(), 1);
        assert_eq!(service.search("HOUSEHOLD").len(), 1);
        assert_eq!(service.search("").len(), 2);
        assert!(service.search("rent").is_empty());
    }

    #[test]
    fn tag_filters_and_tag_listing() {
        let (mut service, house_id, viewer) = service_with_house();

        service
            .create(
                house_id,
                viewer,
                NewNote {
                    title: "Groceries".to_string(),
                    content: String::new(),
                    tags: BTreeSet::from(["shopping".to_string(), "urgent".to_string()]),
                },
            )
            .unwrap();
        service
            .create(
                house_id,
                viewer,
                NewNote {
                    title: "Chore rota".to_string(),
                    content: String::new(),
                    tags: BTreeSet::from(["urgent".to_string()]),
                },
            )
            .unwrap();

        assert_eq!(service.with_tag("urgent").len(), 2);
        assert_eq!(service.with_tag("shopping").len(), 1);
        assert!(service.with_tag("missing").is_empty());

        assert_eq!(service.all_tags(), vec!["shopping", "urgent"]);
    }

    #[test]
    fn update_rewrites_content_and_tags() {
        let (mut service, house_id, viewer) = service_with_house();

        let notes = service
            .create(house_id, viewer, new_note("Draft", "v1"))
            .unwrap();

        let mut note = notes[0].clone();
        note.content = "v2".to_string();
        note.tags = BTreeSet::from(["final".to_string()]);
        let notes = service.update(&note).unwrap();

        assert_eq!(notes[0].content, "v2");
        assert!(notes[0].tags.contains("final"));
    }

    #[test]
    fn create_rejects_blank_titles() {
        let (mut service, house_id, viewer) = service_with_house();

        let err = service
            .create(house_id, viewer, new_note("   ", "body"))
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert!(!service.is_busy());
        assert!(service.last_error().is_some());
    }

    #[test]
    fn delete_removes_the_note() {
        let (mut service, house_id, viewer) = service_with_house();

        let notes = service
            .create(house_id, viewer, new_note("Ephemeral", ""))
            .unwrap();
        let notes = service.delete(house_id, notes[0].id).unwrap();

        assert!(notes.is_empty());
        assert!(service.notes().is_empty());
    }
}
