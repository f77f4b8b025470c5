//! Chore tracking
//!
//! Snapshot of the current house's chore list, ordered by the backend:
//! soonest due first, undated chores at the top. After every mutation the
//! full list is re-fetched so concurrent edits from housemates land too.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use hearth_core::{Chore, ChoreRepository, Error, Recurrence, Result};

use super::ServiceStatus;

/// Fields accepted when creating a chore
#[derive(Debug, Clone, Default)]
pub struct NewChore {
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub assigned_user_id: Option<Uuid>,
    pub recurrence: Recurrence,
    pub points: Option<i32>,
}

pub struct ChoreService<B: ChoreRepository> {
    backend: Arc<Mutex<B>>,
    chores: Vec<Chore>,
    status: ServiceStatus,
}

impl<B: ChoreRepository> ChoreService<B> {
    pub fn new(backend: Arc<Mutex<B>>) -> Self {
        Self {
            backend,
            chores: Vec::new(),
            status: ServiceStatus::default(),
        }
    }

    /// The chore list from the last refresh
    pub fn chores(&self) -> &[Chore] {
        &self.chores
    }

    /// Incomplete chores that are still current; undated chores never
    /// drop out
    pub fn upcoming_chores(&self, now: DateTime<Utc>) -> Vec<&Chore> {
        self.chores.iter().filter(|c| c.is_upcoming(now)).collect()
    }

    pub fn is_busy(&self) -> bool {
        self.status.is_busy()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.status.last_error()
    }

    /// Load the chore list for a house
    pub fn fetch(&mut self, house_id: Uuid) -> Result<Vec<Chore>> {
        self.status.begin();
        let result = self.fetch_inner(house_id);
        self.status.finish(result)
    }

    fn fetch_inner(&mut self, house_id: Uuid) -> Result<Vec<Chore>> {
        let backend = self.backend.lock().unwrap();
        let fresh = backend.list_chores(house_id)?;
        drop(backend);

        self.chores = fresh.clone();
        Ok(fresh)
    }

    /// Create a chore, then re-list
    pub fn create(&mut self, house_id: Uuid, viewer: Uuid, fields: NewChore) -> Result<Vec<Chore>> {
        self.status.begin();
        let result = self.create_inner(house_id, viewer, fields);
        self.status.finish(result)
    }

    fn create_inner(&mut self, house_id: Uuid, viewer: Uuid, fields: NewChore) -> Result<Vec<Chore>> {
        let title = fields.title.trim();
        if title.is_empty() {
            return Err(Error::Validation("chore title must not be empty".into()));
        }

        let mut chore = Chore::new(house_id, viewer, title.to_string());
        chore.description = fields.description;
        chore.due_date = fields.due_date;
        chore.assigned_user_id = fields.assigned_user_id;
        chore.recurrence = fields.recurrence;
        chore.points = fields.points;

        let backend = self.backend.lock().unwrap();
        backend.create_chore(&chore)?;
        let fresh = backend.list_chores(house_id)?;
        drop(backend);

        self.chores = fresh.clone();
        Ok(fresh)
    }

    /// Update a chore's editable fields, then re-list
    pub fn update(&mut self, chore: &Chore) -> Result<Vec<Chore>> {
        self.status.begin();
        let result = self.update_inner(chore);
        self.status.finish(result)
    }

    fn update_inner(&mut self, chore: &Chore) -> Result<Vec<Chore>> {
        if chore.title.trim().is_empty() {
            return Err(Error::Validation("chore title must not be empty".into()));
        }

        let backend = self.backend.lock().unwrap();
        backend.update_chore(chore)?;
        let fresh = backend.list_chores(chore.house_id)?;
        drop(backend);

        self.chores = fresh.clone();
        Ok(fresh)
    }

    /// Mark a chore complete or not, then re-list
    pub fn set_completed(
        &mut self,
        house_id: Uuid,
        id: Uuid,
        is_completed: bool,
    ) -> Result<Vec<Chore>> {
        self.status.begin();
        let result = self.set_completed_inner(house_id, id, is_completed);
        self.status.finish(result)
    }

    fn set_completed_inner(
        &mut self,
        house_id: Uuid,
        id: Uuid,
        is_completed: bool,
    ) -> Result<Vec<Chore>> {
        let backend = self.backend.lock().unwrap();
        backend.set_chore_completed(id, is_completed)?;
        let fresh = backend.list_chores(house_id)?;
        drop(backend);

        self.chores = fresh.clone();
        Ok(fresh)
    }

    /// Assign a chore to a member (or unassign it), then re-list
    pub fn assign(
        &mut self,
        house_id: Uuid,
        id: Uuid,
        assigned_user_id: Option<Uuid>,
    ) -> Result<Vec<Chore>> {
        self.status.begin();
        let result = self.assign_inner(house_id, id, assigned_user_id);
        self.status.finish(result)
    }

    fn assign_inner(
        &mut self,
        house_id: Uuid,
        id: Uuid,
        assigned_user_id: Option<Uuid>,
    ) -> Result<Vec<Chore>> {
        let backend = self.backend.lock().unwrap();
        backend.assign_chore(id, assigned_user_id)?;
        let fresh = backend.list_chores(house_id)?;
        drop(backend);

        self.chores = fresh.clone();
        Ok(fresh)
    }

    /// Delete a chore, then re-list
    pub fn delete(&mut self, house_id: Uuid, id: Uuid) -> Result<Vec<Chore>> {
        self.status.begin();
        let result = self.delete_inner(house_id, id);
        self.status.finish(result)
    }

    fn delete_inner(&mut self, house_id: Uuid, id: Uuid) -> Result<Vec<Chore>> {
        let backend = self.backend.lock().unwrap();
        backend.delete_chore(id)?;
        let fresh = backend.list_chores(house_id)?;
        drop(backend);

        self.chores = fresh.clone();
        Ok(fresh)
    }

    pub(crate) fn clear(&mut self) {
        self.chores.clear();
        self.status.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use hearth_core::{Database, House};

    fn service_with_house() -> (ChoreService<Database>, Uuid, Uuid) {
        let db = Database::open_in_memory().unwrap();
        let viewer = Uuid::new_v4();
        let house = House::new("Test House".to_string(), viewer);
        db.houses().create(&house).unwrap();
        let house_id = house.id;
        (ChoreService::new(Arc::new(Mutex::new(db))), house_id, viewer)
    }

    #[test]
    fn create_returns_the_re_listed_snapshot() {
        let (mut service, house_id, viewer) = service_with_house();

        let chores = service
            .create(
                house_id,
                viewer,
                NewChore {
                    title: "Dishes".to_string(),
                    ..NewChore::default()
                },
            )
            .unwrap();
        assert_eq!(chores.len(), 1);
        assert_eq!(chores[0].created_by, viewer);
        assert_eq!(service.chores().len(), 1);
        assert!(!service.is_busy());
    }

    #[test]
    fn empty_title_is_rejected_before_the_backend_sees_it() {
        let (mut service, house_id, viewer) = service_with_house();

        let err = service
            .create(house_id, viewer, NewChore::default())
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert!(service.chores().is_empty());
        assert!(service.last_error().is_some());
    }

    #[test]
    fn snapshot_keeps_backend_order() {
        let (mut service, house_id, viewer) = service_with_house();
        let now = Utc::now();

        service
            .create(
                house_id,
                viewer,
                NewChore {
                    title: "Dated".to_string(),
                    due_date: Some(now + Duration::days(2)),
                    ..NewChore::default()
                },
            )
            .unwrap();
        let chores = service
            .create(
                house_id,
                viewer,
                NewChore {
                    title: "Undated".to_string(),
                    ..NewChore::default()
                },
            )
            .unwrap();

        assert_eq!(chores[0].title, "Undated");
        assert_eq!(chores[1].title, "Dated");
    }

    #[test]
    fn toggling_completion_round_trips() {
        let (mut service, house_id, viewer) = service_with_house();
        let chores = service
            .create(
                house_id,
                viewer,
                NewChore {
                    title: "Vacuum".to_string(),
                    ..NewChore::default()
                },
            )
            .unwrap();
        let id = chores[0].id;

        let chores = service.set_completed(house_id, id, true).unwrap();
        assert!(chores[0].is_completed);

        let chores = service.set_completed(house_id, id, false).unwrap();
        assert!(!chores[0].is_completed);
    }

    #[test]
    fn assignment_and_deletion_update_the_snapshot() {
        let (mut service, house_id, viewer) = service_with_house();
        let assignee = Uuid::new_v4();
        let chores = service
            .create(
                house_id,
                viewer,
                NewChore {
                    title: "Bins".to_string(),
                    ..NewChore::default()
                },
            )
            .unwrap();
        let id = chores[0].id;

        let chores = service.assign(house_id, id, Some(assignee)).unwrap();
        assert_eq!(chores[0].assigned_user_id, Some(assignee));

        let chores = service.delete(house_id, id).unwrap();
        assert!(chores.is_empty());
        assert!(service.chores().is_empty());
    }

    #[test]
    fn upcoming_keeps_undated_and_drops_overdue() {
        let (mut service, house_id, viewer) = service_with_house();
        let now = Utc::now();

        service
            .create(
                house_id,
                viewer,
                NewChore {
                    title: "Overdue".to_string(),
                    due_date: Some(now - Duration::hours(2)),
                    ..NewChore::default()
                },
            )
            .unwrap();
        service
            .create(
                house_id,
                viewer,
                NewChore {
                    title: "Whenever".to_string(),
                    ..NewChore::default()
                },
            )
            .unwrap();

        let upcoming = service.upcoming_chores(now);
        assert_eq!(upcoming.len(), 1);
        assert_eq!(upcoming[0].title, "Whenever");
    }

    #[test]
    fn update_rewrites_fields_and_re_lists() {
        let (mut service, house_id, viewer) = service_with_house();
        let chores = service
            .create(
                house_id,
                viewer,
                NewChore {
                    title: "Mop".to_string(),
                    ..NewChore::default()
                },
            )
            .unwrap();

        let mut edited = chores[0].clone();
        edited.title = "Mop everywhere".to_string();
        edited.recurrence = Recurrence::Weekly;

        let chores = service.update(&edited).unwrap();
        assert_eq!(chores[0].title, "Mop everywhere");
        assert_eq!(chores[0].recurrence, Recurrence::Weekly);
    }
}
