//! Chore model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// How often a chore repeats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Recurrence {
    #[default]
    None,
    Daily,
    Weekly,
    Monthly,
}

impl Recurrence {
    /// Stable label used in storage
    pub fn as_str(&self) -> &'static str {
        match self {
            Recurrence::None => "none",
            Recurrence::Daily => "daily",
            Recurrence::Weekly => "weekly",
            Recurrence::Monthly => "monthly",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Recurrence::None => "No Recurrence",
            Recurrence::Daily => "Daily",
            Recurrence::Weekly => "Weekly",
            Recurrence::Monthly => "Monthly",
        }
    }
}

/// A household task
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chore {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub is_completed: bool,
    pub assigned_user_id: Option<Uuid>,
    pub house_id: Uuid,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub recurrence: Recurrence,
    pub points: Option<i32>,
}

impl Chore {
    pub fn new(house_id: Uuid, created_by: Uuid, title: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            title,
            description: None,
            due_date: None,
            is_completed: false,
            assigned_user_id: None,
            house_id,
            created_by,
            created_at: Utc::now(),
            recurrence: Recurrence::None,
            points: None,
        }
    }

    pub fn with_due_date(mut self, due_date: DateTime<Utc>) -> Self {
        self.due_date = Some(due_date);
        self
    }

    pub fn with_assignee(mut self, user_id: Uuid) -> Self {
        self.assigned_user_id = Some(user_id);
        self
    }

    /// Whether this chore still counts as upcoming at `now`
    ///
    /// A chore without a due date never expires.
    pub fn is_upcoming(&self, now: DateTime<Utc>) -> bool {
        !self.is_completed && self.due_date.map_or(true, |due| due >= now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn undated_chores_never_expire() {
        let chore = Chore::new(Uuid::new_v4(), Uuid::new_v4(), "Water plants".to_string());
        assert!(chore.is_upcoming(Utc::now()));
        assert!(chore.is_upcoming(Utc::now() + Duration::days(365)));
    }

    #[test]
    fn overdue_chores_drop_out_of_upcoming() {
        let now = Utc::now();
        let chore = Chore::new(Uuid::new_v4(), Uuid::new_v4(), "Take out bins".to_string())
            .with_due_date(now - Duration::hours(1));
        assert!(!chore.is_upcoming(now));
    }

    #[test]
    fn completed_chores_are_not_upcoming() {
        let mut chore = Chore::new(Uuid::new_v4(), Uuid::new_v4(), "Vacuum".to_string())
            .with_due_date(Utc::now() + Duration::days(1));
        chore.is_completed = true;
        assert!(!chore.is_upcoming(Utc::now()));
    }
}
