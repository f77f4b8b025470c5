//! Feature services consumed by the presentation layer
//!
//! Each service owns a cached snapshot of one backend collection, a busy
//! flag for the in-flight round trip, and the last user-facing error.
//! Mutating methods take `&mut self`, so a given service can never run
//! two round trips at once; after every successful mutation the service
//! re-lists from the backend rather than patching its snapshot locally.

mod chores;
mod expenses;
mod house;
mod notes;
mod profile;

pub use chores::{ChoreService, NewChore};
pub use expenses::{ExpenseService, NewExpense};
pub use house::{HouseService, Membership};
pub use notes::{NewNote, NoteService};
pub use profile::ProfileService;

use hearth_core::Result;

/// Busy flag and last error shared by every service
#[derive(Debug, Default)]
pub struct ServiceStatus {
    busy: bool,
    last_error: Option<String>,
}

impl ServiceStatus {
    /// Mark the start of a round trip
    fn begin(&mut self) {
        self.busy = true;
        self.last_error = None;
    }

    /// Mark the end of a round trip, recording any failure
    ///
    /// Every service method routes its result through here, success or
    /// error, so the busy flag can never stay stuck after a failure.
    fn finish<T>(&mut self, result: Result<T>) -> Result<T> {
        self.busy = false;
        if let Err(err) = &result {
            self.last_error = Some(err.to_string());
        }
        result
    }

    fn reset(&mut self) {
        self.busy = false;
        self.last_error = None;
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }
}
