//! Hearth Core Library
//!
//! Core models, balance computation, and storage for the Hearth
//! household platform.

pub mod auth;
pub mod balance;
pub mod error;
pub mod invariants;
pub mod models;
pub mod storage;

pub use auth::DEFAULT_SESSION_HOURS;
pub use balance::{balance_for, BalanceSummary};
pub use error::{Error, Result};
pub use models::*;
pub use storage::{
    Backend, ChoreRepository, Database, ExpenseRepository, HouseRepository, NoteRepository,
    ProfileRepository, SessionGateway,
};
