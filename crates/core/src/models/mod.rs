//! Data models for Hearth

mod account;
mod chore;
mod expense;
mod house;
mod note;
mod user;

pub use account::*;
pub use chore::*;
pub use expense::*;
pub use house::*;
pub use note::*;
pub use user::*;
