//! # roster-shared
//!
//! Data model and collaborator errors shared by the store, network and
//! client crates.

pub mod constants;
pub mod error;
pub mod types;

pub use error::{FetchError, PersistError};
pub use types::{Address, Company, User, UserId};
