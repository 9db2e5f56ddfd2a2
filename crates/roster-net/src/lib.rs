//! # roster-net
//!
//! Network collaborators of the users store: fetching the collection and
//! persisting edited records.

pub mod http;
pub mod service;
pub mod simulated;

pub use http::HttpUserService;
pub use service::{UserFetcher, UserPersister};
pub use simulated::SimulatedPersister;
