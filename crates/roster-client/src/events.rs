//! Notifications broadcast by the store after each state change.
//!
//! Presentation layers subscribe with
//! [`UserStore::subscribe`](crate::store::UserStore::subscribe) and re-read
//! the state when an event arrives.

use serde::Serialize;

use roster_shared::UserId;

pub const EVENT_FETCH_STARTED: &str = "fetch-started";
pub const EVENT_FETCH_SUCCEEDED: &str = "fetch-succeeded";
pub const EVENT_FETCH_FAILED: &str = "fetch-failed";
pub const EVENT_FETCH_ABANDONED: &str = "fetch-abandoned";
pub const EVENT_PAGE_LOADED: &str = "page-loaded";
pub const EVENT_USER_REPLACED: &str = "user-replaced";
pub const EVENT_ERROR_CLEARED: &str = "error-cleared";
pub const EVENT_PAGINATION_RESET: &str = "pagination-reset";

/// Capacity of the broadcast channel.  Slow subscribers see `Lagged`.
pub const EVENT_CAPACITY: usize = 64;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum StoreEvent {
    FetchStarted,
    FetchSucceeded { count: usize },
    FetchFailed { message: String },
    /// A fetch was dropped by its caller before it settled.
    FetchAbandoned,
    PageLoaded { visible: usize, has_more: bool },
    UserReplaced { id: UserId, reverted: bool },
    ErrorCleared,
    PaginationReset { visible: usize },
}

impl StoreEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::FetchStarted => EVENT_FETCH_STARTED,
            Self::FetchSucceeded { .. } => EVENT_FETCH_SUCCEEDED,
            Self::FetchFailed { .. } => EVENT_FETCH_FAILED,
            Self::FetchAbandoned => EVENT_FETCH_ABANDONED,
            Self::PageLoaded { .. } => EVENT_PAGE_LOADED,
            Self::UserReplaced { .. } => EVENT_USER_REPLACED,
            Self::ErrorCleared => EVENT_ERROR_CLEARED,
            Self::PaginationReset { .. } => EVENT_PAGINATION_RESET,
        }
    }

    /// Whether the event leaves state worth persisting.
    pub fn is_persistable(&self) -> bool {
        !matches!(self, Self::FetchStarted)
    }
}
