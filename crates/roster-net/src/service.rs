//! Collaborator contracts consumed by the users store.
//!
//! Both traits are object-safe so the client can hold them behind
//! `Arc<dyn ...>` and swap real, simulated and test implementations.

use async_trait::async_trait;

use roster_shared::{FetchError, PersistError, User};

/// Source of the full users collection.
#[async_trait]
pub trait UserFetcher: Send + Sync {
    /// Fetch every record, in server order.
    ///
    /// Every failure mode is collapsed into a single [`FetchError`] carrying
    /// a human-readable message.
    async fn fetch_users(&self) -> Result<Vec<User>, FetchError>;
}

/// Remote save behind an optimistic edit.
#[async_trait]
pub trait UserPersister: Send + Sync {
    /// Persist the full record.  No retry is attempted.
    async fn save_user(&self, user: &User) -> Result<(), PersistError>;
}
