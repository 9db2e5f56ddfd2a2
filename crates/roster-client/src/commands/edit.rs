//! Optimistic editing of a single user.
//!
//! Saving is a two-phase protocol on top of the store:
//!
//! 1. capture the record as it is now ([`PendingEdit::begin`]),
//! 2. apply the edited record to the store immediately,
//! 3. persist it remotely,
//! 4. on failure, put the captured record back ([`PendingEdit::rollback`]).
//!
//! The store itself knows nothing about saves.  One pending edit per user is
//! assumed; overlapping edits of the same user are not arbitrated and the
//! last replacement wins.

use thiserror::Error;
use tracing::{info, warn};

use roster_net::UserPersister;
use roster_shared::{PersistError, User, UserId};

use crate::commands::form::{EditValues, ValidationErrors};
use crate::store::UserStore;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EditError {
    #[error("User {0} is not loaded")]
    NotFound(UserId),

    #[error("Invalid form: {0}")]
    Invalid(#[from] ValidationErrors),

    #[error("Could not save changes. Your edits have been reverted.")]
    Reverted(#[source] PersistError),
}

/// An edit applied to the store but not yet confirmed.
#[must_use = "a pending edit must be committed or rolled back"]
#[derive(Debug)]
pub struct PendingEdit {
    original: User,
    edited: User,
}

impl PendingEdit {
    /// Capture the current record and apply `edited` in its place.
    pub fn begin(store: &UserStore, edited: User) -> Result<Self, EditError> {
        let original = store
            .find_user(&edited.id)
            .ok_or_else(|| EditError::NotFound(edited.id.clone()))?;

        store.update_user(edited.clone());
        Ok(Self { original, edited })
    }

    pub fn original(&self) -> &User {
        &self.original
    }

    pub fn edited(&self) -> &User {
        &self.edited
    }

    /// The save went through; keep the edited record.
    pub fn commit(self) -> User {
        self.edited
    }

    /// The save failed; restore the captured record.
    pub fn rollback(self, store: &UserStore) -> User {
        store.revert_user(self.original.clone());
        self.original
    }
}

/// Apply `edited` optimistically and persist it, reverting on failure.
///
/// Returns the record now held by the store.
pub async fn save_user<P>(store: &UserStore, persister: &P, edited: User) -> Result<User, EditError>
where
    P: UserPersister + ?Sized,
{
    let pending = PendingEdit::begin(store, edited)?;
    let id = pending.edited().id.clone();

    match persister.save_user(pending.edited()).await {
        Ok(()) => {
            info!(user = %id, "User updated");
            Ok(pending.commit())
        }
        Err(err) => {
            warn!(user = %id, error = %err, "Save failed, reverting edit");
            pending.rollback(store);
            Err(EditError::Reverted(err))
        }
    }
}

/// Validate `values`, apply them to the stored record `id` and save.
///
/// Nothing touches the store when validation fails.
pub async fn save_form<P>(
    store: &UserStore,
    persister: &P,
    id: &UserId,
    values: &EditValues,
) -> Result<User, EditError>
where
    P: UserPersister + ?Sized,
{
    values.validate()?;

    let current = store
        .find_user(id)
        .ok_or_else(|| EditError::NotFound(id.clone()))?;

    save_user(store, persister, values.apply_to(&current)).await
}
