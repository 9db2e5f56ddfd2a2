//! Restoring the users state at start-up and saving it as it changes.
//!
//! The database only sees an opaque snapshot of [`UsersState`] stored under
//! [`USERS_SNAPSHOT_KEY`].

use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use roster_shared::constants::USERS_SNAPSHOT_KEY;
use roster_store::{Database, StoreError};

use crate::state::UsersState;
use crate::store::{StoreReader, UserStore};

/// Build a store from the persisted snapshot, or an empty one.
///
/// A snapshot that no longer decodes is discarded with a warning rather
/// than blocking start-up.
pub fn hydrate(db: &Database, limit: usize) -> Result<UserStore, StoreError> {
    match db.load_snapshot::<UsersState>(USERS_SNAPSHOT_KEY) {
        Ok(Some(stored)) => {
            let state = stored.value.rehydrated(limit);
            info!(
                users = state.all_users().len(),
                visible = state.visible_len(),
                saved_at = %stored.saved_at,
                "Restored users state"
            );
            Ok(UserStore::from_state(state))
        }
        Ok(None) => {
            debug!("No persisted users state");
            Ok(UserStore::new(limit))
        }
        Err(StoreError::Json(e)) => {
            warn!(error = %e, "Discarding unreadable users snapshot");
            Ok(UserStore::new(limit))
        }
        Err(e) => Err(e),
    }
}

/// Save the current state of `store`.
pub fn persist(db: &Database, store: &UserStore) -> Result<(), StoreError> {
    db.save_snapshot(USERS_SNAPSHOT_KEY, &store.snapshot())
}

/// Save the state after every persistable store event.
///
/// Writes run on the blocking pool, one at a time.  The task ends, after a
/// final save, once every [`UserStore`] handle has been dropped.
pub fn spawn_autosave(store: &UserStore, db: Database) -> JoinHandle<()> {
    let mut events = store.subscribe();
    let reader = store.reader();

    tokio::spawn(async move {
        let mut db = db;
        loop {
            let due = match events.recv().await {
                Ok(event) if event.is_persistable() => {
                    debug!(event = event.name(), "Autosaving users state");
                    true
                }
                Ok(_) => false,
                Err(RecvError::Lagged(skipped)) => {
                    debug!(skipped, "Autosave lagged behind store events");
                    true
                }
                Err(RecvError::Closed) => break,
            };

            if due {
                db = match save(db, &reader).await {
                    Some(db) => db,
                    None => return,
                };
            }
        }

        if save(db, &reader).await.is_some() {
            debug!("Autosave stopped");
        }
    })
}

/// Write the current state off the async workers.
///
/// Hands the database back, or `None` if the writer panicked.
async fn save(db: Database, reader: &StoreReader) -> Option<Database> {
    let state = reader.snapshot();
    let written = tokio::task::spawn_blocking(move || {
        let result = db.save_snapshot(USERS_SNAPSHOT_KEY, &state);
        (db, result)
    })
    .await;

    match written {
        Ok((db, Ok(()))) => Some(db),
        Ok((db, Err(e))) => {
            error!(error = %e, "Failed to save users state");
            Some(db)
        }
        Err(e) => {
            error!(error = %e, "Autosave writer panicked, autosave stopped");
            None
        }
    }
}
