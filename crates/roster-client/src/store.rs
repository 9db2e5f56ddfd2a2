//! The users synchronization store.
//!
//! [`UserStore`] is the single owner of [`UsersState`].  It is a cheap,
//! cloneable handle around `Arc<Mutex<UsersState>>`: each command applies
//! its whole transition under one lock acquisition, so readers never see a
//! half-applied command.  The lock is never held across an `.await`.
//!
//! Consumers only get copies ([`UserStore::snapshot`]) or short read-only
//! borrows ([`UserStore::read`]); the state itself is never handed out
//! mutably.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use roster_net::UserFetcher;
use roster_shared::{FetchError, User, UserId};

use crate::events::{StoreEvent, EVENT_CAPACITY};
use crate::state::UsersState;

fn lock_state(state: &Mutex<UsersState>) -> MutexGuard<'_, UsersState> {
    // Transitions cannot panic halfway, so a poisoned lock still guards a
    // consistent state.
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Lowers `loading` if the fetch future is dropped before it settles.
struct PendingFetch<'a> {
    store: &'a UserStore,
    settled: bool,
}

impl Drop for PendingFetch<'_> {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        lock_state(&self.store.state).abandon_fetch();
        debug!("Users fetch dropped before settling");
        self.store.emit(StoreEvent::FetchAbandoned);
    }
}

#[derive(Clone)]
pub struct UserStore {
    state: Arc<Mutex<UsersState>>,
    events: broadcast::Sender<StoreEvent>,
}

impl UserStore {
    /// Create an empty store with the given page size.
    pub fn new(limit: usize) -> Self {
        Self::from_state(UsersState::new(limit))
    }

    /// Create a store around an existing state, e.g. one restored from disk.
    pub fn from_state(state: UsersState) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            state: Arc::new(Mutex::new(state)),
            events,
        }
    }

    fn lock(&self) -> MutexGuard<'_, UsersState> {
        lock_state(&self.state)
    }

    fn emit(&self, event: StoreEvent) {
        // No subscribers is not an error.
        let _ = self.events.send(event);
    }

    // ------------------------------------------------------------------
    // Read surface
    // ------------------------------------------------------------------

    /// Copy of the current state.
    pub fn snapshot(&self) -> UsersState {
        self.lock().clone()
    }

    /// Run `f` against the current state without copying it.
    pub fn read<R>(&self, f: impl FnOnce(&UsersState) -> R) -> R {
        f(&self.lock())
    }

    pub fn find_user(&self, id: &UserId) -> Option<User> {
        self.lock().find(id).cloned()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    /// Read-only handle that does not keep the event channel open.
    pub fn reader(&self) -> StoreReader {
        StoreReader {
            state: Arc::clone(&self.state),
        }
    }

    // ------------------------------------------------------------------
    // Commands
    // ------------------------------------------------------------------

    /// Fetch the whole collection and replace the stored one.
    ///
    /// `loading` is raised before the collaborator is called.  Other
    /// commands stay usable while the fetch is pending.  Concurrent fetches
    /// are neither merged nor cancelled: each applies its result when it
    /// settles, so the last one to settle wins.
    ///
    /// On failure the previous records are kept and the message is stored
    /// in `error`; the error is also returned to the caller.  Dropping the
    /// returned future before it completes clears `loading` and nothing
    /// else.
    pub async fn fetch_all<F>(&self, fetcher: &F) -> Result<usize, FetchError>
    where
        F: UserFetcher + ?Sized,
    {
        {
            let mut state = self.lock();
            state.begin_fetch();
            self.emit(StoreEvent::FetchStarted);
        }

        let mut pending = PendingFetch {
            store: self,
            settled: false,
        };

        debug!("Fetching users");
        let result = fetcher.fetch_users().await;

        pending.settled = true;
        let mut state = self.lock();
        match result {
            Ok(users) => {
                let count = state.apply_fetch_success(users);
                info!(count, visible = state.visible_len(), "Users loaded");
                self.emit(StoreEvent::FetchSucceeded { count });
                Ok(count)
            }
            Err(err) => {
                state.apply_fetch_failure(&err);
                warn!(
                    error = %err,
                    kept = state.all_users().len(),
                    "Users fetch failed"
                );
                self.emit(StoreEvent::FetchFailed {
                    message: err.message().to_string(),
                });
                Err(err)
            }
        }
    }

    /// Reveal the next page.  Returns how many records became visible.
    ///
    /// Never performs I/O.  A no-op when nothing more is available.
    pub fn load_more(&self) -> usize {
        let mut state = self.lock();
        let revealed = state.load_more();
        if revealed > 0 {
            debug!(
                revealed,
                visible = state.visible_len(),
                page = state.page(),
                "Loaded more users"
            );
            self.emit(StoreEvent::PageLoaded {
                visible: state.visible_len(),
                has_more: state.has_more(),
            });
        }
        revealed
    }

    /// Optimistically apply an edited record.
    ///
    /// The record replaces the one with the same id wherever it appears.
    /// No validation is done here.  Returns `false` when no record has that
    /// id.
    pub fn update_user(&self, user: User) -> bool {
        self.replace(user, false)
    }

    /// Restore a record captured before [`update_user`](Self::update_user).
    pub fn revert_user(&self, user: User) -> bool {
        self.replace(user, true)
    }

    fn replace(&self, user: User, reverted: bool) -> bool {
        let id = user.id.clone();
        let mut state = self.lock();
        if !state.replace_user(user) {
            debug!(user = %id, reverted, "No user with this id, nothing replaced");
            return false;
        }
        debug!(user = %id, reverted, "User replaced");
        self.emit(StoreEvent::UserReplaced { id, reverted });
        true
    }

    pub fn clear_error(&self) {
        let mut state = self.lock();
        if state.clear_error() {
            self.emit(StoreEvent::ErrorCleared);
        }
    }

    /// Back to the first page without refetching.
    pub fn reset_pagination(&self) {
        let mut state = self.lock();
        state.reset_pagination();
        debug!(visible = state.visible_len(), "Pagination reset");
        self.emit(StoreEvent::PaginationReset {
            visible: state.visible_len(),
        });
    }
}

impl Default for UserStore {
    fn default() -> Self {
        Self::from_state(UsersState::default())
    }
}

/// Read-only view of a [`UserStore`]'s state.
#[derive(Clone)]
pub struct StoreReader {
    state: Arc<Mutex<UsersState>>,
}

impl StoreReader {
    pub fn snapshot(&self) -> UsersState {
        lock_state(&self.state).clone()
    }

    pub fn read<R>(&self, f: impl FnOnce(&UsersState) -> R) -> R {
        f(&lock_state(&self.state))
    }
}
