//! The users state owned by [`UserStore`](crate::store::UserStore).
//!
//! Only the full collection is stored.  The visible page is derived as a
//! prefix of it (`page * limit` records), which keeps the two sequences
//! consistent by construction: an edit to a record is seen by both, and the
//! visible prefix can never contain gaps or records missing from the full
//! collection.
//!
//! Every method here is a pure, synchronous transition; locking, events and
//! I/O live in the store.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use roster_shared::constants::PAGE_LIMIT;
use roster_shared::{FetchError, User, UserId};

/// Central users state.
///
/// This is also the persisted shape: it is saved as-is and handed back to
/// [`UsersState::rehydrated`] on the next start.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsersState {
    /// Full collection from the last successful fetch, in server order.
    all_users: Vec<User>,

    /// Number of pages revealed so far (starts at 1).
    #[serde(default = "first_page")]
    page: usize,

    /// Page size.
    #[serde(default = "default_limit")]
    limit: usize,

    /// A full-collection fetch is in flight.
    #[serde(default)]
    loading: bool,

    /// Reserved for an in-flight page extension.  Never set by fetches.
    #[serde(default)]
    loading_more: bool,

    /// Reason of the last failed fetch.
    #[serde(default)]
    error: Option<String>,
}

fn first_page() -> usize {
    1
}

fn default_limit() -> usize {
    PAGE_LIMIT
}

impl UsersState {
    /// Create an empty state.  A zero `limit` is raised to 1.
    pub fn new(limit: usize) -> Self {
        Self {
            all_users: Vec::new(),
            page: 1,
            limit: limit.max(1),
            loading: false,
            loading_more: false,
            error: None,
        }
    }

    // ------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------

    pub fn all_users(&self) -> &[User] {
        &self.all_users
    }

    /// The records revealed through pagination so far.
    pub fn visible_users(&self) -> &[User] {
        &self.all_users[..self.visible_len()]
    }

    pub fn visible_len(&self) -> usize {
        self.page.saturating_mul(self.limit).min(self.all_users.len())
    }

    pub fn has_more(&self) -> bool {
        self.visible_len() < self.all_users.len()
    }

    pub fn loading(&self) -> bool {
        self.loading
    }

    pub fn loading_more(&self) -> bool {
        self.loading_more
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn find(&self, id: &UserId) -> Option<&User> {
        self.all_users.iter().find(|u| &u.id == id)
    }

    // ------------------------------------------------------------------
    // Transitions
    // ------------------------------------------------------------------

    /// A fetch is about to start.
    pub fn begin_fetch(&mut self) {
        self.loading = true;
        self.error = None;
    }

    /// Replace the collection wholesale and go back to the first page.
    ///
    /// Returns the number of records kept.  Duplicate ids keep their first
    /// occurrence.
    pub fn apply_fetch_success(&mut self, users: Vec<User>) -> usize {
        let (users, dropped) = dedupe_by_id(users);
        if dropped > 0 {
            tracing::warn!(dropped, "Fetch returned duplicate user ids");
        }

        self.all_users = users;
        self.page = 1;
        self.loading = false;
        self.loading_more = false;
        self.error = None;
        self.all_users.len()
    }

    /// Record a failed fetch.  Previously fetched records stay untouched.
    pub fn apply_fetch_failure(&mut self, err: &FetchError) {
        self.loading = false;
        self.error = Some(err.message().to_string());
    }

    /// A fetch went away without a result.  Records and error are kept.
    pub fn abandon_fetch(&mut self) {
        self.loading = false;
    }

    /// Reveal the next page of already fetched records.
    ///
    /// Returns how many records became visible; 0 when everything is
    /// already visible (including the empty collection).
    pub fn load_more(&mut self) -> usize {
        if !self.has_more() {
            return 0;
        }
        let before = self.visible_len();
        self.page += 1;
        self.visible_len() - before
    }

    /// Replace the record with the same id, in place.
    ///
    /// Returns `false` (and changes nothing) when no record has that id.
    pub fn replace_user(&mut self, user: User) -> bool {
        match self.all_users.iter_mut().find(|u| u.same_entity(&user)) {
            Some(slot) => {
                *slot = user;
                true
            }
            None => false,
        }
    }

    /// Back to the first page, keeping the fetched records.
    pub fn reset_pagination(&mut self) {
        self.page = 1;
    }

    /// Returns `true` if an error was present.
    pub fn clear_error(&mut self) -> bool {
        self.error.take().is_some()
    }

    /// Normalise a state restored from persistent storage.
    ///
    /// Nothing is in flight after a restart, so the transient flags are
    /// cleared.  The page size is taken from the running configuration and
    /// the page counter is clamped to the collection.
    pub fn rehydrated(self, limit: usize) -> Self {
        let (all_users, dropped) = dedupe_by_id(self.all_users);
        if dropped > 0 {
            tracing::warn!(dropped, "Persisted state had duplicate user ids");
        }

        let limit = limit.max(1);
        let last_page = all_users.len().div_ceil(limit).max(1);

        Self {
            all_users,
            page: self.page.clamp(1, last_page),
            limit,
            loading: false,
            loading_more: false,
            error: self.error,
        }
    }
}

impl Default for UsersState {
    fn default() -> Self {
        Self::new(PAGE_LIMIT)
    }
}

/// Keep the first record for every id, preserving order.
fn dedupe_by_id(users: Vec<User>) -> (Vec<User>, usize) {
    let total = users.len();
    let mut seen = HashSet::with_capacity(total);
    let kept: Vec<User> = users
        .into_iter()
        .filter(|u| seen.insert(u.id.clone()))
        .collect();
    let dropped = total - kept.len();
    (kept, dropped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{user, users};

    fn fetched(n: usize) -> UsersState {
        let mut state = UsersState::new(4);
        state.begin_fetch();
        state.apply_fetch_success(users(n));
        state
    }

    fn assert_invariants(state: &UsersState) {
        assert!(state.visible_users().len() <= state.all_users().len());
        assert_eq!(state.has_more(), state.visible_users().len() < state.all_users().len());
        assert_eq!(state.visible_users(), &state.all_users()[..state.visible_len()]);

        let ids: HashSet<_> = state.all_users().iter().map(|u| &u.id).collect();
        assert_eq!(ids.len(), state.all_users().len());
    }

    #[test]
    fn test_new_state_is_empty() {
        let state = UsersState::new(4);
        assert!(state.all_users().is_empty());
        assert!(state.visible_users().is_empty());
        assert!(!state.has_more());
        assert!(!state.loading());
        assert_eq!(state.error(), None);
        assert_eq!(state.page(), 1);
        assert_eq!(state.limit(), 4);
    }

    #[test]
    fn test_zero_limit_raised() {
        assert_eq!(UsersState::new(0).limit(), 1);
    }

    #[test]
    fn test_begin_fetch_sets_loading_and_clears_error() {
        let mut state = UsersState::new(4);
        state.apply_fetch_failure(&FetchError::new("boom"));
        state.begin_fetch();
        assert!(state.loading());
        assert_eq!(state.error(), None);
    }

    #[test]
    fn test_fetch_success_seeds_first_page() {
        let state = fetched(10);
        assert_eq!(state.all_users(), users(10).as_slice());
        assert_eq!(state.visible_users(), &users(10)[..4]);
        assert!(state.has_more());
        assert!(!state.loading());
        assert_eq!(state.page(), 1);
        assert_invariants(&state);
    }

    #[test]
    fn test_fetch_success_small_collection() {
        for n in 0..=4 {
            let state = fetched(n);
            assert_eq!(state.visible_users().len(), n);
            assert!(!state.has_more());
            assert_invariants(&state);
        }
    }

    #[test]
    fn test_fetch_success_replaces_not_merges() {
        let mut state = fetched(10);
        state.load_more();

        state.begin_fetch();
        state.apply_fetch_success(vec![user(99, "Only One")]);

        assert_eq!(state.all_users().len(), 1);
        assert_eq!(state.visible_users().len(), 1);
        assert_eq!(state.page(), 1);
    }

    #[test]
    fn test_fetch_success_clears_loading_more() {
        let mut state = UsersState::new(4);
        state.loading_more = true;
        state.apply_fetch_success(users(2));
        assert!(!state.loading_more());
    }

    #[test]
    fn test_fetch_success_drops_duplicate_ids() {
        let mut state = UsersState::new(4);
        let count = state.apply_fetch_success(vec![
            user(1, "First"),
            user(2, "Second"),
            user(1, "Shadow"),
        ]);
        assert_eq!(count, 2);
        assert_eq!(state.all_users()[0].name, "First");
        assert_invariants(&state);
    }

    #[test]
    fn test_fetch_failure_keeps_data() {
        let mut state = fetched(10);
        state.load_more();
        let before = state.clone();

        state.begin_fetch();
        state.apply_fetch_failure(&FetchError::new("Network error"));

        assert_eq!(state.error(), Some("Network error"));
        assert!(!state.loading());
        assert_eq!(state.all_users(), before.all_users());
        assert_eq!(state.visible_users(), before.visible_users());
    }

    #[test]
    fn test_abandon_fetch_only_lowers_loading() {
        let mut state = fetched(10);
        state.load_more();
        let before = state.clone();

        state.begin_fetch();
        assert!(state.loading());
        state.abandon_fetch();

        assert_eq!(state, before);
        assert_invariants(&state);
    }

    #[test]
    fn test_fetch_failure_fallback_message() {
        let mut state = UsersState::new(4);
        state.apply_fetch_failure(&FetchError::new(""));
        assert_eq!(state.error(), Some("Something went wrong. Please retry."));
    }

    #[test]
    fn test_load_more_scenario() {
        let mut state = fetched(10);

        assert_eq!(state.load_more(), 4);
        assert_eq!(state.visible_users().len(), 8);
        assert!(state.has_more());

        assert_eq!(state.load_more(), 2);
        assert_eq!(state.visible_users().len(), 10);
        assert!(!state.has_more());

        let before = state.clone();
        assert_eq!(state.load_more(), 0);
        assert_eq!(state, before);
    }

    #[test]
    fn test_load_more_eventually_reveals_everything() {
        for n in [0, 1, 4, 5, 9, 16, 37] {
            let mut state = fetched(n);
            let mut calls = 0;
            while state.has_more() {
                state.load_more();
                assert_invariants(&state);
                calls += 1;
                assert!(calls <= n);
            }
            assert_eq!(state.visible_users(), state.all_users());
            assert_eq!(state.load_more(), 0);
        }
    }

    #[test]
    fn test_load_more_on_empty_is_noop() {
        let mut state = UsersState::new(4);
        assert_eq!(state.load_more(), 0);
        assert!(!state.has_more());
        assert_eq!(state.page(), 1);
    }

    #[test]
    fn test_replace_keeps_position() {
        let mut state = fetched(10);
        let mut edited = state.all_users()[2].clone();
        edited.name = "Jane Doe".into();

        assert!(state.replace_user(edited.clone()));
        assert_eq!(state.all_users()[2], edited);
        assert_eq!(state.visible_users()[2], edited);
        assert_eq!(state.all_users().len(), 10);
        assert!(state.has_more());
    }

    #[test]
    fn test_replace_outside_visible_prefix() {
        let mut state = fetched(10);
        let mut edited = state.all_users()[8].clone();
        edited.email = "new@example.com".into();

        assert!(state.replace_user(edited.clone()));
        assert_eq!(state.all_users()[8], edited);
        assert_eq!(state.visible_users().len(), 4);

        state.load_more();
        state.load_more();
        assert_eq!(state.visible_users()[8], edited);
    }

    #[test]
    fn test_replace_unknown_id_is_noop() {
        let mut state = fetched(3);
        let before = state.clone();
        assert!(!state.replace_user(user(404, "Ghost")));
        assert_eq!(state, before);
    }

    #[test]
    fn test_replace_then_revert_round_trip() {
        let mut state = fetched(10);
        let before = state.clone();
        let original = state.all_users()[2].clone();

        let mut edited = original.clone();
        edited.name = "Jane Doe".into();
        state.replace_user(edited);
        state.replace_user(original);

        assert_eq!(state, before);
    }

    #[test]
    fn test_replace_does_not_touch_flags() {
        let mut state = fetched(10);
        state.begin_fetch();
        state.error = Some("stale".into());
        state.load_more();

        let mut edited = state.all_users()[0].clone();
        edited.phone = "000".into();
        state.replace_user(edited);

        assert!(state.loading());
        assert_eq!(state.error(), Some("stale"));
        assert_eq!(state.page(), 2);
        assert!(state.has_more());
    }

    #[test]
    fn test_reset_matches_fresh_fetch() {
        let mut state = fetched(10);
        state.load_more();
        state.load_more();
        state.reset_pagination();

        let fresh = fetched(10);
        assert_eq!(state.visible_users(), fresh.visible_users());
        assert_eq!(state.has_more(), fresh.has_more());
        assert_eq!(state.page(), fresh.page());
    }

    #[test]
    fn test_clear_error() {
        let mut state = UsersState::new(4);
        assert!(!state.clear_error());
        state.apply_fetch_failure(&FetchError::new("boom"));
        assert!(state.clear_error());
        assert_eq!(state.error(), None);
    }

    #[test]
    fn test_rehydrated_clears_transient_flags() {
        let mut state = fetched(10);
        state.load_more();
        state.begin_fetch();
        state.loading_more = true;
        state.error = Some("Network error".into());

        let restored = state.rehydrated(4);
        assert!(!restored.loading());
        assert!(!restored.loading_more());
        assert_eq!(restored.error(), Some("Network error"));
        assert_eq!(restored.visible_users().len(), 8);
    }

    #[test]
    fn test_rehydrated_clamps_page() {
        let mut state = fetched(5);
        state.page = 40;
        let restored = state.rehydrated(4);
        assert_eq!(restored.page(), 2);
        assert!(!restored.has_more());

        let mut empty = UsersState::new(4);
        empty.page = 0;
        assert_eq!(empty.rehydrated(4).page(), 1);
    }

    #[test]
    fn test_serde_round_trip_preserves_state() {
        let mut state = fetched(7);
        state.load_more();

        let json = serde_json::to_string(&state).unwrap();
        assert!(json.contains("\"allUsers\""));
        let back: UsersState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, state);
    }

    #[test]
    fn test_deserialize_minimal_shape() {
        let back: UsersState = serde_json::from_str(r#"{ "allUsers": [] }"#).unwrap();
        assert_eq!(back, UsersState::default());
    }
}
