//! Pure derivations consumed by the presentation layer.
//!
//! Nothing here is stored: the displayed list and the screen status are
//! recomputed from the current state plus the transient search text.

use roster_shared::User;

use crate::state::UsersState;

/// The list to display.
///
/// A blank search shows the paginated prefix.  Otherwise every fetched
/// record whose name contains the search text (case-insensitively) is
/// returned, whether or not pagination has revealed it yet.
pub fn filter_users<'a>(all: &'a [User], visible: &'a [User], search: &str) -> Vec<&'a User> {
    if search.trim().is_empty() {
        return visible.iter().collect();
    }

    let needle = search.to_lowercase();
    all.iter()
        .filter(|u| u.name.to_lowercase().contains(&needle))
        .collect()
}

/// What the list screen should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListStatus<'a> {
    /// Fetch failed and there is nothing to fall back on: full-screen error
    /// with a retry action.
    FullScreenError { message: &'a str },
    /// First load in progress, nothing to show yet.
    Loading,
    /// Nothing matches.  `stale_error` is set when the last refresh failed.
    Empty { stale_error: Option<&'a str> },
    /// Rows to show.  `stale_error` drives the non-blocking banner.
    Ready { stale_error: Option<&'a str> },
}

impl UsersState {
    /// [`filter_users`] over this state.
    pub fn filtered(&self, search: &str) -> Vec<&User> {
        filter_users(self.all_users(), self.visible_users(), search)
    }
}

/// Screen status for `state` with `displayed` rows after filtering.
pub fn list_status(state: &UsersState, displayed: usize) -> ListStatus<'_> {
    let error = state.error();

    if let Some(message) = error {
        if state.all_users().is_empty() {
            return ListStatus::FullScreenError { message };
        }
    }

    if displayed == 0 {
        if state.loading() {
            return ListStatus::Loading;
        }
        return ListStatus::Empty { stale_error: error };
    }

    ListStatus::Ready { stale_error: error }
}
