use serde::Serialize;
use tracing::debug;

use roster_net::UserFetcher;
use roster_shared::{FetchError, User};

use crate::state::UsersState;
use crate::store::UserStore;

/// Serializable read surface of the users state.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsersDto {
    pub all_users: Vec<User>,
    pub visible_users: Vec<User>,
    pub loading: bool,
    pub loading_more: bool,
    pub error: Option<String>,
    pub has_more: bool,
    pub page: usize,
    pub limit: usize,
}

impl From<&UsersState> for UsersDto {
    fn from(s: &UsersState) -> Self {
        Self {
            all_users: s.all_users().to_vec(),
            visible_users: s.visible_users().to_vec(),
            loading: s.loading(),
            loading_more: s.loading_more(),
            error: s.error().map(str::to_string),
            has_more: s.has_more(),
            page: s.page(),
            limit: s.limit(),
        }
    }
}

/// Fetch only when nothing has been loaded or restored yet.
///
/// Returns `Ok(true)` when a fetch ran and succeeded.
pub async fn load_initial<F>(store: &UserStore, fetcher: &F) -> Result<bool, FetchError>
where
    F: UserFetcher + ?Sized,
{
    if !store.read(|s| s.all_users().is_empty()) {
        debug!("Users already present, skipping initial fetch");
        return Ok(false);
    }
    store.fetch_all(fetcher).await?;
    Ok(true)
}

/// Pull-to-refresh: refetch everything, keeping current rows on failure.
pub async fn refresh<F>(store: &UserStore, fetcher: &F) -> Result<usize, FetchError>
where
    F: UserFetcher + ?Sized,
{
    store.fetch_all(fetcher).await
}

/// Retry after a failure: drop the error, then refetch.
pub async fn retry<F>(store: &UserStore, fetcher: &F) -> Result<usize, FetchError>
where
    F: UserFetcher + ?Sized,
{
    store.clear_error();
    store.fetch_all(fetcher).await
}

/// The list was scrolled to its end.
///
/// Pagination is suspended while a search is active, since search already
/// covers every fetched record.  Returns how many records became visible.
pub fn end_reached(store: &UserStore, search: &str) -> usize {
    if !search.trim().is_empty() {
        return 0;
    }
    if store.read(|s| s.loading_more() || !s.has_more()) {
        return 0;
    }
    store.load_more()
}

/// Leaving a search: show the first page again.
pub fn search_cleared(store: &UserStore) {
    store.reset_pagination();
}
