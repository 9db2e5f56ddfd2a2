/// Application name
pub const APP_NAME: &str = "Roster";

/// Number of records revealed per page
pub const PAGE_LIMIT: usize = 4;

/// Default users API (JSONPlaceholder-compatible)
pub const DEFAULT_API_URL: &str = "https://jsonplaceholder.typicode.com";

/// Default HTTP request timeout in seconds
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 30;

/// Message used when a transport failure carries no usable text
pub const NETWORK_ERROR_MESSAGE: &str = "Network error. Please check your connection.";

/// Message stored when a fetch fails without any message at all
pub const FETCH_FALLBACK_MESSAGE: &str = "Something went wrong. Please retry.";

/// Simulated save: fixed latency in milliseconds
pub const DEFAULT_SAVE_DELAY_MS: u64 = 600;

/// Simulated save: probability of failure
pub const DEFAULT_SAVE_FAILURE_RATE: f64 = 0.05;

/// Snapshot key under which the users state is persisted
pub const USERS_SNAPSHOT_KEY: &str = "users";
