//! Types handed back by the snapshot helpers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A decoded snapshot together with the time it was written.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoredSnapshot<T> {
    /// The key the snapshot was saved under.
    pub key: String,
    /// The decoded payload.
    pub value: T,
    /// When the snapshot was last written.
    pub saved_at: DateTime<Utc>,
}
