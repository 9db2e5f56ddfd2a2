//! Stand-in persister for demos and offline runs.
//!
//! Waits a fixed delay, then fails with a fixed probability.  There is no
//! real remote write behind it.

use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use tracing::{debug, warn};

use roster_shared::constants::{DEFAULT_SAVE_DELAY_MS, DEFAULT_SAVE_FAILURE_RATE};
use roster_shared::{PersistError, User};

use crate::service::UserPersister;

#[derive(Debug, Clone)]
pub struct SimulatedPersister {
    delay: Duration,
    failure_rate: f64,
}

impl SimulatedPersister {
    /// `failure_rate` is clamped to `0.0..=1.0`.
    pub fn new(delay: Duration, failure_rate: f64) -> Self {
        let failure_rate = if failure_rate.is_nan() {
            0.0
        } else {
            failure_rate.clamp(0.0, 1.0)
        };
        Self {
            delay,
            failure_rate,
        }
    }

    pub fn failure_rate(&self) -> f64 {
        self.failure_rate
    }
}

impl Default for SimulatedPersister {
    fn default() -> Self {
        Self::new(
            Duration::from_millis(DEFAULT_SAVE_DELAY_MS),
            DEFAULT_SAVE_FAILURE_RATE,
        )
    }
}

#[async_trait]
impl UserPersister for SimulatedPersister {
    async fn save_user(&self, user: &User) -> Result<(), PersistError> {
        // Roll before sleeping: ThreadRng must not live across an await.
        let fail = rand::thread_rng().gen_bool(self.failure_rate);

        tokio::time::sleep(self.delay).await;

        if fail {
            warn!(user = %user.id, "Simulated save failed");
            return Err(PersistError::Failed("Network error".into()));
        }

        debug!(user = %user.id, "Simulated save succeeded");
        Ok(())
    }
}
