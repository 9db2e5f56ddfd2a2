//! Fixtures shared by the unit tests of this crate.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::{oneshot, Mutex};

use roster_net::{UserFetcher, UserPersister};
use roster_shared::{Address, Company, FetchError, PersistError, User, UserId};

pub fn user(id: i64, name: &str) -> User {
    User {
        id: UserId::Int(id),
        name: name.to_string(),
        username: format!("user{id}"),
        email: format!("user{id}@example.com"),
        phone: "1-770-736-8031".into(),
        website: "example.com".into(),
        address: Address {
            street: "Kulas Light".into(),
            suite: "Apt. 556".into(),
            city: "Gwenborough".into(),
            zipcode: "92998-3874".into(),
        },
        company: Company {
            name: "Romaguera-Crona".into(),
            catch_phrase: "Multi-layered client-server neural-net".into(),
            bs: "harness real-time e-markets".into(),
        },
    }
}

/// `n` users with ids `1..=n`, named `User 1`, `User 2`, ...
pub fn users(n: usize) -> Vec<User> {
    (1..=n as i64).map(|i| user(i, &format!("User {i}"))).collect()
}

/// Fetcher answering every call with the same result.
pub struct StaticFetcher {
    result: Result<Vec<User>, FetchError>,
    calls: AtomicUsize,
}

impl StaticFetcher {
    pub fn ok(users: Vec<User>) -> Self {
        Self {
            result: Ok(users),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            result: Err(FetchError::new(message)),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl UserFetcher for StaticFetcher {
    async fn fetch_users(&self) -> Result<Vec<User>, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.result.clone()
    }
}

/// Fetcher that parks until the test releases it through the sender.
pub struct GatedFetcher {
    rx: Mutex<Option<oneshot::Receiver<Result<Vec<User>, FetchError>>>>,
}

impl GatedFetcher {
    pub fn new() -> (oneshot::Sender<Result<Vec<User>, FetchError>>, Self) {
        let (tx, rx) = oneshot::channel();
        (
            tx,
            Self {
                rx: Mutex::new(Some(rx)),
            },
        )
    }
}

#[async_trait]
impl UserFetcher for GatedFetcher {
    async fn fetch_users(&self) -> Result<Vec<User>, FetchError> {
        let rx = self
            .rx
            .lock()
            .await
            .take()
            .ok_or_else(|| FetchError::new("gate already used"))?;
        rx.await.unwrap_or_else(|_| Err(FetchError::new("gate dropped")))
    }
}

/// Persister with a fixed outcome that records what it was asked to save.
pub struct RecordingPersister {
    fail: bool,
    saved: std::sync::Mutex<Vec<User>>,
}

impl RecordingPersister {
    pub fn succeeding() -> Self {
        Self {
            fail: false,
            saved: std::sync::Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            saved: std::sync::Mutex::new(Vec::new()),
        }
    }

    pub fn saved(&self) -> Vec<User> {
        self.saved.lock().unwrap().clone()
    }
}

#[async_trait]
impl UserPersister for RecordingPersister {
    async fn save_user(&self, user: &User) -> Result<(), PersistError> {
        self.saved.lock().unwrap().push(user.clone());
        if self.fail {
            Err(PersistError::Failed("Network error".into()))
        } else {
            Ok(())
        }
    }
}
