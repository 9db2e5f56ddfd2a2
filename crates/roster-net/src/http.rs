//! HTTP implementation of the users collaborators.
//!
//! Talks to a JSONPlaceholder-compatible API: `GET {base}/users` returns the
//! whole collection and `PUT {base}/users/{id}` accepts an edited record.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use tracing::{debug, info, warn};

use roster_shared::constants::NETWORK_ERROR_MESSAGE;
use roster_shared::{FetchError, PersistError, User};

use crate::service::{UserFetcher, UserPersister};

/// Error body some servers attach to failed responses.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// Users API client backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpUserService {
    client: Client,
    base_url: String,
}

impl HttpUserService {
    /// Build a client for `base_url` with the given request timeout.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, base_url))
    }

    /// Wrap an already configured `reqwest::Client`.
    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn users_url(&self) -> String {
        format!("{}/users", self.base_url)
    }
}

#[async_trait]
impl UserFetcher for HttpUserService {
    async fn fetch_users(&self) -> Result<Vec<User>, FetchError> {
        let url = self.users_url();
        debug!(%url, "Fetching users");

        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| FetchError::new(transport_message(&e)))?;

        if !resp.status().is_success() {
            let message = failure_message(resp).await;
            warn!(%url, %message, "Users fetch rejected");
            return Err(FetchError::new(message));
        }

        let users: Vec<User> = resp
            .json()
            .await
            .map_err(|e| FetchError::new(transport_message(&e)))?;

        info!(count = users.len(), "Users fetched");
        Ok(users)
    }
}

#[async_trait]
impl UserPersister for HttpUserService {
    async fn save_user(&self, user: &User) -> Result<(), PersistError> {
        let url = format!("{}/{}", self.users_url(), user.id);
        debug!(%url, "Saving user");

        let resp = self
            .client
            .put(&url)
            .json(user)
            .send()
            .await
            .map_err(|e| PersistError::Failed(transport_message(&e)))?;

        if !resp.status().is_success() {
            let message = failure_message(resp).await;
            warn!(%url, %message, "User save rejected");
            return Err(PersistError::Failed(message));
        }

        info!(user = %user.id, "User saved");
        Ok(())
    }
}

/// Collapse a transport-level error into a single message.
fn transport_message(err: &reqwest::Error) -> String {
    let text = err.to_string();
    if text.trim().is_empty() {
        NETWORK_ERROR_MESSAGE.to_string()
    } else {
        text
    }
}

/// Prefer the server's own `message`, then the status line.
async fn failure_message(resp: Response) -> String {
    let status = resp.status();
    let body = resp.text().await.unwrap_or_default();

    match serde_json::from_str::<ErrorBody>(&body) {
        Ok(ErrorBody { message: Some(msg) }) if !msg.trim().is_empty() => msg,
        _ => status_message(status),
    }
}

fn status_message(status: StatusCode) -> String {
    format!("Request failed with status code {}", status.as_u16())
}
