pub mod commands;
pub mod config;
pub mod events;
pub mod persist;
pub mod state;
pub mod store;
pub mod view;

#[cfg(test)]
mod testing;

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use roster_net::{HttpUserService, SimulatedPersister};
use roster_shared::constants::APP_NAME;
use roster_shared::{User, UserId};
use roster_store::Database;

pub use crate::config::ClientConfig;
pub use crate::state::UsersState;
pub use crate::store::{StoreReader, UserStore};

use crate::commands::edit;
use crate::commands::form::EditValues;
use crate::commands::users::{self, UsersDto};
use crate::view::{list_status, ListStatus};

/// Headless client for the user roster.
#[derive(Debug, Parser, PartialEq)]
#[command(name = "roster", version)]
pub struct RunOptions {
    /// Refetch even when a persisted state was restored.
    #[arg(long)]
    pub refresh: bool,

    /// Print the final state as JSON.
    #[arg(long)]
    pub json: bool,

    /// Rename a user through the optimistic save flow.
    #[arg(long, num_args = 2, value_names = ["ID", "NAME"])]
    rename: Option<Vec<String>>,

    /// Name filter; empty shows the paginated list.
    search: Vec<String>,
}

impl RunOptions {
    /// The user to rename and the new name.
    pub fn rename(&self) -> Option<(UserId, &str)> {
        match self.rename.as_deref() {
            Some([id, name]) => Some((parse_user_id(id), name.as_str())),
            _ => None,
        }
    }

    pub fn search(&self) -> String {
        self.search.join(" ")
    }
}

/// Numeric ids are integers, anything else is kept as text.
fn parse_user_id(raw: &str) -> UserId {
    match raw.parse::<i64>() {
        Ok(n) => UserId::Int(n),
        Err(_) => UserId::Text(raw.to_string()),
    }
}

pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("roster_client_lib=debug,roster_net=debug,roster_store=info,warn")
    });

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .init();
}

pub async fn run() -> anyhow::Result<()> {
    init_tracing();

    info!("Starting {APP_NAME} client");

    let options = RunOptions::parse();
    let config = ClientConfig::from_env();
    info!(?config, "Loaded configuration");

    let db = match &config.db_path {
        Some(path) => Database::open_at(path),
        None => Database::new(),
    }
    .context("opening local database")?;

    let store = persist::hydrate(&db, config.page_limit)?;
    let autosave = persist::spawn_autosave(&store, db);

    let service = HttpUserService::new(config.api_url.clone(), config.fetch_timeout)?;

    let fetched = if options.refresh {
        users::refresh(&store, &service).await.map(|_| true)
    } else {
        users::load_initial(&store, &service).await
    };
    if let Err(e) = fetched {
        warn!(error = %e, "Could not load users");
    }

    if let Some((id, name)) = options.rename() {
        let persister = SimulatedPersister::new(config.save_delay, config.save_failure_rate);
        rename(&store, &persister, &id, name).await;
    }

    let search = options.search();
    render(&store, &search);

    if search.trim().is_empty() {
        while users::end_reached(&store, "") > 0 {
            println!("-- more --");
            render_tail(&store);
        }
    } else {
        users::search_cleared(&store);
    }

    if options.json {
        let dto = store.read(|state| UsersDto::from(state));
        println!("{}", serde_json::to_string_pretty(&dto)?);
    }

    drop(store);
    autosave.await?;

    Ok(())
}

async fn rename(store: &UserStore, persister: &SimulatedPersister, id: &UserId, name: &str) {
    let Some(current) = store.find_user(id) else {
        warn!(user = %id, "Cannot rename a user that is not loaded");
        return;
    };

    let mut values = EditValues::from_user(&current);
    values.name = name.to_string();

    match edit::save_form(store, persister, id, &values).await {
        Ok(saved) => println!("Saved: {} is now {}", saved.id, saved.name),
        Err(e) => println!("Update failed: {e}"),
    }
}

fn row(user: &User) -> String {
    format!("[{:>2}] {} <{}>", user.initials(), user.name, user.email)
}

fn render(store: &UserStore, search: &str) {
    store.read(|state| {
        let rows = state.filtered(search);
        match list_status(state, rows.len()) {
            ListStatus::FullScreenError { message } => {
                println!("Something went wrong");
                println!("{message}");
                println!("Run again to retry.");
            }
            ListStatus::Loading => println!("Loading..."),
            ListStatus::Empty { stale_error } => {
                print_banner(stale_error);
                println!("No users found");
            }
            ListStatus::Ready { stale_error } => {
                print_banner(stale_error);
                for user in rows {
                    println!("{}", row(user));
                }
            }
        }
    });
}

/// Print the page revealed by the last `load_more`.
fn render_tail(store: &UserStore) {
    store.read(|state| {
        let visible = state.visible_users();
        // The last page may be shorter than the limit.
        let start = (state.page().saturating_sub(1) * state.limit()).min(visible.len());
        for user in &visible[start..] {
            println!("{}", row(user));
        }
    });
}

fn print_banner(stale_error: Option<&str>) {
    if stale_error.is_some() {
        println!("! Refresh failed. Showing cached data.");
    }
}
