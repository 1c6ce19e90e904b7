use std::time::Duration;

use mongodb::Client as MongoClient;
use rocket::{
    fairing::{Fairing, Info, Kind},
    Build, Rocket,
};
use serde::Deserialize;

use crate::{
    model::mongodb::{ensure_indexes_exist, repositories},
    service::ports::Repositories,
};

/// Application configuration, derived from `Rocket.toml` and `ROCKET_*`
/// environment variables. Every field has a default. This struct becomes
/// managed state and can be inspected by any endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub(crate) rate_limit_capacity: u32,
    pub(crate) rate_limit_refill_tokens: u32,
    pub(crate) rate_limit_refill_secs: u64,
    pub(crate) rate_limit_idle_secs: u64,
    pub(crate) rate_limit_max_clients: usize,
    pub(crate) results_cache_idle_secs: u64,
    pub(crate) results_cache_capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rate_limit_capacity: 100,
            rate_limit_refill_tokens: 100,
            rate_limit_refill_secs: 60,
            rate_limit_idle_secs: 3600,
            rate_limit_max_clients: 10_000,
            results_cache_idle_secs: 600,
            results_cache_capacity: 10_000,
        }
    }
}

impl Config {
    /// Burst size of each client's token bucket.
    pub fn rate_limit_capacity(&self) -> u32 {
        self.rate_limit_capacity
    }

    /// Tokens added to a bucket per refill period.
    pub fn rate_limit_refill_tokens(&self) -> u32 {
        self.rate_limit_refill_tokens
    }

    pub fn rate_limit_refill_period(&self) -> Duration {
        Duration::from_secs(self.rate_limit_refill_secs)
    }

    /// How long a client bucket may sit unused before it can be pruned.
    pub fn rate_limit_idle(&self) -> Duration {
        Duration::from_secs(self.rate_limit_idle_secs)
    }

    pub fn rate_limit_max_clients(&self) -> usize {
        self.rate_limit_max_clients
    }

    /// How long cached results survive without being read.
    pub fn results_cache_idle(&self) -> Duration {
        Duration::from_secs(self.results_cache_idle_secs)
    }

    /// The most elections whose results are cached at once.
    pub fn results_cache_capacity(&self) -> usize {
        self.results_cache_capacity
    }
}

/// A fairing that loads the application config and puts it in managed state.
/// This could easily be achieved using `AdHoc::config`, but is written out
/// explicitly for symmetry with the database fairing and control over error
/// messages.
pub struct ConfigFairing;

#[rocket::async_trait]
impl Fairing for ConfigFairing {
    fn info(&self) -> Info {
        Info {
            name: "Config",
            kind: Kind::Ignite,
        }
    }

    async fn on_ignite(&self, mut rocket: Rocket<Build>) -> rocket::fairing::Result {
        // Load the config.
        let config = match rocket.figment().extract::<Config>() {
            Ok(config) => config,
            Err(e) => {
                error!("Failed to load application config");
                rocket::config::pretty_print_error(e);
                return Err(rocket);
            }
        };

        // Manage the state.
        rocket = rocket.manage(config);
        Ok(rocket)
    }
}

/// Configuration for the database.
#[derive(Deserialize)]
struct DbConfig {
    // secrets
    db_uri: Option<String>,
}

/// A fairing that loads the MongoDB config, connects to the database,
/// ensures the indexes exist, and places the services built on top of it
/// into managed state. Without a `db_uri`, in-memory storage is used.
///
/// Must be attached after [`ConfigFairing`].
pub struct DatabaseFairing;

#[rocket::async_trait]
impl Fairing for DatabaseFairing {
    fn info(&self) -> Info {
        Info {
            name: "MongoDB",
            kind: Kind::Ignite,
        }
    }

    async fn on_ignite(&self, rocket: Rocket<Build>) -> rocket::fairing::Result {
        // Load the config.
        let db_config = match rocket.figment().extract::<DbConfig>() {
            Ok(config) => config,
            Err(e) => {
                error!("Failed to load database config");
                rocket::config::pretty_print_error(e);
                return Err(rocket);
            }
        };
        let Some(config) = rocket.state::<Config>().cloned() else {
            error!("Application config must be loaded before the database");
            return Err(rocket);
        };

        let Some(db_uri) = db_config.db_uri else {
            warn!("No `db_uri` configured, falling back to volatile in-memory storage");
            return crate::manage_services(rocket, Repositories::in_memory(), &config);
        };

        info!("Loaded database config, connecting...");
        // Construct the connection.
        let client = match MongoClient::with_uri_str(db_uri).await {
            Ok(client) => client,
            Err(e) => {
                error!("Failed to connect to database: {e}");
                return Err(rocket);
            }
        };
        let db = client.database(&get_database_name());

        // Ensure the required indexes exist.
        if let Err(e) = ensure_indexes_exist(&db).await {
            error!("Failed to connect to database: {e}");
            return Err(rocket);
        }
        info!("...database connection online!");

        // Manage the state.
        let repos = repositories(&db);
        let rocket = rocket.manage(client).manage(db);
        crate::manage_services(rocket, repos, &config)
    }
}

/// Get the name of the database to use (production version).
#[cfg(not(test))]
fn get_database_name() -> String {
    "elections".to_string()
}

/// Get the name of the database to use (test version).
/// Use a random name to avoid collisions between tests.
#[cfg(test)]
fn get_database_name() -> String {
    let random: u32 = rand::random();
    let db = format!("test{random}");
    info!("Using database {db}");
    db
}
