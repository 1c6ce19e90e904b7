#[macro_use]
extern crate rocket;

#[cfg(test)]
#[macro_use]
extern crate backend_test;

use std::sync::Arc;

use prometheus::Registry;
use rocket::{fairing::AdHoc, Build, Rocket};

use crate::{
    cache::MemoryResultCache,
    config::{Config, ConfigFairing, DatabaseFairing},
    headers::SecurityHeadersFairing,
    logging::LoggerFairing,
    metrics::MetricsRegistry,
    rate_limit::RateLimiter,
    service::{
        ports::{Clock, IdGenerator, ObjectIdGenerator, Repositories, SystemClock},
        CachedVoting, ElectionService, ObservedVoting, VoterService, Voting, VotingService,
    },
};

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod headers;
pub mod logging;
pub mod metrics;
pub mod model;
pub mod rate_limit;
pub mod service;

/// Build the server. Storage is chosen at ignition from the `db_uri` setting.
pub fn build() -> Rocket<Build> {
    rocket::build()
        .mount("/api", api::routes())
        .register("/", api::catchers())
        .attach(LoggerFairing)
        .attach(SecurityHeadersFairing)
        .attach(ConfigFairing)
        .attach(DatabaseFairing)
}

/// Build the server on top of the given repositories, skipping the config
/// and database fairings.
pub fn rocket_for_repositories(repos: Repositories, config: Config) -> Rocket<Build> {
    rocket::build()
        .mount("/api", api::routes())
        .register("/", api::catchers())
        .attach(LoggerFairing)
        .attach(SecurityHeadersFairing)
        .attach(AdHoc::try_on_ignite("Services", move |rocket| async move {
            let rocket = manage_services(rocket, repos, &config)?;
            Ok(rocket.manage(config))
        }))
}

/// Compose the services over the given repositories and place them into
/// managed state.
pub(crate) fn manage_services(
    rocket: Rocket<Build>,
    repos: Repositories,
    config: &Config,
) -> rocket::fairing::Result {
    let metrics = match MetricsRegistry::new(Registry::new()) {
        Ok(metrics) => Arc::new(metrics),
        Err(e) => {
            error!("Failed to register metrics: {e}");
            return Err(rocket);
        }
    };
    let ids: Arc<dyn IdGenerator> = Arc::new(ObjectIdGenerator);
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let cache = Arc::new(MemoryResultCache::new(
        config.results_cache_idle(),
        config.results_cache_capacity(),
    ));

    let core = VotingService::new(&repos, ids.clone(), clock.clone());
    let voting: Voting = Box::new(ObservedVoting::new(
        CachedVoting::new(core, cache),
        metrics.clone(),
    ));

    info!("Serving elections from {} storage", repos.storage.name());
    Ok(rocket
        .manage(VoterService::new(repos.voters, ids.clone(), clock.clone()))
        .manage(ElectionService::new(repos.elections, ids, clock))
        .manage(voting)
        .manage(metrics)
        .manage(repos.storage)
        .manage(RateLimiter::new(config)))
}

/// A client for a server running on fresh in-memory storage.
#[cfg(test)]
pub(crate) async fn test_client() -> rocket::local::asynchronous::Client {
    rocket::local::asynchronous::Client::tracked(rocket_for_repositories(
        Repositories::in_memory(),
        Config::default(),
    ))
    .await
    .unwrap()
}
