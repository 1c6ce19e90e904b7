use rocket::{http::Status, serde::json::Json, Route, State};

use crate::{
    model::api::health::{HealthResponse, HealthStatus},
    service::ports::Storage,
};

pub fn routes() -> Vec<Route> {
    routes![health]
}

/// Report whether the storage behind the server is reachable.
///
/// Not rate limited, so that monitoring keeps working under load.
#[get("/health")]
async fn health(storage: &State<Storage>) -> (Status, Json<HealthResponse>) {
    let storage_name = storage.name().to_string();
    match storage.ping().await {
        Ok(()) => (
            Status::Ok,
            Json(HealthResponse {
                status: HealthStatus::Up,
                storage: storage_name,
                error: None,
            }),
        ),
        Err(e) => {
            error!("Health check failed for {storage_name} storage: {e}");
            (
                Status::ServiceUnavailable,
                Json(HealthResponse {
                    status: HealthStatus::Down,
                    storage: storage_name,
                    error: Some(e.to_string()),
                }),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use mongodb::options::ClientOptions;
    use rocket::{
        local::asynchronous::{Client, LocalResponse},
        serde::json::serde_json,
    };

    use super::*;

    use crate::{
        config::Config, model::mongodb::repositories, rocket_for_repositories, test_client,
    };

    async fn health_of(response: LocalResponse<'_>) -> HealthResponse {
        serde_json::from_str(&response.into_string().await.unwrap()).unwrap()
    }

    #[rocket::async_test]
    async fn memory_storage_is_always_up() {
        let client = test_client().await;
        let response = client.get("/api/health").dispatch().await;

        assert_eq!(Status::Ok, response.status());
        assert_eq!(
            health_of(response).await,
            HealthResponse {
                status: HealthStatus::Up,
                storage: "memory".to_string(),
                error: None,
            }
        );
    }

    #[rocket::async_test]
    async fn unreachable_database_is_down() {
        // Nothing listens on port 1; give up on it quickly.
        let mut options = ClientOptions::parse("mongodb://127.0.0.1:1").await.unwrap();
        options.server_selection_timeout = Some(std::time::Duration::from_millis(200));
        let db = mongodb::Client::with_options(options)
            .unwrap()
            .database("unreachable");
        let client = Client::tracked(rocket_for_repositories(
            repositories(&db),
            Config::default(),
        ))
        .await
        .unwrap();

        let response = client.get("/api/health").dispatch().await;

        assert_eq!(Status::ServiceUnavailable, response.status());
        let health = health_of(response).await;
        assert_eq!(health.status, HealthStatus::Down);
        assert_eq!(health.storage, "mongodb");
        assert!(health.error.is_some());
    }

    #[backend_test]
    async fn reachable_database_is_up(client: Client) {
        let response = client.get("/api/health").dispatch().await;

        assert_eq!(Status::Ok, response.status());
        let health = health_of(response).await;
        assert_eq!(health.status, HealthStatus::Up);
        assert_eq!(health.storage, "mongodb");
    }
}
