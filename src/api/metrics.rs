use std::sync::Arc;

use rocket::{http::ContentType, Route, State};

use crate::{
    error::{Error, Result},
    metrics::MetricsRegistry,
    rate_limit::Throttle,
};

pub fn routes() -> Vec<Route> {
    routes![metrics]
}

/// Prometheus scrape endpoint.
#[get("/metrics")]
fn metrics(
    _throttle: Throttle,
    registry: &State<Arc<MetricsRegistry>>,
) -> Result<(ContentType, String)> {
    let body = registry
        .render()
        .map_err(|e| Error::Internal(format!("Failed to encode metrics: {e}")))?;
    let content_type =
        ContentType::parse_flexible(prometheus::TEXT_FORMAT).unwrap_or(ContentType::Plain);
    Ok((content_type, body))
}

#[cfg(test)]
mod tests {
    use rocket::http::Status;

    use crate::test_client;

    #[rocket::async_test]
    async fn empty_scrape() {
        let client = test_client().await;
        let response = client.get("/api/metrics").dispatch().await;

        assert_eq!(Status::Ok, response.status());
        let content_type = response.content_type().unwrap();
        assert_eq!(content_type.top(), "text");
        assert_eq!(content_type.sub(), "plain");
        assert_eq!(response.into_string().await.unwrap(), "");
    }
}
