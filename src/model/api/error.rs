use chrono::{DateTime, Utc};
use rocket::http::Status;
use serde::{Deserialize, Serialize};

/// The body of every error response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    pub timestamp: DateTime<Utc>,
    pub status: u16,
    pub error_code: String,
    pub message: String,
    pub path: String,
}

impl ApiError {
    pub fn new(status: Status, error_code: &str, message: String, path: String) -> Self {
        Self {
            timestamp: Utc::now(),
            status: status.code,
            error_code: error_code.to_string(),
            message,
            path,
        }
    }
}
