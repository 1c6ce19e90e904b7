use mongodb::bson::oid;
use rocket::{http::Status, serde::json::Json, Catcher, Request, Route};

use crate::{
    error::{Error, Result},
    model::{api::ApiError, Id},
};

mod election;
mod health;
mod metrics;
mod voter;
mod voting;

pub fn routes() -> Vec<Route> {
    let mut routes = Vec::new();
    routes.extend(voter::routes());
    routes.extend(election::routes());
    routes.extend(voting::routes());
    routes.extend(metrics::routes());
    routes.extend(health::routes());
    routes
}

pub fn catchers() -> Vec<Catcher> {
    catchers![
        bad_request,
        not_found,
        unprocessable_entity,
        too_many_requests,
        internal_error
    ]
}

/// Turn a path segment that failed to parse as an ID into a validation error.
fn path_id(field: &'static str, id: std::result::Result<Id, oid::Error>) -> Result<Id> {
    id.map_err(|e| Error::validation(field, format!("Invalid id: {e}")))
}

fn api_error(status: Status, code: &str, message: &str, req: &Request<'_>) -> Json<ApiError> {
    Json(ApiError::new(
        status,
        code,
        message.to_string(),
        req.uri().path().to_string(),
    ))
}

#[catch(400)]
fn bad_request(req: &Request<'_>) -> Json<ApiError> {
    api_error(
        Status::BadRequest,
        "VALIDATION_ERROR",
        "Malformed request",
        req,
    )
}

#[catch(404)]
fn not_found(req: &Request<'_>) -> Json<ApiError> {
    api_error(Status::NotFound, "NOT_FOUND", "Resource not found", req)
}

#[catch(422)]
fn unprocessable_entity(req: &Request<'_>) -> Json<ApiError> {
    api_error(
        Status::UnprocessableEntity,
        "VALIDATION_ERROR",
        "Request body does not match the expected shape",
        req,
    )
}

#[catch(429)]
fn too_many_requests(req: &Request<'_>) -> Json<ApiError> {
    api_error(
        Status::TooManyRequests,
        Error::RateLimitExceeded.code(),
        "Rate limit exceeded",
        req,
    )
}

#[catch(500)]
fn internal_error(req: &Request<'_>) -> Json<ApiError> {
    api_error(
        Status::InternalServerError,
        "INTERNAL_ERROR",
        "Internal server error",
        req,
    )
}
