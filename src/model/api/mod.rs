//! Request and response bodies of the JSON API.
//!
//! Responses are built from domain records with `From` conversions; IDs are
//! exposed as 24-digit hex strings via [`ApiId`].

mod error;
mod id;

pub mod election;
pub mod health;
pub mod results;
pub mod vote;
pub mod voter;

pub use error::ApiError;
pub use id::ApiId;
