use mongodb::error::Error as DbError;
use rocket::{
    http::Status,
    response::{self, Responder},
    serde::json::Json,
    Request, Response,
};
use thiserror::Error;

use crate::{
    logging::RequestId,
    model::{api::ApiError, ElectionId, VoterId, VotingOptionId},
};

pub type Result<T> = std::result::Result<T, Error>;

/// Something that was referenced does not exist.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NotFound {
    #[error("Voter not found: {0}")]
    Voter(VoterId),
    #[error("Election not found: {0}")]
    Election(ElectionId),
    #[error("Voting option not found: {0}")]
    VotingOption(VotingOptionId),
}

/// The request is well-formed but clashes with existing state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Conflict {
    #[error("Voter is blocked: {0}")]
    VoterBlocked(VoterId),
    #[error("Voter already voted in this election")]
    DuplicateVote,
    #[error("Email already registered: {0}")]
    DuplicateEmail(String),
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    NotFound(#[from] NotFound),
    #[error(transparent)]
    Conflict(#[from] Conflict),
    #[error("{field}: {message}")]
    Validation {
        field: &'static str,
        message: String,
    },
    #[error("Rate limit exceeded")]
    RateLimitExceeded,
    #[error(transparent)]
    Db(#[from] DbError),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }

    /// Stable, machine-readable error code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound(NotFound::Voter(_)) => "VOTER_NOT_FOUND",
            Self::NotFound(NotFound::Election(_)) => "ELECTION_NOT_FOUND",
            Self::NotFound(NotFound::VotingOption(_)) => "VOTING_OPTION_NOT_FOUND",
            Self::Conflict(Conflict::VoterBlocked(_)) => "VOTER_BLOCKED",
            Self::Conflict(Conflict::DuplicateVote) => "DUPLICATE_VOTE",
            Self::Conflict(Conflict::DuplicateEmail(_)) => "DUPLICATE_EMAIL",
            Self::Validation { .. } => "VALIDATION_ERROR",
            Self::RateLimitExceeded => "RATE_LIMIT_EXCEEDED",
            Self::Db(_) | Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    pub fn status(&self) -> Status {
        match self {
            Self::NotFound(_) => Status::NotFound,
            Self::Conflict(_) => Status::Conflict,
            Self::Validation { .. } => Status::BadRequest,
            Self::RateLimitExceeded => Status::TooManyRequests,
            Self::Db(_) | Self::Internal(_) => Status::InternalServerError,
        }
    }
}

/// A short random token tying a client-visible internal error to its log entry.
fn correlation_token() -> String {
    format!("{:016x}", rand::random::<u64>())
}

impl<'r> Responder<'r, 'static> for Error {
    fn respond_to(self, req: &'r Request<'_>) -> response::Result<'static> {
        let status = self.status();
        let message = if status == Status::InternalServerError {
            // Never leak internal details to the client.
            let token = correlation_token();
            let id = RequestId::of(req);
            error!("Unhandled error in req{id} [correlationId={token}]: {self}");
            format!("Internal server error [{token}]")
        } else {
            debug!("Request failed: {self}");
            self.to_string()
        };
        let body = ApiError::new(status, self.code(), message, req.uri().path().to_string());
        Response::build_from(Json(body).respond_to(req)?)
            .status(status)
            .ok()
    }
}
