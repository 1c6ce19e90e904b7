use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

use super::{validated_name, VoterId};

pub const NAME_MIN_LENGTH: usize = 2;
pub const NAME_MAX_LENGTH: usize = 100;

const EMAIL_PATTERN: &str = r"^[A-Za-z0-9+_.-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$";

fn email_regex() -> &'static Regex {
    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    EMAIL_REGEX.get_or_init(|| Regex::new(EMAIL_PATTERN).unwrap()) // Constant pattern.
}

/// Whether a voter may currently vote.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VoterStatus {
    Active,
    Blocked,
}

impl VoterStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "ACTIVE",
            Self::Blocked => "BLOCKED",
        }
    }
}

/// A registered voter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Voter {
    #[serde(rename = "_id")]
    id: VoterId,
    name: String,
    email: String,
    status: VoterStatus,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    created_at: DateTime<Utc>,
}

impl Voter {
    /// Register a new, active voter, validating and trimming the name and email.
    ///
    /// Email uniqueness is not checked here; that is up to the repository.
    pub fn create(id: VoterId, name: &str, email: &str, created_at: DateTime<Utc>) -> Result<Self> {
        let name = validated_name("Voter", name, NAME_MIN_LENGTH, NAME_MAX_LENGTH)?;
        let email = validated_email(email)?;
        Ok(Self {
            id,
            name,
            email,
            status: VoterStatus::Active,
            created_at,
        })
    }

    /// Rebuild a voter from trusted data without validation.
    pub fn reconstitute(
        id: VoterId,
        name: String,
        email: String,
        status: VoterStatus,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name,
            email,
            status,
            created_at,
        }
    }

    /// Block this voter. Blocking a blocked voter changes nothing.
    pub fn block(self) -> Self {
        Self {
            status: VoterStatus::Blocked,
            ..self
        }
    }

    /// Unblock this voter. Unblocking an active voter changes nothing.
    pub fn unblock(self) -> Self {
        Self {
            status: VoterStatus::Active,
            ..self
        }
    }

    pub fn is_blocked(&self) -> bool {
        self.status == VoterStatus::Blocked
    }

    pub fn is_active(&self) -> bool {
        self.status == VoterStatus::Active
    }

    pub fn id(&self) -> VoterId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn status(&self) -> VoterStatus {
        self.status
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

fn validated_email(email: &str) -> Result<String> {
    let email = email.trim();
    if email.is_empty() {
        return Err(Error::validation("email", "Voter email must not be blank"));
    }
    if !email_regex().is_match(email) {
        return Err(Error::validation("email", "Invalid email format"));
    }
    Ok(email.to_string())
}

/// Example data for tests.
#[cfg(test)]
mod examples {
    use super::*;

    use crate::model::Id;

    impl Voter {
        pub fn example() -> Self {
            Self::create(Id::new(), "Jan Kowalski", "jan@example.com", Utc::now()).unwrap()
        }

        pub fn example_with_email(email: &str) -> Self {
            Self::create(Id::new(), "Anna Nowak", email, Utc::now()).unwrap()
        }
    }
}
