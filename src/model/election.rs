use chrono::{DateTime, Utc};
use mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime;
use serde::{Deserialize, Serialize};

use crate::error::Result;

use super::{validated_name, ElectionId, VotingOptionId};

pub const NAME_MIN_LENGTH: usize = 2;
pub const NAME_MAX_LENGTH: usize = 200;

/// A selectable choice within exactly one election.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VotingOption {
    id: VotingOptionId,
    name: String,
}

impl VotingOption {
    /// Create a new option, validating and trimming its name.
    pub fn create(id: VotingOptionId, name: &str) -> Result<Self> {
        let name = validated_name("Voting option", name, NAME_MIN_LENGTH, NAME_MAX_LENGTH)?;
        Ok(Self { id, name })
    }

    /// Rebuild an option from trusted data without validation.
    pub fn reconstitute(id: VotingOptionId, name: String) -> Self {
        Self { id, name }
    }

    pub fn id(&self) -> VotingOptionId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// A named contest with an ordered list of voting options.
///
/// Options are only ever appended; the ID and name never change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Election {
    #[serde(rename = "_id")]
    id: ElectionId,
    name: String,
    voting_options: Vec<VotingOption>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    created_at: DateTime<Utc>,
}

impl Election {
    /// Create a new election with no options, validating and trimming its name.
    pub fn create(id: ElectionId, name: &str, created_at: DateTime<Utc>) -> Result<Self> {
        let name = validated_name("Election", name, NAME_MIN_LENGTH, NAME_MAX_LENGTH)?;
        Ok(Self {
            id,
            name,
            voting_options: Vec::new(),
            created_at,
        })
    }

    /// Rebuild an election from trusted data without validation.
    pub fn reconstitute(
        id: ElectionId,
        name: String,
        voting_options: Vec<VotingOption>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name,
            voting_options,
            created_at,
        }
    }

    /// Append an option, keeping the existing ones in order.
    pub fn add_voting_option(mut self, option: VotingOption) -> Self {
        self.voting_options.push(option);
        self
    }

    pub fn has_option(&self, option_id: VotingOptionId) -> bool {
        self.voting_options.iter().any(|o| o.id == option_id)
    }

    pub fn find_option(&self, option_id: VotingOptionId) -> Option<&VotingOption> {
        self.voting_options.iter().find(|o| o.id == option_id)
    }

    pub fn id(&self) -> ElectionId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn voting_options(&self) -> &[VotingOption] {
        &self.voting_options
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
