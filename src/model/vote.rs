use chrono::{DateTime, Utc};
use mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime;
use serde::{Deserialize, Serialize};

use super::{ElectionId, VoteId, VoterId, VotingOptionId};

/// One voter's choice of one option in one election. Never updated or deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vote {
    #[serde(rename = "_id")]
    id: VoteId,
    voter_id: VoterId,
    election_id: ElectionId,
    voting_option_id: VotingOptionId,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    cast_at: DateTime<Utc>,
}

impl Vote {
    /// Record a vote. All eligibility checks happen before this is called.
    pub fn cast(
        id: VoteId,
        voter_id: VoterId,
        election_id: ElectionId,
        voting_option_id: VotingOptionId,
        cast_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            voter_id,
            election_id,
            voting_option_id,
            cast_at,
        }
    }

    pub fn id(&self) -> VoteId {
        self.id
    }

    pub fn voter_id(&self) -> VoterId {
        self.voter_id
    }

    pub fn election_id(&self) -> ElectionId {
        self.election_id
    }

    pub fn voting_option_id(&self) -> VotingOptionId {
        self.voting_option_id
    }

    pub fn cast_at(&self) -> DateTime<Utc> {
        self.cast_at
    }
}
