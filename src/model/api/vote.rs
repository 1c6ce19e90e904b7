use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::vote::Vote;

use super::ApiId;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CastVoteRequest {
    pub voter_id: ApiId,
    pub voting_option_id: ApiId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteResponse {
    pub id: ApiId,
    pub voter_id: ApiId,
    pub election_id: ApiId,
    pub voting_option_id: ApiId,
    pub cast_at: DateTime<Utc>,
}

impl From<Vote> for VoteResponse {
    fn from(vote: Vote) -> Self {
        Self {
            id: vote.id().into(),
            voter_id: vote.voter_id().into(),
            election_id: vote.election_id().into(),
            voting_option_id: vote.voting_option_id().into(),
            cast_at: vote.cast_at(),
        }
    }
}
