use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::election::{Election, VotingOption};

use super::ApiId;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateElectionRequest {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateVotingOptionRequest {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VotingOptionResponse {
    pub id: ApiId,
    pub name: String,
}

impl From<&VotingOption> for VotingOptionResponse {
    fn from(option: &VotingOption) -> Self {
        Self {
            id: option.id().into(),
            name: option.name().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElectionResponse {
    pub id: ApiId,
    pub name: String,
    pub voting_options: Vec<VotingOptionResponse>,
    pub created_at: DateTime<Utc>,
}

impl From<Election> for ElectionResponse {
    fn from(election: Election) -> Self {
        Self {
            id: election.id().into(),
            name: election.name().to_string(),
            voting_options: election.voting_options().iter().map(Into::into).collect(),
            created_at: election.created_at(),
        }
    }
}
