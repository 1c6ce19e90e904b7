use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::voter::{Voter, VoterStatus};

use super::ApiId;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateVoterRequest {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoterResponse {
    pub id: ApiId,
    pub name: String,
    pub email: String,
    pub status: VoterStatus,
    pub created_at: DateTime<Utc>,
}

impl From<Voter> for VoterResponse {
    fn from(voter: Voter) -> Self {
        Self {
            id: voter.id().into(),
            name: voter.name().to_string(),
            email: voter.email().to_string(),
            status: voter.status(),
            created_at: voter.created_at(),
        }
    }
}
