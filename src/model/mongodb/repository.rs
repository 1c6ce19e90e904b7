//! Repositories over the `voters`, `elections` and `votes` collections.

use std::collections::HashMap;
use std::sync::Arc;

use mongodb::{
    bson::{self, doc},
    options::{FindOptions, ReplaceOptions},
    Database,
};
use rocket::futures::TryStreamExt;
use serde::Deserialize;

use crate::{
    error::{Conflict, Error, Result},
    model::{election::Election, vote::Vote, voter::Voter, ElectionId, VoterId, VotingOptionId},
    service::ports::{
        ElectionRepository, Repositories, Storage, VoteRepository, VoterRepository,
    },
};

use super::{duplicate_key_index, Coll, ONE_VOTE_INDEX, VOTER_EMAIL_INDEX};

/// Build the full set of repositories on top of the given database.
pub fn repositories(db: &Database) -> Repositories {
    Repositories {
        voters: Arc::new(MongoVoterRepository::new(db)),
        elections: Arc::new(MongoElectionRepository::new(db)),
        votes: Arc::new(MongoVoteRepository::new(db)),
        storage: Storage::MongoDb(db.clone()),
    }
}

fn upsert() -> ReplaceOptions {
    ReplaceOptions::builder().upsert(true).build()
}

fn oldest_first() -> FindOptions {
    FindOptions::builder().sort(doc! {"_id": 1}).build()
}

pub struct MongoVoterRepository {
    voters: Coll<Voter>,
}

impl MongoVoterRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            voters: Coll::from_db(db),
        }
    }
}

#[rocket::async_trait]
impl VoterRepository for MongoVoterRepository {
    async fn save(&self, voter: Voter) -> Result<Voter> {
        match self
            .voters
            .replace_one(voter.id().as_doc(), &voter, upsert())
            .await
        {
            Ok(_) => Ok(voter),
            // Only the email index means the address is taken; an `_id`
            // clash between two upserts of one voter is an internal error.
            Err(e) if duplicate_key_index(&e) == Some(VOTER_EMAIL_INDEX) => {
                Err(Conflict::DuplicateEmail(voter.email().to_string()).into())
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn find_by_id(&self, id: VoterId) -> Result<Option<Voter>> {
        Ok(self.voters.find_one(id.as_doc(), None).await?)
    }

    async fn find_all(&self) -> Result<Vec<Voter>> {
        let voters = self
            .voters
            .find(None, oldest_first())
            .await?
            .try_collect()
            .await?;
        Ok(voters)
    }

    async fn exists_by_email(&self, email: &str) -> Result<bool> {
        let count = self
            .voters
            .count_documents(doc! {"email": email}, None)
            .await?;
        Ok(count > 0)
    }
}

pub struct MongoElectionRepository {
    elections: Coll<Election>,
}

impl MongoElectionRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            elections: Coll::from_db(db),
        }
    }
}

#[rocket::async_trait]
impl ElectionRepository for MongoElectionRepository {
    async fn save(&self, election: Election) -> Result<Election> {
        self.elections
            .replace_one(election.id().as_doc(), &election, upsert())
            .await?;
        Ok(election)
    }

    async fn find_by_id(&self, id: ElectionId) -> Result<Option<Election>> {
        Ok(self.elections.find_one(id.as_doc(), None).await?)
    }

    async fn find_all(&self) -> Result<Vec<Election>> {
        let elections = self
            .elections
            .find(None, oldest_first())
            .await?
            .try_collect()
            .await?;
        Ok(elections)
    }
}

pub struct MongoVoteRepository {
    votes: Coll<Vote>,
}

impl MongoVoteRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            votes: Coll::from_db(db),
        }
    }
}

/// One row of the grouped count.
#[derive(Deserialize)]
struct OptionCount {
    #[serde(rename = "_id")]
    option_id: VotingOptionId,
    count: u64,
}

#[rocket::async_trait]
impl VoteRepository for MongoVoteRepository {
    async fn save(&self, vote: Vote) -> Result<Vote> {
        match self.votes.insert_one(&vote, None).await {
            Ok(_) => Ok(vote),
            // The unique (voter_id, election_id) index caught a concurrent vote.
            Err(e) if duplicate_key_index(&e) == Some(ONE_VOTE_INDEX) => {
                Err(Conflict::DuplicateVote.into())
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn exists_by_voter_and_election(
        &self,
        voter_id: VoterId,
        election_id: ElectionId,
    ) -> Result<bool> {
        let filter = doc! {
            "voter_id": voter_id,
            "election_id": election_id,
        };
        Ok(self.votes.count_documents(filter, None).await? > 0)
    }

    async fn count_by_election_grouped_by_option(
        &self,
        election_id: ElectionId,
    ) -> Result<HashMap<VotingOptionId, u64>> {
        let pipeline = [
            doc! {"$match": {"election_id": election_id}},
            doc! {"$group": {"_id": "$voting_option_id", "count": {"$sum": 1}}},
        ];
        let rows: Vec<_> = self
            .votes
            .aggregate(pipeline, None)
            .await?
            .try_collect()
            .await?;

        rows.into_iter()
            .map(|row| {
                let row: OptionCount = bson::from_document(row)
                    .map_err(|e| Error::Internal(format!("Malformed vote count: {e}")))?;
                Ok((row.option_id, row.count))
            })
            .collect()
    }
}
