//! The collaborators the services depend on.
//!
//! Every repository method is a single call to the store; none of them
//! retry. Implementations live in [`crate::model::memory`] and
//! [`crate::model::mongodb`].

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use mongodb::{bson::doc, Database};

use crate::{
    error::Result,
    model::{
        election::Election, memory, results::ElectionResults, vote::Vote, voter::Voter,
        ElectionId, Id, VoteId, VoterId, VotingOptionId,
    },
};

#[rocket::async_trait]
pub trait VoterRepository: Send + Sync {
    /// Insert or replace a voter.
    ///
    /// Fails with `Conflict::DuplicateEmail` if a different voter already
    /// holds the same email.
    async fn save(&self, voter: Voter) -> Result<Voter>;

    async fn find_by_id(&self, id: VoterId) -> Result<Option<Voter>>;

    async fn find_all(&self) -> Result<Vec<Voter>>;

    async fn exists_by_email(&self, email: &str) -> Result<bool>;
}

#[rocket::async_trait]
pub trait ElectionRepository: Send + Sync {
    /// Insert or replace an election, keeping its option order.
    async fn save(&self, election: Election) -> Result<Election>;

    async fn find_by_id(&self, id: ElectionId) -> Result<Option<Election>>;

    async fn find_all(&self) -> Result<Vec<Election>>;
}

#[rocket::async_trait]
pub trait VoteRepository: Send + Sync {
    /// Insert a new vote.
    ///
    /// This is the hard uniqueness constraint: if a vote for the same
    /// voter and election already exists, the insert fails atomically with
    /// `Conflict::DuplicateVote`.
    async fn save(&self, vote: Vote) -> Result<Vote>;

    async fn exists_by_voter_and_election(
        &self,
        voter_id: VoterId,
        election_id: ElectionId,
    ) -> Result<bool>;

    /// Number of votes per option. Options without votes are absent.
    async fn count_by_election_grouped_by_option(
        &self,
        election_id: ElectionId,
    ) -> Result<HashMap<VotingOptionId, u64>>;
}

/// Produces fresh identifiers for new records.
pub trait IdGenerator: Send + Sync {
    fn voter_id(&self) -> VoterId;
    fn election_id(&self) -> ElectionId;
    fn voting_option_id(&self) -> VotingOptionId;
    fn vote_id(&self) -> VoteId;
}

/// Generates a new `ObjectId` for every record.
#[derive(Debug, Default, Clone, Copy)]
pub struct ObjectIdGenerator;

impl IdGenerator for ObjectIdGenerator {
    fn voter_id(&self) -> VoterId {
        Id::new()
    }

    fn election_id(&self) -> ElectionId {
        Id::new()
    }

    fn voting_option_id(&self) -> VotingOptionId {
        Id::new()
    }

    fn vote_id(&self) -> VoteId {
        Id::new()
    }
}

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A keyed store of computed results.
///
/// The store may drop entries on its own (e.g. when idle) but must never
/// return an entry after it has been evicted.
pub trait ResultCache: Send + Sync {
    fn get(&self, election_id: ElectionId) -> Option<ElectionResults>;
    fn put(&self, election_id: ElectionId, results: ElectionResults);
    fn evict(&self, election_id: ElectionId);
}

/// Receives timing observations from the voting pipeline.
pub trait MetricsSink: Send + Sync {
    fn record_vote_cast(&self, election_id: ElectionId, duration: Duration);
    fn record_results_query(&self, election_id: ElectionId, duration: Duration);
}

/// The backing store of a set of repositories.
#[derive(Debug, Clone)]
pub enum Storage {
    Memory,
    MongoDb(Database),
}

impl Storage {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Memory => "memory",
            Self::MongoDb(_) => "mongodb",
        }
    }

    /// Check that the store is reachable. Memory is always reachable.
    pub async fn ping(&self) -> Result<()> {
        if let Self::MongoDb(db) = self {
            db.run_command(doc! {"ping": 1}, None).await?;
        }
        Ok(())
    }
}

/// The set of repositories backing one running instance.
#[derive(Clone)]
pub struct Repositories {
    pub voters: Arc<dyn VoterRepository>,
    pub elections: Arc<dyn ElectionRepository>,
    pub votes: Arc<dyn VoteRepository>,
    pub storage: Storage,
}

impl Repositories {
    /// Volatile repositories that live only as long as the process.
    pub fn in_memory() -> Self {
        Self {
            voters: Arc::new(memory::MemoryVoterRepository::default()),
            elections: Arc::new(memory::MemoryElectionRepository::default()),
            votes: Arc::new(memory::MemoryVoteRepository::default()),
            storage: Storage::Memory,
        }
    }
}
