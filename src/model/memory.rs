//! Volatile repositories backed by mutex-guarded maps.
//!
//! Records are cloned in and out, so callers never share state with the
//! store. Uniqueness rules are checked under the same lock as the write.

use std::collections::{btree_map::Entry, BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::{
    error::{Conflict, Result},
    service::ports::{ElectionRepository, VoteRepository, VoterRepository},
};

use super::{election::Election, vote::Vote, voter::Voter, ElectionId, VoterId, VotingOptionId};

/// Lock a mutex, ignoring poisoning; every critical section below leaves
/// its map consistent even if a panic unwinds through it.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Debug, Default)]
pub struct MemoryVoterRepository {
    voters: Mutex<BTreeMap<VoterId, Voter>>,
}

#[rocket::async_trait]
impl VoterRepository for MemoryVoterRepository {
    async fn save(&self, voter: Voter) -> Result<Voter> {
        let mut voters = lock(&self.voters);
        let taken = voters
            .values()
            .any(|other| other.id() != voter.id() && other.email() == voter.email());
        if taken {
            return Err(Conflict::DuplicateEmail(voter.email().to_string()).into());
        }
        voters.insert(voter.id(), voter.clone());
        Ok(voter)
    }

    async fn find_by_id(&self, id: VoterId) -> Result<Option<Voter>> {
        Ok(lock(&self.voters).get(&id).cloned())
    }

    async fn find_all(&self) -> Result<Vec<Voter>> {
        Ok(lock(&self.voters).values().cloned().collect())
    }

    async fn exists_by_email(&self, email: &str) -> Result<bool> {
        Ok(lock(&self.voters).values().any(|v| v.email() == email))
    }
}

#[derive(Debug, Default)]
pub struct MemoryElectionRepository {
    elections: Mutex<BTreeMap<ElectionId, Election>>,
}

#[rocket::async_trait]
impl ElectionRepository for MemoryElectionRepository {
    async fn save(&self, election: Election) -> Result<Election> {
        lock(&self.elections).insert(election.id(), election.clone());
        Ok(election)
    }

    async fn find_by_id(&self, id: ElectionId) -> Result<Option<Election>> {
        Ok(lock(&self.elections).get(&id).cloned())
    }

    async fn find_all(&self) -> Result<Vec<Election>> {
        Ok(lock(&self.elections).values().cloned().collect())
    }
}

/// Votes keyed by `(voter, election)`, which makes the at-most-one-vote
/// rule a property of the map itself.
#[derive(Debug, Default)]
pub struct MemoryVoteRepository {
    votes: Mutex<BTreeMap<(VoterId, ElectionId), Vote>>,
}

#[rocket::async_trait]
impl VoteRepository for MemoryVoteRepository {
    async fn save(&self, vote: Vote) -> Result<Vote> {
        match lock(&self.votes).entry((vote.voter_id(), vote.election_id())) {
            Entry::Occupied(_) => Err(Conflict::DuplicateVote.into()),
            Entry::Vacant(entry) => {
                entry.insert(vote.clone());
                Ok(vote)
            }
        }
    }

    async fn exists_by_voter_and_election(
        &self,
        voter_id: VoterId,
        election_id: ElectionId,
    ) -> Result<bool> {
        Ok(lock(&self.votes).contains_key(&(voter_id, election_id)))
    }

    async fn count_by_election_grouped_by_option(
        &self,
        election_id: ElectionId,
    ) -> Result<HashMap<VotingOptionId, u64>> {
        let votes = lock(&self.votes);
        let mut counts = HashMap::new();
        for vote in votes.values().filter(|v| v.election_id() == election_id) {
            *counts.entry(vote.voting_option_id()).or_insert(0) += 1;
        }
        Ok(counts)
    }
}
