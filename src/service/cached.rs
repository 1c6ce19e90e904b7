use std::sync::Arc;

use crate::{
    error::Result,
    model::{results::ElectionResults, vote::Vote, ElectionId, VoterId, VotingOptionId},
};

use super::{ports::ResultCache, VotingUseCase};

/// Serves results from a cache, invalidating an election's entry whenever a
/// vote is cast in it.
pub struct CachedVoting<V> {
    inner: V,
    cache: Arc<dyn ResultCache>,
}

impl<V: VotingUseCase> CachedVoting<V> {
    pub fn new(inner: V, cache: Arc<dyn ResultCache>) -> Self {
        Self { inner, cache }
    }
}

#[rocket::async_trait]
impl<V: VotingUseCase> VotingUseCase for CachedVoting<V> {
    async fn cast_vote(
        &self,
        voter_id: VoterId,
        election_id: ElectionId,
        option_id: VotingOptionId,
    ) -> Result<Vote> {
        let vote = self
            .inner
            .cast_vote(voter_id, election_id, option_id)
            .await?;
        // Evict rather than update, so the next read recomputes from the store.
        self.cache.evict(election_id);
        Ok(vote)
    }

    async fn get_results(&self, election_id: ElectionId) -> Result<ElectionResults> {
        if let Some(results) = self.cache.get(election_id) {
            debug!("Results cache hit for election {election_id}");
            return Ok(results);
        }
        debug!("Results cache miss for election {election_id}");
        let results = self.inner.get_results(election_id).await?;
        self.cache.put(election_id, results.clone());
        Ok(results)
    }
}
