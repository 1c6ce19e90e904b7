use std::sync::Arc;
use std::time::Instant;

use crate::{
    error::Result,
    model::{results::ElectionResults, vote::Vote, ElectionId, VoterId, VotingOptionId},
};

use super::{ports::MetricsSink, VotingUseCase};

/// Times each call to the wrapped pipeline and reports it to a metrics sink.
///
/// Only successful calls are recorded. Results and errors pass through
/// untouched.
pub struct ObservedVoting<V> {
    inner: V,
    metrics: Arc<dyn MetricsSink>,
}

impl<V: VotingUseCase> ObservedVoting<V> {
    pub fn new(inner: V, metrics: Arc<dyn MetricsSink>) -> Self {
        Self { inner, metrics }
    }
}

#[rocket::async_trait]
impl<V: VotingUseCase> VotingUseCase for ObservedVoting<V> {
    async fn cast_vote(
        &self,
        voter_id: VoterId,
        election_id: ElectionId,
        option_id: VotingOptionId,
    ) -> Result<Vote> {
        let start = Instant::now();
        let vote = self
            .inner
            .cast_vote(voter_id, election_id, option_id)
            .await?;
        self.metrics.record_vote_cast(election_id, start.elapsed());
        Ok(vote)
    }

    async fn get_results(&self, election_id: ElectionId) -> Result<ElectionResults> {
        let start = Instant::now();
        let results = self.inner.get_results(election_id).await?;
        self.metrics
            .record_results_query(election_id, start.elapsed());
        Ok(results)
    }
}
