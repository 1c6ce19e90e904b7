//! Prometheus metrics for the voting pipeline.
//!
//! Every metric is labelled with the election it belongs to. The metrics
//! live in a registry owned by the server rather than the process-wide
//! default one, so each server instance reports only its own calls.

use std::time::Duration;

use prometheus::{HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder};

use crate::{model::ElectionId, service::ports::MetricsSink};

const ELECTION_LABEL: &str = "election_id";

const LATENCY_BUCKETS: [f64; 9] = [0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0];

pub struct MetricsRegistry {
    registry: Registry,
    votes_cast_duration: HistogramVec,
    votes_cast_total: IntCounterVec,
    results_query_duration: HistogramVec,
}

impl MetricsRegistry {
    /// Register the voting metrics with the given registry.
    pub fn new(registry: Registry) -> prometheus::Result<Self> {
        let votes_cast_duration = HistogramVec::new(
            HistogramOpts::new(
                "votes_cast_duration_seconds",
                "Time taken to cast a vote",
            )
            .buckets(LATENCY_BUCKETS.to_vec()),
            &[ELECTION_LABEL],
        )?;
        let votes_cast_total = IntCounterVec::new(
            Opts::new("votes_cast_total", "Number of votes cast"),
            &[ELECTION_LABEL],
        )?;
        let results_query_duration = HistogramVec::new(
            HistogramOpts::new(
                "results_query_duration_seconds",
                "Time taken to answer a results query",
            )
            .buckets(LATENCY_BUCKETS.to_vec()),
            &[ELECTION_LABEL],
        )?;

        registry.register(Box::new(votes_cast_duration.clone()))?;
        registry.register(Box::new(votes_cast_total.clone()))?;
        registry.register(Box::new(results_query_duration.clone()))?;

        Ok(Self {
            registry,
            votes_cast_duration,
            votes_cast_total,
            results_query_duration,
        })
    }

    /// Render every metric in the Prometheus text exposition format.
    pub fn render(&self) -> prometheus::Result<String> {
        TextEncoder::new().encode_to_string(&self.registry.gather())
    }
}

impl MetricsSink for MetricsRegistry {
    fn record_vote_cast(&self, election_id: ElectionId, duration: Duration) {
        debug!("vote.cast election={election_id} duration={duration:?}");
        let label = election_id.to_string();
        self.votes_cast_duration
            .with_label_values(&[label.as_str()])
            .observe(duration.as_secs_f64());
        self.votes_cast_total
            .with_label_values(&[label.as_str()])
            .inc();
    }

    fn record_results_query(&self, election_id: ElectionId, duration: Duration) {
        debug!("results.query election={election_id} duration={duration:?}");
        self.results_query_duration
            .with_label_values(&[election_id.to_string().as_str()])
            .observe(duration.as_secs_f64());
    }
}
