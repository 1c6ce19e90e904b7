use serde::{Deserialize, Serialize};

use crate::model::results::ElectionResults;

use super::ApiId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionResultResponse {
    pub option_id: ApiId,
    pub option_name: String,
    pub vote_count: u64,
    /// Share of all votes in the election, 0 to 100. Zero when nobody has voted.
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElectionResultsResponse {
    pub election_id: ApiId,
    pub election_name: String,
    pub results: Vec<OptionResultResponse>,
    pub total_votes: u64,
}

impl From<ElectionResults> for ElectionResultsResponse {
    fn from(results: ElectionResults) -> Self {
        let total_votes: u64 = results.results.iter().map(|r| r.vote_count).sum();
        let results_out = results
            .results
            .into_iter()
            .map(|r| OptionResultResponse {
                option_id: r.option_id.into(),
                option_name: r.option_name,
                vote_count: r.vote_count,
                percentage: percentage(r.vote_count, total_votes),
            })
            .collect();

        Self {
            election_id: results.election_id.into(),
            election_name: results.election_name,
            results: results_out,
            total_votes,
        }
    }
}

fn percentage(count: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 * 100.0 / total as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::model::{results::OptionResult, Id};

    fn results(counts: &[(&str, u64)]) -> ElectionResults {
        ElectionResults {
            election_id: Id::new(),
            election_name: "Mayor".to_string(),
            results: counts
                .iter()
                .map(|(name, count)| OptionResult {
                    option_id: Id::new(),
                    option_name: name.to_string(),
                    vote_count: *count,
                })
                .collect(),
        }
    }

    #[test]
    fn percentages_of_total() {
        let response = ElectionResultsResponse::from(results(&[("A", 2), ("B", 1)]));
        assert_eq!(response.total_votes, 3);
        let rounded: Vec<_> = response
            .results
            .iter()
            .map(|r| (r.percentage * 10.0).round() / 10.0)
            .collect();
        assert_eq!(rounded, [66.7, 33.3]);
    }

    #[test]
    fn no_votes_means_zero_percent() {
        let response = ElectionResultsResponse::from(results(&[("A", 0), ("B", 0)]));
        assert_eq!(response.total_votes, 0);
        assert!(response.results.iter().all(|r| r.percentage == 0.0));
        assert_eq!(response.results.len(), 2);
    }

    #[test]
    fn single_option_takes_everything() {
        let response = ElectionResultsResponse::from(results(&[("A", 5)]));
        assert_eq!(response.results[0].percentage, 100.0);
    }
}
