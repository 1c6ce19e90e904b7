use std::collections::HashMap;

use super::{election::Election, ElectionId, VotingOptionId};

/// Vote counts for every option of one election, in the election's option order.
///
/// Totals and percentages are left to the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElectionResults {
    pub election_id: ElectionId,
    pub election_name: String,
    pub results: Vec<OptionResult>,
}

/// The number of votes cast for a single option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionResult {
    pub option_id: VotingOptionId,
    pub option_name: String,
    pub vote_count: u64,
}

impl ElectionResults {
    /// Combine an election with its per-option vote counts.
    ///
    /// Every option gets an entry, with zero for options nobody voted for.
    /// Counts for IDs that are not options of the election are ignored.
    pub fn tally(election: &Election, counts: &HashMap<VotingOptionId, u64>) -> Self {
        let results = election
            .voting_options()
            .iter()
            .map(|option| OptionResult {
                option_id: option.id(),
                option_name: option.name().to_string(),
                vote_count: counts.get(&option.id()).copied().unwrap_or(0),
            })
            .collect();

        Self {
            election_id: election.id(),
            election_name: election.name().to_string(),
            results,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::model::Id;

    #[test]
    fn tally_includes_zero_counts_in_option_order() {
        let election = Election::example("Mayor", &["Alice", "Bob", "Carol"]);
        let counts = HashMap::from([
            (election.option_id("Carol"), 4),
            (election.option_id("Alice"), 1),
            (Id::new(), 99),
        ]);

        let results = ElectionResults::tally(&election, &counts);

        assert_eq!(results.election_id, election.id());
        assert_eq!(results.election_name, "Mayor");
        let summary: Vec<_> = results
            .results
            .iter()
            .map(|r| (r.option_name.as_str(), r.vote_count))
            .collect();
        assert_eq!(summary, [("Alice", 1), ("Bob", 0), ("Carol", 4)]);
    }

    #[test]
    fn election_without_options_has_no_results() {
        let election = Election::example("Empty", &[]);
        let results = ElectionResults::tally(&election, &HashMap::new());
        assert!(results.results.is_empty());
    }
}
