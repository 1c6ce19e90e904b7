use std::sync::Arc;

use crate::{
    error::{Conflict, Error, NotFound, Result},
    model::{results::ElectionResults, vote::Vote, ElectionId, VoterId, VotingOptionId},
};

use super::ports::{
    Clock, ElectionRepository, IdGenerator, Repositories, VoteRepository, VoterRepository,
};

/// Casting votes and reading results.
#[rocket::async_trait]
pub trait VotingUseCase: Send + Sync {
    async fn cast_vote(
        &self,
        voter_id: VoterId,
        election_id: ElectionId,
        option_id: VotingOptionId,
    ) -> Result<Vote>;

    async fn get_results(&self, election_id: ElectionId) -> Result<ElectionResults>;
}

/// The core voting rules, straight against the repositories.
pub struct VotingService {
    voters: Arc<dyn VoterRepository>,
    elections: Arc<dyn ElectionRepository>,
    votes: Arc<dyn VoteRepository>,
    ids: Arc<dyn IdGenerator>,
    clock: Arc<dyn Clock>,
}

impl VotingService {
    pub fn new(repos: &Repositories, ids: Arc<dyn IdGenerator>, clock: Arc<dyn Clock>) -> Self {
        Self {
            voters: repos.voters.clone(),
            elections: repos.elections.clone(),
            votes: repos.votes.clone(),
            ids,
            clock,
        }
    }
}

#[rocket::async_trait]
impl VotingUseCase for VotingService {
    /// Record a vote once every eligibility check has passed.
    ///
    /// The checks run in a fixed order and only read; the single write is
    /// the final `save`. The voter's status is checked before the election
    /// is looked up, so a blocked voter learns nothing about elections.
    async fn cast_vote(
        &self,
        voter_id: VoterId,
        election_id: ElectionId,
        option_id: VotingOptionId,
    ) -> Result<Vote> {
        let voter = self
            .voters
            .find_by_id(voter_id)
            .await?
            .ok_or(NotFound::Voter(voter_id))?;
        if voter.is_blocked() {
            debug!("Rejecting vote from blocked voter {voter_id}");
            return Err(Conflict::VoterBlocked(voter_id).into());
        }

        let election = self
            .elections
            .find_by_id(election_id)
            .await?
            .ok_or(NotFound::Election(election_id))?;
        if !election.has_option(option_id) {
            debug!("Option {option_id} is not part of election {election_id}");
            return Err(NotFound::VotingOption(option_id).into());
        }

        if self
            .votes
            .exists_by_voter_and_election(voter_id, election_id)
            .await?
        {
            debug!("Voter {voter_id} already voted in election {election_id}");
            return Err(Conflict::DuplicateVote.into());
        }

        let vote = Vote::cast(
            self.ids.vote_id(),
            voter_id,
            election_id,
            option_id,
            self.clock.now(),
        );
        let vote = self.votes.save(vote).await.map_err(|err| {
            if matches!(err, Error::Conflict(Conflict::DuplicateVote)) {
                warn!("Lost duplicate vote race for voter {voter_id} in election {election_id}");
            }
            err
        })?;

        info!("Vote {} cast in election {election_id}", vote.id());
        Ok(vote)
    }

    async fn get_results(&self, election_id: ElectionId) -> Result<ElectionResults> {
        let election = self
            .elections
            .find_by_id(election_id)
            .await?
            .ok_or(NotFound::Election(election_id))?;
        let counts = self
            .votes
            .count_by_election_grouped_by_option(election_id)
            .await?;
        debug!("Computed results for election {election_id}");
        Ok(ElectionResults::tally(&election, &counts))
    }
}

#[cfg(test)]
pub(super) mod tests {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use rocket::futures::future::join_all;

    use super::*;

    use crate::{
        model::{election::Election, voter::Voter, Id},
        service::ports::{ObjectIdGenerator, SystemClock},
    };

    pub fn service(repos: &Repositories) -> VotingService {
        VotingService::new(repos, Arc::new(ObjectIdGenerator), Arc::new(SystemClock))
    }

    /// A voter with an email nobody else has.
    pub fn unique_voter() -> Voter {
        Voter::example_with_email(&format!("{}@example.com", Id::new()))
    }

    /// Store a fresh voter and an election with the given options.
    pub async fn setup(repos: &Repositories, options: &[&str]) -> (Voter, Election) {
        let voter = repos.voters.save(unique_voter()).await.unwrap();
        let election = repos
            .elections
            .save(Election::example("Mayor", options))
            .await
            .unwrap();
        (voter, election)
    }

    #[rocket::async_test]
    async fn cast_vote_records_the_choice() {
        let repos = Repositories::in_memory();
        let (voter, election) = setup(&repos, &["Alice", "Bob"]).await;
        let bob = election.option_id("Bob");

        let vote = service(&repos)
            .cast_vote(voter.id(), election.id(), bob)
            .await
            .unwrap();

        assert_eq!(vote.voter_id(), voter.id());
        assert_eq!(vote.election_id(), election.id());
        assert_eq!(vote.voting_option_id(), bob);
        assert!(repos
            .votes
            .exists_by_voter_and_election(voter.id(), election.id())
            .await
            .unwrap());
    }

    #[rocket::async_test]
    async fn unknown_voter() {
        let repos = Repositories::in_memory();
        let (_, election) = setup(&repos, &["Alice"]).await;
        let stranger = Id::new();

        let err = service(&repos)
            .cast_vote(stranger, election.id(), election.option_id("Alice"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(NotFound::Voter(id)) if id == stranger));
    }

    #[rocket::async_test]
    async fn blocked_voter_is_rejected_whatever_the_election() {
        let repos = Repositories::in_memory();
        let (voter, election) = setup(&repos, &["Alice"]).await;
        repos.voters.save(voter.clone().block()).await.unwrap();
        let service = service(&repos);

        for (election_id, option_id) in [
            (election.id(), election.option_id("Alice")),
            (election.id(), Id::new()),
            (Id::new(), Id::new()),
        ] {
            let err = service
                .cast_vote(voter.id(), election_id, option_id)
                .await
                .unwrap_err();
            assert!(matches!(err, Error::Conflict(Conflict::VoterBlocked(_))));
        }
    }

    /// An election repository that counts lookups.
    struct CountingElections {
        inner: Arc<dyn ElectionRepository>,
        lookups: AtomicUsize,
    }

    #[rocket::async_trait]
    impl ElectionRepository for CountingElections {
        async fn save(&self, election: Election) -> Result<Election> {
            self.inner.save(election).await
        }

        async fn find_by_id(&self, id: ElectionId) -> Result<Option<Election>> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            self.inner.find_by_id(id).await
        }

        async fn find_all(&self) -> Result<Vec<Election>> {
            self.inner.find_all().await
        }
    }

    #[rocket::async_test]
    async fn blocked_voter_never_reaches_the_election_lookup() {
        let mut repos = Repositories::in_memory();
        let (voter, election) = setup(&repos, &["Alice"]).await;
        repos.voters.save(voter.clone().block()).await.unwrap();
        let elections = Arc::new(CountingElections {
            inner: repos.elections.clone(),
            lookups: AtomicUsize::new(0),
        });
        repos.elections = elections.clone();

        let result = service(&repos)
            .cast_vote(voter.id(), election.id(), election.option_id("Alice"))
            .await;

        assert!(matches!(
            result,
            Err(Error::Conflict(Conflict::VoterBlocked(_)))
        ));
        assert_eq!(elections.lookups.load(Ordering::SeqCst), 0);
    }

    #[rocket::async_test]
    async fn unknown_election() {
        let repos = Repositories::in_memory();
        let (voter, _) = setup(&repos, &["Alice"]).await;
        let missing = Id::new();

        let err = service(&repos)
            .cast_vote(voter.id(), missing, Id::new())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(NotFound::Election(id)) if id == missing));
    }

    #[rocket::async_test]
    async fn option_from_another_election_is_not_found() {
        let repos = Repositories::in_memory();
        let (voter, election) = setup(&repos, &["Alice"]).await;
        let other = repos
            .elections
            .save(Election::example("Council", &["Carol"]))
            .await
            .unwrap();
        let carol = other.option_id("Carol");

        let err = service(&repos)
            .cast_vote(voter.id(), election.id(), carol)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(NotFound::VotingOption(id)) if id == carol));
    }

    #[rocket::async_test]
    async fn second_vote_is_a_duplicate() {
        let repos = Repositories::in_memory();
        let (voter, election) = setup(&repos, &["Alice", "Bob"]).await;
        let service = service(&repos);

        service
            .cast_vote(voter.id(), election.id(), election.option_id("Alice"))
            .await
            .unwrap();
        let err = service
            .cast_vote(voter.id(), election.id(), election.option_id("Bob"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Conflict(Conflict::DuplicateVote)));

        let results = service.get_results(election.id()).await.unwrap();
        let total: u64 = results.results.iter().map(|r| r.vote_count).sum();
        assert_eq!(total, 1);
    }

    /// A vote repository whose pre-check always says "no vote yet", so
    /// every concurrent caller makes it to the insert.
    struct BlindVotes(Arc<dyn VoteRepository>);

    #[rocket::async_trait]
    impl VoteRepository for BlindVotes {
        async fn save(&self, vote: Vote) -> Result<Vote> {
            rocket::tokio::task::yield_now().await;
            self.0.save(vote).await
        }

        async fn exists_by_voter_and_election(&self, _: VoterId, _: ElectionId) -> Result<bool> {
            Ok(false)
        }

        async fn count_by_election_grouped_by_option(
            &self,
            election_id: ElectionId,
        ) -> Result<HashMap<VotingOptionId, u64>> {
            self.0.count_by_election_grouped_by_option(election_id).await
        }
    }

    #[rocket::async_test]
    async fn concurrent_casts_produce_exactly_one_vote() {
        let mut repos = Repositories::in_memory();
        let (voter, election) = setup(&repos, &["Alice", "Bob"]).await;
        repos.votes = Arc::new(BlindVotes(repos.votes.clone()));
        let service = Arc::new(service(&repos));

        let tasks = (0..16).map(|i| {
            let service = service.clone();
            let option = if i % 2 == 0 { "Alice" } else { "Bob" };
            let option_id = election.option_id(option);
            let (voter_id, election_id) = (voter.id(), election.id());
            rocket::tokio::spawn(async move {
                service.cast_vote(voter_id, election_id, option_id).await
            })
        });
        let outcomes: Vec<_> = join_all(tasks)
            .await
            .into_iter()
            .map(|joined| joined.unwrap())
            .collect();

        let successes = outcomes.iter().filter(|o| o.is_ok()).count();
        assert_eq!(successes, 1);
        assert!(outcomes.iter().filter(|o| o.is_err()).all(|o| matches!(
            o,
            Err(Error::Conflict(Conflict::DuplicateVote))
        )));

        let counts = repos
            .votes
            .count_by_election_grouped_by_option(election.id())
            .await
            .unwrap();
        assert_eq!(counts.values().sum::<u64>(), 1);
    }

    #[rocket::async_test]
    async fn results_follow_option_order_and_include_zeroes() {
        let repos = Repositories::in_memory();
        let election = Election::example("Mayor", &["Option A", "Option B", "Option C"]);
        let election = repos.elections.save(election).await.unwrap();
        let service = service(&repos);

        for option in ["Option A", "Option A", "Option B"] {
            let voter = repos.voters.save(unique_voter()).await.unwrap();
            service
                .cast_vote(voter.id(), election.id(), election.option_id(option))
                .await
                .unwrap();
        }

        let results = service.get_results(election.id()).await.unwrap();
        assert_eq!(results.election_name, "Mayor");
        let summary: Vec<_> = results
            .results
            .iter()
            .map(|r| (r.option_name.as_str(), r.vote_count))
            .collect();
        assert_eq!(summary, [("Option A", 2), ("Option B", 1), ("Option C", 0)]);
    }

    #[rocket::async_test]
    async fn results_for_unknown_election() {
        let repos = Repositories::in_memory();
        let missing = Id::new();
        let err = service(&repos).get_results(missing).await.unwrap_err();
        assert!(matches!(err, Error::NotFound(NotFound::Election(id)) if id == missing));
    }
}
