use std::sync::Arc;

use crate::{
    error::{NotFound, Result},
    model::{
        election::{Election, VotingOption},
        ElectionId,
    },
};

use super::ports::{Clock, ElectionRepository, IdGenerator};

/// Creating elections and growing their option lists.
pub struct ElectionService {
    elections: Arc<dyn ElectionRepository>,
    ids: Arc<dyn IdGenerator>,
    clock: Arc<dyn Clock>,
}

impl ElectionService {
    pub fn new(
        elections: Arc<dyn ElectionRepository>,
        ids: Arc<dyn IdGenerator>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            elections,
            ids,
            clock,
        }
    }

    pub async fn create_election(&self, name: &str) -> Result<Election> {
        let election = Election::create(self.ids.election_id(), name, self.clock.now())?;
        let election = self.elections.save(election).await?;
        info!("Created election {} ({})", election.id(), election.name());
        Ok(election)
    }

    /// Append a new option to an election and return it as stored.
    ///
    /// Two concurrent calls for the same election may race; the later save wins.
    pub async fn add_voting_option(
        &self,
        election_id: ElectionId,
        name: &str,
    ) -> Result<VotingOption> {
        let election = self.get_election(election_id).await?;
        let option = VotingOption::create(self.ids.voting_option_id(), name)?;
        let option_id = option.id();
        let election = self
            .elections
            .save(election.add_voting_option(option))
            .await?;
        let option = election
            .find_option(option_id)
            .cloned()
            .ok_or(NotFound::VotingOption(option_id))?;
        info!("Added option {option_id} to election {election_id}");
        Ok(option)
    }

    pub async fn get_election(&self, id: ElectionId) -> Result<Election> {
        Ok(self
            .elections
            .find_by_id(id)
            .await?
            .ok_or(NotFound::Election(id))?)
    }

    pub async fn get_all_elections(&self) -> Result<Vec<Election>> {
        self.elections.find_all().await
    }
}

#[cfg(test)]
mod tests {
    use mongodb::Database;

    use super::*;

    use crate::{
        error::Error,
        model::{memory::MemoryElectionRepository, mongodb::MongoElectionRepository, Id},
        service::ports::{ObjectIdGenerator, SystemClock},
    };

    fn service() -> ElectionService {
        service_over(Arc::new(MemoryElectionRepository::default()))
    }

    fn service_over(elections: Arc<dyn ElectionRepository>) -> ElectionService {
        ElectionService::new(elections, Arc::new(ObjectIdGenerator), Arc::new(SystemClock))
    }

    /// Append three options one by one, checking after each step that the
    /// stored election holds exactly the options added so far, in order.
    async fn append_three_options(elections: Arc<dyn ElectionRepository>) {
        let service = service_over(elections.clone());
        let election = service.create_election("City council").await.unwrap();

        let mut added = Vec::new();
        for name in ["Zoe", "Adam", "Maria"] {
            let option = service
                .add_voting_option(election.id(), name)
                .await
                .unwrap();
            assert_eq!(option.name(), name);
            added.push(option);

            let stored = elections.find_by_id(election.id()).await.unwrap().unwrap();
            assert_eq!(stored.voting_options(), added.as_slice());
            assert_eq!(stored.id(), election.id());
            assert_eq!(stored.name(), "City council");
        }

        let names: Vec<_> = service
            .get_election(election.id())
            .await
            .unwrap()
            .voting_options()
            .iter()
            .map(|o| o.name().to_string())
            .collect();
        assert_eq!(names, ["Zoe", "Adam", "Maria"]);
    }

    #[rocket::async_test]
    async fn appended_options_are_stored_in_order() {
        append_three_options(Arc::new(MemoryElectionRepository::default())).await;
    }

    #[backend_test]
    async fn appended_options_are_stored_in_order_in_mongodb(db: Database) {
        append_three_options(Arc::new(MongoElectionRepository::new(&db))).await;
    }

    #[rocket::async_test]
    async fn create_and_fetch() {
        let service = service();
        let election = service.create_election("  Mayor 2024 ").await.unwrap();

        assert_eq!(election.name(), "Mayor 2024");
        assert!(election.voting_options().is_empty());
        assert_eq!(service.get_election(election.id()).await.unwrap(), election);
        assert_eq!(service.get_all_elections().await.unwrap(), vec![election]);
    }

    #[rocket::async_test]
    async fn invalid_names_are_rejected() {
        let service = service();
        assert!(matches!(
            service.create_election("X").await,
            Err(Error::Validation { .. })
        ));
        assert!(service.get_all_elections().await.unwrap().is_empty());
    }

    #[rocket::async_test]
    async fn options_are_appended_in_order() {
        let service = service();
        let election = service.create_election("Mayor").await.unwrap();

        let alice = service
            .add_voting_option(election.id(), " Alice ")
            .await
            .unwrap();
        let bob = service.add_voting_option(election.id(), "Bob").await.unwrap();

        assert_eq!(alice.name(), "Alice");
        let stored = service.get_election(election.id()).await.unwrap();
        assert_eq!(stored.voting_options(), [alice, bob]);
        assert_eq!(stored.name(), "Mayor");
    }

    #[rocket::async_test]
    async fn option_errors() {
        let service = service();
        let missing = Id::new();
        assert!(matches!(
            service.add_voting_option(missing, "Alice").await,
            Err(Error::NotFound(NotFound::Election(id))) if id == missing
        ));

        let election = service.create_election("Mayor").await.unwrap();
        assert!(matches!(
            service.add_voting_option(election.id(), "").await,
            Err(Error::Validation { field: "name", .. })
        ));
        let stored = service.get_election(election.id()).await.unwrap();
        assert!(stored.voting_options().is_empty());
    }
}
