use std::sync::Arc;

use crate::{
    error::{Conflict, NotFound, Result},
    model::{voter::Voter, VoterId},
};

use super::ports::{Clock, IdGenerator, VoterRepository};

/// Registering voters and toggling whether they may vote.
pub struct VoterService {
    voters: Arc<dyn VoterRepository>,
    ids: Arc<dyn IdGenerator>,
    clock: Arc<dyn Clock>,
}

impl VoterService {
    pub fn new(
        voters: Arc<dyn VoterRepository>,
        ids: Arc<dyn IdGenerator>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self { voters, ids, clock }
    }

    /// Register a new active voter.
    ///
    /// Input is validated before the repository is touched.
    pub async fn create_voter(&self, name: &str, email: &str) -> Result<Voter> {
        let voter = Voter::create(self.ids.voter_id(), name, email, self.clock.now())?;
        if self.voters.exists_by_email(voter.email()).await? {
            return Err(Conflict::DuplicateEmail(voter.email().to_string()).into());
        }
        let voter = self.voters.save(voter).await?;
        info!("Created voter {}", voter.id());
        Ok(voter)
    }

    pub async fn block_voter(&self, id: VoterId) -> Result<Voter> {
        let voter = self.get_voter(id).await?.block();
        let voter = self.voters.save(voter).await?;
        info!("Blocked voter {id}");
        Ok(voter)
    }

    pub async fn unblock_voter(&self, id: VoterId) -> Result<Voter> {
        let voter = self.get_voter(id).await?.unblock();
        let voter = self.voters.save(voter).await?;
        info!("Unblocked voter {id}");
        Ok(voter)
    }

    pub async fn get_voter(&self, id: VoterId) -> Result<Voter> {
        Ok(self
            .voters
            .find_by_id(id)
            .await?
            .ok_or(NotFound::Voter(id))?)
    }

    pub async fn get_all_voters(&self) -> Result<Vec<Voter>> {
        self.voters.find_all().await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    use crate::{
        error::Error,
        model::{memory::MemoryVoterRepository, voter::VoterStatus, Id},
        service::ports::{ObjectIdGenerator, SystemClock},
    };

    fn service(voters: Arc<dyn VoterRepository>) -> VoterService {
        VoterService::new(voters, Arc::new(ObjectIdGenerator), Arc::new(SystemClock))
    }

    /// A repository that counts every call made to it.
    #[derive(Default)]
    struct CountingVoters {
        inner: MemoryVoterRepository,
        calls: AtomicUsize,
    }

    #[rocket::async_trait]
    impl VoterRepository for CountingVoters {
        async fn save(&self, voter: Voter) -> Result<Voter> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.save(voter).await
        }

        async fn find_by_id(&self, id: VoterId) -> Result<Option<Voter>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.find_by_id(id).await
        }

        async fn find_all(&self) -> Result<Vec<Voter>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.find_all().await
        }

        async fn exists_by_email(&self, email: &str) -> Result<bool> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.exists_by_email(email).await
        }
    }

    #[rocket::async_test]
    async fn create_voter_stores_an_active_voter() {
        let voters = Arc::new(MemoryVoterRepository::default());
        let service = service(voters.clone());

        let voter = service
            .create_voter(" Jan Kowalski ", "jan@example.com")
            .await
            .unwrap();

        assert_eq!(voter.name(), "Jan Kowalski");
        assert_eq!(voter.status(), VoterStatus::Active);
        assert_eq!(service.get_voter(voter.id()).await.unwrap(), voter);
        assert_eq!(service.get_all_voters().await.unwrap(), vec![voter]);
    }

    #[rocket::async_test]
    async fn invalid_email_fails_before_any_repository_call() {
        let voters = Arc::new(CountingVoters::default());
        let service = service(voters.clone());

        let err = service
            .create_voter("Jan Kowalski", "not-an-email")
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Validation { field: "email", .. }));
        assert_eq!(voters.calls.load(Ordering::SeqCst), 0);
    }

    #[rocket::async_test]
    async fn emails_must_be_unique() {
        let service = service(Arc::new(MemoryVoterRepository::default()));
        service
            .create_voter("Jan Kowalski", "jan@example.com")
            .await
            .unwrap();

        let err = service
            .create_voter("Jan Nowak", " jan@example.com ")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Conflict(Conflict::DuplicateEmail(email)) if email == "jan@example.com"
        ));
    }

    #[rocket::async_test]
    async fn block_and_unblock_round_trip() {
        let service = service(Arc::new(MemoryVoterRepository::default()));
        let voter = service
            .create_voter("Jan Kowalski", "jan@example.com")
            .await
            .unwrap();

        let blocked = service.block_voter(voter.id()).await.unwrap();
        assert!(blocked.is_blocked());
        // Idempotent.
        let blocked = service.block_voter(voter.id()).await.unwrap();
        assert!(blocked.is_blocked());
        assert!(service.get_voter(voter.id()).await.unwrap().is_blocked());

        let active = service.unblock_voter(voter.id()).await.unwrap();
        assert!(active.is_active());
        let active = service.unblock_voter(voter.id()).await.unwrap();
        assert!(active.is_active());
        assert_eq!(active.email(), voter.email());
    }

    #[rocket::async_test]
    async fn unknown_voters_are_not_found() {
        let service = service(Arc::new(MemoryVoterRepository::default()));
        let missing = Id::new();

        for result in [
            service.get_voter(missing).await,
            service.block_voter(missing).await,
            service.unblock_voter(missing).await,
        ] {
            assert!(matches!(
                result,
                Err(Error::NotFound(NotFound::Voter(id))) if id == missing
            ));
        }
    }
}
