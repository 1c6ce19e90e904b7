//! Application services.
//!
//! The voting pipeline is a stack of [`VotingUseCase`] implementations:
//! [`ObservedVoting`] wraps [`CachedVoting`], which wraps the core
//! [`VotingService`]. Each layer can be used and tested on its own.

mod cached;
mod election;
mod observed;
pub mod ports;
mod voter;
mod voting;

pub use cached::CachedVoting;
pub use election::ElectionService;
pub use observed::ObservedVoting;
pub use voter::VoterService;
pub use voting::{VotingService, VotingUseCase};

/// The fully composed voting pipeline, as held in managed state.
pub type Voting = Box<dyn VotingUseCase>;
