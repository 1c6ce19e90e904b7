mod bson;
mod collection;
mod errors;
mod repository;

pub use bson::Id;
pub use collection::{
    ensure_indexes_exist, Coll, MongoCollection, ONE_VOTE_INDEX, VOTER_EMAIL_INDEX,
};
pub use errors::{duplicate_key_index, is_duplicate_key_error, DUPLICATE_KEY};
pub use repository::{
    repositories, MongoElectionRepository, MongoVoteRepository, MongoVoterRepository,
};
