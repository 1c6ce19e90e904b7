use std::ops::Deref;

use mongodb::{
    bson::doc, error::Error as DbError, options::IndexOptions, Collection, Database, IndexModel,
};

use crate::model::{election::Election, vote::Vote, voter::Voter};

/// A type that can be directly inserted/read to/from the database.
pub trait MongoCollection {
    /// The name of the collection.
    const NAME: &'static str;
}

/// A database collection of the given type.
pub struct Coll<T>(Collection<T>);

impl<T> Coll<T>
where
    T: MongoCollection,
{
    /// Get a handle on this collection in the given database.
    pub fn from_db(db: &Database) -> Self {
        Self(db.collection(T::NAME))
    }
}

// `Derive(Clone)` would only derive if `T: Clone`, but we don't need that bound.
impl<T> Clone for Coll<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<T> Deref for Coll<T> {
    type Target = Collection<T>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl MongoCollection for Voter {
    const NAME: &'static str = "voters";
}

impl MongoCollection for Election {
    const NAME: &'static str = "elections";
}

impl MongoCollection for Vote {
    const NAME: &'static str = "votes";
}

/// The unique index on voter emails.
pub const VOTER_EMAIL_INDEX: &str = "voter_email";

/// The unique index allowing one vote per voter per election.
pub const ONE_VOTE_INDEX: &str = "one_vote_per_election";

fn unique(name: &str) -> IndexOptions {
    IndexOptions::builder()
        .unique(true)
        .name(name.to_string())
        .build()
}

/// Ensure that all the required indexes exist on the given database.
///
/// This operation is idempotent.
pub async fn ensure_indexes_exist(db: &Database) -> Result<(), DbError> {
    debug!("Ensuring collection indexes exist");

    // Voter collection.
    let email_index = IndexModel::builder()
        .keys(doc! {"email": 1})
        .options(unique(VOTER_EMAIL_INDEX))
        .build();
    Coll::<Voter>::from_db(db)
        .create_index(email_index, None)
        .await?;

    // Vote collection: at most one vote per voter per election.
    let one_vote_index = IndexModel::builder()
        .keys(doc! {"voter_id": 1, "election_id": 1})
        .options(unique(ONE_VOTE_INDEX))
        .build();
    let tally_index = IndexModel::builder()
        .keys(doc! {"election_id": 1, "voting_option_id": 1})
        .build();
    Coll::<Vote>::from_db(db)
        .create_indexes([one_vote_index, tally_index], None)
        .await?;

    Ok(())
}
