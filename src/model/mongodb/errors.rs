//! For some reason, the mongodb crate doesn't provide error code constants.
//! This module fills in the gaps.

use mongodb::error::{Error as DbError, ErrorKind, WriteFailure};

pub const DUPLICATE_KEY: i32 = 11000;

/// Return true if the given error is a unique index violation on write.
pub fn is_duplicate_key_error(err: &DbError) -> bool {
    match *err.kind {
        ErrorKind::Write(WriteFailure::WriteError(ref e)) => e.code == DUPLICATE_KEY,
        _ => false,
    }
}

/// If the given error is a unique index violation, the name of the index
/// that was violated.
///
/// The driver does not expose the key pattern of a write error, so the name
/// is read from the server's message, e.g.
/// `E11000 duplicate key error collection: db.voters index: voter_email dup key: ...`.
pub fn duplicate_key_index(err: &DbError) -> Option<&str> {
    match *err.kind {
        ErrorKind::Write(WriteFailure::WriteError(ref e)) if e.code == DUPLICATE_KEY => {
            index_in_message(&e.message)
        }
        _ => None,
    }
}

fn index_in_message(message: &str) -> Option<&str> {
    let (_, rest) = message.split_once(" index: ")?;
    rest.split_whitespace().next()
}
