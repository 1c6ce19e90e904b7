//! Domain records and their storage/API representations.
//!
//! Records in this module are immutable values. Each one that accepts user
//! input has a validating `create` constructor and a trusted `reconstitute`
//! constructor for data already known to be valid (e.g. read back from
//! storage); state transitions consume the value and return a new one.

pub mod api;
pub mod election;
pub mod memory;
pub mod mongodb;
pub mod results;
pub mod vote;
pub mod voter;

pub use self::mongodb::Id;

/// Voter IDs are plain IDs.
pub type VoterId = Id;
/// Election IDs are plain IDs.
pub type ElectionId = Id;
/// Voting option IDs are plain IDs.
pub type VotingOptionId = Id;
/// Vote IDs are plain IDs.
pub type VoteId = Id;

use crate::error::{Error, Result};

/// Trim a name and check that its length, in characters, lies within `min..=max`.
///
/// `subject` is used in error messages, e.g. "Voter name must not be blank".
pub(crate) fn validated_name(
    subject: &str,
    name: &str,
    min: usize,
    max: usize,
) -> Result<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::validation(
            "name",
            format!("{subject} name must not be blank"),
        ));
    }
    let length = name.chars().count();
    if length < min || length > max {
        return Err(Error::validation(
            "name",
            format!("{subject} name must be between {min} and {max} characters"),
        ));
    }
    Ok(name.to_string())
}
