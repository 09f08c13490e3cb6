//! Voter, proposal and identity types

use serde::{Deserialize, Serialize};
use std::fmt;

/// Sequential proposal identifier. The id is the proposal's index in the list.
pub type ProposalId = u64;

/// Id of the placeholder proposal created when submissions open
pub const GENESIS_PROPOSAL_ID: ProposalId = 0;

/// Description of the placeholder proposal
pub const GENESIS_DESCRIPTION: &str = "GENESIS";

/// Caller identity as supplied by the hosting runtime.
///
/// The ballot never authenticates an address; it only compares it against
/// the administrator and the voter registry.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(String);

impl Address {
    pub fn new(address: impl Into<String>) -> Self {
        Address(address.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Address {
    fn from(address: &str) -> Self {
        Address::new(address)
    }
}

impl From<String> for Address {
    fn from(address: String) -> Self {
        Address(address)
    }
}

impl AsRef<str> for Address {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Voter record. Absent registry entries read as `Voter::default()`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Voter {
    pub is_registered: bool,
    pub has_voted: bool,
    pub voted_proposal_id: ProposalId,
}

impl Voter {
    /// A freshly registered voter who has not voted yet
    pub fn registered() -> Self {
        Voter {
            is_registered: true,
            ..Voter::default()
        }
    }
}

/// A submitted proposal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proposal {
    pub description: String,
    pub vote_count: u64,
}

impl Proposal {
    pub fn new(description: impl Into<String>) -> Self {
        Proposal {
            description: description.into(),
            vote_count: 0,
        }
    }

    /// The id-0 placeholder that guarantees a non-empty candidate set
    pub fn genesis() -> Self {
        Proposal::new(GENESIS_DESCRIPTION)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_voter_is_unregistered() {
        let voter = Voter::default();
        assert!(!voter.is_registered);
        assert!(!voter.has_voted);
        assert_eq!(voter.voted_proposal_id, 0);

        let voter = Voter::registered();
        assert!(voter.is_registered);
        assert!(!voter.has_voted);
    }

    #[test]
    fn test_address_serializes_as_plain_string() {
        let address = Address::from("0xabc");
        assert_eq!(serde_json::to_string(&address).unwrap(), "\"0xabc\"");
        assert_eq!(address.to_string(), "0xabc");
    }
}
