//! Ballot error types

use thiserror::Error;

use crate::phase::{Operation, Phase};
use crate::types::ProposalId;

/// Rejections raised by ballot operations.
///
/// Every variant is permanent for a given state: retrying the same call
/// against the same ballot fails the same way.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BallotError {
    #[error("Ownable: caller is not the owner")]
    NotAdministrator,

    #[error("You're not a voter")]
    NotAVoter,

    #[error("Already registered")]
    AlreadyRegistered,

    #[error("You have already voted")]
    AlreadyVoted,

    #[error("Vous ne pouvez pas ne rien proposer")]
    EmptyProposal,

    #[error("Proposal not found: {0}")]
    UnknownProposal(ProposalId),

    #[error("{}", .operation.mismatch_reason())]
    PhaseMismatch {
        operation: Operation,
        required: Phase,
        actual: Phase,
    },
}

pub type Result<T> = std::result::Result<T, BallotError>;
