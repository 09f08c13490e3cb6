//! Ballot Core Library
//!
//! Single-organizer ballot workflow: voter registration, proposal submission,
//! one-vote-per-voter casting and a deterministic tally, driven through a
//! fixed six-phase state machine.

pub mod ballot;
pub mod error;
pub mod events;
pub mod phase;
pub mod shared;
pub mod tally;
pub mod types;

// Re-export main types
pub use ballot::{Ballot, BallotCommand};
pub use error::{BallotError, Result};
pub use events::BallotEvent;
pub use phase::{Operation, Phase, Transition};
pub use shared::SharedBallot;
pub use tally::select_winner;
pub use types::{Address, Proposal, ProposalId, Voter, GENESIS_DESCRIPTION, GENESIS_PROPOSAL_ID};
