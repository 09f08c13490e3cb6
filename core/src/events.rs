//! Notifications emitted by successful ballot operations

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::phase::Phase;
use crate::types::{Address, ProposalId};

/// A record of one successful state change.
///
/// Exactly one event is produced per successful mutating call and none on
/// failure. The ballot keeps them in an append-only log; this log is the
/// only history of phase changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BallotEvent {
    VoterRegistered { voter: Address },
    WorkflowStatusChange { previous: Phase, next: Phase },
    ProposalRegistered { proposal_id: ProposalId },
    Voted { voter: Address, proposal_id: ProposalId },
}

impl BallotEvent {
    pub fn name(&self) -> &'static str {
        match self {
            BallotEvent::VoterRegistered { .. } => "VoterRegistered",
            BallotEvent::WorkflowStatusChange { .. } => "WorkflowStatusChange",
            BallotEvent::ProposalRegistered { .. } => "ProposalRegistered",
            BallotEvent::Voted { .. } => "Voted",
        }
    }
}

impl fmt::Display for BallotEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BallotEvent::VoterRegistered { voter } => write!(f, "VoterRegistered({})", voter),
            BallotEvent::WorkflowStatusChange { previous, next } => write!(
                f,
                "WorkflowStatusChange({} -> {})",
                previous.code(),
                next.code()
            ),
            BallotEvent::ProposalRegistered { proposal_id } => {
                write!(f, "ProposalRegistered({})", proposal_id)
            }
            BallotEvent::Voted { voter, proposal_id } => {
                write!(f, "Voted({}, {})", voter, proposal_id)
            }
        }
    }
}
