//! Thread-safe handle for hosts that dispatch calls concurrently
//!
//! Every call takes the single lock for its whole duration, so concurrent
//! callers observe the same one-at-a-time semantics as a serialized host.

use parking_lot::Mutex;
use std::sync::Arc;

use crate::ballot::{Ballot, BallotCommand};
use crate::error::Result;
use crate::events::BallotEvent;
use crate::phase::Phase;
use crate::types::{Address, Proposal, ProposalId, Voter};

#[derive(Debug, Clone)]
pub struct SharedBallot {
    inner: Arc<Mutex<Ballot>>,
}

impl SharedBallot {
    pub fn new(ballot: Ballot) -> Self {
        SharedBallot {
            inner: Arc::new(Mutex::new(ballot)),
        }
    }

    pub fn execute(&self, caller: &Address, command: BallotCommand) -> Result<BallotEvent> {
        self.inner.lock().execute(caller, command)
    }

    pub fn get_voter(&self, caller: &Address, voter: &Address) -> Result<Voter> {
        self.inner.lock().get_voter(caller, voter)
    }

    pub fn get_proposal(&self, caller: &Address, proposal_id: ProposalId) -> Result<Proposal> {
        self.inner.lock().get_proposal(caller, proposal_id)
    }

    pub fn winning_proposal_id(&self) -> Option<ProposalId> {
        self.inner.lock().winning_proposal_id()
    }

    pub fn phase(&self) -> Phase {
        self.inner.lock().phase()
    }

    /// Copy of the current state, e.g. for persisting
    pub fn snapshot(&self) -> Ballot {
        self.inner.lock().clone()
    }

    /// Run a read-only closure against the locked state
    pub fn read<R>(&self, f: impl FnOnce(&Ballot) -> R) -> R {
        f(&self.inner.lock())
    }
}

impl From<Ballot> for SharedBallot {
    fn from(ballot: Ballot) -> Self {
        SharedBallot::new(ballot)
    }
}
