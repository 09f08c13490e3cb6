//! Ballot workflow engine
//!
//! Owns the administrator, the phase, the voter registry, the proposal list
//! and the tally result. All state changes go through the operations below;
//! each one either applies fully and returns its event, or fails and leaves
//! the ballot untouched.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{BallotError, Result};
use crate::events::BallotEvent;
use crate::phase::{Operation, Phase, Transition};
use crate::tally::select_winner;
use crate::types::{Address, Proposal, ProposalId, Voter, GENESIS_PROPOSAL_ID};

/// Mutating calls a host can submit on behalf of a caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BallotCommand {
    RegisterVoter(Address),
    StartProposalsRegistration,
    SubmitProposal(String),
    EndProposalsRegistration,
    StartVotingSession,
    CastVote(ProposalId),
    EndVotingSession,
    TallyVotes,
}

impl BallotCommand {
    pub fn operation(&self) -> Operation {
        match self {
            BallotCommand::RegisterVoter(_) => Operation::RegisterVoter,
            BallotCommand::StartProposalsRegistration => Operation::StartProposalsRegistration,
            BallotCommand::SubmitProposal(_) => Operation::SubmitProposal,
            BallotCommand::EndProposalsRegistration => Operation::EndProposalsRegistration,
            BallotCommand::StartVotingSession => Operation::StartVotingSession,
            BallotCommand::CastVote(_) => Operation::CastVote,
            BallotCommand::EndVotingSession => Operation::EndVotingSession,
            BallotCommand::TallyVotes => Operation::TallyVotes,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ballot {
    administrator: Address,
    phase: Phase,
    voters: BTreeMap<Address, Voter>,
    proposals: Vec<Proposal>,
    winning_proposal_id: Option<ProposalId>,
    events: Vec<BallotEvent>,
}

impl Ballot {
    /// Create a ballot in the `RegisteringVoters` phase.
    ///
    /// The administrator is fixed for the lifetime of the ballot and is not a
    /// voter unless registered like anyone else.
    pub fn new(administrator: Address) -> Self {
        log::info!("Ballot created with administrator {}", administrator);
        Ballot {
            administrator,
            phase: Phase::RegisteringVoters,
            voters: BTreeMap::new(),
            proposals: Vec::new(),
            winning_proposal_id: None,
            events: Vec::new(),
        }
    }

    /// Apply a command on behalf of `caller`
    pub fn execute(&mut self, caller: &Address, command: BallotCommand) -> Result<BallotEvent> {
        match command {
            BallotCommand::RegisterVoter(voter) => self.register_voter(caller, voter),
            BallotCommand::StartProposalsRegistration => self.start_proposals_registration(caller),
            BallotCommand::SubmitProposal(description) => self.submit_proposal(caller, description),
            BallotCommand::EndProposalsRegistration => self.end_proposals_registration(caller),
            BallotCommand::StartVotingSession => self.start_voting_session(caller),
            BallotCommand::CastVote(proposal_id) => self.cast_vote(caller, proposal_id),
            BallotCommand::EndVotingSession => self.end_voting_session(caller),
            BallotCommand::TallyVotes => self.tally_votes(caller),
        }
    }

    // ---------------------------------------------------------------------
    // Voter registration
    // ---------------------------------------------------------------------

    pub fn register_voter(&mut self, caller: &Address, voter: Address) -> Result<BallotEvent> {
        let operation = Operation::RegisterVoter;
        self.require_administrator(caller, operation.name())?;
        self.require_phase(caller, operation)?;

        if self.is_registered_voter(&voter) {
            return Err(reject(caller, operation.name(), BallotError::AlreadyRegistered));
        }

        self.voters.insert(voter.clone(), Voter::registered());
        log::info!("✓ Registered voter {}", voter);

        Ok(self.emit(BallotEvent::VoterRegistered { voter }))
    }

    // ---------------------------------------------------------------------
    // Phase transitions
    // ---------------------------------------------------------------------

    /// Open proposal submission and create the GENESIS proposal (id 0)
    pub fn start_proposals_registration(&mut self, caller: &Address) -> Result<BallotEvent> {
        self.advance(caller, Transition::StartProposalsRegistration, |ballot| {
            ballot.proposals.push(Proposal::genesis());
        })
    }

    pub fn end_proposals_registration(&mut self, caller: &Address) -> Result<BallotEvent> {
        self.advance(caller, Transition::EndProposalsRegistration, |_| {})
    }

    pub fn start_voting_session(&mut self, caller: &Address) -> Result<BallotEvent> {
        self.advance(caller, Transition::StartVotingSession, |_| {})
    }

    pub fn end_voting_session(&mut self, caller: &Address) -> Result<BallotEvent> {
        self.advance(caller, Transition::EndVotingSession, |_| {})
    }

    /// Close the workflow and fix the winning proposal.
    ///
    /// Lower id wins a tie; see [`select_winner`].
    pub fn tally_votes(&mut self, caller: &Address) -> Result<BallotEvent> {
        self.advance(caller, Transition::TallyVotes, |ballot| {
            let winner = select_winner(&ballot.proposals).unwrap_or(GENESIS_PROPOSAL_ID);
            log::info!("✓ Tally complete, winning proposal {}", winner);
            ballot.winning_proposal_id = Some(winner);
        })
    }

    fn advance(
        &mut self,
        caller: &Address,
        transition: Transition,
        side_effect: impl FnOnce(&mut Self),
    ) -> Result<BallotEvent> {
        let operation = transition.operation();
        self.require_administrator(caller, operation.name())?;
        self.require_phase(caller, operation)?;

        side_effect(self);

        let previous = self.phase;
        self.phase = transition.target();
        log::info!("Workflow status changed: {} -> {}", previous, self.phase);

        Ok(self.emit(BallotEvent::WorkflowStatusChange {
            previous,
            next: self.phase,
        }))
    }

    // ---------------------------------------------------------------------
    // Proposals and votes
    // ---------------------------------------------------------------------

    pub fn submit_proposal(
        &mut self,
        caller: &Address,
        description: impl Into<String>,
    ) -> Result<BallotEvent> {
        let operation = Operation::SubmitProposal;
        self.require_registered_voter(caller, operation.name())?;
        self.require_phase(caller, operation)?;

        let description = description.into();
        if description.is_empty() {
            return Err(reject(caller, operation.name(), BallotError::EmptyProposal));
        }

        let proposal_id = self.proposals.len() as ProposalId;
        self.proposals.push(Proposal::new(description));
        log::info!("✓ Proposal {} registered by {}", proposal_id, caller);

        Ok(self.emit(BallotEvent::ProposalRegistered { proposal_id }))
    }

    pub fn cast_vote(&mut self, caller: &Address, proposal_id: ProposalId) -> Result<BallotEvent> {
        let operation = Operation::CastVote;
        self.require_registered_voter(caller, operation.name())?;
        self.require_phase(caller, operation)?;

        if self.voter(caller).has_voted {
            return Err(reject(caller, operation.name(), BallotError::AlreadyVoted));
        }
        let index = self.proposal_index(proposal_id).ok_or_else(|| {
            reject(caller, operation.name(), BallotError::UnknownProposal(proposal_id))
        })?;

        let voter = self.voters.entry(caller.clone()).or_default();
        voter.has_voted = true;
        voter.voted_proposal_id = proposal_id;
        self.proposals[index].vote_count += 1;
        log::info!("✓ Vote from {} accepted for proposal {}", caller, proposal_id);

        Ok(self.emit(BallotEvent::Voted {
            voter: caller.clone(),
            proposal_id,
        }))
    }

    // ---------------------------------------------------------------------
    // Reads
    // ---------------------------------------------------------------------

    /// Voter record for `voter`; unknown identities read as the default record
    pub fn get_voter(&self, caller: &Address, voter: &Address) -> Result<Voter> {
        self.require_registered_voter(caller, "get_voter")?;
        Ok(self.voter(voter))
    }

    /// Proposal `proposal_id`; ids never submitted are `UnknownProposal`
    pub fn get_proposal(&self, caller: &Address, proposal_id: ProposalId) -> Result<Proposal> {
        self.require_registered_voter(caller, "get_proposal")?;
        self.proposal_index(proposal_id)
            .map(|index| self.proposals[index].clone())
            .ok_or_else(|| reject(caller, "get_proposal", BallotError::UnknownProposal(proposal_id)))
    }

    /// Winning proposal id, available once votes are tallied
    pub fn winning_proposal_id(&self) -> Option<ProposalId> {
        self.winning_proposal_id
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn administrator(&self) -> &Address {
        &self.administrator
    }

    /// Notification log, oldest first
    pub fn events(&self) -> &[BallotEvent] {
        &self.events
    }

    pub fn proposal_count(&self) -> usize {
        self.proposals.len()
    }

    pub fn registered_voter_count(&self) -> usize {
        self.voters.values().filter(|v| v.is_registered).count()
    }

    pub fn vote_count(&self) -> usize {
        self.voters.values().filter(|v| v.has_voted).count()
    }

    pub fn is_administrator(&self, caller: &Address) -> bool {
        *caller == self.administrator
    }

    pub fn is_registered_voter(&self, caller: &Address) -> bool {
        self.voter(caller).is_registered
    }

    // ---------------------------------------------------------------------
    // Guards
    // ---------------------------------------------------------------------

    fn require_administrator(&self, caller: &Address, action: &str) -> Result<()> {
        if !self.is_administrator(caller) {
            return Err(reject(caller, action, BallotError::NotAdministrator));
        }
        Ok(())
    }

    fn require_registered_voter(&self, caller: &Address, action: &str) -> Result<()> {
        if !self.is_registered_voter(caller) {
            return Err(reject(caller, action, BallotError::NotAVoter));
        }
        Ok(())
    }

    fn require_phase(&self, caller: &Address, operation: Operation) -> Result<()> {
        let required = operation.required_phase();
        if self.phase != required {
            return Err(reject(
                caller,
                operation.name(),
                BallotError::PhaseMismatch {
                    operation,
                    required,
                    actual: self.phase,
                },
            ));
        }
        Ok(())
    }

    fn voter(&self, address: &Address) -> Voter {
        self.voters.get(address).copied().unwrap_or_default()
    }

    fn proposal_index(&self, proposal_id: ProposalId) -> Option<usize> {
        usize::try_from(proposal_id)
            .ok()
            .filter(|index| *index < self.proposals.len())
    }

    fn emit(&mut self, event: BallotEvent) -> BallotEvent {
        self.events.push(event.clone());
        event
    }
}

fn reject(caller: &Address, action: &str, error: BallotError) -> BallotError {
    log::debug!("Rejected {} from {}: {}", action, caller, error);
    error
}
