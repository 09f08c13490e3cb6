//! Workflow phases and the precondition table
//!
//! Every operation that is gated on a phase is listed in [`Operation`], and
//! the five phase-advancing operations are listed in [`Transition`]. The
//! ballot consults these tables instead of hard-coding phases per call.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Current step of the ballot workflow
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Phase {
    #[default]
    RegisteringVoters,
    ProposalsRegistrationStarted,
    ProposalsRegistrationEnded,
    VotingSessionStarted,
    VotingSessionEnded,
    VotesTallied,
}

impl Phase {
    /// All phases in workflow order
    pub const ALL: [Phase; 6] = [
        Phase::RegisteringVoters,
        Phase::ProposalsRegistrationStarted,
        Phase::ProposalsRegistrationEnded,
        Phase::VotingSessionStarted,
        Phase::VotingSessionEnded,
        Phase::VotesTallied,
    ];

    /// Stable numeric code (0..=5) carried by status change notifications
    pub fn code(self) -> u8 {
        match self {
            Phase::RegisteringVoters => 0,
            Phase::ProposalsRegistrationStarted => 1,
            Phase::ProposalsRegistrationEnded => 2,
            Phase::VotingSessionStarted => 3,
            Phase::VotingSessionEnded => 4,
            Phase::VotesTallied => 5,
        }
    }

    pub fn from_code(code: u8) -> Option<Phase> {
        Phase::ALL.get(usize::from(code)).copied()
    }

    /// The phase that follows this one, `None` once tallied
    pub fn next(self) -> Option<Phase> {
        Phase::from_code(self.code() + 1)
    }

    pub fn is_terminal(self) -> bool {
        self == Phase::VotesTallied
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::RegisteringVoters => "RegisteringVoters",
            Phase::ProposalsRegistrationStarted => "ProposalsRegistrationStarted",
            Phase::ProposalsRegistrationEnded => "ProposalsRegistrationEnded",
            Phase::VotingSessionStarted => "VotingSessionStarted",
            Phase::VotingSessionEnded => "VotingSessionEnded",
            Phase::VotesTallied => "VotesTallied",
        };
        f.write_str(name)
    }
}

/// Phase-gated operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operation {
    RegisterVoter,
    StartProposalsRegistration,
    SubmitProposal,
    EndProposalsRegistration,
    StartVotingSession,
    CastVote,
    EndVotingSession,
    TallyVotes,
}

impl Operation {
    /// The only phase in which this operation is allowed
    pub fn required_phase(self) -> Phase {
        match self {
            Operation::RegisterVoter => Phase::RegisteringVoters,
            Operation::StartProposalsRegistration => Phase::RegisteringVoters,
            Operation::SubmitProposal => Phase::ProposalsRegistrationStarted,
            Operation::EndProposalsRegistration => Phase::ProposalsRegistrationStarted,
            Operation::StartVotingSession => Phase::ProposalsRegistrationEnded,
            Operation::CastVote => Phase::VotingSessionStarted,
            Operation::EndVotingSession => Phase::VotingSessionStarted,
            Operation::TallyVotes => Phase::VotingSessionEnded,
        }
    }

    /// Rejection reason when called outside [`Operation::required_phase`]
    pub fn mismatch_reason(self) -> &'static str {
        match self {
            Operation::RegisterVoter => "Voters registration is not open yet",
            Operation::StartProposalsRegistration => "Registering proposals cant be started now",
            Operation::SubmitProposal => "Proposals are not allowed yet",
            Operation::EndProposalsRegistration => "Registering proposals havent started yet",
            Operation::StartVotingSession => "Registering proposals phase is not finished",
            Operation::CastVote => "Voting session havent started yet",
            Operation::EndVotingSession => "Voting session havent started yet",
            Operation::TallyVotes => "Current status is not voting session ended",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Operation::RegisterVoter => "register_voter",
            Operation::StartProposalsRegistration => "start_proposals_registration",
            Operation::SubmitProposal => "submit_proposal",
            Operation::EndProposalsRegistration => "end_proposals_registration",
            Operation::StartVotingSession => "start_voting_session",
            Operation::CastVote => "cast_vote",
            Operation::EndVotingSession => "end_voting_session",
            Operation::TallyVotes => "tally_votes",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The five administrator operations that advance the phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Transition {
    StartProposalsRegistration,
    EndProposalsRegistration,
    StartVotingSession,
    EndVotingSession,
    TallyVotes,
}

impl Transition {
    pub const ALL: [Transition; 5] = [
        Transition::StartProposalsRegistration,
        Transition::EndProposalsRegistration,
        Transition::StartVotingSession,
        Transition::EndVotingSession,
        Transition::TallyVotes,
    ];

    pub fn operation(self) -> Operation {
        match self {
            Transition::StartProposalsRegistration => Operation::StartProposalsRegistration,
            Transition::EndProposalsRegistration => Operation::EndProposalsRegistration,
            Transition::StartVotingSession => Operation::StartVotingSession,
            Transition::EndVotingSession => Operation::EndVotingSession,
            Transition::TallyVotes => Operation::TallyVotes,
        }
    }

    pub fn source(self) -> Phase {
        self.operation().required_phase()
    }

    pub fn target(self) -> Phase {
        match self {
            Transition::StartProposalsRegistration => Phase::ProposalsRegistrationStarted,
            Transition::EndProposalsRegistration => Phase::ProposalsRegistrationEnded,
            Transition::StartVotingSession => Phase::VotingSessionStarted,
            Transition::EndVotingSession => Phase::VotingSessionEnded,
            Transition::TallyVotes => Phase::VotesTallied,
        }
    }
}
