//! End-to-end ballot workflow tests
//!
//! Covers the full lifecycle from voter registration to tally, the
//! wrong-phase matrix for every transition and the vote accounting
//! properties.

use ballot_core::*;

fn admin() -> Address {
    Address::from("0xadmin")
}

fn voter(n: usize) -> Address {
    Address::new(format!("0xvoter{}", n))
}

/// Drive a ballot to `phase` with `voters` registered and
/// `proposals` submitted (ids 1..=proposals) where the phase allows it.
fn ballot_at(phase: Phase, voters: usize, proposals: usize) -> Ballot {
    let mut ballot = Ballot::new(admin());
    for n in 0..voters {
        ballot.register_voter(&admin(), voter(n)).unwrap();
    }
    for transition in Transition::ALL {
        if ballot.phase() == phase {
            break;
        }
        ballot.execute(&admin(), command_for(transition)).unwrap();
        if ballot.phase() == Phase::ProposalsRegistrationStarted {
            for p in 0..proposals {
                ballot
                    .submit_proposal(&voter(0), format!("proposal {}", p + 1))
                    .unwrap();
            }
        }
    }
    assert_eq!(ballot.phase(), phase);
    ballot
}

fn command_for(transition: Transition) -> BallotCommand {
    match transition {
        Transition::StartProposalsRegistration => BallotCommand::StartProposalsRegistration,
        Transition::EndProposalsRegistration => BallotCommand::EndProposalsRegistration,
        Transition::StartVotingSession => BallotCommand::StartVotingSession,
        Transition::EndVotingSession => BallotCommand::EndVotingSession,
        Transition::TallyVotes => BallotCommand::TallyVotes,
    }
}

/// Scenario A: single voter, single proposal, full lifecycle
#[test]
fn test_full_lifecycle() {
    let v1 = voter(1);
    let mut ballot = Ballot::new(admin());

    ballot.register_voter(&admin(), v1.clone()).unwrap();
    ballot.start_proposals_registration(&admin()).unwrap();
    assert_eq!(
        ballot.get_proposal(&v1, GENESIS_PROPOSAL_ID).unwrap().description,
        GENESIS_DESCRIPTION
    );

    let event = ballot.submit_proposal(&v1, "Build a park").unwrap();
    assert_eq!(event, BallotEvent::ProposalRegistered { proposal_id: 1 });

    ballot.end_proposals_registration(&admin()).unwrap();
    ballot.start_voting_session(&admin()).unwrap();
    ballot.cast_vote(&v1, 1).unwrap();

    assert!(ballot.get_voter(&v1, &v1).unwrap().has_voted);
    assert_eq!(ballot.get_proposal(&v1, 1).unwrap().vote_count, 1);

    ballot.end_voting_session(&admin()).unwrap();
    ballot.tally_votes(&admin()).unwrap();
    assert_eq!(ballot.winning_proposal_id(), Some(1));

    let phases: Vec<(Phase, Phase)> = ballot
        .events()
        .iter()
        .filter_map(|event| match event {
            BallotEvent::WorkflowStatusChange { previous, next } => Some((*previous, *next)),
            _ => None,
        })
        .collect();
    assert_eq!(
        phases,
        Transition::ALL
            .iter()
            .map(|t| (t.source(), t.target()))
            .collect::<Vec<_>>()
    );
}

/// Scenario B: an unregistered identity cannot vote
#[test]
fn test_unregistered_voter_cannot_vote() {
    let mut ballot = ballot_at(Phase::VotingSessionStarted, 1, 1);
    let before = ballot.clone();

    assert_eq!(ballot.cast_vote(&voter(2), 1), Err(BallotError::NotAVoter));
    assert_eq!(ballot, before);
    assert_eq!(ballot.phase(), Phase::VotingSessionStarted);
}

/// Scenario C: wrong-phase calls fail with their own reason
#[test]
fn test_wrong_phase_calls_leave_phase_unchanged() {
    let mut ballot = ballot_at(Phase::RegisteringVoters, 1, 0);

    let err = ballot.submit_proposal(&voter(0), "early").unwrap_err();
    assert!(matches!(
        err,
        BallotError::PhaseMismatch {
            operation: Operation::SubmitProposal,
            required: Phase::ProposalsRegistrationStarted,
            actual: Phase::RegisteringVoters,
        }
    ));

    let err = ballot.end_voting_session(&admin()).unwrap_err();
    assert_eq!(err.to_string(), "Voting session havent started yet");
    assert_eq!(ballot.phase(), Phase::RegisteringVoters);
}

/// Scenario D: a tie goes to the lower id
#[test]
fn test_tie_goes_to_lower_id() {
    let mut ballot = ballot_at(Phase::VotingSessionStarted, 2, 2);
    ballot.cast_vote(&voter(0), 2).unwrap();
    ballot.cast_vote(&voter(1), 1).unwrap();
    ballot.end_voting_session(&admin()).unwrap();
    ballot.tally_votes(&admin()).unwrap();

    assert_eq!(ballot.winning_proposal_id(), Some(1));
}

#[test]
fn test_transition_matrix() {
    for phase in Phase::ALL {
        for transition in Transition::ALL {
            let mut ballot = ballot_at(phase, 1, 1);
            let before = ballot.clone();
            let result = ballot.execute(&admin(), command_for(transition));

            if transition.source() == phase {
                assert_eq!(
                    result,
                    Ok(BallotEvent::WorkflowStatusChange {
                        previous: phase,
                        next: transition.target(),
                    })
                );
                assert_eq!(Some(ballot.phase()), phase.next());
            } else {
                let err = result.unwrap_err();
                assert_eq!(err.to_string(), transition.operation().mismatch_reason());
                assert_eq!(ballot, before, "{} from {} mutated state", transition.operation(), phase);
            }
        }
    }
}

#[test]
fn test_non_administrator_cannot_transition() {
    for phase in Phase::ALL {
        let mut ballot = ballot_at(phase, 1, 0);
        for transition in Transition::ALL {
            assert_eq!(
                ballot.execute(&voter(0), command_for(transition)),
                Err(BallotError::NotAdministrator)
            );
        }
        assert_eq!(ballot.phase(), phase);
    }
}

#[test]
fn test_tallied_ballot_is_read_only() {
    let mut ballot = ballot_at(Phase::VotesTallied, 2, 1);
    let winner = ballot.winning_proposal_id();
    let before = ballot.clone();

    assert!(ballot.register_voter(&admin(), voter(9)).is_err());
    assert!(ballot.submit_proposal(&voter(0), "late").is_err());
    assert!(ballot.cast_vote(&voter(1), 1).is_err());
    for transition in Transition::ALL {
        assert!(ballot.execute(&admin(), command_for(transition)).is_err());
    }

    assert_eq!(ballot, before);
    assert_eq!(ballot.winning_proposal_id(), winner);
    assert!(ballot.phase().is_terminal());
}

#[test]
fn test_vote_sum_matches_successful_voters() {
    let mut ballot = ballot_at(Phase::VotingSessionStarted, 10, 3);
    let targets = [1, 2, 3, 3, 0, 2, 3, 9, 1, 3];

    let mut accepted = 0u64;
    for (n, target) in targets.iter().enumerate() {
        if ballot.cast_vote(&voter(n), *target).is_ok() {
            accepted += 1;
            assert_eq!(ballot.cast_vote(&voter(n), 1), Err(BallotError::AlreadyVoted));
        }
    }
    // Outsider and administrator never count
    assert!(ballot.cast_vote(&voter(42), 1).is_err());
    assert!(ballot.cast_vote(&admin(), 1).is_err());

    ballot.end_voting_session(&admin()).unwrap();

    let total: u64 = (0..ballot.proposal_count() as ProposalId)
        .map(|id| ballot.get_proposal(&voter(0), id).unwrap().vote_count)
        .sum();
    assert_eq!(accepted, 9);
    assert_eq!(total, accepted);
    assert_eq!(ballot.vote_count() as u64, accepted);

    ballot.tally_votes(&admin()).unwrap();
    assert_eq!(ballot.winning_proposal_id(), Some(3));
}

#[test]
fn test_duplicate_registration_keeps_registry_size() {
    let mut ballot = ballot_at(Phase::RegisteringVoters, 3, 0);
    assert_eq!(ballot.registered_voter_count(), 3);

    assert_eq!(
        ballot.register_voter(&admin(), voter(1)),
        Err(BallotError::AlreadyRegistered)
    );
    assert_eq!(ballot.registered_voter_count(), 3);
    assert_eq!(ballot.events().len(), 3);
}

#[test]
fn test_administrator_may_also_be_a_voter() {
    let mut ballot = Ballot::new(admin());
    ballot.register_voter(&admin(), admin()).unwrap();
    ballot.start_proposals_registration(&admin()).unwrap();
    ballot.submit_proposal(&admin(), "admin proposal").unwrap();
    ballot.end_proposals_registration(&admin()).unwrap();
    ballot.start_voting_session(&admin()).unwrap();
    ballot.cast_vote(&admin(), 1).unwrap();

    assert_eq!(ballot.get_proposal(&admin(), 1).unwrap().vote_count, 1);
}

#[test]
fn test_state_survives_serialization() {
    let mut ballot = ballot_at(Phase::VotingSessionStarted, 3, 2);
    ballot.cast_vote(&voter(0), 2).unwrap();

    let json = serde_json::to_string(&ballot).unwrap();
    let restored: Ballot = serde_json::from_str(&json).unwrap();
    assert_eq!(restored, ballot);

    let bytes = bincode::serialize(&ballot).unwrap();
    let mut restored: Ballot = bincode::deserialize(&bytes).unwrap();
    assert_eq!(restored, ballot);

    // The restored ballot keeps enforcing one vote per voter
    assert_eq!(restored.cast_vote(&voter(0), 1), Err(BallotError::AlreadyVoted));
    restored.cast_vote(&voter(1), 2).unwrap();
    assert_eq!(restored.get_proposal(&voter(1), 2).unwrap().vote_count, 2);
}
