//! Winner selection

use crate::types::{Proposal, ProposalId};

/// Select the proposal with the strictly greatest vote count.
///
/// Proposals are scanned in ascending id order and the incumbent is kept
/// unless a strictly greater count appears, so the lower id wins a tie.
/// Returns `None` only for an empty candidate set.
pub fn select_winner(proposals: &[Proposal]) -> Option<ProposalId> {
    let mut winner: Option<(ProposalId, u64)> = None;

    for (id, proposal) in (0..).zip(proposals) {
        match winner {
            Some((_, best)) if proposal.vote_count <= best => {}
            _ => winner = Some((id, proposal.vote_count)),
        }
    }

    winner.map(|(id, _)| id)
}
