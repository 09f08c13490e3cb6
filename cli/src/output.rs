//! Rendering of command results

use anyhow::Result;
use ballot_core::{Address, BallotEvent, Phase, Proposal, ProposalId, Voter};
use owo_colors::OwoColorize;
use serde::Serialize;
use std::fmt::{self, Write};

/// Result of one CLI invocation
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Report {
    Deployed {
        administrator: Address,
        location: String,
    },
    Event(BallotEvent),
    Voter {
        address: Address,
        voter: Voter,
    },
    Proposal {
        proposal_id: ProposalId,
        proposal: Proposal,
    },
    Winner(Option<ProposalId>),
    Status {
        phase: Phase,
        administrator: Address,
        proposals: usize,
        registered_voters: usize,
        votes: usize,
        winning_proposal_id: Option<ProposalId>,
    },
    Events(Vec<BallotEvent>),
}

pub fn render(report: &Report, json: bool) -> Result<String> {
    if json {
        return Ok(serde_json::to_string_pretty(report)?);
    }
    Ok(render_text(report))
}

fn render_text(report: &Report) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail
    let _ = write_text(&mut out, report);
    out
}

fn write_text(out: &mut String, report: &Report) -> fmt::Result {
    match report {
        Report::Deployed {
            administrator,
            location,
        } => {
            writeln!(out, "{}", "✓ Ballot deployed".green().bold())?;
            writeln!(out, "Administrator:   {}", administrator)?;
            write!(out, "Deployed to:     {}", location.bright_blue())
        }
        Report::Event(event) => write!(out, "{} {}", "✓".green(), event),
        Report::Voter { address, voter } => {
            writeln!(out, "{} {}", "Voter".yellow().bold(), address)?;
            writeln!(out, "  registered:    {}", voter.is_registered)?;
            writeln!(out, "  has voted:     {}", voter.has_voted)?;
            write!(out, "  voted for:     {}", voter.voted_proposal_id)
        }
        Report::Proposal {
            proposal_id,
            proposal,
        } => {
            writeln!(out, "{} #{}", "Proposal".yellow().bold(), proposal_id)?;
            writeln!(out, "  description:   {}", proposal.description)?;
            write!(out, "  votes:         {}", proposal.vote_count)
        }
        Report::Winner(Some(proposal_id)) => {
            write!(out, "Winning proposal: {}", proposal_id.to_string().green().bold())
        }
        Report::Winner(None) => write!(out, "{}", "⚠ Votes have not been tallied yet".yellow()),
        Report::Status {
            phase,
            administrator,
            proposals,
            registered_voters,
            votes,
            winning_proposal_id,
        } => {
            writeln!(out, "{}", "Ballot Status".cyan().bold())?;
            writeln!(out, "═══════════════════════════════════")?;
            writeln!(out, "Phase:             {} ({})", phase, phase.code())?;
            writeln!(out, "Administrator:     {}", administrator)?;
            writeln!(out, "Registered voters: {}", registered_voters)?;
            writeln!(out, "Proposals:         {}", proposals)?;
            writeln!(out, "Votes cast:        {}", votes)?;
            match winning_proposal_id {
                Some(id) => write!(out, "Winning proposal:  {}", id),
                None => write!(out, "Winning proposal:  -"),
            }
        }
        Report::Events(events) => {
            write!(out, "{} ({})", "Events".yellow().bold(), events.len())?;
            for (i, event) in events.iter().enumerate() {
                write!(out, "\n  {}. {}", i + 1, event)?;
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_event_report() {
        let report = Report::Event(BallotEvent::ProposalRegistered { proposal_id: 1 });
        let json: serde_json::Value =
            serde_json::from_str(&render(&report, true).unwrap()).unwrap();

        assert_eq!(json["event"]["ProposalRegistered"]["proposal_id"], 1);
    }

    #[test]
    fn test_json_status_report() {
        let report = Report::Status {
            phase: Phase::VotesTallied,
            administrator: Address::from("0xadmin"),
            proposals: 2,
            registered_voters: 1,
            votes: 1,
            winning_proposal_id: Some(1),
        };
        let json: serde_json::Value =
            serde_json::from_str(&render(&report, true).unwrap()).unwrap();

        assert_eq!(json["status"]["phase"], "VotesTallied");
        assert_eq!(json["status"]["administrator"], "0xadmin");
        assert_eq!(json["status"]["winning_proposal_id"], 1);
    }

    #[test]
    fn test_text_event_report() {
        let report = Report::Event(BallotEvent::Voted {
            voter: Address::from("0xv1"),
            proposal_id: 3,
        });
        assert!(render(&report, false).unwrap().contains("Voted(0xv1, 3)"));
    }
}
