//! Ballot CLI
//!
//! Hosts a ballot on disk: each invocation loads the snapshot, applies one
//! call on behalf of `--caller`, and writes the snapshot back only when the
//! call succeeded.

pub mod config;
pub mod output;

use anyhow::{anyhow, bail, Context, Result};
use ballot_core::{Address, Ballot, BallotCommand, ProposalId};
use ballot_storage::Storage;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use crate::config::{expand_path, Config, DEFAULT_CONFIG_FILE};
use crate::output::Report;

#[derive(Parser, Debug)]
#[command(name = "ballot")]
#[command(about = "Single-organizer ballot workflow", version)]
#[command(long_version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("GIT_HASH"), ")"))]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Snapshot directory (overrides config)
    #[arg(long, global = true, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Snapshot name (overrides config)
    #[arg(long, global = true, value_name = "NAME")]
    pub snapshot: Option<String>,

    /// Identity submitting the call
    #[arg(long, global = true, value_name = "ADDRESS")]
    pub caller: Option<String>,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Commands {
    /// Create a new ballot administered by ADMIN
    Deploy {
        #[arg(long, value_name = "ADDRESS")]
        admin: String,

        /// Replace an existing snapshot
        #[arg(long)]
        force: bool,
    },

    /// Register a voter (administrator)
    RegisterVoter { voter: String },

    /// Open proposal submission (administrator)
    StartProposals,

    /// Submit a proposal (voter)
    Submit { description: String },

    /// Close proposal submission (administrator)
    EndProposals,

    /// Open the voting session (administrator)
    StartVoting,

    /// Vote for a proposal (voter)
    Vote { proposal_id: ProposalId },

    /// Close the voting session (administrator)
    EndVoting,

    /// Tally votes and fix the winner (administrator)
    Tally,

    /// Show a voter record (voter)
    Voter { address: String },

    /// Show a proposal (voter)
    Proposal { proposal_id: ProposalId },

    /// Show the winning proposal
    Winner,

    /// Show phase and counters
    Status,

    /// List emitted notifications
    Events,
}

impl Commands {
    /// The ballot call this subcommand submits, if it mutates state
    pub fn ballot_command(&self) -> Option<BallotCommand> {
        let command = match self {
            Commands::RegisterVoter { voter } => {
                BallotCommand::RegisterVoter(Address::new(voter.as_str()))
            }
            Commands::StartProposals => BallotCommand::StartProposalsRegistration,
            Commands::Submit { description } => BallotCommand::SubmitProposal(description.clone()),
            Commands::EndProposals => BallotCommand::EndProposalsRegistration,
            Commands::StartVoting => BallotCommand::StartVotingSession,
            Commands::Vote { proposal_id } => BallotCommand::CastVote(*proposal_id),
            Commands::EndVoting => BallotCommand::EndVotingSession,
            Commands::Tally => BallotCommand::TallyVotes,
            _ => return None,
        };
        Some(command)
    }
}

/// Effective settings after merging the config file and flags
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub data_dir: PathBuf,
    pub snapshot: String,
    pub json: bool,
}

impl Settings {
    pub fn resolve(cli: &Cli, config: &Config) -> Self {
        Settings {
            data_dir: cli
                .data_dir
                .clone()
                .unwrap_or_else(|| expand_path(&config.storage.data_dir)),
            snapshot: cli
                .snapshot
                .clone()
                .unwrap_or_else(|| config.storage.snapshot.clone()),
            json: cli.json || config.output.json,
        }
    }
}

#[derive(Debug)]
pub struct Outcome {
    pub report: Report,
    pub json: bool,
}

pub fn run(cli: Cli) -> Result<Outcome> {
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
    let config = Config::load(&config_path)?;
    let settings = Settings::resolve(&cli, &config);

    // Only deploy may create the data directory
    let deploying = matches!(cli.command, Commands::Deploy { .. });
    if !deploying && !settings.data_dir.is_dir() {
        return Err(not_deployed(&settings.data_dir.join(&settings.snapshot)));
    }

    let storage = Storage::open(&settings.data_dir).with_context(|| {
        format!("failed to open data directory {}", settings.data_dir.display())
    })?;

    let report = execute(&cli, &storage, &settings.snapshot)?;
    Ok(Outcome {
        report,
        json: settings.json,
    })
}

fn execute(cli: &Cli, storage: &Storage, snapshot: &str) -> Result<Report> {
    if let Commands::Deploy { admin, force } = &cli.command {
        return deploy(storage, snapshot, Address::new(admin.as_str()), *force);
    }

    if !storage.has_snapshot(snapshot) {
        return Err(not_deployed(&storage.data_dir().join(snapshot)));
    }

    match cli.command.ballot_command() {
        Some(command) => apply(cli, storage, snapshot, command),
        None => read(cli, &load(storage, snapshot)?),
    }
}

/// Load, apply and save under the snapshot lock so concurrent calls serialize
fn apply(cli: &Cli, storage: &Storage, snapshot: &str, command: BallotCommand) -> Result<Report> {
    let caller = require_caller(cli)?;
    let operation = command.operation();

    let _lock = storage
        .lock(snapshot)
        .with_context(|| format!("failed to lock snapshot {}", snapshot))?;
    let mut ballot = load(storage, snapshot)?;

    let event = ballot
        .execute(&caller, command)
        .with_context(|| format!("{} rejected", operation))?;
    storage
        .save_ballot(snapshot, &ballot)
        .with_context(|| format!("failed to save snapshot {}", snapshot))?;

    Ok(Report::Event(event))
}

fn load(storage: &Storage, snapshot: &str) -> Result<Ballot> {
    storage
        .load_ballot(snapshot)
        .with_context(|| format!("failed to load snapshot {}", snapshot))
}

fn not_deployed(location: &Path) -> anyhow::Error {
    anyhow!(
        "no ballot deployed at {} (run `ballot deploy --admin <ADDRESS>` first)",
        location.display()
    )
}

fn deploy(storage: &Storage, snapshot: &str, admin: Address, force: bool) -> Result<Report> {
    let _lock = storage
        .lock(snapshot)
        .with_context(|| format!("failed to lock snapshot {}", snapshot))?;

    if storage.has_snapshot(snapshot) && !force {
        bail!(
            "snapshot {} already exists in {} (use --force to replace it)",
            snapshot,
            storage.data_dir().display()
        );
    }

    let ballot = Ballot::new(admin.clone());
    storage.save_ballot(snapshot, &ballot)?;

    let location = storage.data_dir().join(snapshot).display().to_string();
    log::info!("Ballot deployed to {}", location);
    Ok(Report::Deployed {
        administrator: admin,
        location,
    })
}

fn read(cli: &Cli, ballot: &Ballot) -> Result<Report> {
    let report = match &cli.command {
        Commands::Voter { address } => {
            let caller = require_caller(cli)?;
            let address = Address::new(address.as_str());
            let voter = ballot.get_voter(&caller, &address)?;
            Report::Voter { address, voter }
        }
        Commands::Proposal { proposal_id } => {
            let caller = require_caller(cli)?;
            let proposal = ballot.get_proposal(&caller, *proposal_id)?;
            Report::Proposal {
                proposal_id: *proposal_id,
                proposal,
            }
        }
        Commands::Winner => Report::Winner(ballot.winning_proposal_id()),
        Commands::Status => Report::Status {
            phase: ballot.phase(),
            administrator: ballot.administrator().clone(),
            proposals: ballot.proposal_count(),
            registered_voters: ballot.registered_voter_count(),
            votes: ballot.vote_count(),
            winning_proposal_id: ballot.winning_proposal_id(),
        },
        Commands::Events => Report::Events(ballot.events().to_vec()),
        other => bail!("{:?} is not a read command", other),
    };
    Ok(report)
}

fn require_caller(cli: &Cli) -> Result<Address> {
    match &cli.caller {
        Some(caller) if !caller.is_empty() => Ok(Address::new(caller.as_str())),
        _ => bail!("--caller is required for this command"),
    }
}
