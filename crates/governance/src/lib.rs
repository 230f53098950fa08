//! Proposals, votes and tallies for the DHO engine
//!
//! A proposal is open while `root --proposal--> proposal` exists. Members
//! vote with their voice balance; every vote recomputes the proposal's tally,
//! which is stored content-addressed so that equal tallies share a document.
//! Closing evaluates the tally and, on pass, runs the proposal type's
//! transition.

use thiserror::Error;

use dho_common::Checksum256;
use dho_docgraph::GraphError;
use dho_payroll::PayrollError;

pub mod ballot;
pub mod manager;
pub mod power;
pub mod proposal;
pub mod proposals;
pub mod tally;
pub mod voting;

pub use ballot::Vote;
pub use manager::{CloseOutcome, ProposalManager};
pub use power::VotePowerSource;
pub use proposal::ProposalView;
pub use proposals::{handler_for, ProposalHandler, ProposalType};
pub use tally::VoteTally;
pub use voting::{AlignmentVoting, VotingResult, VotingScheme};

/// Error types for governance operations
#[derive(Error, Debug)]
pub enum GovernanceError {
    /// Error from the document graph
    #[error("Graph error: {0}")]
    Graph(#[from] GraphError),

    /// Membership, period or payment error raised while proposing or passing
    #[error(transparent)]
    Payroll(#[from] PayrollError),

    /// Value parsing or asset arithmetic error
    #[error(transparent)]
    Common(#[from] dho_common::Error),

    /// Invalid proposal
    #[error("Invalid proposal: {0}")]
    InvalidProposal(String),

    /// Option not on the ballot
    #[error("Invalid vote: {0}")]
    InvalidVote(String),

    /// Proposal not found
    #[error("Proposal not found: {0}")]
    ProposalNotFound(Checksum256),

    /// Vote on a proposal that is no longer open
    #[error("Only allowed to vote active proposals")]
    VotingClosed,

    /// Vote after the voting window
    #[error("Voting has expired for this proposal")]
    VotingExpired,

    /// Close of a proposal that is no longer open
    #[error("Only allowed to close active proposals")]
    NotActive,

    /// Close before the voting window elapsed
    #[error("Voting is still active for this proposal")]
    VotingActive,

    /// Voter holds no voice
    #[error("No HVOICE found for {0}")]
    NoVoice(String),

    /// Vote weight is not in the voice token
    #[error("Invalid vote power: {0}")]
    InvalidVotePower(String),

    /// Permission denied
    #[error("Permission denied: {0}")]
    PermissionDenied(String),
}

/// Result type for governance operations
pub type GovernanceResult<T> = Result<T, GovernanceError>;
