use thiserror::Error;

use dho_common::Checksum256;
use dho_docgraph::{GraphError, StorageError};

/// Errors raised by payroll operations
#[derive(Debug, Error)]
pub enum PayrollError {
    /// Error from the document graph
    #[error("Graph error: {0}")]
    Graph(#[from] GraphError),

    /// Error persisting treasury state
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Value parsing or asset arithmetic error
    #[error(transparent)]
    Common(#[from] dho_common::Error),

    /// Period missing, malformed or out of order
    #[error("Invalid period: {0}")]
    InvalidPeriod(String),

    /// Assignment missing, malformed or in the wrong state
    #[error("Invalid assignment: {0}")]
    InvalidAssignment(String),

    /// Rejected commitment or deferral adjustment
    #[error("Invalid commitment: {0}")]
    InvalidCommitment(String),

    /// Account is not, or is already, a member
    #[error("Membership error: {0}")]
    Membership(String),

    /// The caller may not perform this action
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// Every remaining period is still running; retry after it ends
    #[error("Period {period} has not ended yet")]
    ClaimTooEarly { period: String },

    /// Nothing left to claim
    #[error("All available periods for this assignment have been claimed")]
    AllPeriodsClaimed,

    /// Commitment history cannot be applied to a period
    #[error("Invalid proration: {0}")]
    InvalidProration(String),

    /// Treasury rejected an issue
    #[error("Treasury error: {0}")]
    Treasury(String),

    /// A payment with identical content was already recorded
    #[error("Duplicate payment {hash}: {memo}")]
    DuplicatePayment { hash: Checksum256, memo: String },
}

impl PayrollError {
    /// Whether repeating the same action later may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, PayrollError::ClaimTooEarly { .. })
    }
}

/// Result type for payroll operations
pub type PayrollResult<T> = Result<T, PayrollError>;
