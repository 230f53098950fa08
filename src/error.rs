use thiserror::Error;

use dho_docgraph::GraphError;
use dho_governance::GovernanceError;
use dho_payroll::PayrollError;

/// Errors returned by [`Dao`](crate::Dao) actions
#[derive(Error, Debug)]
pub enum DaoError {
    /// Every action is rejected while the DAO is paused
    #[error("Contract is paused for maintenance. Please try again later.")]
    Paused,

    /// Proposal, vote or close failure
    #[error(transparent)]
    Governance(#[from] GovernanceError),

    /// Period, assignment or claim failure
    #[error(transparent)]
    Payroll(#[from] PayrollError),

    /// Error from the document graph
    #[error(transparent)]
    Graph(#[from] GraphError),

    /// Invalid settings or value
    #[error(transparent)]
    Common(#[from] dho_common::Error),
}

impl DaoError {
    /// Whether repeating the same action later may succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            DaoError::Payroll(e) | DaoError::Governance(GovernanceError::Payroll(e)) => e.is_retryable(),
            _ => false,
        }
    }
}

pub type DaoResult<T> = Result<T, DaoError>;
