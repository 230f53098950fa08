//! DHO engine
//!
//! Proposal voting with a deduplicated vote tally, and period-based payroll
//! with pro-rated commitment adjustments, over a content-addressed document
//! graph.

pub mod dao;
pub mod error;
pub mod retry;

pub use dao::Dao;
pub use error::{DaoError, DaoResult};
pub use retry::{retry, RetryPolicy};

pub use dho_common as common;
pub use dho_docgraph as docgraph;
pub use dho_governance as governance;
pub use dho_payroll as payroll;

/// Module version information
pub mod version {
    /// The current version of the DHO library
    pub const VERSION: &str = env!("CARGO_PKG_VERSION");
}

#[cfg(test)]
mod tests {
    #[test]
    fn version_is_available() {
        assert!(!super::version::VERSION.is_empty());
    }
}
