//! Pass rules
//!
//! A voting scheme turns a final tally into a pass/fail decision.

use std::fmt::Debug;

use serde::{Deserialize, Serialize};

use dho_common::{Asset, DaoSettings};

use crate::tally::VoteTally;
use crate::GovernanceResult;

pub const PASS: &str = "pass";
pub const ABSTAIN: &str = "abstain";
pub const FAIL: &str = "fail";

/// Result of evaluating a tally
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VotingResult {
    /// Whether the proposal was approved
    pub approved: bool,
    /// Whether enough of the supply took part
    pub has_quorum: bool,
    pub pass_power: Asset,
    pub fail_power: Asset,
    pub abstain_power: Asset,
    /// Power of every vote cast, abstentions included
    pub total_power: Asset,
    /// Voice in circulation at close
    pub supply: Asset,
}

/// A trait for different voting schemes
pub trait VotingScheme: Send + Sync + Debug {
    fn evaluate(&self, tally: &VoteTally, supply: &Asset) -> GovernanceResult<VotingResult>;
}

/// Quorum plus alignment
///
/// Passes when `total * 100 >= supply * quorum_factor_x100` and
/// `pass * 100 > alignment_factor_x100 * (pass + fail)`. With the default
/// factors (0 and 50) this is "more pass power than fail power".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlignmentVoting {
    quorum_factor_x100: i64,
    alignment_factor_x100: i64,
}

impl AlignmentVoting {
    pub fn new(quorum_factor_x100: i64, alignment_factor_x100: i64) -> Self {
        Self {
            quorum_factor_x100,
            alignment_factor_x100,
        }
    }

    pub fn from_settings(settings: &DaoSettings) -> Self {
        Self::new(
            settings.voting_quorum_factor_x100,
            settings.voting_alignment_factor_x100,
        )
    }
}

impl Default for AlignmentVoting {
    fn default() -> Self {
        Self::new(0, 50)
    }
}

impl VotingScheme for AlignmentVoting {
    fn evaluate(&self, tally: &VoteTally, supply: &Asset) -> GovernanceResult<VotingResult> {
        let pass_power = tally.power_of(PASS);
        let fail_power = tally.power_of(FAIL);
        let abstain_power = tally.power_of(ABSTAIN);
        let total_power = tally.total()?;

        let total = i128::from(total_power.amount());
        let pass = i128::from(pass_power.amount());
        let fail = i128::from(fail_power.amount());

        let has_quorum = total * 100 >= i128::from(supply.amount()) * i128::from(self.quorum_factor_x100);
        let aligned = pass * 100 > i128::from(self.alignment_factor_x100) * (pass + fail);

        Ok(VotingResult {
            approved: has_quorum && aligned,
            has_quorum,
            pass_power,
            fail_power,
            abstain_power,
            total_power,
            supply: supply.clone(),
        })
    }
}
