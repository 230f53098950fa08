//! Periods, assignments and pro-rated compensation
//!
//! An approved assignment pays its assignee once per period for
//! `period_count` periods. Each claim prorates the per-period salary across
//! the commitment history overlapping the period and pays every non-zero
//! token amount through the [`Treasury`].

pub mod assignment;
pub mod badge;
pub mod claim;
pub mod commitment;
pub mod context;
pub mod error;
pub mod member;
pub mod payment;
pub mod period;
pub mod proration;
pub mod salary;
pub mod time_share;
pub mod treasury;

pub use assignment::{Assignment, AssignmentState};
pub use badge::{active_badges, badge_bonus, Badge};
pub use claim::{claim_next_period, next_claimable_period, ClaimReceipt};
pub use commitment::{adjust_commitment, adjust_deferred, start_commitment, suspend, withdraw};
pub use context::PayrollContext;
pub use error::{PayrollError, PayrollResult};
pub use member::Member;
pub use payment::{ensure_payable, make_payment, payment_content, Payment};
pub use period::Period;
pub use proration::{prorate, CommitmentSegment, PeriodWindow, Proration};
pub use salary::{derive_period_salary, usd_per_period, PeriodSalary, SalaryTerms, PHASE_TO_YEAR_RATIO};
pub use time_share::TimeShare;
pub use treasury::Treasury;
