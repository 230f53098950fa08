//! Claiming one period of an assignment's pay
//!
//! Every read and computation happens before the first write, so a failed
//! claim leaves the graph and the treasury untouched.

use tracing::{debug, info, warn};

use dho_common::names::edges;
use dho_common::{Asset, Checksum256, Name, TimePoint};

use crate::assignment::{Assignment, AssignmentState};
use crate::badge::{active_badges, badge_bonus};
use crate::context::PayrollContext;
use crate::error::{PayrollError, PayrollResult};
use crate::member::Member;
use crate::payment::{ensure_payable, make_payment, Payment};
use crate::period::Period;
use crate::proration::{prorate, PeriodWindow, Proration};
use crate::time_share::TimeShare;

#[derive(Debug, Clone)]
pub struct ClaimReceipt {
    pub assignment: Checksum256,
    pub period: Period,
    pub fraction: Proration,
    pub payments: Vec<Payment>,
}

impl ClaimReceipt {
    pub fn amount_of(&self, code: &str) -> Option<&Asset> {
        self.payments
            .iter()
            .map(|p| &p.amount)
            .find(|a| a.symbol().code() == code)
    }
}

/// The first unclaimed period that has ended, along with its end
///
/// Periods that ended before the assignment was approved are never
/// claimable.
pub async fn next_claimable_period(
    ctx: &PayrollContext<'_>,
    assignment: &Assignment,
) -> PayrollResult<(Period, TimePoint)> {
    let approved = assignment.approved_at()?;
    let periods = assignment.periods(ctx.graph).await?;
    let mut pending: Option<String> = None;

    for period in &periods {
        if assignment.is_claimed(ctx.graph, &period.hash).await {
            continue;
        }
        match period.end_time(ctx.graph).await? {
            Some(end) if end <= approved => continue,
            Some(end) if end <= ctx.now => return Ok((period.clone(), end)),
            _ => {
                pending.get_or_insert_with(|| period.label.clone());
            }
        }
    }

    if pending.is_none() && (periods.len() as i64) < assignment.period_count {
        pending = periods.last().map(|p| format!("after {}", p.label));
    }

    match pending {
        Some(period) => Err(PayrollError::ClaimTooEarly { period }),
        None => Err(PayrollError::AllPeriodsClaimed),
    }
}

/// Time share in effect at `at`
fn share_at(shares: &[TimeShare], at: TimePoint) -> Option<&TimeShare> {
    shares.iter().rev().find(|s| s.start_date < at)
}

/// Pay the next lapsed period of `assignment` to its assignee
pub async fn claim_next_period(
    ctx: &PayrollContext<'_>,
    assignment: &Checksum256,
    claimer: &Name,
) -> PayrollResult<ClaimReceipt> {
    let assignment = Assignment::load(ctx.graph, assignment).await?;
    if &assignment.assignee != claimer {
        warn!("{} tried to claim pay of {}", claimer, assignment.assignee);
        return Err(PayrollError::PermissionDenied(
            "Only the assignee can claim pay for this assignment".to_string(),
        ));
    }
    if !matches!(
        assignment.state,
        AssignmentState::Approved | AssignmentState::Withdrawed | AssignmentState::Suspended
    ) {
        return Err(PayrollError::InvalidAssignment(format!(
            "Cannot claim pay for {} assignments",
            assignment.state
        )));
    }
    let member = Member::require(
        ctx.graph,
        ctx.root,
        &assignment.assignee,
        "assignee must be a current member to claim pay",
    )
    .await?;

    let (period, end) = next_claimable_period(ctx, &assignment).await?;
    let window = PeriodWindow::new(period.start_time, end);

    let shares = assignment.time_shares(ctx.graph).await?;
    let segments = assignment.segments(ctx.graph).await?;
    let fraction = prorate(&window, &segments, assignment.time_share_x100)?;
    debug!(
        "Period {} of {}: {} segments, fraction {}",
        period.label,
        assignment.hash(),
        segments.len(),
        fraction
    );

    let badges = active_badges(ctx.graph, &member.hash, &period).await?;
    let mut amounts = Vec::new();
    for base in assignment.salary.payable() {
        let prorated = fraction.apply(base)?;
        let total = prorated.checked_add(&badge_bonus(&badges, &prorated)?)?;
        amounts.push(total);
    }

    let current = assignment.current_time_share(ctx.graph).await?;
    let next_current = share_at(&shares, end).map(|s| s.hash);

    let mut payable = Vec::new();
    for amount in amounts {
        let memo = format!(
            "Payment for assignment {}; period {}; {}",
            assignment.hash(),
            period.label,
            amount.symbol().code()
        );
        ensure_payable(ctx, assignment.hash(), &assignment.assignee, &amount, &memo).await?;
        payable.push((amount, memo));
    }

    // writes
    let mut payments = Vec::new();
    for (amount, memo) in &payable {
        if let Some(payment) =
            make_payment(ctx, assignment.hash(), &assignment.assignee, amount, memo).await?
        {
            ctx.graph
                .create_edge(ctx.contract(), &period.hash, &payment.hash, edges::PAYMENT, ctx.now)
                .await?;
            payments.push(payment);
        }
    }

    ctx.graph
        .create_edge(ctx.contract(), assignment.hash(), &period.hash, edges::CLAIMED, ctx.now)
        .await?;

    if let Some(next) = next_current {
        if current.as_ref().map(|c| c.hash) != Some(next) {
            if let Some(current) = &current {
                ctx.graph
                    .erase_edge(assignment.hash(), &current.hash, edges::CURRENT_TIME_SHARE)
                    .await?;
            }
            ctx.graph
                .create_edge(ctx.contract(), assignment.hash(), &next, edges::CURRENT_TIME_SHARE, ctx.now)
                .await?;
        }
    }

    info!(
        "{} claimed period {} of assignment {} ({} payments)",
        assignment.assignee,
        period.label,
        assignment.hash(),
        payments.len()
    );

    Ok(ClaimReceipt {
        assignment: *assignment.hash(),
        period,
        fraction,
        payments,
    })
}
