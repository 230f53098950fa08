//! Commitment history of an assignment
//!
//! The history is a chain of time-share documents:
//!
//! ```text
//! assignment --initimeshare--> ts0 --nextimeshare--> ts1 --nextimeshare--> ts2
//! assignment --curtimeshare--> (first share of the next unclaimed period)
//! assignment --lasttimeshare--> ts2
//! ```
//!
//! Start dates are strictly increasing, so the chain never needs reordering.

use tracing::{info, warn};

use dho_common::names::{edges, groups, labels};
use dho_common::{Checksum256, Name, TimePoint};
use dho_docgraph::Content;

use crate::assignment::{Assignment, AssignmentState};
use crate::context::PayrollContext;
use crate::error::{PayrollError, PayrollResult};
use crate::period::Period;
use crate::salary::{derive_period_salary, SalaryTerms};
use crate::time_share::TimeShare;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Modifier {
    Adjust,
    Withdraw,
    Suspend,
}

impl Modifier {
    fn verb(&self) -> &'static str {
        match self {
            Modifier::Adjust => "adjust",
            Modifier::Withdraw => "withdraw",
            Modifier::Suspend => "suspend",
        }
    }
}

/// Write the initial time share of a freshly approved assignment
pub async fn start_commitment(
    ctx: &PayrollContext<'_>,
    assignment: &Checksum256,
    assignee: &Name,
    time_share_x100: i64,
    start: TimePoint,
) -> PayrollResult<TimeShare> {
    let share = TimeShare::create(
        ctx.graph,
        ctx.contract(),
        assignment,
        assignee,
        time_share_x100,
        start,
        ctx.now,
    )
    .await?;

    for name in [
        edges::INIT_TIME_SHARE,
        edges::CURRENT_TIME_SHARE,
        edges::LAST_TIME_SHARE,
    ] {
        ctx.graph
            .create_edge(ctx.contract(), assignment, &share.hash, name, ctx.now)
            .await?;
    }
    Ok(share)
}

fn require_owner(assignment: &Assignment, issuer: &Name, message: &str) -> PayrollResult<()> {
    if &assignment.assignee != issuer {
        warn!("{} tried to change assignment {} of {}", issuer, assignment.hash(), assignment.assignee);
        return Err(PayrollError::PermissionDenied(message.to_string()));
    }
    Ok(())
}

/// Append a commitment change starting at `start`
async fn modify_commitment(
    ctx: &PayrollContext<'_>,
    assignment: &Assignment,
    time_share_x100: i64,
    start: TimePoint,
    modifier: Modifier,
) -> PayrollResult<TimeShare> {
    if modifier == Modifier::Adjust {
        if assignment.state.is_terminal() {
            return Err(PayrollError::InvalidCommitment(format!(
                "Cannot adjust commitment for {} assignments",
                assignment.state
            )));
        }
        if assignment.is_expired(ctx.graph, ctx.now).await? {
            return Err(PayrollError::InvalidCommitment(
                "Cannot adjust expired assignment".to_string(),
            ));
        }
    }

    if !(0..=assignment.time_share_x100).contains(&time_share_x100) {
        return Err(PayrollError::InvalidCommitment(format!(
            "New time share has to be between 0 and the approved time share: {}",
            assignment.time_share_x100
        )));
    }

    let last = assignment.last_time_share(ctx.graph).await?;
    if modifier == Modifier::Adjust && last.time_share_x100 == time_share_x100 {
        return Err(PayrollError::InvalidCommitment(format!(
            "New commitment: [{}] must be different than current commitment: [{}]",
            time_share_x100, last.time_share_x100
        )));
    }
    if start <= last.start_date {
        return Err(PayrollError::InvalidCommitment(
            "New time share start date must be greater than the previous time share start date"
                .to_string(),
        ));
    }

    let share = TimeShare::create(
        ctx.graph,
        ctx.contract(),
        assignment.hash(),
        &assignment.assignee,
        time_share_x100,
        start,
        ctx.now,
    )
    .await?;
    ctx.graph
        .create_edge(ctx.contract(), &last.hash, &share.hash, edges::NEXT_TIME_SHARE, ctx.now)
        .await?;
    ctx.graph
        .erase_edge(assignment.hash(), &last.hash, edges::LAST_TIME_SHARE)
        .await?;
    ctx.graph
        .create_edge(ctx.contract(), assignment.hash(), &share.hash, edges::LAST_TIME_SHARE, ctx.now)
        .await?;

    Ok(share)
}

/// Change the assignee's commitment from `start` (default: now) onwards
pub async fn adjust_commitment(
    ctx: &PayrollContext<'_>,
    issuer: &Name,
    assignment: &Checksum256,
    time_share_x100: i64,
    start: Option<TimePoint>,
) -> PayrollResult<TimeShare> {
    let assignment = Assignment::load(ctx.graph, assignment).await?;
    require_owner(&assignment, issuer, "Only the owner of the assignment can adjust it")?;

    let share = modify_commitment(
        ctx,
        &assignment,
        time_share_x100,
        start.unwrap_or(ctx.now),
        Modifier::Adjust,
    )
    .await?;

    info!(
        "Adjusted commitment of {} to {}% from {}",
        assignment.hash(),
        time_share_x100,
        share.start_date
    );
    Ok(share)
}

/// Raise the deferred share of the assignee's pay and recompute the
/// per-period amounts
pub async fn adjust_deferred(
    ctx: &PayrollContext<'_>,
    issuer: &Name,
    assignment: &Checksum256,
    deferred_perc_x100: i64,
) -> PayrollResult<Assignment> {
    let assignment = Assignment::load(ctx.graph, assignment).await?;
    require_owner(&assignment, issuer, "Only the owner of the assignment can modify it")?;

    if assignment.state.is_terminal() {
        return Err(PayrollError::InvalidCommitment(format!(
            "Cannot adjust deferred percentage for {} assignments",
            assignment.state
        )));
    }
    if deferred_perc_x100 < assignment.approved_deferred_perc_x100 {
        return Err(PayrollError::InvalidCommitment(format!(
            "New percentage has to be greater or equal to approved percentage: {}",
            assignment.approved_deferred_perc_x100
        )));
    }
    if deferred_perc_x100 > 100 {
        return Err(PayrollError::InvalidCommitment(
            "New percentage has to be less or equal to 100".to_string(),
        ));
    }

    let terms = SalaryTerms::new(ctx.settings, assignment.time_share_x100, deferred_perc_x100);
    let salary = derive_period_salary(&assignment.salary.usd, &terms)?;

    let mut content = assignment.document.content.clone();
    content.insert_or_replace(groups::DETAILS, Content::new(labels::DEFERRED, deferred_perc_x100));
    for item in salary.to_content() {
        content.insert_or_replace(groups::DETAILS, item);
    }

    let updated = ctx.graph.update_document(&assignment.document, content).await?;
    info!(
        "Deferred share of {} set to {}%: {} / {}",
        updated.hash, deferred_perc_x100, salary.husd, salary.hypha
    );
    Assignment::from_document(updated)
}

/// Number of the assignment's periods that have started by `now`
async fn periods_started(
    ctx: &PayrollContext<'_>,
    assignment: &Assignment,
) -> PayrollResult<i64> {
    let first = Period::load(ctx.graph, &assignment.start_period).await?;
    let periods = first.walk(ctx.graph, assignment.period_count).await?;
    Ok(periods.iter().filter(|p| p.start_time <= ctx.now).count() as i64)
}

/// Cut the period count back to the periods started so far and drop the
/// commitment to zero from now on
async fn end_assignment(
    ctx: &PayrollContext<'_>,
    assignment: Assignment,
    state: AssignmentState,
    modifier: Modifier,
) -> PayrollResult<Assignment> {
    if assignment.state.is_terminal() {
        return Err(PayrollError::InvalidAssignment(format!(
            "Cannot {} {} assignments",
            modifier.verb(),
            assignment.state
        )));
    }
    if assignment.is_expired(ctx.graph, ctx.now).await? {
        return Err(PayrollError::InvalidAssignment(match modifier {
            Modifier::Withdraw => format!(
                "Withdrawal of expired assignment {} is not allowed",
                assignment.hash()
            ),
            _ => format!("Assignment {} is already expired", assignment.hash()),
        }));
    }

    let period_count = periods_started(ctx, &assignment).await?;
    let last = assignment.last_time_share(ctx.graph).await?;
    if ctx.now <= last.start_date {
        return Err(PayrollError::InvalidCommitment(
            "New time share start date must be greater than the previous time share start date"
                .to_string(),
        ));
    }

    let mut content = assignment.document.content.clone();
    content.insert_or_replace(groups::DETAILS, Content::new(labels::PERIOD_COUNT, period_count));
    content.insert_or_replace(groups::DETAILS, Content::new(labels::STATE, state.as_str()));
    let updated = Assignment::from_document(
        ctx.graph.update_document(&assignment.document, content).await?,
    )?;

    modify_commitment(ctx, &updated, 0, ctx.now, modifier).await?;

    info!(
        "Assignment {} of {} {} after {} periods",
        updated.hash(),
        updated.assignee,
        state,
        period_count
    );
    Ok(updated)
}

/// End the assignment with the current period, at the assignee's request
pub async fn withdraw(
    ctx: &PayrollContext<'_>,
    owner: &Name,
    assignment: &Checksum256,
) -> PayrollResult<Assignment> {
    let assignment = Assignment::load(ctx.graph, assignment).await?;
    require_owner(&assignment, owner, "Only the owner of the assignment can withdraw it")?;
    end_assignment(ctx, assignment, AssignmentState::Withdrawed, Modifier::Withdraw).await
}

/// End the assignment with the current period after a passed suspension
pub async fn suspend(ctx: &PayrollContext<'_>, assignment: &Checksum256) -> PayrollResult<Assignment> {
    let assignment = Assignment::load(ctx.graph, assignment).await?;
    end_assignment(ctx, assignment, AssignmentState::Suspended, Modifier::Suspend).await
}
