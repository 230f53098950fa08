use async_trait::async_trait;
use tracing::info;

use dho_common::names::{edges, groups, labels, types};
use dho_common::Name;
use dho_docgraph::{Content, ContentWrapper, Document};
use dho_payroll::{
    derive_period_salary, start_commitment, usd_per_period, AssignmentState, Member, PayrollContext,
    SalaryTerms,
};

use super::{
    approved_at, period_count_or_default, percent_in_range, require_passed, start_period,
    ProposalHandler, ProposalType,
};
use crate::GovernanceResult;

/// Staffing of a role by one member
///
/// The per-period salary is derived from the role when the proposal is made
/// and stored in the assignment.
pub struct AssignmentProposal;

#[async_trait]
impl ProposalHandler for AssignmentProposal {
    fn proposal_type(&self) -> ProposalType {
        ProposalType::Assignment
    }

    async fn propose_impl(
        &self,
        ctx: &PayrollContext<'_>,
        _proposer: &Name,
        content: &mut ContentWrapper,
    ) -> GovernanceResult<()> {
        let assignee = content.get_name(groups::DETAILS, labels::ASSIGNEE)?.clone();
        Member::require(ctx.graph, ctx.root, &assignee, "only members can be assigned").await?;

        let role_hash = *content.get_checksum(groups::DETAILS, labels::ROLE)?;
        let role = require_passed(ctx, &role_hash, types::ROLE, edges::ROLE).await?;
        start_period(ctx.graph, content).await?;
        period_count_or_default(ctx, content)?;

        let min_time_share = role.content.opt_i64(groups::DETAILS, labels::MIN_TIME_SHARE)?.unwrap_or(0);
        let min_deferred = role.content.opt_i64(groups::DETAILS, labels::MIN_DEFERRED)?.unwrap_or(0);
        let time_share = content.get_i64(groups::DETAILS, labels::TIME_SHARE)?;
        let deferred = content.get_i64(groups::DETAILS, labels::DEFERRED)?;
        percent_in_range(time_share, min_time_share.max(1), labels::TIME_SHARE)?;
        percent_in_range(deferred, min_deferred, labels::DEFERRED)?;

        let annual = role.content.get_asset(groups::DETAILS, labels::ANNUAL_USD_SALARY)?;
        let usd = usd_per_period(annual)?;
        let salary = derive_period_salary(&usd, &SalaryTerms::new(ctx.settings, time_share, deferred))?;

        for item in salary.to_content() {
            content.insert_or_replace(groups::DETAILS, item);
        }
        content.insert_or_replace(groups::DETAILS, Content::new(labels::APPROVED_DEFERRED, deferred));
        content.insert_or_replace(
            groups::DETAILS,
            Content::new(labels::STATE, AssignmentState::Proposed.as_str()),
        );
        Ok(())
    }

    async fn validate_pass(&self, ctx: &PayrollContext<'_>, proposal: &Document) -> GovernanceResult<()> {
        let assignee = proposal.content.get_name(groups::DETAILS, labels::ASSIGNEE)?;
        Member::require(ctx.graph, ctx.root, assignee, "assignee must be a current member").await?;
        let role = proposal.content.get_checksum(groups::DETAILS, labels::ROLE)?;
        require_passed(ctx, role, types::ROLE, edges::ROLE).await?;
        Ok(())
    }

    async fn pass_impl(
        &self,
        ctx: &PayrollContext<'_>,
        proposal: &Document,
        content: &mut ContentWrapper,
    ) -> GovernanceResult<()> {
        let assignee = proposal.content.get_name(groups::DETAILS, labels::ASSIGNEE)?;
        let member = Member::require(ctx.graph, ctx.root, assignee, "assignee must be a current member").await?;
        let role = *proposal.content.get_checksum(groups::DETAILS, labels::ROLE)?;
        let time_share = proposal.content.get_i64(groups::DETAILS, labels::TIME_SHARE)?;
        let a = &proposal.hash;

        for (from, to, name) in [
            (&member.hash, a, edges::ASSIGNED),
            (a, &member.hash, edges::ASSIGNEE),
            (a, &role, edges::ROLE),
            (&role, a, edges::ASSIGNMENT),
            (ctx.root, a, edges::ASSIGNMENT),
        ] {
            ctx.graph.create_edge(ctx.contract(), from, to, name, ctx.now).await?;
        }

        start_commitment(ctx, a, assignee, time_share, approved_at(content)?).await?;
        content.insert_or_replace(
            groups::DETAILS,
            Content::new(labels::STATE, AssignmentState::Approved.as_str()),
        );

        info!("Assignment {} of {} approved at {}%", a, assignee, time_share);
        Ok(())
    }
}
