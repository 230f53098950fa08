use async_trait::async_trait;
use tracing::info;

use dho_common::names::{edges, groups, labels, types};
use dho_common::Name;
use dho_docgraph::{ContentWrapper, Document};
use dho_payroll::{Member, PayrollContext};

use super::{invalid, period_count_or_default, require_passed, start_period, ProposalHandler, ProposalType};
use crate::GovernanceResult;

/// Longest badge grant, in periods
pub const MAX_BADGE_PERIODS: i64 = 26;

/// Grant of a badge to a member for a run of periods
pub struct AssignBadgeProposal;

#[async_trait]
impl ProposalHandler for AssignBadgeProposal {
    fn proposal_type(&self) -> ProposalType {
        ProposalType::AssignBadge
    }

    async fn propose_impl(
        &self,
        ctx: &PayrollContext<'_>,
        _proposer: &Name,
        content: &mut ContentWrapper,
    ) -> GovernanceResult<()> {
        let assignee = content.get_name(groups::DETAILS, labels::ASSIGNEE)?.clone();
        Member::require(ctx.graph, ctx.root, &assignee, "only members can be earn badges").await?;

        let badge = *content.get_checksum(groups::DETAILS, labels::BADGE)?;
        require_passed(ctx, &badge, types::BADGE, edges::BADGE).await?;
        start_period(ctx.graph, content).await?;

        let count = period_count_or_default(ctx, content)?;
        if count >= MAX_BADGE_PERIODS {
            return Err(invalid(format!(
                "period_count must be less than {}, got {}",
                MAX_BADGE_PERIODS, count
            )));
        }
        Ok(())
    }

    async fn validate_pass(&self, ctx: &PayrollContext<'_>, proposal: &Document) -> GovernanceResult<()> {
        let badge = proposal.content.get_checksum(groups::DETAILS, labels::BADGE)?;
        require_passed(ctx, badge, types::BADGE, edges::BADGE).await?;
        Ok(())
    }

    async fn pass_impl(
        &self,
        ctx: &PayrollContext<'_>,
        proposal: &Document,
        _content: &mut ContentWrapper,
    ) -> GovernanceResult<()> {
        let assignee = proposal.content.get_name(groups::DETAILS, labels::ASSIGNEE)?;
        let member = Member::require(ctx.graph, ctx.root, assignee, "only members can be earn badges").await?;
        let badge = *proposal.content.get_checksum(groups::DETAILS, labels::BADGE)?;
        let grant = &proposal.hash;
        let graph = ctx.graph;

        graph.ensure_edge(ctx.contract(), &member.hash, &badge, edges::HOLDS_BADGE, ctx.now).await?;
        graph.ensure_edge(ctx.contract(), &badge, &member.hash, edges::HELD_BY, ctx.now).await?;
        graph.create_edge(ctx.contract(), &member.hash, grant, edges::ASSIGN_BADGE, ctx.now).await?;
        graph.create_edge(ctx.contract(), &badge, grant, edges::ASSIGNMENT, ctx.now).await?;
        graph.create_edge(ctx.contract(), grant, &badge, edges::BADGE, ctx.now).await?;

        info!("Badge {} granted to {}", badge, assignee);
        Ok(())
    }
}
