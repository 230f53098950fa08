use async_trait::async_trait;

use dho_common::names::{edges, groups, labels};
use dho_common::Name;
use dho_docgraph::{ContentWrapper, Document};
use dho_payroll::PayrollContext;

use super::{invalid, ProposalHandler, ProposalType};
use crate::GovernanceResult;

pub struct BadgeProposal;

#[async_trait]
impl ProposalHandler for BadgeProposal {
    fn proposal_type(&self) -> ProposalType {
        ProposalType::Badge
    }

    async fn propose_impl(
        &self,
        _ctx: &PayrollContext<'_>,
        _proposer: &Name,
        content: &mut ContentWrapper,
    ) -> GovernanceResult<()> {
        for label in [
            labels::HYPHA_COEFFICIENT,
            labels::HUSD_COEFFICIENT,
            labels::HVOICE_COEFFICIENT,
        ] {
            if let Some(coefficient) = content.opt_i64(groups::DETAILS, label)? {
                if coefficient <= 0 {
                    return Err(invalid(format!("{} must be positive, got {}", label, coefficient)));
                }
            }
        }
        Ok(())
    }

    async fn pass_impl(
        &self,
        ctx: &PayrollContext<'_>,
        proposal: &Document,
        _content: &mut ContentWrapper,
    ) -> GovernanceResult<()> {
        ctx.graph
            .create_edge(ctx.contract(), ctx.root, &proposal.hash, edges::BADGE, ctx.now)
            .await?;
        Ok(())
    }
}
