use async_trait::async_trait;

use dho_common::names::{edges, groups, labels};
use dho_common::{Name, Symbol};
use dho_docgraph::{ContentWrapper, Document};
use dho_payroll::PayrollContext;

use super::{invalid, percent_in_range, ProposalHandler, ProposalType};
use crate::GovernanceResult;

/// A role with an annual USD salary that assignments draw from
pub struct RoleProposal;

#[async_trait]
impl ProposalHandler for RoleProposal {
    fn proposal_type(&self) -> ProposalType {
        ProposalType::Role
    }

    async fn propose_impl(
        &self,
        _ctx: &PayrollContext<'_>,
        _proposer: &Name,
        content: &mut ContentWrapper,
    ) -> GovernanceResult<()> {
        let salary = content.get_asset(groups::DETAILS, labels::ANNUAL_USD_SALARY)?;
        if salary.symbol() != &Symbol::usd() || !salary.is_positive() {
            return Err(invalid(format!(
                "annual_usd_salary must be a positive USD amount, got {}",
                salary
            )));
        }

        let min_time_share = content.opt_i64(groups::DETAILS, labels::MIN_TIME_SHARE)?.unwrap_or(0);
        percent_in_range(min_time_share, 0, labels::MIN_TIME_SHARE)?;
        let min_deferred = content.opt_i64(groups::DETAILS, labels::MIN_DEFERRED)?.unwrap_or(0);
        percent_in_range(min_deferred, 0, labels::MIN_DEFERRED)?;
        Ok(())
    }

    async fn pass_impl(
        &self,
        ctx: &PayrollContext<'_>,
        proposal: &Document,
        _content: &mut ContentWrapper,
    ) -> GovernanceResult<()> {
        ctx.graph
            .create_edge(ctx.contract(), ctx.root, &proposal.hash, edges::ROLE, ctx.now)
            .await?;
        Ok(())
    }
}
