use async_trait::async_trait;

use dho_common::names::edges;
use dho_common::Name;
use dho_docgraph::{ContentWrapper, Document};
use dho_payroll::PayrollContext;

use super::{ProposalHandler, ProposalType};
use crate::GovernanceResult;

/// Free-form policy document; its details are whatever the proposer wrote
pub struct AttestationProposal;

#[async_trait]
impl ProposalHandler for AttestationProposal {
    fn proposal_type(&self) -> ProposalType {
        ProposalType::Attestation
    }

    async fn propose_impl(
        &self,
        _ctx: &PayrollContext<'_>,
        _proposer: &Name,
        _content: &mut ContentWrapper,
    ) -> GovernanceResult<()> {
        Ok(())
    }

    async fn pass_impl(
        &self,
        ctx: &PayrollContext<'_>,
        proposal: &Document,
        _content: &mut ContentWrapper,
    ) -> GovernanceResult<()> {
        ctx.graph
            .create_edge(ctx.contract(), ctx.root, &proposal.hash, edges::ATTESTATION, ctx.now)
            .await?;
        Ok(())
    }
}
