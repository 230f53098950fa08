use async_trait::async_trait;
use tracing::info;

use dho_common::names::{edges, groups, labels, types};
use dho_common::Name;
use dho_docgraph::{Content, ContentWrapper, Document};
use dho_payroll::{suspend, Assignment, PayrollContext};

use super::{invalid, ProposalHandler, ProposalType};
use crate::GovernanceResult;

/// Vote to end an assignment early, against the assignee's will
pub struct SuspendProposal;

async fn require_suspendable(ctx: &PayrollContext<'_>, document: Document) -> GovernanceResult<Assignment> {
    if !document.is_type(types::ASSIGNMENT) {
        return Err(invalid(format!(
            "Unexpected document type for suspension: {}. Valid types [{}]",
            document.document_type().map(|t| t.to_string()).unwrap_or_default(),
            types::ASSIGNMENT
        )));
    }
    let assignment = Assignment::from_document(document)?;
    if assignment.state.is_terminal() {
        return Err(invalid(format!(
            "assignment {} is already {}",
            assignment.hash(),
            assignment.state
        )));
    }
    if assignment.is_expired(ctx.graph, ctx.now).await? {
        return Err(invalid("Assignment is already expired"));
    }
    Ok(assignment)
}

/// The assignment a suspension applies to, tracked through rewrites
async fn suspended_of(ctx: &PayrollContext<'_>, proposal: &Document) -> GovernanceResult<Document> {
    ctx.graph
        .get_last_document_of_edge(&proposal.hash, edges::SUSPEND)
        .await?
        .ok_or_else(|| invalid(format!("Missing edge from suspension proposal {} to document", proposal.hash)))
}

#[async_trait]
impl ProposalHandler for SuspendProposal {
    fn proposal_type(&self) -> ProposalType {
        ProposalType::Suspend
    }

    async fn propose_impl(
        &self,
        ctx: &PayrollContext<'_>,
        _proposer: &Name,
        content: &mut ContentWrapper,
    ) -> GovernanceResult<()> {
        let original = *content.get_checksum(groups::DETAILS, labels::ORIGINAL_DOCUMENT)?;
        let document = ctx.graph.load_document(&original).await?;
        let assignment = require_suspendable(ctx, document).await?;

        let title = assignment
            .document
            .content
            .get_str(groups::DETAILS, labels::TITLE)
            .unwrap_or_default()
            .to_string();
        content.insert_or_replace(
            groups::DETAILS,
            Content::new(labels::TITLE, format!("Suspension of {}: {}", types::ASSIGNMENT, title)),
        );
        Ok(())
    }

    async fn post_propose(&self, ctx: &PayrollContext<'_>, proposal: &Document) -> GovernanceResult<()> {
        let original = *proposal.content.get_checksum(groups::DETAILS, labels::ORIGINAL_DOCUMENT)?;
        ctx.graph
            .create_edge(ctx.contract(), &proposal.hash, &original, edges::SUSPEND, ctx.now)
            .await?;
        Ok(())
    }

    async fn validate_pass(&self, ctx: &PayrollContext<'_>, proposal: &Document) -> GovernanceResult<()> {
        require_suspendable(ctx, suspended_of(ctx, proposal).await?).await?;
        Ok(())
    }

    async fn pass_impl(
        &self,
        ctx: &PayrollContext<'_>,
        proposal: &Document,
        _content: &mut ContentWrapper,
    ) -> GovernanceResult<()> {
        let original = suspended_of(ctx, proposal).await?;
        let suspended = suspend(ctx, &original.hash).await?;
        info!(
            "Suspension {} ended assignment {} of {}",
            proposal.hash,
            suspended.hash(),
            suspended.assignee
        );
        Ok(())
    }
}
