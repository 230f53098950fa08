use async_trait::async_trait;

use dho_common::names::{groups, labels};
use dho_common::Name;
use dho_docgraph::{Content, ContentWrapper, Document};
use dho_payroll::{Assignment, AssignmentState, PayrollContext};

use super::edit::{apply_edit, link_original, original_of};
use super::{invalid, ProposalHandler, ProposalType};
use crate::GovernanceResult;

/// Details of a proposal extending `assignment` by `additional_periods`
pub fn extension_content(assignment: &Assignment, additional_periods: i64) -> GovernanceResult<ContentWrapper> {
    if additional_periods <= 0 {
        return Err(invalid(format!(
            "an extension must add at least one period, got {}",
            additional_periods
        )));
    }
    let period_count = assignment
        .period_count
        .checked_add(additional_periods)
        .ok_or_else(|| invalid("period_count overflows"))?;

    Ok(ContentWrapper::new().with_group(
        groups::DETAILS,
        [
            Content::new(labels::TITLE, format!("Extension of assignment {}", assignment.hash())),
            Content::new(
                labels::DESCRIPTION,
                format!(
                    "Extend the assignment of {} from {} to {} periods",
                    assignment.assignee, assignment.period_count, period_count
                ),
            ),
            Content::new(labels::PERIOD_COUNT, period_count),
            Content::new(labels::ORIGINAL_DOCUMENT, *assignment.hash()),
        ],
    ))
}

fn require_extendable(assignment: &Assignment) -> GovernanceResult<()> {
    if assignment.state != AssignmentState::Approved {
        return Err(invalid(format!(
            "only approved assignments can be extended, {} is {}",
            assignment.hash(),
            assignment.state
        )));
    }
    Ok(())
}

/// An edit of an assignment that only raises its `period_count`
pub struct ExtensionProposal;

#[async_trait]
impl ProposalHandler for ExtensionProposal {
    fn proposal_type(&self) -> ProposalType {
        ProposalType::Extension
    }

    async fn propose_impl(
        &self,
        ctx: &PayrollContext<'_>,
        _proposer: &Name,
        content: &mut ContentWrapper,
    ) -> GovernanceResult<()> {
        let original = *content.get_checksum(groups::DETAILS, labels::ORIGINAL_DOCUMENT)?;
        let assignment = Assignment::load(ctx.graph, &original).await?;
        require_extendable(&assignment)?;

        let requested = content.get_i64(groups::DETAILS, labels::PERIOD_COUNT)?;
        if requested <= assignment.period_count {
            return Err(invalid(format!(
                "new period_count {} must be greater than the current {}",
                requested, assignment.period_count
            )));
        }
        Ok(())
    }

    async fn post_propose(&self, ctx: &PayrollContext<'_>, proposal: &Document) -> GovernanceResult<()> {
        link_original(ctx, proposal).await
    }

    async fn validate_pass(&self, ctx: &PayrollContext<'_>, proposal: &Document) -> GovernanceResult<()> {
        let assignment = Assignment::from_document(original_of(ctx, proposal).await?)?;
        require_extendable(&assignment)
    }

    async fn pass_impl(
        &self,
        ctx: &PayrollContext<'_>,
        proposal: &Document,
        _content: &mut ContentWrapper,
    ) -> GovernanceResult<()> {
        apply_edit(ctx, proposal).await.map(|_| ())
    }
}
