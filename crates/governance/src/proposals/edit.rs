use async_trait::async_trait;
use tracing::info;

use dho_common::names::{edges, groups, labels};
use dho_common::Name;
use dho_docgraph::{ContentWrapper, Document};
use dho_payroll::PayrollContext;

use super::{invalid, ProposalHandler, ProposalType};
use crate::GovernanceResult;

/// Details of an edit that describe the edit itself and are never merged
const EDIT_METADATA: [&str; 6] = [
    groups::CONTENT_GROUP_LABEL,
    labels::TITLE,
    labels::DESCRIPTION,
    labels::BALLOT_TITLE,
    labels::BALLOT_DESCRIPTION,
    labels::ORIGINAL_DOCUMENT,
];

/// Overlay the `details` of `edit` onto the `details` of `original`
///
/// Items of the edit replace or extend the original's; everything else in
/// the original is kept as is.
pub fn merge_details(original: &ContentWrapper, edit: &ContentWrapper) -> ContentWrapper {
    let mut merged = original.clone();
    if let Some(details) = edit.get_group(groups::DETAILS) {
        for item in details {
            if !EDIT_METADATA.contains(&item.label.as_str()) {
                merged.insert_or_replace(groups::DETAILS, item.clone());
            }
        }
    }
    merged
}

pub(super) async fn link_original(ctx: &PayrollContext<'_>, proposal: &Document) -> GovernanceResult<()> {
    let original = *proposal.content.get_checksum(groups::DETAILS, labels::ORIGINAL_DOCUMENT)?;
    ctx.graph
        .create_edge(ctx.contract(), &proposal.hash, &original, edges::ORIGINAL, ctx.now)
        .await?;
    Ok(())
}

/// The document an edit applies to; follows the `original` edge so that
/// rewrites of the original after the proposal was made are tracked
pub(super) async fn original_of(ctx: &PayrollContext<'_>, proposal: &Document) -> GovernanceResult<Document> {
    ctx.graph
        .get_last_document_of_edge(&proposal.hash, edges::ORIGINAL)
        .await?
        .ok_or_else(|| invalid(format!("edit {} has no original document", proposal.hash)))
}

pub(super) async fn apply_edit(ctx: &PayrollContext<'_>, proposal: &Document) -> GovernanceResult<Document> {
    let original = original_of(ctx, proposal).await?;
    let merged = merge_details(&original.content, &proposal.content);
    let updated = ctx.graph.update_document(&original, merged).await?;
    info!("Edit {} merged: {} -> {}", proposal.hash, original.hash, updated.hash);
    Ok(updated)
}

pub struct EditProposal;

#[async_trait]
impl ProposalHandler for EditProposal {
    fn proposal_type(&self) -> ProposalType {
        ProposalType::Edit
    }

    async fn propose_impl(
        &self,
        ctx: &PayrollContext<'_>,
        _proposer: &Name,
        content: &mut ContentWrapper,
    ) -> GovernanceResult<()> {
        let original = *content.get_checksum(groups::DETAILS, labels::ORIGINAL_DOCUMENT)?;
        if &original == ctx.root {
            return Err(invalid("the root document cannot be edited"));
        }
        ctx.graph.load_document(&original).await?;
        Ok(())
    }

    async fn post_propose(&self, ctx: &PayrollContext<'_>, proposal: &Document) -> GovernanceResult<()> {
        link_original(ctx, proposal).await
    }

    async fn validate_pass(&self, ctx: &PayrollContext<'_>, proposal: &Document) -> GovernanceResult<()> {
        original_of(ctx, proposal).await.map(|_| ())
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

#[cfg(test)]
mod tests {
    use super::*;
    use dho_common::Checksum256;
    use dho_docgraph::Content;

    fn asset(s: &str) -> dho_common::Asset {
        s.parse().unwrap()
    }

    #[test]
    fn test_merge_overwrites_only_edited_items() {
        let original = ContentWrapper::new()
            .with_group(
                groups::DETAILS,
                [
                    Content::new(labels::TITLE, "Hardware policy"),
                    Content::new("clause_hardware_threshold", asset("50000000.0000 SEEDS")),
                    Content::new("clause_review_cycle", 4i64),
                ],
            )
            .with_group(groups::SYSTEM, [Content::new(labels::NODE_LABEL, "Hardware policy")]);
        let edit = ContentWrapper::new().with_group(
            groups::DETAILS,
            [
                Content::new(labels::TITLE, "Lower the threshold"),
                Content::new(labels::ORIGINAL_DOCUMENT, Checksum256::hash(b"original")),
                Content::new("clause_hardware_threshold", asset("25000000.0000 SEEDS")),
                Content::new("clause_new", "added"),
            ],
        );

        let merged = merge_details(&original, &edit);

        assert_eq!(
            merged.get_asset(groups::DETAILS, "clause_hardware_threshold").unwrap(),
            &asset("25000000.0000 SEEDS")
        );
        assert_eq!(merged.get_str(groups::DETAILS, labels::TITLE).unwrap(), "Hardware policy");
        assert_eq!(merged.get_i64(groups::DETAILS, "clause_review_cycle").unwrap(), 4);
        assert_eq!(merged.get_str(groups::DETAILS, "clause_new").unwrap(), "added");
        assert!(merged.get(groups::DETAILS, labels::ORIGINAL_DOCUMENT).is_none());
        assert_eq!(merged.get_group(groups::SYSTEM), original.get_group(groups::SYSTEM));
    }
}
