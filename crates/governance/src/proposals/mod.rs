//! Proposal types
//!
//! Each type validates and completes its `details` at propose time and runs
//! its own transition when the proposal passes.

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;

use dho_common::names::{groups, labels, types};
use dho_common::{Checksum256, Name, TimePoint};
use dho_docgraph::{Content, ContentWrapper, Document, DocumentGraph};
use dho_payroll::{Period, PayrollContext};

use crate::{GovernanceError, GovernanceResult};

mod assign_badge;
mod assignment;
mod attestation;
mod badge;
mod edit;
mod extension;
mod payout;
mod role;
mod suspend;

pub use edit::merge_details;
pub use extension::extension_content;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProposalType {
    Role,
    Assignment,
    Badge,
    AssignBadge,
    Payout,
    Edit,
    Extension,
    Suspend,
    Attestation,
}

impl ProposalType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProposalType::Role => types::ROLE,
            ProposalType::Assignment => types::ASSIGNMENT,
            ProposalType::Badge => types::BADGE,
            ProposalType::AssignBadge => types::ASSIGN_BADGE,
            ProposalType::Payout => types::PAYOUT,
            ProposalType::Edit => types::EDIT,
            ProposalType::Extension => types::EXTENSION,
            ProposalType::Suspend => types::SUSPEND,
            ProposalType::Attestation => types::ATTESTATION,
        }
    }
}

impl fmt::Display for ProposalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProposalType {
    type Err = GovernanceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            types::ROLE => Ok(ProposalType::Role),
            types::ASSIGNMENT => Ok(ProposalType::Assignment),
            types::BADGE => Ok(ProposalType::Badge),
            types::ASSIGN_BADGE => Ok(ProposalType::AssignBadge),
            types::PAYOUT => Ok(ProposalType::Payout),
            types::EDIT => Ok(ProposalType::Edit),
            types::EXTENSION => Ok(ProposalType::Extension),
            types::SUSPEND => Ok(ProposalType::Suspend),
            types::ATTESTATION => Ok(ProposalType::Attestation),
            other => Err(GovernanceError::InvalidProposal(format!(
                "unknown proposal type: {}",
                other
            ))),
        }
    }
}

/// Type-specific hooks of the proposal lifecycle
#[async_trait]
pub trait ProposalHandler: Send + Sync {
    fn proposal_type(&self) -> ProposalType;

    /// Validate `content` and fill in defaults before the proposal is stored
    async fn propose_impl(
        &self,
        ctx: &PayrollContext<'_>,
        proposer: &Name,
        content: &mut ContentWrapper,
    ) -> GovernanceResult<()>;

    /// Runs once the proposal document and its edges exist
    async fn post_propose(&self, _ctx: &PayrollContext<'_>, _proposal: &Document) -> GovernanceResult<()> {
        Ok(())
    }

    /// Checked before a passing proposal is closed; an error leaves it open
    async fn validate_pass(&self, _ctx: &PayrollContext<'_>, _proposal: &Document) -> GovernanceResult<()> {
        Ok(())
    }

    /// Apply a passed proposal. Edges are created on `proposal`; changes to
    /// `content` are written back when the close completes.
    async fn pass_impl(
        &self,
        ctx: &PayrollContext<'_>,
        proposal: &Document,
        content: &mut ContentWrapper,
    ) -> GovernanceResult<()>;
}

static ROLE: role::RoleProposal = role::RoleProposal;
static ASSIGNMENT: assignment::AssignmentProposal = assignment::AssignmentProposal;
static BADGE: badge::BadgeProposal = badge::BadgeProposal;
static ASSIGN_BADGE: assign_badge::AssignBadgeProposal = assign_badge::AssignBadgeProposal;
static PAYOUT: payout::PayoutProposal = payout::PayoutProposal;
static EDIT: edit::EditProposal = edit::EditProposal;
static EXTENSION: extension::ExtensionProposal = extension::ExtensionProposal;
static SUSPEND: suspend::SuspendProposal = suspend::SuspendProposal;
static ATTESTATION: attestation::AttestationProposal = attestation::AttestationProposal;

pub fn handler_for(proposal_type: ProposalType) -> &'static dyn ProposalHandler {
    match proposal_type {
        ProposalType::Role => &ROLE,
        ProposalType::Assignment => &ASSIGNMENT,
        ProposalType::Badge => &BADGE,
        ProposalType::AssignBadge => &ASSIGN_BADGE,
        ProposalType::Payout => &PAYOUT,
        ProposalType::Edit => &EDIT,
        ProposalType::Extension => &EXTENSION,
        ProposalType::Suspend => &SUSPEND,
        ProposalType::Attestation => &ATTESTATION,
    }
}

// Shared checks

fn invalid(msg: impl Into<String>) -> GovernanceError {
    GovernanceError::InvalidProposal(msg.into())
}

/// `period_count` from the details, defaulting it when absent
fn period_count_or_default(ctx: &PayrollContext<'_>, content: &mut ContentWrapper) -> GovernanceResult<i64> {
    match content.opt_i64(groups::DETAILS, labels::PERIOD_COUNT)? {
        Some(count) if count > 0 => Ok(count),
        Some(count) => Err(invalid(format!("period_count must be positive, got {}", count))),
        None => {
            let count = ctx.settings.default_period_count;
            content.insert_or_replace(groups::DETAILS, Content::new(labels::PERIOD_COUNT, count));
            Ok(count)
        }
    }
}

/// The period referenced by `details.start_period`
async fn start_period(graph: &DocumentGraph, content: &ContentWrapper) -> GovernanceResult<Period> {
    let hash = *content.get_checksum(groups::DETAILS, labels::START_PERIOD)?;
    Ok(Period::load(graph, &hash).await?)
}

/// A document of `doc_type` that has passed (`root --edge_name--> doc`)
async fn require_passed(
    ctx: &PayrollContext<'_>,
    hash: &Checksum256,
    doc_type: &str,
    edge_name: &str,
) -> GovernanceResult<Document> {
    let document = ctx.graph.load_document(hash).await?;
    if !document.is_type(doc_type) {
        return Err(invalid(format!("{} is not a {}", hash, doc_type)));
    }
    if !ctx.graph.edge_exists(ctx.root, hash, edge_name).await {
        return Err(invalid(format!("{} {} has not been approved", doc_type, hash)));
    }
    Ok(document)
}

fn percent_in_range(value: i64, min: i64, label: &str) -> GovernanceResult<()> {
    if !(min..=100).contains(&value) {
        return Err(invalid(format!("{} must be between {} and 100, got {}", label, min, value)));
    }
    Ok(())
}

fn approved_at(content: &ContentWrapper) -> GovernanceResult<TimePoint> {
    Ok(*content.get_time_point(groups::SYSTEM, labels::APPROVED_DATE)?)
}
