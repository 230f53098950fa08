//! Typed view over a proposal document

use dho_common::names::{edges, groups, labels};
use dho_common::{Checksum256, Name, TimePoint};
use dho_docgraph::{Document, DocumentGraph, GraphError};

use crate::proposals::ProposalType;
use crate::{GovernanceError, GovernanceResult};

#[derive(Debug, Clone)]
pub struct ProposalView {
    pub document: Document,
    pub proposal_type: ProposalType,
    pub proposer: Name,
    pub title: String,
    pub expiration: TimePoint,
    /// Ballot options in ballot order
    pub options: Vec<Name>,
    pub approved_date: Option<TimePoint>,
}

/// Option names of a ballot, in order
pub fn ballot_options(document: &Document) -> GovernanceResult<Vec<Name>> {
    let group = document.content.get_group_or_fail(groups::BALLOT_OPTIONS)?;
    group
        .iter()
        .filter(|item| item.label != groups::CONTENT_GROUP_LABEL)
        .map(|item| {
            item.value.as_name().cloned().ok_or_else(|| {
                GovernanceError::InvalidProposal(format!("ballot option {} is not a name", item.label))
            })
        })
        .collect()
}

impl ProposalView {
    pub fn from_document(document: Document) -> GovernanceResult<Self> {
        let proposal_type: ProposalType = document.document_type()?.as_str().parse()?;
        let content = &document.content;
        let approved_date = match content.get(groups::SYSTEM, labels::APPROVED_DATE) {
            Some(_) => Some(*content.get_time_point(groups::SYSTEM, labels::APPROVED_DATE)?),
            None => None,
        };

        Ok(Self {
            proposal_type,
            proposer: content.get_name(groups::SYSTEM, labels::PROPOSER)?.clone(),
            title: content.get_str(groups::SYSTEM, labels::NODE_LABEL)?.to_string(),
            expiration: *content.get_time_point(groups::BALLOT, labels::EXPIRATION)?,
            options: ballot_options(&document)?,
            approved_date,
            document,
        })
    }

    pub async fn load(graph: &DocumentGraph, hash: &Checksum256) -> GovernanceResult<Self> {
        match graph.load_document(hash).await {
            Ok(document) => Self::from_document(document),
            Err(GraphError::DocumentNotFound(hash)) => Err(GovernanceError::ProposalNotFound(hash)),
            Err(e) => Err(e.into()),
        }
    }

    pub fn hash(&self) -> &Checksum256 {
        &self.document.hash
    }

    pub async fn is_open(&self, graph: &DocumentGraph, root: &Checksum256) -> bool {
        graph.edge_exists(root, self.hash(), edges::PROPOSAL).await
    }

    pub async fn is_passed(&self, graph: &DocumentGraph, root: &Checksum256) -> bool {
        graph.edge_exists(root, self.hash(), edges::PASSED_PROPS).await
    }

    pub async fn is_failed(&self, graph: &DocumentGraph, root: &Checksum256) -> bool {
        graph.edge_exists(root, self.hash(), edges::FAILED_PROPS).await
    }

    /// Whether the voting window has elapsed at `now`
    pub fn is_expired(&self, now: TimePoint) -> bool {
        now > self.expiration
    }

    pub fn has_option(&self, option: &Name) -> bool {
        self.options.contains(option)
    }
}
