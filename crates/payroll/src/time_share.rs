use dho_common::names::{edges, groups, labels, types};
use dho_common::{Checksum256, Name, TimePoint};
use dho_docgraph::{system_group, Content, ContentWrapper, Document, DocumentGraph};

use crate::error::{PayrollError, PayrollResult};

/// One entry of an assignment's commitment history: from `start_date` on,
/// the assignee commits `time_share_x100` percent of full time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeShare {
    pub hash: Checksum256,
    pub time_share_x100: i64,
    pub start_date: TimePoint,
}

impl TimeShare {
    /// `assignment` is the assignment's hash when the entry was written; it
    /// keeps entries of different assignments distinct
    pub fn content(
        assignment: &Checksum256,
        assignee: &Name,
        time_share_x100: i64,
        start_date: TimePoint,
    ) -> PayrollResult<ContentWrapper> {
        let mut content = ContentWrapper::new().with_group(
            groups::DETAILS,
            [
                Content::new(labels::TIME_SHARE, time_share_x100),
                Content::new(labels::START_DATE, start_date),
                Content::new(labels::ASSIGNMENT, *assignment),
                Content::new(labels::ASSIGNEE, assignee.clone()),
            ],
        );
        content.push_group(system_group(
            types::TIME_SHARE,
            format!("Time share: {}%", time_share_x100),
        )?);
        Ok(content)
    }

    pub fn from_document(document: &Document) -> PayrollResult<Self> {
        if !document.is_type(types::TIME_SHARE) {
            return Err(PayrollError::InvalidCommitment(format!(
                "{} is not a time share",
                document.hash
            )));
        }
        Ok(Self {
            hash: document.hash,
            time_share_x100: document.content.get_i64(groups::DETAILS, labels::TIME_SHARE)?,
            start_date: *document.content.get_time_point(groups::DETAILS, labels::START_DATE)?,
        })
    }

    pub async fn load(graph: &DocumentGraph, hash: &Checksum256) -> PayrollResult<Self> {
        Self::from_document(&graph.load_document(hash).await?)
    }

    pub async fn create(
        graph: &DocumentGraph,
        creator: &Name,
        assignment: &Checksum256,
        assignee: &Name,
        time_share_x100: i64,
        start_date: TimePoint,
        now: TimePoint,
    ) -> PayrollResult<Self> {
        let content = Self::content(assignment, assignee, time_share_x100, start_date)?;
        let document = graph.create_document(creator, content, now).await?;
        Self::from_document(&document)
    }

    pub async fn next(&self, graph: &DocumentGraph) -> PayrollResult<Option<TimeShare>> {
        match graph.get_last_edge_from(&self.hash, edges::NEXT_TIME_SHARE).await {
            Some(edge) => Self::load(graph, &edge.to_node).await.map(Some),
            None => Ok(None),
        }
    }
}
