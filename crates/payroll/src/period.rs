//! Pay periods
//!
//! Periods form a single chain: `root --start--> first --next--> second ...`.
//! A period ends when its successor starts, so the last period of the chain
//! has no end yet.

use tracing::info;

use dho_common::names::{edges, groups, labels, types};
use dho_common::{Checksum256, Name, TimePoint};
use dho_docgraph::{system_group, Content, ContentWrapper, Document, DocumentGraph};

use crate::error::{PayrollError, PayrollResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Period {
    pub hash: Checksum256,
    pub start_time: TimePoint,
    pub label: String,
}

impl Period {
    pub fn content(start_time: TimePoint, label: &str) -> PayrollResult<ContentWrapper> {
        let mut content = ContentWrapper::new().with_group(
            groups::DETAILS,
            [
                Content::new(labels::START_TIME, start_time),
                Content::new(labels::LABEL, label),
            ],
        );
        content.push_group(system_group(types::PERIOD, label)?);
        Ok(content)
    }

    pub fn from_document(document: &Document) -> PayrollResult<Self> {
        if !document.is_type(types::PERIOD) {
            return Err(PayrollError::InvalidPeriod(format!(
                "{} is not a period",
                document.hash
            )));
        }
        let content = &document.content;
        Ok(Self {
            hash: document.hash,
            start_time: *content.get_time_point(groups::DETAILS, labels::START_TIME)?,
            label: content.get_str(groups::DETAILS, labels::LABEL)?.to_string(),
        })
    }

    pub async fn load(graph: &DocumentGraph, hash: &Checksum256) -> PayrollResult<Self> {
        Self::from_document(&graph.load_document(hash).await?)
    }

    /// Append a period after `predecessor`, which is either the root (for
    /// the first period) or the current last period
    pub async fn create(
        graph: &DocumentGraph,
        root: &Checksum256,
        creator: &Name,
        predecessor: &Checksum256,
        start_time: TimePoint,
        label: &str,
        now: TimePoint,
    ) -> PayrollResult<Self> {
        let link = if predecessor == root {
            if graph.get_last_edge_from(root, edges::START).await.is_some() {
                return Err(PayrollError::InvalidPeriod(
                    "the period chain already has a first period".to_string(),
                ));
            }
            edges::START
        } else {
            let previous = Self::load(graph, predecessor).await?;
            if previous.start_time >= start_time {
                return Err(PayrollError::InvalidPeriod(format!(
                    "predecessor {} must start before the new period",
                    previous.label
                )));
            }
            if graph.get_last_edge_from(predecessor, edges::NEXT).await.is_some() {
                return Err(PayrollError::InvalidPeriod(format!(
                    "period {} already has a successor",
                    previous.label
                )));
            }
            edges::NEXT
        };

        let content = Self::content(start_time, label)?;
        if graph.document_exists(&Document::hash_content(&content)?).await {
            return Err(PayrollError::InvalidPeriod(format!("period {} already exists", label)));
        }

        let document = graph.create_document(creator, content, now).await?;
        graph
            .create_edge(creator, predecessor, &document.hash, link, now)
            .await?;
        graph
            .create_edge(creator, root, &document.hash, edges::PERIOD, now)
            .await?;

        info!("Added period {} starting {}", label, start_time);
        Self::from_document(&document)
    }

    pub async fn next(&self, graph: &DocumentGraph) -> PayrollResult<Option<Period>> {
        match graph.get_last_edge_from(&self.hash, edges::NEXT).await {
            Some(edge) => Self::load(graph, &edge.to_node).await.map(Some),
            None => Ok(None),
        }
    }

    /// Start of the successor, if one has been added
    pub async fn end_time(&self, graph: &DocumentGraph) -> PayrollResult<Option<TimePoint>> {
        Ok(self.next(graph).await?.map(|next| next.start_time))
    }

    pub async fn first(graph: &DocumentGraph, root: &Checksum256) -> PayrollResult<Option<Period>> {
        match graph.get_last_edge_from(root, edges::START).await {
            Some(edge) => Self::load(graph, &edge.to_node).await.map(Some),
            None => Ok(None),
        }
    }

    pub async fn last(graph: &DocumentGraph, root: &Checksum256) -> PayrollResult<Option<Period>> {
        let mut current = match Self::first(graph, root).await? {
            Some(first) => first,
            None => return Ok(None),
        };
        while let Some(next) = current.next(graph).await? {
            current = next;
        }
        Ok(Some(current))
    }

    /// This period followed by its successors, at most `count` in total
    pub async fn walk(&self, graph: &DocumentGraph, count: i64) -> PayrollResult<Vec<Period>> {
        let mut periods = Vec::new();
        let mut current = Some(self.clone());
        while let Some(period) = current {
            if periods.len() as i64 >= count {
                break;
            }
            current = period.next(graph).await?;
            periods.push(period);
        }
        Ok(periods)
    }
}
