use serde::{Deserialize, Serialize};

use dho_common::names::{groups, labels};
use dho_common::{Checksum256, Name, TimePoint};

use crate::content::ContentWrapper;
use crate::error::GraphResult;

/// A content-addressed node of the graph
///
/// `hash` covers `content` only, so two documents with equal content are
/// the same document regardless of who created them or when.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub hash: Checksum256,
    pub creator: Name,
    pub created_date: TimePoint,
    pub content: ContentWrapper,
}

impl Document {
    pub fn new(creator: Name, content: ContentWrapper, created_date: TimePoint) -> GraphResult<Self> {
        Ok(Self {
            hash: Self::hash_content(&content)?,
            creator,
            created_date,
            content,
        })
    }

    /// SHA-256 of the canonical JSON encoding of the content groups
    pub fn hash_content(content: &ContentWrapper) -> GraphResult<Checksum256> {
        let bytes = serde_json::to_vec(content)?;
        Ok(Checksum256::hash(&bytes))
    }

    /// Value of `system.type`
    pub fn document_type(&self) -> GraphResult<&Name> {
        self.content.get_name(groups::SYSTEM, labels::TYPE)
    }

    pub fn is_type(&self, expected: &str) -> bool {
        matches!(self.document_type(), Ok(t) if t.as_str() == expected)
    }

    pub fn node_label(&self) -> Option<&str> {
        self.content
            .get(groups::SYSTEM, labels::NODE_LABEL)
            .and_then(|v| v.as_str())
    }
}
