use serde::{Deserialize, Serialize};

use dho_common::{Checksum256, Name, TimePoint};

/// Directed, named link between two documents
///
/// `(from_node, to_node, edge_name)` is unique. `id` grows with every edge
/// created, so among edges with the same name the highest id is the latest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub id: u64,
    pub from_node: Checksum256,
    pub to_node: Checksum256,
    pub edge_name: String,
    pub creator: Name,
    pub created_date: TimePoint,
}

impl Edge {
    pub fn touches(&self, node: &Checksum256) -> bool {
        &self.from_node == node || &self.to_node == node
    }

    pub fn matches(&self, from: &Checksum256, to: &Checksum256, name: &str) -> bool {
        &self.from_node == from && &self.to_node == to && self.edge_name == name
    }
}
