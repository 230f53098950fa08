//! The document graph
//!
//! Documents and edges are indexed in memory and written through to a
//! [`Storage`] backend, so a graph reopened on the same storage sees the
//! same state.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

use dho_common::{Checksum256, Name, TimePoint};

use crate::content::ContentWrapper;
use crate::document::Document;
use crate::edge::Edge;
use crate::error::{GraphError, GraphResult};
use crate::storage::{JsonStorage, Storage};

/// Path constants for storage
const DOCUMENTS_PATH: &str = "docgraph/documents";
const EDGES_PATH: &str = "docgraph/edges";

fn document_key(hash: &Checksum256) -> String {
    format!("{}/{}", DOCUMENTS_PATH, hash)
}

fn edge_key(id: u64) -> String {
    format!("{}/{:020}", EDGES_PATH, id)
}

pub struct DocumentGraph {
    storage: Arc<dyn Storage>,
    documents: Arc<RwLock<HashMap<Checksum256, Document>>>,
    /// Edges by id; iteration order is creation order
    edges: Arc<RwLock<BTreeMap<u64, Edge>>>,
    next_edge_id: AtomicU64,
}

impl DocumentGraph {
    /// Open a graph over `storage`, loading whatever it already holds
    pub async fn open(storage: Arc<dyn Storage>) -> GraphResult<Self> {
        let graph = Self {
            storage,
            documents: Arc::new(RwLock::new(HashMap::new())),
            edges: Arc::new(RwLock::new(BTreeMap::new())),
            next_edge_id: AtomicU64::new(1),
        };

        graph.load_documents().await?;
        graph.load_edges().await?;

        Ok(graph)
    }

    async fn load_documents(&self) -> GraphResult<()> {
        let keys = self.storage.list(&format!("{}/", DOCUMENTS_PATH)).await?;

        let mut documents = self.documents.write().await;
        for key in keys {
            match self.storage.get_json::<Document>(&key).await {
                Ok(document) => {
                    if Document::hash_content(&document.content)? != document.hash {
                        warn!("Skipping document {} whose content does not match its hash", key);
                        continue;
                    }
                    documents.insert(document.hash, document);
                }
                Err(e) => {
                    error!("Failed to load document {}: {}", key, e);
                }
            }
        }

        info!("Loaded {} documents", documents.len());
        Ok(())
    }

    async fn load_edges(&self) -> GraphResult<()> {
        let keys = self.storage.list(&format!("{}/", EDGES_PATH)).await?;

        let mut edges = self.edges.write().await;
        for key in keys {
            match self.storage.get_json::<Edge>(&key).await {
                Ok(edge) => {
                    edges.insert(edge.id, edge);
                }
                Err(e) => {
                    error!("Failed to load edge {}: {}", key, e);
                }
            }
        }

        let next = edges.keys().next_back().map_or(1, |last| last + 1);
        self.next_edge_id.store(next, Ordering::SeqCst);

        info!("Loaded {} edges", edges.len());
        Ok(())
    }

    /// Create a document, or return the existing one with identical content
    pub async fn create_document(
        &self,
        creator: &Name,
        content: ContentWrapper,
        now: TimePoint,
    ) -> GraphResult<Document> {
        let document = Document::new(creator.clone(), content, now)?;

        if let Some(existing) = self.documents.read().await.get(&document.hash) {
            debug!("Reusing existing document {}", existing.hash);
            return Ok(existing.clone());
        }

        self.storage.put_json(&document_key(&document.hash), &document).await?;
        self.documents
            .write()
            .await
            .insert(document.hash, document.clone());

        debug!("Created document {}", document.hash);
        Ok(document)
    }

    pub async fn load_document(&self, hash: &Checksum256) -> GraphResult<Document> {
        self.documents
            .read()
            .await
            .get(hash)
            .cloned()
            .ok_or(GraphError::DocumentNotFound(*hash))
    }

    pub async fn document_exists(&self, hash: &Checksum256) -> bool {
        self.documents.read().await.contains_key(hash)
    }

    /// Replace a document's content
    ///
    /// The new content gets a new hash. Every edge of the old document is
    /// moved to the new one and the old document is erased.
    pub async fn update_document(
        &self,
        original: &Document,
        content: ContentWrapper,
    ) -> GraphResult<Document> {
        let updated = Document::new(original.creator.clone(), content, original.created_date)?;
        if updated.hash == original.hash {
            return Ok(original.clone());
        }

        let existing = self.documents.read().await.get(&updated.hash).cloned();
        let updated = match existing {
            Some(existing) => existing,
            None => {
                self.storage.put_json(&document_key(&updated.hash), &updated).await?;
                self.documents
                    .write()
                    .await
                    .insert(updated.hash, updated.clone());
                updated
            }
        };

        self.replace_node(&original.hash, &updated.hash).await?;
        self.erase_document(&original.hash).await?;

        debug!("Updated document {} -> {}", original.hash, updated.hash);
        Ok(updated)
    }

    /// Remove a document together with every edge touching it
    pub async fn erase_document(&self, hash: &Checksum256) -> GraphResult<()> {
        if !self.document_exists(hash).await {
            return Err(GraphError::DocumentNotFound(*hash));
        }

        {
            let mut edges = self.edges.write().await;
            let touching: Vec<u64> = edges
                .values()
                .filter(|e| e.touches(hash))
                .map(|e| e.id)
                .collect();
            for id in touching {
                self.storage.delete(&edge_key(id)).await?;
                edges.remove(&id);
            }
        }

        self.storage.delete(&document_key(hash)).await?;
        self.documents.write().await.remove(hash);

        debug!("Erased document {}", hash);
        Ok(())
    }

    /// Point every edge of `old` at `new` instead
    ///
    /// An edge that would duplicate one `new` already has is dropped.
    pub async fn replace_node(&self, old: &Checksum256, new: &Checksum256) -> GraphResult<()> {
        if !self.document_exists(new).await {
            return Err(GraphError::DocumentNotFound(*new));
        }

        let mut edges = self.edges.write().await;
        let affected: Vec<u64> = edges
            .values()
            .filter(|e| e.touches(old))
            .map(|e| e.id)
            .collect();

        for id in affected {
            let Some(mut edge) = edges.remove(&id) else {
                continue;
            };
            if edge.from_node == *old {
                edge.from_node = *new;
            }
            if edge.to_node == *old {
                edge.to_node = *new;
            }

            let duplicate = edges
                .values()
                .any(|e| e.matches(&edge.from_node, &edge.to_node, &edge.edge_name));
            if duplicate {
                self.storage.delete(&edge_key(id)).await?;
            } else {
                self.storage.put_json(&edge_key(id), &edge).await?;
                edges.insert(id, edge);
            }
        }

        Ok(())
    }

    pub async fn create_edge(
        &self,
        creator: &Name,
        from: &Checksum256,
        to: &Checksum256,
        name: &str,
        now: TimePoint,
    ) -> GraphResult<Edge> {
        for node in [from, to] {
            if !self.document_exists(node).await {
                return Err(GraphError::DocumentNotFound(*node));
            }
        }

        let mut edges = self.edges.write().await;
        if edges.values().any(|e| e.matches(from, to, name)) {
            return Err(GraphError::EdgeExists {
                from: *from,
                to: *to,
                name: name.to_string(),
            });
        }

        let edge = Edge {
            id: self.next_edge_id.fetch_add(1, Ordering::SeqCst),
            from_node: *from,
            to_node: *to,
            edge_name: name.to_string(),
            creator: creator.clone(),
            created_date: now,
        };
        self.storage.put_json(&edge_key(edge.id), &edge).await?;
        edges.insert(edge.id, edge.clone());

        debug!("Created edge {} --{}--> {}", from, name, to);
        Ok(edge)
    }

    /// Create the edge unless it already exists
    pub async fn ensure_edge(
        &self,
        creator: &Name,
        from: &Checksum256,
        to: &Checksum256,
        name: &str,
        now: TimePoint,
    ) -> GraphResult<Edge> {
        match self.get_edge(from, to, name).await {
            Ok(edge) => Ok(edge),
            Err(GraphError::EdgeNotFound { .. }) => {
                self.create_edge(creator, from, to, name, now).await
            }
            Err(e) => Err(e),
        }
    }

    pub async fn erase_edge(&self, from: &Checksum256, to: &Checksum256, name: &str) -> GraphResult<()> {
        let mut edges = self.edges.write().await;
        let id = edges
            .values()
            .find(|e| e.matches(from, to, name))
            .map(|e| e.id)
            .ok_or_else(|| GraphError::EdgeNotFound {
                from: *from,
                to: *to,
                name: name.to_string(),
            })?;

        self.storage.delete(&edge_key(id)).await?;
        edges.remove(&id);

        debug!("Erased edge {} --{}--> {}", from, name, to);
        Ok(())
    }

    pub async fn edge_exists(&self, from: &Checksum256, to: &Checksum256, name: &str) -> bool {
        self.edges
            .read()
            .await
            .values()
            .any(|e| e.matches(from, to, name))
    }

    pub async fn get_edge(&self, from: &Checksum256, to: &Checksum256, name: &str) -> GraphResult<Edge> {
        self.edges
            .read()
            .await
            .values()
            .find(|e| e.matches(from, to, name))
            .cloned()
            .ok_or_else(|| GraphError::EdgeNotFound {
                from: *from,
                to: *to,
                name: name.to_string(),
            })
    }

    /// Outgoing edges named `name`, oldest first
    pub async fn get_edges_from(&self, from: &Checksum256, name: &str) -> Vec<Edge> {
        self.edges
            .read()
            .await
            .values()
            .filter(|e| &e.from_node == from && e.edge_name == name)
            .cloned()
            .collect()
    }

    /// Incoming edges named `name`, oldest first
    pub async fn get_edges_to(&self, to: &Checksum256, name: &str) -> Vec<Edge> {
        self.edges
            .read()
            .await
            .values()
            .filter(|e| &e.to_node == to && e.edge_name == name)
            .cloned()
            .collect()
    }

    pub async fn get_last_edge_from(&self, from: &Checksum256, name: &str) -> Option<Edge> {
        self.edges
            .read()
            .await
            .values()
            .rev()
            .find(|e| &e.from_node == from && e.edge_name == name)
            .cloned()
    }

    /// Target of the most recent `from --name-->` edge
    pub async fn get_last_document_of_edge(
        &self,
        from: &Checksum256,
        name: &str,
    ) -> GraphResult<Option<Document>> {
        match self.get_last_edge_from(from, name).await {
            Some(edge) => self.load_document(&edge.to_node).await.map(Some),
            None => Ok(None),
        }
    }

    /// Whether any edge starts or ends at `node`
    pub async fn has_edges(&self, node: &Checksum256) -> bool {
        self.edges.read().await.values().any(|e| e.touches(node))
    }

    pub async fn document_count(&self) -> usize {
        self.documents.read().await.len()
    }

    pub async fn edge_count(&self) -> usize {
        self.edges.read().await.len()
    }

    /// Documents whose `system.type` is `doc_type`
    pub async fn documents_of_type(&self, doc_type: &str) -> Vec<Document> {
        self.documents
            .read()
            .await
            .values()
            .filter(|d| d.is_type(doc_type))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::Content;
    use crate::memory_storage::MemoryStorage;
    use crate::storage::FileStorage;
    use chrono::{TimeZone, Utc};
    use tempfile::tempdir;

    fn now() -> TimePoint {
        Utc.with_ymd_and_hms(2021, 6, 1, 0, 0, 0).unwrap()
    }

    fn creator() -> Name {
        Name::new("dao.hypha").unwrap()
    }

    fn node(title: &str) -> ContentWrapper {
        ContentWrapper::new().with_group("details", [Content::new("title", title)])
    }

    async fn memory_graph() -> DocumentGraph {
        DocumentGraph::open(Arc::new(MemoryStorage::new())).await.unwrap()
    }

    #[tokio::test]
    async fn test_identical_content_is_one_document() {
        let graph = memory_graph().await;

        let a = graph.create_document(&creator(), node("a"), now()).await.unwrap();
        let again = graph
            .create_document(&Name::new("alice").unwrap(), node("a"), now())
            .await
            .unwrap();

        assert_eq!(a.hash, again.hash);
        assert_eq!(again.creator, creator());
        assert_eq!(graph.document_count().await, 1);
    }

    #[tokio::test]
    async fn test_edges_are_unique_and_ordered() {
        let graph = memory_graph().await;
        let a = graph.create_document(&creator(), node("a"), now()).await.unwrap();
        let b = graph.create_document(&creator(), node("b"), now()).await.unwrap();
        let c = graph.create_document(&creator(), node("c"), now()).await.unwrap();

        graph.create_edge(&creator(), &a.hash, &b.hash, "link", now()).await.unwrap();
        graph.create_edge(&creator(), &a.hash, &c.hash, "link", now()).await.unwrap();

        let dup = graph.create_edge(&creator(), &a.hash, &b.hash, "link", now()).await;
        assert!(matches!(dup, Err(GraphError::EdgeExists { .. })));

        let from_a = graph.get_edges_from(&a.hash, "link").await;
        assert_eq!(from_a.len(), 2);
        assert_eq!(from_a[0].to_node, b.hash);

        let last = graph.get_last_document_of_edge(&a.hash, "link").await.unwrap().unwrap();
        assert_eq!(last.hash, c.hash);

        graph.erase_edge(&a.hash, &c.hash, "link").await.unwrap();
        assert!(!graph.edge_exists(&a.hash, &c.hash, "link").await);
        assert!(!graph.has_edges(&c.hash).await);

        let missing = graph.erase_edge(&a.hash, &c.hash, "link").await;
        assert!(matches!(missing, Err(GraphError::EdgeNotFound { .. })));
    }

    #[tokio::test]
    async fn test_edge_requires_both_documents() {
        let graph = memory_graph().await;
        let a = graph.create_document(&creator(), node("a"), now()).await.unwrap();
        let ghost = Checksum256::hash(b"ghost");

        let result = graph.create_edge(&creator(), &a.hash, &ghost, "link", now()).await;
        assert!(matches!(result, Err(GraphError::DocumentNotFound(h)) if h == ghost));
    }

    #[tokio::test]
    async fn test_update_document_moves_edges() {
        let graph = memory_graph().await;
        let root = graph.create_document(&creator(), node("root"), now()).await.unwrap();
        let doc = graph.create_document(&creator(), node("draft"), now()).await.unwrap();
        let child = graph.create_document(&creator(), node("child"), now()).await.unwrap();

        graph.create_edge(&creator(), &root.hash, &doc.hash, "proposal", now()).await.unwrap();
        graph.create_edge(&creator(), &doc.hash, &child.hash, "votetally", now()).await.unwrap();

        let mut content = doc.content.clone();
        content.insert_or_replace("details", Content::new("title", "final"));
        let updated = graph.update_document(&doc, content).await.unwrap();

        assert_ne!(updated.hash, doc.hash);
        assert!(!graph.document_exists(&doc.hash).await);
        assert!(graph.edge_exists(&root.hash, &updated.hash, "proposal").await);
        assert!(graph.edge_exists(&updated.hash, &child.hash, "votetally").await);
        assert_eq!(graph.edge_count().await, 2);
    }

    #[tokio::test]
    async fn test_erase_document_removes_edges() {
        let graph = memory_graph().await;
        let a = graph.create_document(&creator(), node("a"), now()).await.unwrap();
        let b = graph.create_document(&creator(), node("b"), now()).await.unwrap();
        graph.create_edge(&creator(), &a.hash, &b.hash, "link", now()).await.unwrap();

        graph.erase_document(&b.hash).await.unwrap();
        assert_eq!(graph.edge_count().await, 0);
        assert!(matches!(
            graph.load_document(&b.hash).await,
            Err(GraphError::DocumentNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_reopen_from_file_storage() {
        let dir = tempdir().unwrap();
        let storage: Arc<dyn Storage> = Arc::new(FileStorage::new(dir.path().to_path_buf()).unwrap());

        let (a, b) = {
            let graph = DocumentGraph::open(storage.clone()).await.unwrap();
            let a = graph.create_document(&creator(), node("a"), now()).await.unwrap();
            let b = graph.create_document(&creator(), node("b"), now()).await.unwrap();
            graph.create_edge(&creator(), &a.hash, &b.hash, "link", now()).await.unwrap();
            (a, b)
        };

        let reopened = DocumentGraph::open(storage).await.unwrap();
        assert_eq!(reopened.document_count().await, 2);
        assert!(reopened.edge_exists(&a.hash, &b.hash, "link").await);

        let c = reopened.create_document(&creator(), node("c"), now()).await.unwrap();
        let edge = reopened.create_edge(&creator(), &b.hash, &c.hash, "link", now()).await.unwrap();
        assert_eq!(edge.id, 2);
    }
}
