//! Document graph for the DHO engine
//!
//! This crate provides:
//! - typed document content ([`ContentWrapper`], [`FlexValue`])
//! - content-addressed documents and labeled, ordered edges
//! - the [`DocumentGraph`] index over a pluggable [`Storage`] backend

pub mod content;
pub mod document;
pub mod edge;
pub mod error;
pub mod graph;
pub mod memory_storage;
pub mod storage;

pub use content::{content_group, group_label, system_group, Content, ContentGroup, ContentWrapper, FlexValue};
pub use document::Document;
pub use edge::Edge;
pub use error::{GraphError, GraphResult};
pub use graph::DocumentGraph;
pub use memory_storage::MemoryStorage;
pub use storage::{FileStorage, JsonStorage, Storage, StorageError, StorageResult};
