pub mod document_store;
pub mod indexing_service;
pub mod retrieval_service;

pub use document_store::DocumentStore;
pub use indexing_service::{IndexingService, IndexingStats};
pub use retrieval_service::RetrievalService;
