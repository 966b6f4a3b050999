pub mod dto;
pub mod ports;
pub mod services;

pub use dto::{ChunkInput, RankedResult, SearchOutcome};
pub use ports::{Embedder, VectorIndex};
pub use services::{
    DocumentStore, IndexingService, IndexingStats, RetrievalService,
};
