//! Retrieval and indexing core for a ministry document question-answering
//! service.
//!
//! Documents are split into overlapping chunks, embedded with a local
//! sentence-transformer model, and stored in a qdrant collection keyed by
//! content-derived ids. Queries are embedded the same way and answered with
//! a ministry-filtered nearest-neighbor search that falls back to an
//! unfiltered search when the filter path is unhealthy.

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use application::services::DocumentStore;
pub use config::AppConfig;
