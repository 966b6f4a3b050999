// Infrastructure layer module
pub mod chunking;
pub mod embeddings;
pub mod persistence;
pub mod vector_index;
