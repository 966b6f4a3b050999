/// Vector index infrastructure
mod qdrant_index;

pub use qdrant_index::QdrantVectorIndex;
