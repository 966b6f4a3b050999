/// Ports the application services depend on
mod embedder;
mod vector_index;

pub use embedder::Embedder;
pub use vector_index::VectorIndex;
