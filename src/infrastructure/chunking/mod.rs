/// Document text chunking
mod recursive_splitter;

pub use recursive_splitter::TextChunker;
