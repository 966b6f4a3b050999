/// Embedding infrastructure
mod fastembed_service;

pub use fastembed_service::FastEmbedService;
