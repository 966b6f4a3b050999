/// Durable persistence for the retrieval core
mod ministry_registry;

pub use ministry_registry::MinistryRegistry;
