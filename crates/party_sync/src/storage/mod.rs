pub mod file_store;
pub mod memory_store;
pub mod provider;

pub use file_store::FileDocumentStore;
pub use memory_store::MemoryDocumentStore;
pub use provider::DocumentStore;
