//! Catalog-backed collaborators: repository store, search contexts, index

pub mod catalog;
pub mod contexts;
pub mod memory;

pub use catalog::{Catalog, ContextRepoRecord, RepoRecord, SearchContextRecord, UserRecord};
pub use contexts::{StaticIndex, StaticSearchContexts};
pub use memory::MemoryRepoStore;
