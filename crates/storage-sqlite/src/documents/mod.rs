mod model;
mod repository;

pub use model::{DocumentDB, StoredDocument};
pub use repository::{merge_patch, DocumentRepository};
