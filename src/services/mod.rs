// Service exports
pub mod cache;
pub mod firestore;

pub use cache::{CacheManager, CacheStats};
pub use firestore::{FirestoreClient, FirestoreCollections, FirestoreError};
