pub mod client;
pub mod local;

pub use client::{ObjectStore, ObjectStoreError, StoredObject};
pub use local::LocalObjectStore;
