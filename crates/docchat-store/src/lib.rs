//! Document Store: persists the currently staged document to disk.
//!
//! Staging writes the uploaded bytes through a scoped exclusive temp-file
//! handle that is flushed, synced, and atomically renamed into place. A
//! partially written document is never observable at the final path, so a
//! concurrently triggered ingestion cannot read a corrupt file.

pub mod store;

pub use store::DocumentStore;
