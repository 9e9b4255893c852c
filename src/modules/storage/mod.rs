//! Storage module for uploaded documents
//!
//! Binaries live on local disk; only their path is recorded in the database.

mod local_disk;

pub use local_disk::{LocalDiskStorage, StorageError, StoredObject};
