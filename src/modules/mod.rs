//! Modules layer - Infrastructure components outside the database
//!
//! Contains adapters for the local filesystem used by file uploads.

pub mod storage;
