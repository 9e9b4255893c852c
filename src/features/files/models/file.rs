use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for an uploaded document
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct File {
    pub id: i64,
    pub client_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub category: String,
    /// Location of the stored binary on disk
    pub path: String,
    /// MIME type
    #[sqlx(rename = "type")]
    pub file_type: String,
    pub size: i64,
    pub uploaded_by: String,
    pub created_at: DateTime<Utc>,
}

/// Metadata for a binary that has already been written to disk
#[derive(Debug, Clone)]
pub struct NewFile {
    pub client_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub category: String,
    pub path: String,
    pub file_type: String,
    pub size: i64,
    pub uploaded_by: String,
}
