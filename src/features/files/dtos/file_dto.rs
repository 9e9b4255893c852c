use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::features::files::models::File;

/// Upload file request DTO for OpenAPI documentation
/// Note: This struct is for Swagger UI documentation only.
/// The actual handler uses axum's Multipart extractor directly.
#[derive(Debug, ToSchema)]
pub struct UploadFileDto {
    /// The file to upload
    #[schema(format = Binary, content_media_type = "application/octet-stream")]
    pub file: String,
    /// Client the document belongs to
    #[schema(example = 1)]
    pub client_id: i64,
    /// Display name of the document
    #[schema(example = "2024 engagement letter")]
    pub name: String,
    #[schema(example = "contract")]
    pub category: String,
    pub description: Option<String>,
}

/// Query params for listing files
#[derive(Debug, Deserialize, IntoParams)]
pub struct ListFilesQuery {
    /// Client whose files to list (required)
    pub client_id: Option<String>,
}

/// Response DTO for file operations
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FileResponseDto {
    pub id: i64,
    pub client_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub category: String,
    /// Location of the stored binary
    pub path: String,
    /// MIME type of the file
    #[serde(rename = "type")]
    pub file_type: String,
    /// Size of the file in bytes
    pub size: i64,
    /// User who uploaded the file
    pub uploaded_by: String,
    pub created_at: DateTime<Utc>,
}

impl From<File> for FileResponseDto {
    fn from(f: File) -> Self {
        Self {
            id: f.id,
            client_id: f.client_id,
            name: f.name,
            description: f.description,
            category: f.category,
            path: f.path,
            file_type: f.file_type,
            size: f.size,
            uploaded_by: f.uploaded_by,
            created_at: f.created_at,
        }
    }
}

/// Parse a required integer id from a query or form value
pub fn parse_client_id(raw: Option<&str>) -> Result<i64, String> {
    let raw = raw
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| "client_id is required".to_string())?;
    raw.parse::<i64>()
        .map_err(|_| format!("client_id must be an integer, got '{}'", raw))
}
