use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for a client, with its file count aggregated at query time
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Client {
    pub id: i64,
    pub name: String,
    pub code: String,
    pub file_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
