use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::core::error::{AppError, Result};
use crate::features::auth::Visibility;
use crate::features::files::models::{File, NewFile};

const FILE_COLUMNS: &str =
    "id, client_id, name, description, category, path, type, size, uploaded_by, created_at";

/// Persistence for the `files` table
#[async_trait]
pub trait FileRepository: Send + Sync {
    /// Files of one client visible under `visibility`, ordered by id
    async fn list_for_client(&self, client_id: i64, visibility: &Visibility) -> Result<Vec<File>>;

    async fn find_by_id(&self, id: i64) -> Result<Option<File>>;

    /// Insert metadata; a `client_id` without a client is a validation error
    async fn create(&self, file: NewFile) -> Result<File>;

    /// Delete the row, returning it if it existed
    async fn delete(&self, id: i64) -> Result<Option<File>>;
}

/// Map constraint violations to client errors
fn handle_db_error(e: sqlx::Error, client_id: i64) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        // foreign_key_violation
        if db_err.code().as_deref() == Some("23503") {
            return AppError::Validation(format!("Client with id {} does not exist", client_id));
        }
    }
    AppError::Database(e)
}

pub struct PgFileRepository {
    pool: PgPool,
}

impl PgFileRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FileRepository for PgFileRepository {
    async fn list_for_client(&self, client_id: i64, visibility: &Visibility) -> Result<Vec<File>> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT ");
        qb.push(FILE_COLUMNS)
            .push(" FROM files WHERE client_id = ")
            .push_bind(client_id);
        visibility.push_owner_filter(&mut qb, "uploaded_by");
        qb.push(" ORDER BY id");

        let files = qb
            .build_query_as::<File>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list files for client {}: {:?}", client_id, e);
                e
            })?;

        Ok(files)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<File>> {
        let file = sqlx::query_as::<_, File>(&format!(
            "SELECT {} FROM files WHERE id = $1",
            FILE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(file)
    }

    async fn create(&self, file: NewFile) -> Result<File> {
        let client_id = file.client_id;
        let created = sqlx::query_as::<_, File>(&format!(
            r#"
            INSERT INTO files (client_id, name, description, category, path, type, size, uploaded_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {}
            "#,
            FILE_COLUMNS
        ))
        .bind(file.client_id)
        .bind(file.name)
        .bind(file.description)
        .bind(file.category)
        .bind(file.path)
        .bind(file.file_type)
        .bind(file.size)
        .bind(file.uploaded_by)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| handle_db_error(e, client_id))?;

        Ok(created)
    }

    async fn delete(&self, id: i64) -> Result<Option<File>> {
        let deleted = sqlx::query_as::<_, File>(&format!(
            "DELETE FROM files WHERE id = $1 RETURNING {}",
            FILE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(deleted)
    }
}
