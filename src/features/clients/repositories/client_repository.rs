use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::core::error::Result;
use crate::features::auth::Visibility;
use crate::features::clients::models::Client;

/// Outcome of a guarded client delete
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientDeletion {
    Deleted,
    NotFound,
    /// Client still has this many files attached
    HasFiles(i64),
}

/// Persistence for the `clients` table
#[async_trait]
pub trait ClientRepository: Send + Sync {
    /// All clients visible under `visibility`, with file counts, ordered by id
    async fn list(&self, visibility: &Visibility) -> Result<Vec<Client>>;

    /// One client with its total file count
    async fn find_by_id(&self, id: i64) -> Result<Option<Client>>;

    async fn create(&self, name: &str, code: &str) -> Result<Client>;

    /// Overwrite name and code; `None` when the client does not exist
    async fn update(&self, id: i64, name: &str, code: &str) -> Result<Option<Client>>;

    /// Delete a client unless files still reference it
    async fn delete(&self, id: i64) -> Result<ClientDeletion>;
}

pub struct PgClientRepository {
    pool: PgPool,
}

impl PgClientRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ClientRepository for PgClientRepository {
    async fn list(&self, visibility: &Visibility) -> Result<Vec<Client>> {
        let mut qb = QueryBuilder::<Postgres>::new(
            r#"
            SELECT c.id, c.name, c.code, c.created_at, c.updated_at,
                   COUNT(f.id) AS file_count
            FROM clients c
            LEFT JOIN files f ON f.client_id = c.id
            "#,
        );
        visibility.push_client_join_filter(&mut qb, "f");
        qb.push(" GROUP BY c.id ORDER BY c.id");

        let clients = qb
            .build_query_as::<Client>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list clients: {:?}", e);
                e
            })?;

        Ok(clients)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Client>> {
        let client = sqlx::query_as::<_, Client>(
            r#"
            SELECT c.id, c.name, c.code, c.created_at, c.updated_at,
                   (SELECT COUNT(*) FROM files f WHERE f.client_id = c.id) AS file_count
            FROM clients c
            WHERE c.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(client)
    }

    async fn create(&self, name: &str, code: &str) -> Result<Client> {
        let client = sqlx::query_as::<_, Client>(
            r#"
            INSERT INTO clients (name, code)
            VALUES ($1, $2)
            RETURNING id, name, code, created_at, updated_at, 0::BIGINT AS file_count
            "#,
        )
        .bind(name)
        .bind(code)
        .fetch_one(&self.pool)
        .await?;

        Ok(client)
    }

    async fn update(&self, id: i64, name: &str, code: &str) -> Result<Option<Client>> {
        let client = sqlx::query_as::<_, Client>(
            r#"
            UPDATE clients
            SET name = $2, code = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING id, name, code, created_at, updated_at,
                      (SELECT COUNT(*) FROM files f WHERE f.client_id = clients.id) AS file_count
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;

        Ok(client)
    }

    async fn delete(&self, id: i64) -> Result<ClientDeletion> {
        let mut tx = self.pool.begin().await?;

        // Row lock blocks concurrent uploads for this client until commit
        let existing = sqlx::query_scalar::<_, i64>("SELECT id FROM clients WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;

        if existing.is_none() {
            return Ok(ClientDeletion::NotFound);
        }

        let file_count =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM files WHERE client_id = $1")
                .bind(id)
                .fetch_one(&mut *tx)
                .await?;

        if file_count > 0 {
            return Ok(ClientDeletion::HasFiles(file_count));
        }

        sqlx::query("DELETE FROM clients WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(ClientDeletion::Deleted)
    }
}
