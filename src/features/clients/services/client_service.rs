use std::sync::Arc;

use tracing::info;

use crate::core::error::{AppError, Result};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::auth::AccessPolicy;
use crate::features::clients::dtos::{ClientResponseDto, CreateClientDto, UpdateClientDto};
use crate::features::clients::repositories::{ClientDeletion, ClientRepository};

/// Service for client operations
pub struct ClientService {
    repo: Arc<dyn ClientRepository>,
    policy: Arc<AccessPolicy>,
}

impl ClientService {
    pub fn new(repo: Arc<dyn ClientRepository>, policy: Arc<AccessPolicy>) -> Self {
        Self { repo, policy }
    }

    /// List clients visible to `user`.
    ///
    /// Restricted callers see clients without files plus clients holding at
    /// least one of their own files; `file_count` then only counts their files.
    pub async fn list(&self, user: &AuthenticatedUser) -> Result<Vec<ClientResponseDto>> {
        let visibility = self.policy.visibility(user);
        let clients = self.repo.list(&visibility).await?;
        Ok(clients.into_iter().map(Into::into).collect())
    }

    /// Get a client by id. No role filter applies here.
    pub async fn get_by_id(&self, id: i64) -> Result<ClientResponseDto> {
        self.repo
            .find_by_id(id)
            .await?
            .map(Into::into)
            .ok_or_else(|| AppError::NotFound(format!("Client with id {} not found", id)))
    }

    pub async fn create(&self, dto: CreateClientDto) -> Result<ClientResponseDto> {
        let client = self.repo.create(&dto.name, &dto.code).await?;
        info!("Client created: id={}, code={}", client.id, client.code);
        Ok(client.into())
    }

    pub async fn update(&self, id: i64, dto: UpdateClientDto) -> Result<ClientResponseDto> {
        let client = self
            .repo
            .update(id, &dto.name, &dto.code)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Client with id {} not found", id)))?;

        info!("Client updated: id={}, code={}", client.id, client.code);
        Ok(client.into())
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        match self.repo.delete(id).await? {
            ClientDeletion::Deleted => {
                info!("Client deleted: id={}", id);
                Ok(())
            }
            ClientDeletion::NotFound => Err(AppError::NotFound(format!(
                "Client with id {} not found",
                id
            ))),
            ClientDeletion::HasFiles(count) => Err(AppError::Conflict(format!(
                "Cannot delete client with {} associated file(s)",
                count
            ))),
        }
    }
}
