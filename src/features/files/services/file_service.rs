use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::core::error::{AppError, Result};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::auth::AccessPolicy;
use crate::features::files::dtos::FileResponseDto;
use crate::features::files::models::{File, NewFile};
use crate::features::files::repositories::FileRepository;
use crate::modules::storage::LocalDiskStorage;

/// A validated upload, still in memory
#[derive(Debug)]
pub struct FileUpload {
    pub client_id: i64,
    pub name: String,
    pub category: String,
    pub description: Option<String>,
    pub original_filename: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

/// Service for file operations
pub struct FileService {
    repo: Arc<dyn FileRepository>,
    storage: Arc<LocalDiskStorage>,
    policy: Arc<AccessPolicy>,
    max_upload_size: usize,
}

impl FileService {
    pub fn new(
        repo: Arc<dyn FileRepository>,
        storage: Arc<LocalDiskStorage>,
        policy: Arc<AccessPolicy>,
        max_upload_size: usize,
    ) -> Self {
        Self {
            repo,
            storage,
            policy,
            max_upload_size,
        }
    }

    pub fn max_upload_size(&self) -> usize {
        self.max_upload_size
    }

    /// List the files of a client, restricted to the caller's own uploads
    /// unless the caller is privileged
    pub async fn list(
        &self,
        client_id: i64,
        user: &AuthenticatedUser,
    ) -> Result<Vec<FileResponseDto>> {
        let visibility = self.policy.visibility(user);
        let files = self.repo.list_for_client(client_id, &visibility).await?;
        Ok(files.into_iter().map(Into::into).collect())
    }

    pub async fn get_by_id(&self, id: i64, user: &AuthenticatedUser) -> Result<FileResponseDto> {
        let file = self.find_permitted(id, user, "access").await?;
        Ok(file.into())
    }

    /// Write the binary to disk and record its metadata
    ///
    /// # Arguments
    /// * `upload` - Validated form fields and file content
    /// * `user` - The uploader, recorded as `uploaded_by`
    ///
    /// # Returns
    /// The created file metadata
    pub async fn upload(
        &self,
        upload: FileUpload,
        user: &AuthenticatedUser,
    ) -> Result<FileResponseDto> {
        if upload.data.len() > self.max_upload_size {
            return Err(AppError::Validation(format!(
                "File too large. Maximum size is {} bytes",
                self.max_upload_size
            )));
        }

        let stored = self
            .storage
            .store(upload.client_id, &upload.original_filename, &upload.data)
            .await?;

        debug!("File written to disk: {}", stored.path);

        let new_file = NewFile {
            client_id: upload.client_id,
            name: upload.name,
            description: upload.description,
            category: upload.category,
            path: stored.path.clone(),
            file_type: upload.content_type,
            size: stored.size,
            uploaded_by: user.user_id.clone(),
        };

        let file = match self.repo.create(new_file).await {
            Ok(file) => file,
            Err(e) => {
                if let Err(cleanup) = self.storage.remove(&stored.path).await {
                    warn!(
                        "Failed to remove {} after metadata insert failed: {}",
                        stored.path, cleanup
                    );
                }
                return Err(e);
            }
        };

        info!(
            "File uploaded: id={}, client_id={}, size={}, uploaded_by={}",
            file.id, file.client_id, file.size, file.uploaded_by
        );

        Ok(file.into())
    }

    /// Delete a file's row, then its binary.
    ///
    /// Failing to remove the binary is logged and does not fail the delete.
    pub async fn delete(&self, id: i64, user: &AuthenticatedUser) -> Result<()> {
        self.find_permitted(id, user, "delete").await?;

        let Some(file) = self.repo.delete(id).await? else {
            return Err(AppError::NotFound(format!("File with id {} not found", id)));
        };

        if let Err(e) = self.storage.remove(&file.path).await {
            warn!("File {} deleted but its binary was not removed: {}", file.id, e);
        }

        info!("File deleted: id={}, path={}", file.id, file.path);
        Ok(())
    }

    async fn find_permitted(&self, id: i64, user: &AuthenticatedUser, action: &str) -> Result<File> {
        let file = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("File with id {} not found", id)))?;

        if !self.policy.visibility(user).permits(&file.uploaded_by) {
            return Err(AppError::Forbidden(format!(
                "You do not have permission to {} this file",
                action
            )));
        }

        Ok(file)
    }
}
