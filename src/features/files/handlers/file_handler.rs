use axum::{
    extract::{multipart::Field, Multipart, Query, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use tracing::debug;

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppPath;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::files::dtos::{
    parse_client_id, FileResponseDto, ListFilesQuery, UploadFileDto,
};
use crate::features::files::services::{FileService, FileUpload};
use crate::shared::constants::FALLBACK_CONTENT_TYPE;
use crate::shared::types::{ApiResponse, Meta};
use crate::shared::validation::non_blank;

/// List files of a client
///
/// Privileged roles see every file; other roles only their own uploads.
#[utoipa::path(
    get,
    path = "/api/files",
    params(ListFilesQuery),
    responses(
        (status = 200, description = "Files of the client", body = ApiResponse<Vec<FileResponseDto>>),
        (status = 400, description = "client_id missing or invalid"),
        (status = 401, description = "Authentication required")
    ),
    tag = "files",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_files(
    user: AuthenticatedUser,
    State(service): State<Arc<FileService>>,
    Query(query): Query<ListFilesQuery>,
) -> Result<Json<ApiResponse<Vec<FileResponseDto>>>> {
    let client_id = parse_client_id(query.client_id.as_deref()).map_err(AppError::Validation)?;

    let files = service.list(client_id, &user).await?;
    let total = files.len() as i64;
    Ok(Json(ApiResponse::success(
        Some(files),
        None,
        Some(Meta { total }),
    )))
}

/// Get file metadata by ID
///
/// Only the uploader or a privileged role may read it.
#[utoipa::path(
    get,
    path = "/api/files/{id}",
    params(
        ("id" = i64, Path, description = "File ID")
    ),
    responses(
        (status = 200, description = "File found", body = ApiResponse<FileResponseDto>),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "Not authorized to access this file"),
        (status = 404, description = "File not found")
    ),
    tag = "files",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_file(
    user: AuthenticatedUser,
    State(service): State<Arc<FileService>>,
    AppPath(id): AppPath<i64>,
) -> Result<Json<ApiResponse<FileResponseDto>>> {
    let file = service.get_by_id(id, &user).await?;
    Ok(Json(ApiResponse::success(Some(file), None, None)))
}

async fn read_text(field: Field<'_>, name: &str) -> Result<String> {
    field
        .text()
        .await
        .map_err(|e| AppError::BadRequest(format!("Failed to read {} field: {}", name, e)))
}

/// Upload a file for a client
///
/// Accepts multipart/form-data with:
/// - `file`: The file to upload (required)
/// - `client_id`: Owning client (required)
/// - `name`: Display name (required)
/// - `category`: Document category (required)
/// - `description`: Optional free text
#[utoipa::path(
    post,
    path = "/api/files",
    tag = "files",
    request_body(
        content = UploadFileDto,
        content_type = "multipart/form-data",
        description = "File upload form with client_id, name, category and optional description",
    ),
    responses(
        (status = 201, description = "File uploaded successfully", body = ApiResponse<FileResponseDto>),
        (status = 400, description = "Missing file or required field"),
        (status = 401, description = "Authentication required")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn upload_file(
    user: AuthenticatedUser,
    State(service): State<Arc<FileService>>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<ApiResponse<FileResponseDto>>)> {
    let mut file_data: Option<Vec<u8>> = None;
    let mut file_name: Option<String> = None;
    let mut content_type: Option<String> = None;
    let mut client_id: Option<String> = None;
    let mut name: Option<String> = None;
    let mut category: Option<String> = None;
    let mut description: Option<String> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        debug!("Failed to read multipart field: {}", e);
        AppError::BadRequest(format!("Failed to read multipart data: {}", e))
    })? {
        let field_name = field.name().unwrap_or("").to_string();

        match field_name.as_str() {
            "file" => {
                let fname = field
                    .file_name()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "unnamed".to_string());

                let ct = field.content_type().map(|s| s.to_string());

                let data = field.bytes().await.map_err(|e| {
                    debug!("Failed to read file bytes: {}", e);
                    AppError::BadRequest(format!("Failed to read file data: {}", e))
                })?;

                file_data = Some(data.to_vec());
                file_name = Some(fname);
                content_type = ct;
            }
            "client_id" => client_id = Some(read_text(field, "client_id").await?),
            "name" => name = non_blank(Some(read_text(field, "name").await?)),
            "category" => category = non_blank(Some(read_text(field, "category").await?)),
            "description" => {
                description = non_blank(Some(read_text(field, "description").await?))
            }
            _ => {
                debug!("Ignoring unknown field: {}", field_name);
            }
        }
    }

    // Validate everything before touching the disk
    let file_data =
        file_data.ok_or_else(|| AppError::Validation("File is required".to_string()))?;
    let file_name = file_name.unwrap_or_else(|| "unnamed".to_string());

    let mut missing = Vec::new();
    if non_blank(client_id.clone()).is_none() {
        missing.push("client_id");
    }
    if name.is_none() {
        missing.push("name");
    }
    if category.is_none() {
        missing.push("category");
    }
    if !missing.is_empty() {
        return Err(AppError::Validation(format!(
            "Missing required fields: {}",
            missing.join(", ")
        )));
    }

    let client_id = parse_client_id(client_id.as_deref()).map_err(AppError::Validation)?;

    let content_type = content_type.unwrap_or_else(|| {
        mime_guess::from_path(&file_name)
            .first()
            .map(|m| m.essence_str().to_string())
            .unwrap_or_else(|| FALLBACK_CONTENT_TYPE.to_string())
    });

    let upload = FileUpload {
        client_id,
        name: name.unwrap_or_default(),
        category: category.unwrap_or_default(),
        description,
        original_filename: file_name,
        content_type,
        data: file_data,
    };

    let response = service.upload(upload, &user).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(response),
            Some("File uploaded successfully".to_string()),
            None,
        )),
    ))
}

/// Delete a file
///
/// Only the uploader or a privileged role may delete it. The database row is
/// always removed; failing to remove the stored binary is only logged.
#[utoipa::path(
    delete,
    path = "/api/files/{id}",
    params(
        ("id" = i64, Path, description = "File ID")
    ),
    responses(
        (status = 200, description = "File deleted successfully"),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "Not authorized to delete this file"),
        (status = 404, description = "File not found")
    ),
    tag = "files",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_file(
    user: AuthenticatedUser,
    State(service): State<Arc<FileService>>,
    AppPath(id): AppPath<i64>,
) -> Result<Json<ApiResponse<()>>> {
    service.delete(id, &user).await?;

    Ok(Json(ApiResponse::success(
        None,
        Some("File deleted successfully".to_string()),
        None,
    )))
}
