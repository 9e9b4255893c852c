use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::{AppJson, AppPath};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::clients::dtos::{ClientResponseDto, CreateClientDto, UpdateClientDto};
use crate::features::clients::services::ClientService;
use crate::shared::types::{ApiResponse, Meta};

/// List clients with their file counts
///
/// Privileged roles see every client. Other roles see clients without files
/// and clients holding at least one file they uploaded.
#[utoipa::path(
    get,
    path = "/api/clients",
    responses(
        (status = 200, description = "List of clients", body = ApiResponse<Vec<ClientResponseDto>>),
        (status = 401, description = "Authentication required")
    ),
    tag = "clients",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_clients(
    user: AuthenticatedUser,
    State(service): State<Arc<ClientService>>,
) -> Result<Json<ApiResponse<Vec<ClientResponseDto>>>> {
    let clients = service.list(&user).await?;
    let total = clients.len() as i64;
    Ok(Json(ApiResponse::success(
        Some(clients),
        None,
        Some(Meta { total }),
    )))
}

/// Get a client by ID
#[utoipa::path(
    get,
    path = "/api/clients/{id}",
    params(
        ("id" = i64, Path, description = "Client ID")
    ),
    responses(
        (status = 200, description = "Client found", body = ApiResponse<ClientResponseDto>),
        (status = 401, description = "Authentication required"),
        (status = 404, description = "Client not found")
    ),
    tag = "clients",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_client(
    _user: AuthenticatedUser,
    State(service): State<Arc<ClientService>>,
    AppPath(id): AppPath<i64>,
) -> Result<Json<ApiResponse<ClientResponseDto>>> {
    let client = service.get_by_id(id).await?;
    Ok(Json(ApiResponse::success(Some(client), None, None)))
}

/// Create a client
#[utoipa::path(
    post,
    path = "/api/clients",
    request_body = CreateClientDto,
    responses(
        (status = 201, description = "Client created", body = ApiResponse<ClientResponseDto>),
        (status = 400, description = "Name or code missing"),
        (status = 401, description = "Authentication required")
    ),
    tag = "clients",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_client(
    _user: AuthenticatedUser,
    State(service): State<Arc<ClientService>>,
    AppJson(dto): AppJson<CreateClientDto>,
) -> Result<(StatusCode, Json<ApiResponse<ClientResponseDto>>)> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let client = service.create(dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(client),
            Some("Client created successfully".to_string()),
            None,
        )),
    ))
}

/// Replace a client's name and code
#[utoipa::path(
    put,
    path = "/api/clients/{id}",
    params(
        ("id" = i64, Path, description = "Client ID")
    ),
    request_body = UpdateClientDto,
    responses(
        (status = 200, description = "Client updated", body = ApiResponse<ClientResponseDto>),
        (status = 400, description = "Name or code missing"),
        (status = 401, description = "Authentication required"),
        (status = 404, description = "Client not found")
    ),
    tag = "clients",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_client(
    _user: AuthenticatedUser,
    State(service): State<Arc<ClientService>>,
    AppPath(id): AppPath<i64>,
    AppJson(dto): AppJson<UpdateClientDto>,
) -> Result<Json<ApiResponse<ClientResponseDto>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let client = service.update(id, dto).await?;
    Ok(Json(ApiResponse::success(
        Some(client),
        Some("Client updated successfully".to_string()),
        None,
    )))
}

/// Delete a client
///
/// Refused while any file is still attached to the client.
#[utoipa::path(
    delete,
    path = "/api/clients/{id}",
    params(
        ("id" = i64, Path, description = "Client ID")
    ),
    responses(
        (status = 200, description = "Client deleted"),
        (status = 400, description = "Client still has files"),
        (status = 401, description = "Authentication required"),
        (status = 404, description = "Client not found")
    ),
    tag = "clients",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_client(
    _user: AuthenticatedUser,
    State(service): State<Arc<ClientService>>,
    AppPath(id): AppPath<i64>,
) -> Result<Json<ApiResponse<()>>> {
    service.delete(id).await?;
    Ok(Json(ApiResponse::success(
        None,
        Some("Client deleted successfully".to_string()),
        None,
    )))
}
