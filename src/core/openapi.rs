use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::features::auth;
use crate::features::clients::{dtos as clients_dtos, handlers as clients_handlers};
use crate::features::files::{dtos as files_dtos, handlers as files_handlers};
use crate::shared::types::{ApiResponse, Meta};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Auth
        auth::handler::get_me,
        // Clients
        clients_handlers::list_clients,
        clients_handlers::get_client,
        clients_handlers::create_client,
        clients_handlers::update_client,
        clients_handlers::delete_client,
        // Files
        files_handlers::list_files,
        files_handlers::get_file,
        files_handlers::upload_file,
        files_handlers::delete_file,
    ),
    components(
        schemas(
            // Shared
            Meta,
            // Auth
            auth::dto::MeResponseDto,
            auth::model::AuthenticatedUser,
            ApiResponse<auth::dto::MeResponseDto>,
            // Clients
            clients_dtos::CreateClientDto,
            clients_dtos::UpdateClientDto,
            clients_dtos::ClientResponseDto,
            ApiResponse<clients_dtos::ClientResponseDto>,
            ApiResponse<Vec<clients_dtos::ClientResponseDto>>,
            // Files
            files_dtos::UploadFileDto,
            files_dtos::FileResponseDto,
            ApiResponse<files_dtos::FileResponseDto>,
            ApiResponse<Vec<files_dtos::FileResponseDto>>,
        )
    ),
    tags(
        (name = "auth", description = "Current caller"),
        (name = "clients", description = "Client records"),
        (name = "files", description = "Documents uploaded for clients"),
    ),
    modifiers(&SecurityAddon),
    info(
        title = "Clientvault API",
        version = "0.1.0",
        description = "API documentation for Clientvault",
    )
)]
pub struct ApiDoc;

/// Adds Bearer JWT security scheme to OpenAPI spec
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}
