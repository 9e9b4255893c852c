//! HTTP application assembly shared by the binary and the router tests.

use std::sync::Arc;

use axum::{http::StatusCode, middleware::from_fn, routing::get, Router};
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use crate::core::config::SwaggerConfig;
use crate::core::middleware;
use crate::core::openapi::{ApiDoc, SwaggerInfoModifier};
use crate::features::auth::{routes as auth_routes, AccessPolicy, JwtValidator};
use crate::features::clients::{self, ClientService};
use crate::features::files::{self, FileService};

/// Everything the routes need, already wired to their backends
pub struct AppServices {
    pub jwt_validator: Arc<JwtValidator>,
    pub policy: Arc<AccessPolicy>,
    pub client_service: Arc<ClientService>,
    pub file_service: Arc<FileService>,
}

async fn health_check() -> StatusCode {
    StatusCode::OK
}

fn swagger_router(config: &SwaggerConfig) -> Router {
    let mut openapi = ApiDoc::openapi();
    SwaggerInfoModifier {
        title: config.title.clone(),
        version: config.version.clone(),
        description: config.description.clone(),
    }
    .modify(&mut openapi);

    let swagger = SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi);

    match config.credentials() {
        Some(credentials) => {
            tracing::info!("Swagger UI basic auth enabled");
            Router::new()
                .merge(swagger)
                .layer(from_fn(middleware::basic_auth_middleware(Arc::new(
                    credentials,
                ))))
        }
        None => {
            tracing::info!("Swagger UI basic auth disabled (no credentials configured)");
            Router::new().merge(swagger)
        }
    }
}

/// Build the full router: swagger, `/health`, and the JWT-protected API
pub fn build_router(
    services: AppServices,
    cors_allowed_origins: Vec<String>,
    swagger: &SwaggerConfig,
) -> Router {
    let protected_routes = Router::new()
        .merge(auth_routes::protected_routes(services.policy))
        .merge(clients::routes(services.client_service))
        .merge(files::routes(services.file_service))
        .route_layer(axum::middleware::from_fn_with_state(
            services.jwt_validator,
            middleware::auth_middleware,
        ));

    Router::new()
        .merge(swagger_router(swagger))
        .merge(protected_routes)
        .route("/health", get(health_check))
        .layer(middleware::cors_layer(cors_allowed_origins))
        // Propagate X-Request-Id to response headers
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(middleware::MakeSpanWithRequestId)
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        // Generate X-Request-Id using UUID v7 (or use client-provided one)
        .layer(SetRequestIdLayer::x_request_id(middleware::MakeRequestUuid))
}
