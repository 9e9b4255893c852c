use axum::{extract::DefaultBodyLimit, handler::Handler, routing::get, Router};
use std::sync::Arc;

use crate::features::files::handlers::{delete_file, get_file, list_files, upload_file};
use crate::features::files::services::FileService;

/// Create routes for the files feature (protected)
pub fn routes(file_service: Arc<FileService>) -> Router {
    // Leave room for multipart overhead on top of the file itself
    let body_limit = file_service.max_upload_size() + 1024 * 1024;

    Router::new()
        .route(
            "/api/files",
            get(list_files).post(upload_file.layer(DefaultBodyLimit::max(body_limit))),
        )
        .route("/api/files/{id}", get(get_file).delete(delete_file))
        .with_state(file_service)
}
