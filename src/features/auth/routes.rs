use crate::features::auth::handler;
use crate::features::auth::policy::AccessPolicy;
use axum::{routing::get, Router};
use std::sync::Arc;

/// Protected auth routes (require JWT authentication)
pub fn protected_routes(policy: Arc<AccessPolicy>) -> Router {
    Router::new()
        .route("/api/auth/me", get(handler::get_me))
        .with_state(policy)
}
