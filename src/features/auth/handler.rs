use crate::core::error::Result;
use crate::features::auth::dto::MeResponseDto;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::auth::policy::AccessPolicy;
use crate::shared::types::ApiResponse;
use axum::{extract::State, Json};
use std::sync::Arc;

#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, description = "Current user retrieved successfully", body = ApiResponse<MeResponseDto>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "auth",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_me(
    user: AuthenticatedUser,
    State(policy): State<Arc<AccessPolicy>>,
) -> Result<Json<ApiResponse<MeResponseDto>>> {
    let privileged = policy.is_privileged(&user);
    Ok(Json(ApiResponse::success(
        Some(MeResponseDto {
            user_id: user.user_id,
            role: user.role,
            privileged,
        }),
        None,
        None,
    )))
}

#[cfg(test)]
mod tests {
    use crate::features::auth::policy::AccessPolicy;
    use crate::features::auth::routes;
    use crate::shared::test_helpers::{test_policy, user, with_user};
    use axum_test::TestServer;
    use serde_json::Value;
    use std::sync::Arc;

    fn server(role: &str) -> TestServer {
        let policy: Arc<AccessPolicy> = test_policy();
        TestServer::new(with_user(routes::protected_routes(policy), user("u1", role))).unwrap()
    }

    #[tokio::test]
    async fn test_me_reports_privilege() {
        let body: Value = server("chairman").get("/api/auth/me").await.json();
        assert_eq!(body["data"]["user_id"], "u1");
        assert_eq!(body["data"]["privileged"], true);

        let body: Value = server("clerk").get("/api/auth/me").await.json();
        assert_eq!(body["data"]["role"], "clerk");
        assert_eq!(body["data"]["privileged"], false);
    }
}
