use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// DTO for /auth/me response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MeResponseDto {
    pub user_id: String,
    pub role: String,
    /// True when the role sees every client and file
    pub privileged: bool,
}
