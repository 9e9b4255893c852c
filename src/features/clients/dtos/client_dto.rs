use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::features::clients::models::Client;

/// Request DTO for creating a client
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateClientDto {
    #[serde(default)]
    #[validate(length(min = 1, message = "name is required"))]
    #[schema(example = "Acme")]
    pub name: String,

    #[serde(default)]
    #[validate(length(min = 1, message = "code is required"))]
    #[schema(example = "AC1")]
    pub code: String,
}

/// Request DTO for replacing a client's name and code
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateClientDto {
    #[serde(default)]
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,

    #[serde(default)]
    #[validate(length(min = 1, message = "code is required"))]
    pub code: String,
}

/// Response DTO for client operations
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ClientResponseDto {
    pub id: i64,
    pub name: String,
    pub code: String,
    /// Number of files attached to the client, as visible to the caller
    pub file_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Client> for ClientResponseDto {
    fn from(c: Client) -> Self {
        Self {
            id: c.id,
            name: c.name,
            code: c.code,
            file_count: c.file_count,
            created_at: c.created_at,
            updated_at: c.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_code_fails_validation() {
        let dto: CreateClientDto = serde_json::from_str(r#"{"name":"Acme"}"#).unwrap();
        let err = dto.validate().unwrap_err();

        assert!(err.field_errors().contains_key("code"));
        assert!(!err.field_errors().contains_key("name"));
    }

    #[test]
    fn test_complete_payload_validates() {
        let dto: UpdateClientDto =
            serde_json::from_str(r#"{"name":"Acme","code":"AC1"}"#).unwrap();
        assert!(dto.validate().is_ok());
    }
}
