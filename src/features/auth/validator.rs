use super::model::{AuthenticatedUser, Claims};
use crate::core::error::AppError;
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use std::time::Duration;

/// Validates HS256 bearer tokens issued by the upstream login service
pub struct JwtValidator {
    decoding_key: DecodingKey,
    leeway: u64,
}

impl JwtValidator {
    pub fn new(secret: &str, leeway: Duration) -> Self {
        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            leeway: leeway.as_secs(),
        }
    }

    pub fn validate_token(&self, token: &str) -> Result<AuthenticatedUser, AppError> {
        let header = decode_header(token).map_err(|e| AppError::Auth(e.to_string()))?;

        if header.alg != Algorithm::HS256 {
            return Err(AppError::Auth(format!(
                "Unsupported algorithm: {:?}. Only HS256 is allowed",
                header.alg
            )));
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = self.leeway;
        validation.validate_nbf = true;
        validation.set_required_spec_claims(&["exp"]);

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(|e| AppError::Auth(e.to_string()))?;

        let claims = token_data.claims;
        if claims.sub.is_empty() {
            return Err(AppError::Auth("Token has an empty subject".to_string()));
        }

        Ok(AuthenticatedUser {
            user_id: claims.sub,
            role: claims.role,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::{issue_token, TEST_JWT_SECRET};
    use jsonwebtoken::{encode, EncodingKey, Header};

    fn validator() -> JwtValidator {
        JwtValidator::new(TEST_JWT_SECRET, Duration::from_secs(0))
    }

    #[test]
    fn test_valid_token_yields_user() {
        let token = issue_token("user-42", "accountant");
        let user = validator().validate_token(&token).unwrap();

        assert_eq!(user, AuthenticatedUser::new("user-42", "accountant"));
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let token = issue_token("user-42", "gmd");
        let other = JwtValidator::new("another-secret", Duration::from_secs(0));

        assert!(matches!(other.validate_token(&token), Err(AppError::Auth(_))));
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let claims = Claims {
            sub: "user-42".to_string(),
            role: "gmd".to_string(),
            exp: 1_000,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(TEST_JWT_SECRET.as_bytes()),
        )
        .unwrap();

        assert!(validator().validate_token(&token).is_err());
    }

    #[test]
    fn test_garbage_is_rejected() {
        assert!(validator().validate_token("not-a-jwt").is_err());
    }

    #[test]
    fn test_numeric_id_claim_is_accepted() {
        let claims = serde_json::json!({
            "id": 42,
            "role": "clerk",
            "exp": chrono::Utc::now().timestamp() + 3600,
        });
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(TEST_JWT_SECRET.as_bytes()),
        )
        .unwrap();

        let user = validator().validate_token(&token).unwrap();

        assert_eq!(user, AuthenticatedUser::new("42", "clerk"));
    }
}
