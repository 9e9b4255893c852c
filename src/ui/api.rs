use async_trait::async_trait;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::features::clients::dtos::{ClientResponseDto, UpdateClientDto};
use crate::shared::types::ApiResponse;

#[derive(Debug, Error)]
pub enum ClientsApiError {
    /// Non-2xx response; `message` is the envelope's message when one was sent
    #[error("HTTP {status}: {}", .message.as_deref().unwrap_or("no message"))]
    Server {
        status: u16,
        message: Option<String>,
    },

    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Unexpected response: {0}")]
    Decode(String),
}

impl ClientsApiError {
    /// Message the server put in the envelope, if any
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ClientsApiError::Server { message, .. } => message.as_deref(),
            _ => None,
        }
    }
}

pub type ApiResult<T> = std::result::Result<T, ClientsApiError>;

/// Client-side access to the clients endpoints
#[async_trait]
pub trait ClientsApi: Send + Sync {
    async fn get(&self, id: i64, token: Option<&str>) -> ApiResult<ClientResponseDto>;

    async fn update(
        &self,
        id: i64,
        body: &UpdateClientDto,
        token: Option<&str>,
    ) -> ApiResult<ClientResponseDto>;

    async fn delete(&self, id: i64, token: Option<&str>) -> ApiResult<()>;
}

/// [`ClientsApi`] over HTTP with `reqwest`
pub struct HttpClientsApi {
    base_url: String,
    http_client: reqwest::Client,
}

impl HttpClientsApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http_client: reqwest::Client::new(),
        }
    }

    fn client_url(&self, id: i64) -> String {
        format!("{}/api/clients/{}", self.base_url, id)
    }

    fn authorize(
        request: reqwest::RequestBuilder,
        token: Option<&str>,
    ) -> reqwest::RequestBuilder {
        match token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Unwrap the envelope, turning non-2xx responses into [`ClientsApiError::Server`]
    async fn read_envelope<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> ApiResult<ApiResponse<T>> {
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ApiResponse<serde_json::Value>>(&body)
                .ok()
                .and_then(|envelope| envelope.message);
            tracing::debug!("Clients API error: HTTP {} - {:?}", status, message);
            return Err(ClientsApiError::Server {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_str(&body).map_err(|e| ClientsApiError::Decode(e.to_string()))
    }

    fn require_data<T>(envelope: ApiResponse<T>) -> ApiResult<T> {
        envelope
            .data
            .ok_or_else(|| ClientsApiError::Decode("Response has no data".to_string()))
    }
}

#[async_trait]
impl ClientsApi for HttpClientsApi {
    async fn get(&self, id: i64, token: Option<&str>) -> ApiResult<ClientResponseDto> {
        let url = self.client_url(id);
        tracing::debug!("Fetching client: {}", url);

        let response = Self::authorize(self.http_client.get(&url), token)
            .send()
            .await?;
        Self::require_data(Self::read_envelope(response).await?)
    }

    async fn update(
        &self,
        id: i64,
        body: &UpdateClientDto,
        token: Option<&str>,
    ) -> ApiResult<ClientResponseDto> {
        let url = self.client_url(id);
        tracing::debug!("Updating client: {}", url);

        let response = Self::authorize(self.http_client.put(&url), token)
            .json(body)
            .send()
            .await?;
        Self::require_data(Self::read_envelope(response).await?)
    }

    async fn delete(&self, id: i64, token: Option<&str>) -> ApiResult<()> {
        let url = self.client_url(id);
        tracing::debug!("Deleting client: {}", url);

        let response = Self::authorize(self.http_client.delete(&url), token)
            .send()
            .await?;
        Self::read_envelope::<serde_json::Value>(response).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{self, StatusCode};

    fn response(status: StatusCode, body: serde_json::Value) -> reqwest::Response {
        http::Response::builder()
            .status(status)
            .header("content-type", "application/json")
            .body(body.to_string())
            .unwrap()
            .into()
    }

    #[tokio::test]
    async fn test_success_envelope_decodes_client() {
        let body = serde_json::json!({
            "success": true,
            "data": {
                "id": 7,
                "name": "Acme Holdings",
                "code": "ACME",
                "file_count": 3,
                "created_at": "2025-01-01T00:00:00Z",
                "updated_at": "2025-01-02T00:00:00Z"
            }
        });

        let envelope = HttpClientsApi::read_envelope::<ClientResponseDto>(response(
            StatusCode::OK,
            body,
        ))
        .await
        .unwrap();
        let client = HttpClientsApi::require_data(envelope).unwrap();

        assert_eq!(client.id, 7);
        assert_eq!(client.code, "ACME");
        assert_eq!(client.file_count, 3);
    }

    #[tokio::test]
    async fn test_envelope_without_data_is_a_decode_error() {
        let body = serde_json::json!({ "success": true, "message": "Client deleted" });

        let envelope = HttpClientsApi::read_envelope::<ClientResponseDto>(response(
            StatusCode::OK,
            body,
        ))
        .await
        .unwrap();

        assert_eq!(envelope.message.as_deref(), Some("Client deleted"));
        assert!(matches!(
            HttpClientsApi::require_data(envelope),
            Err(ClientsApiError::Decode(_))
        ));
    }

    #[tokio::test]
    async fn test_error_envelope_keeps_server_message() {
        let body = serde_json::json!({
            "success": false,
            "message": "Client has attached files",
            "errors": ["Client has attached files"]
        });

        let err = HttpClientsApi::read_envelope::<ClientResponseDto>(response(
            StatusCode::BAD_REQUEST,
            body,
        ))
        .await
        .unwrap_err();

        assert!(matches!(err, ClientsApiError::Server { status: 400, .. }));
        assert_eq!(err.server_message(), Some("Client has attached files"));
    }

    #[tokio::test]
    async fn test_error_without_envelope_has_no_message() {
        let err = HttpClientsApi::read_envelope::<ClientResponseDto>(
            http::Response::builder()
                .status(StatusCode::BAD_GATEWAY)
                .body("upstream down".to_string())
                .unwrap()
                .into(),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, ClientsApiError::Server { status: 502, .. }));
        assert_eq!(err.server_message(), None);
    }
}
