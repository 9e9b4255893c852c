use std::sync::Arc;

use crate::features::clients::dtos::UpdateClientDto;
use crate::ui::api::{ClientsApi, ClientsApiError};
use crate::ui::credentials::{CredentialStore, TOKEN_KEY};

/// Where the view goes after a successful update or delete
pub const CLIENT_LIST_ROUTE: &str = "/clients";

const LOAD_FAILED: &str = "Failed to load client";
const UPDATE_FAILED: &str = "Failed to update client";
const DELETE_FAILED: &str = "Failed to delete client";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    Loading,
    Ready,
    Submitting,
    /// Error text shown to the user
    Failed(String),
    /// Left the view for the given route
    Navigated(String),
}

/// The two editable fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientForm {
    pub name: String,
    pub code: String,
}

/// Edit form for one client.
///
/// `Loading -> {Ready, Failed}` on [`load`](Self::load), then
/// `Ready | Failed (with form) -> Submitting -> {Navigated, Failed}` on
/// [`submit`](Self::submit) or a confirmed [`delete`](Self::delete).
pub struct ClientEditView {
    client_id: i64,
    api: Arc<dyn ClientsApi>,
    credentials: Arc<dyn CredentialStore>,
    phase: Phase,
    form: Option<ClientForm>,
}

impl ClientEditView {
    pub fn new(
        client_id: i64,
        api: Arc<dyn ClientsApi>,
        credentials: Arc<dyn CredentialStore>,
    ) -> Self {
        Self {
            client_id,
            api,
            credentials,
            phase: Phase::Loading,
            form: None,
        }
    }

    pub fn client_id(&self) -> i64 {
        self.client_id
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn form(&self) -> Option<&ClientForm> {
        self.form.as_ref()
    }

    /// Error text, when the last operation failed
    pub fn error(&self) -> Option<&str> {
        match &self.phase {
            Phase::Failed(message) => Some(message.as_str()),
            _ => None,
        }
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        if let Some(form) = self.form.as_mut() {
            form.name = name.into();
        }
    }

    pub fn set_code(&mut self, code: impl Into<String>) {
        if let Some(form) = self.form.as_mut() {
            form.code = code.into();
        }
    }

    /// Submit and delete are only offered with a loaded form and no request in flight
    pub fn can_submit(&self) -> bool {
        self.form.is_some() && matches!(self.phase, Phase::Ready | Phase::Failed(_))
    }

    fn token(&self) -> Option<String> {
        self.credentials.get(TOKEN_KEY)
    }

    fn failure(err: ClientsApiError, fallback: &str) -> Phase {
        tracing::debug!("Client edit request failed: {}", err);
        Phase::Failed(
            err.server_message()
                .map(str::to_string)
                .unwrap_or_else(|| fallback.to_string()),
        )
    }

    /// Fetch the client and populate the form
    pub async fn load(&mut self) {
        self.phase = Phase::Loading;
        self.form = None;

        let token = self.token();
        match self.api.get(self.client_id, token.as_deref()).await {
            Ok(client) => {
                self.form = Some(ClientForm {
                    name: client.name,
                    code: client.code,
                });
                self.phase = Phase::Ready;
            }
            Err(e) => self.phase = Self::failure(e, LOAD_FAILED),
        }
    }

    /// Send the whole form as an update; navigates back to the list on success
    pub async fn submit(&mut self) {
        if !self.can_submit() {
            return;
        }
        let Some(form) = self.form.clone() else {
            return;
        };

        self.phase = Phase::Submitting;
        let body = UpdateClientDto {
            name: form.name,
            code: form.code,
        };

        let token = self.token();
        self.phase = match self.api.update(self.client_id, &body, token.as_deref()).await {
            Ok(_) => Phase::Navigated(CLIENT_LIST_ROUTE.to_string()),
            Err(e) => Self::failure(e, UPDATE_FAILED),
        };
    }

    /// Delete the client if `confirm` agrees; nothing is sent otherwise
    pub async fn delete(&mut self, confirm: impl FnOnce() -> bool) {
        if !self.can_submit() || !confirm() {
            return;
        }

        self.phase = Phase::Submitting;
        let token = self.token();
        self.phase = match self.api.delete(self.client_id, token.as_deref()).await {
            Ok(()) => Phase::Navigated(CLIENT_LIST_ROUTE.to_string()),
            Err(e) => Self::failure(e, DELETE_FAILED),
        };
    }
}
