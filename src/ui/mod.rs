//! Headless client edit view.
//!
//! The view talks to the `/api/clients` endpoints through a [`ClientsApi`]
//! and reads the bearer credential from a [`CredentialStore`].

mod api;
mod client_edit;
mod credentials;

pub use api::{ClientsApi, ClientsApiError, HttpClientsApi};
pub use client_edit::{ClientEditView, ClientForm, Phase, CLIENT_LIST_ROUTE};
pub use credentials::{CredentialStore, LocalStorage, TOKEN_KEY};
