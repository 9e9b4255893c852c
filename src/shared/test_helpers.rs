//! Fixtures shared by handler and service tests.
//!
//! [`InMemoryStore`] implements both repository traits with the same visibility
//! rules as the Postgres queries, so the HTTP surface can be tested without a
//! database.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use axum::{extract::Request, middleware::Next, Router};
use chrono::Utc;
use jsonwebtoken::{encode, EncodingKey, Header};
use tempfile::TempDir;

use crate::core::config::StorageConfig;
use crate::core::error::{AppError, Result};
use crate::features::auth::model::{AuthenticatedUser, Claims};
use crate::features::auth::{AccessPolicy, Visibility};
use crate::features::clients::models::Client;
use crate::features::clients::{ClientDeletion, ClientRepository, ClientService};
use crate::features::files::models::{File, NewFile};
use crate::features::files::{FileRepository, FileService};
use crate::modules::storage::LocalDiskStorage;
use crate::shared::constants::{DEFAULT_MAX_UPLOAD_SIZE, DEFAULT_PRIVILEGED_ROLES};

pub const TEST_JWT_SECRET: &str = "test-secret-do-not-use";

/// Sign an HS256 token valid for one hour
pub fn issue_token(user_id: &str, role: &str) -> String {
    let claims = Claims {
        sub: user_id.to_string(),
        role: role.to_string(),
        exp: (Utc::now().timestamp() + 3600) as u64,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(TEST_JWT_SECRET.as_bytes()),
    )
    .unwrap()
}

pub fn user(user_id: &str, role: &str) -> AuthenticatedUser {
    AuthenticatedUser::new(user_id, role)
}

pub fn test_policy() -> Arc<AccessPolicy> {
    Arc::new(AccessPolicy::new(
        DEFAULT_PRIVILEGED_ROLES
            .iter()
            .map(|r| r.to_string())
            .collect(),
    ))
}

/// Put `user` into the request extensions, as the auth middleware would
pub fn with_user(router: Router, user: AuthenticatedUser) -> Router {
    router.layer(axum::middleware::from_fn(
        move |mut request: Request, next: Next| {
            let user = user.clone();
            async move {
                request.extensions_mut().insert(user);
                next.run(request).await
            }
        },
    ))
}

#[derive(Default)]
struct Tables {
    clients: BTreeMap<i64, Client>,
    files: BTreeMap<i64, File>,
    next_client_id: i64,
    next_file_id: i64,
}

#[derive(Default)]
pub struct InMemoryStore {
    tables: Mutex<Tables>,
}

impl InMemoryStore {
    fn tables(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap()
    }

    pub fn seed_client(&self, name: &str, code: &str) -> i64 {
        let mut t = self.tables();
        t.next_client_id += 1;
        let id = t.next_client_id;
        let now = Utc::now();
        t.clients.insert(
            id,
            Client {
                id,
                name: name.to_string(),
                code: code.to_string(),
                file_count: 0,
                created_at: now,
                updated_at: now,
            },
        );
        id
    }

    /// Insert a metadata row without a binary behind it
    pub fn seed_file(&self, client_id: i64, uploaded_by: &str) -> i64 {
        let mut t = self.tables();
        t.next_file_id += 1;
        let id = t.next_file_id;
        t.files.insert(
            id,
            File {
                id,
                client_id,
                name: format!("document-{}", id),
                description: None,
                category: "general".to_string(),
                path: format!("/nonexistent/{}/{}.bin", client_id, id),
                file_type: "application/pdf".to_string(),
                size: 1,
                uploaded_by: uploaded_by.to_string(),
                created_at: Utc::now(),
            },
        );
        id
    }

    pub fn client_count(&self) -> usize {
        self.tables().clients.len()
    }

    pub fn file_count(&self) -> usize {
        self.tables().files.len()
    }

    fn with_count(t: &Tables, client: &Client, visibility: &Visibility) -> Client {
        let file_count = t
            .files
            .values()
            .filter(|f| f.client_id == client.id && visibility.permits(&f.uploaded_by))
            .count() as i64;
        Client {
            file_count,
            ..client.clone()
        }
    }
}

#[async_trait]
impl ClientRepository for InMemoryStore {
    async fn list(&self, visibility: &Visibility) -> Result<Vec<Client>> {
        let t = self.tables();
        Ok(t.clients
            .values()
            .filter(|c| {
                visibility.lists_client(
                    t.files
                        .values()
                        .filter(|f| f.client_id == c.id)
                        .map(|f| f.uploaded_by.as_str()),
                )
            })
            .map(|c| Self::with_count(&t, c, visibility))
            .collect())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Client>> {
        let t = self.tables();
        Ok(t.clients
            .get(&id)
            .map(|c| Self::with_count(&t, c, &Visibility::Unrestricted)))
    }

    async fn create(&self, name: &str, code: &str) -> Result<Client> {
        let id = self.seed_client(name, code);
        let t = self.tables();
        Ok(t.clients[&id].clone())
    }

    async fn update(&self, id: i64, name: &str, code: &str) -> Result<Option<Client>> {
        let mut t = self.tables();
        let Some(client) = t.clients.get_mut(&id) else {
            return Ok(None);
        };
        client.name = name.to_string();
        client.code = code.to_string();
        client.updated_at = Utc::now();
        let client = client.clone();
        Ok(Some(Self::with_count(&t, &client, &Visibility::Unrestricted)))
    }

    async fn delete(&self, id: i64) -> Result<ClientDeletion> {
        let mut t = self.tables();
        if !t.clients.contains_key(&id) {
            return Ok(ClientDeletion::NotFound);
        }
        let attached = t.files.values().filter(|f| f.client_id == id).count() as i64;
        if attached > 0 {
            return Ok(ClientDeletion::HasFiles(attached));
        }
        t.clients.remove(&id);
        Ok(ClientDeletion::Deleted)
    }
}

#[async_trait]
impl FileRepository for InMemoryStore {
    async fn list_for_client(&self, client_id: i64, visibility: &Visibility) -> Result<Vec<File>> {
        Ok(self
            .tables()
            .files
            .values()
            .filter(|f| f.client_id == client_id && visibility.permits(&f.uploaded_by))
            .cloned()
            .collect())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<File>> {
        Ok(self.tables().files.get(&id).cloned())
    }

    async fn create(&self, file: NewFile) -> Result<File> {
        let mut t = self.tables();
        if !t.clients.contains_key(&file.client_id) {
            return Err(AppError::Validation(format!(
                "Client with id {} does not exist",
                file.client_id
            )));
        }
        t.next_file_id += 1;
        let id = t.next_file_id;
        let row = File {
            id,
            client_id: file.client_id,
            name: file.name,
            description: file.description,
            category: file.category,
            path: file.path,
            file_type: file.file_type,
            size: file.size,
            uploaded_by: file.uploaded_by,
            created_at: Utc::now(),
        };
        t.files.insert(id, row.clone());
        Ok(row)
    }

    async fn delete(&self, id: i64) -> Result<Option<File>> {
        Ok(self.tables().files.remove(&id))
    }
}

/// Services wired to one in-memory store and a throwaway upload directory
pub struct TestContext {
    pub store: Arc<InMemoryStore>,
    pub storage: Arc<LocalDiskStorage>,
    pub policy: Arc<AccessPolicy>,
    _upload_dir: TempDir,
}

impl TestContext {
    pub fn new() -> Self {
        let upload_dir = tempfile::tempdir().unwrap();
        let storage = LocalDiskStorage::new(&StorageConfig {
            upload_dir: upload_dir.path().join("uploads"),
            max_upload_size: DEFAULT_MAX_UPLOAD_SIZE,
        });

        Self {
            store: Arc::new(InMemoryStore::default()),
            storage: Arc::new(storage),
            policy: test_policy(),
            _upload_dir: upload_dir,
        }
    }

    pub fn client_service(&self) -> Arc<ClientService> {
        Arc::new(ClientService::new(self.store.clone(), self.policy.clone()))
    }

    pub fn file_service(&self) -> Arc<FileService> {
        self.file_service_with_limit(DEFAULT_MAX_UPLOAD_SIZE)
    }

    pub fn file_service_with_limit(&self, max_upload_size: usize) -> Arc<FileService> {
        Arc::new(FileService::new(
            self.store.clone(),
            self.storage.clone(),
            self.policy.clone(),
            max_upload_size,
        ))
    }

    /// Number of binaries currently under the upload root
    pub fn stored_file_count(&self) -> usize {
        fn walk(dir: &std::path::Path) -> usize {
            let Ok(entries) = std::fs::read_dir(dir) else {
                return 0;
            };
            entries
                .flatten()
                .map(|e| {
                    let path = e.path();
                    if path.is_dir() {
                        walk(&path)
                    } else {
                        1
                    }
                })
                .sum()
        }
        walk(self.storage.root())
    }
}
