//! Firestore credential store over the REST API.
//!
//! Runs one structured query per lookup against
//! `projects/{project}/databases/(default)/documents:runQuery`.
//! Production access authenticates with a service-account key; an emulator
//! host skips OAuth entirely.

mod query;
mod token;


pub use token::ServiceAccountKey;

use async_trait::async_trait;
use reqwest::Client;
use std::path::Path;
use tokio::sync::Mutex;
use tracing::{debug, info};
use token::TokenManager;
use wadash_core::{
    config::StoreConfig, error::WadashError, record::CredentialRecord, shellexpand,
    traits::CredentialStore,
};

/// Project id used against an emulator when none is configured.
const EMULATOR_PROJECT: &str = "demo-wadash";

enum Auth {
    /// The emulator accepts this fixed bearer token.
    Emulator,
    ServiceAccount(Mutex<TokenManager>),
}

/// Read-only credential lookups in a Firestore collection.
pub struct FirestoreStore {
    http: Client,
    /// `.../v1/projects/{project}/databases/(default)/documents`
    documents_url: String,
    collection: String,
    auth: Auth,
}

impl FirestoreStore {
    /// Build from config: emulator when `emulator_host` is set, otherwise
    /// production Firestore with the configured service account.
    pub fn from_config(config: &StoreConfig) -> Result<Self, WadashError> {
        if !config.emulator_host.is_empty() {
            let project = if config.project_id.is_empty() {
                EMULATOR_PROJECT
            } else {
                config.project_id.as_str()
            };
            return Ok(Self::emulator(
                &config.emulator_host,
                project,
                &config.collection,
            ));
        }

        let key_path = shellexpand(&config.service_account);
        let key = ServiceAccountKey::from_file(Path::new(&key_path))?;
        let project = if config.project_id.is_empty() {
            key.project_id.clone()
        } else {
            config.project_id.clone()
        };

        info!("Firestore project '{project}', collection '{}'", config.collection);
        let http = Client::new();
        Ok(Self {
            documents_url: documents_url("https://firestore.googleapis.com", &project),
            collection: config.collection.clone(),
            auth: Auth::ServiceAccount(Mutex::new(TokenManager::new(key, http.clone()))),
            http,
        })
    }

    /// Talk to a Firestore emulator at `host` (`host:port`, or a full URL).
    pub fn emulator(host: &str, project: &str, collection: &str) -> Self {
        let base = if host.starts_with("http://") || host.starts_with("https://") {
            host.trim_end_matches('/').to_string()
        } else {
            format!("http://{host}")
        };
        info!("Firestore emulator at {base}, collection '{collection}'");
        Self {
            http: Client::new(),
            documents_url: documents_url(&base, project),
            collection: collection.to_string(),
            auth: Auth::Emulator,
        }
    }

    async fn bearer(&self) -> Result<String, WadashError> {
        match &self.auth {
            Auth::Emulator => Ok("owner".to_string()),
            Auth::ServiceAccount(tokens) => tokens.lock().await.token().await,
        }
    }
}

fn documents_url(base: &str, project: &str) -> String {
    format!("{base}/v1/projects/{project}/databases/(default)/documents")
}

#[async_trait]
impl CredentialStore for FirestoreStore {
    fn name(&self) -> &str {
        "firestore"
    }

    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<CredentialRecord>, WadashError> {
        let token = self.bearer().await?;
        let url = format!("{}:runQuery", self.documents_url);
        debug!("firestore runQuery on '{}'", self.collection);

        let response = self
            .http
            .post(&url)
            .bearer_auth(token)
            .json(&query::username_query(&self.collection, username))
            .send()
            .await
            .map_err(|e| WadashError::Store(format!("firestore request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(WadashError::Store(format!(
                "firestore query failed (HTTP {status}): {body}"
            )));
        }

        let items: Vec<query::RunQueryItem> = response
            .json()
            .await
            .map_err(|e| WadashError::Store(format!("invalid firestore response: {e}")))?;

        Ok(query::first_record(items, username))
    }
}
