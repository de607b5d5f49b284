//! # wadash-auth
//!
//! Administrator credential checks: input validation, bcrypt comparison,
//! and the stores credentials are looked up in.

pub mod firestore;
pub mod hash;
pub mod sqlite;
pub mod validate;
pub mod verifier;

pub use firestore::FirestoreStore;
pub use sqlite::SqliteCredentialStore;
pub use verifier::{CredentialVerifier, LoginRequest, VerifyError};

use std::sync::Arc;
use tracing::info;
use wadash_core::config::{StoreBackend, StoreConfig};
use wadash_core::error::WadashError;
use wadash_core::traits::CredentialStore;

/// Build the configured credential store.
pub async fn build_store(config: &StoreConfig) -> Result<Arc<dyn CredentialStore>, WadashError> {
    let store: Arc<dyn CredentialStore> = match config.backend {
        StoreBackend::Firestore => Arc::new(FirestoreStore::from_config(config)?),
        StoreBackend::Sqlite => Arc::new(SqliteCredentialStore::new(&config.db_path).await?),
    };
    info!("credential store: {}", store.name());
    Ok(store)
}
