use serde::{Deserialize, Serialize};

/// One administrator credential, as stored in the credential collection.
///
/// `password` holds a bcrypt hash. It is optional because the remote store
/// is schemaless and a document may lack the field entirely.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialRecord {
    pub username: String,
    #[serde(default)]
    pub password: Option<String>,
}
