//! Firestore `runQuery` request and response shapes.

use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use wadash_core::record::CredentialRecord;

/// Structured query: `collection WHERE username == ? LIMIT 1`.
pub(super) fn username_query(collection: &str, username: &str) -> Value {
    json!({
        "structuredQuery": {
            "from": [{ "collectionId": collection }],
            "where": {
                "fieldFilter": {
                    "field": { "fieldPath": "username" },
                    "op": "EQUAL",
                    "value": { "stringValue": username }
                }
            },
            "limit": 1
        }
    })
}

/// One element of the streamed `runQuery` response array.
///
/// Elements without `document` carry only read metadata; an empty result
/// set is a single such element.
#[derive(Debug, Deserialize)]
pub(super) struct RunQueryItem {
    #[serde(default)]
    document: Option<Document>,
}

#[derive(Debug, Deserialize)]
struct Document {
    #[serde(default)]
    fields: HashMap<String, FieldValue>,
}

#[derive(Debug, Deserialize)]
struct FieldValue {
    #[serde(rename = "stringValue")]
    string_value: Option<String>,
}

/// First document of the response as a credential record.
///
/// A non-string or empty `password` field counts as missing.
pub(super) fn first_record(items: Vec<RunQueryItem>, username: &str) -> Option<CredentialRecord> {
    let doc = items.into_iter().find_map(|item| item.document)?;
    let string_field = |name: &str| {
        doc.fields
            .get(name)
            .and_then(|v| v.string_value.clone())
            .filter(|s| !s.is_empty())
    };

    Some(CredentialRecord {
        username: string_field("username").unwrap_or_else(|| username.to_string()),
        password: string_field("password"),
    })
}
