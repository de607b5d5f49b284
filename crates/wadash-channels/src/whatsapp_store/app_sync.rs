//! AppSyncStore: app-state sync keys, collection versions, mutation MACs.

use async_trait::async_trait;
use wacore::appstate::hash::HashState;
use wacore::appstate::processor::AppStateMutationMAC;
use wacore::store::error::StoreError;
use wacore::store::traits::{AppStateSyncKey, AppSyncStore};

use super::{bucket, composite, Result, SqlxWhatsAppStore};

/// Sync keys are stored as `timestamp (i64 BE) | key_len (u32 BE) | key_data | fingerprint`.
pub(super) fn encode_sync_key(key: &AppStateSyncKey) -> Vec<u8> {
    let mut out = Vec::with_capacity(12 + key.key_data.len() + key.fingerprint.len());
    out.extend_from_slice(&key.timestamp.to_be_bytes());
    out.extend_from_slice(&(key.key_data.len() as u32).to_be_bytes());
    out.extend_from_slice(&key.key_data);
    out.extend_from_slice(&key.fingerprint);
    out
}

pub(super) fn decode_sync_key(raw: &[u8]) -> Result<AppStateSyncKey> {
    let corrupt = || StoreError::Serialization("corrupt app state sync key".to_string());
    if raw.len() < 12 {
        return Err(corrupt());
    }
    let (ts, rest) = raw.split_at(8);
    let (len, rest) = rest.split_at(4);
    let timestamp = i64::from_be_bytes(ts.try_into().map_err(|_| corrupt())?);
    let len = u32::from_be_bytes(len.try_into().map_err(|_| corrupt())?) as usize;
    if rest.len() < len {
        return Err(corrupt());
    }
    let (key_data, fingerprint) = rest.split_at(len);
    Ok(AppStateSyncKey {
        key_data: key_data.to_vec(),
        timestamp,
        fingerprint: fingerprint.to_vec(),
    })
}

#[async_trait]
impl AppSyncStore for SqlxWhatsAppStore {
    async fn get_sync_key(&self, key_id: &[u8]) -> Result<Option<AppStateSyncKey>> {
        match self.get(bucket::SYNC_KEY, key_id).await? {
            Some(raw) => decode_sync_key(&raw).map(Some),
            None => Ok(None),
        }
    }

    async fn set_sync_key(&self, key_id: &[u8], key: AppStateSyncKey) -> Result<()> {
        self.put(bucket::SYNC_KEY, key_id, &encode_sync_key(&key))
            .await
    }

    async fn get_version(&self, name: &str) -> Result<HashState> {
        match self.get(bucket::APP_VERSION, name.as_bytes()).await? {
            Some(raw) => serde_json::from_slice(&raw)
                .map_err(|e| StoreError::Serialization(e.to_string())),
            None => Ok(HashState::default()),
        }
    }

    async fn set_version(&self, name: &str, state: HashState) -> Result<()> {
        let raw =
            serde_json::to_vec(&state).map_err(|e| StoreError::Serialization(e.to_string()))?;
        self.put(bucket::APP_VERSION, name.as_bytes(), &raw).await
    }

    // Only the latest value MAC per index is consulted, so the version is not kept.
    async fn put_mutation_macs(
        &self,
        name: &str,
        _version: u64,
        mutations: &[AppStateMutationMAC],
    ) -> Result<()> {
        for m in mutations {
            let key = composite(&[name.as_bytes(), &m.index_mac]);
            self.put(bucket::MUTATION_MAC, &key, &m.value_mac).await?;
        }
        Ok(())
    }

    async fn get_mutation_mac(&self, name: &str, index_mac: &[u8]) -> Result<Option<Vec<u8>>> {
        let key = composite(&[name.as_bytes(), index_mac]);
        self.get(bucket::MUTATION_MAC, &key).await
    }

    async fn delete_mutation_macs(&self, name: &str, index_macs: &[Vec<u8>]) -> Result<()> {
        for mac in index_macs {
            let key = composite(&[name.as_bytes(), mac]);
            self.delete(bucket::MUTATION_MAC, &key).await?;
        }
        Ok(())
    }
}
