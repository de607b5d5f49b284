//! SignalStore: identities, sessions, prekeys, signed prekeys, sender keys.

use async_trait::async_trait;
use wacore::store::traits::SignalStore;

use super::{bucket, id_key, Result, SqlxWhatsAppStore};

#[async_trait]
impl SignalStore for SqlxWhatsAppStore {
    async fn put_identity(&self, address: &str, key: [u8; 32]) -> Result<()> {
        self.put(bucket::IDENTITY, address.as_bytes(), &key).await
    }

    async fn load_identity(&self, address: &str) -> Result<Option<Vec<u8>>> {
        self.get(bucket::IDENTITY, address.as_bytes()).await
    }

    async fn delete_identity(&self, address: &str) -> Result<()> {
        self.delete(bucket::IDENTITY, address.as_bytes()).await
    }

    async fn get_session(&self, address: &str) -> Result<Option<Vec<u8>>> {
        self.get(bucket::SESSION, address.as_bytes()).await
    }

    async fn put_session(&self, address: &str, session: &[u8]) -> Result<()> {
        self.put(bucket::SESSION, address.as_bytes(), session).await
    }

    async fn delete_session(&self, address: &str) -> Result<()> {
        self.delete(bucket::SESSION, address.as_bytes()).await
    }

    // The upload flag is never read back; the server is the source of truth.
    async fn store_prekey(&self, id: u32, record: &[u8], _uploaded: bool) -> Result<()> {
        self.put(bucket::PREKEY, &id_key(id), record).await
    }

    async fn load_prekey(&self, id: u32) -> Result<Option<Vec<u8>>> {
        self.get(bucket::PREKEY, &id_key(id)).await
    }

    async fn remove_prekey(&self, id: u32) -> Result<()> {
        self.delete(bucket::PREKEY, &id_key(id)).await
    }

    async fn store_signed_prekey(&self, id: u32, record: &[u8]) -> Result<()> {
        self.put(bucket::SIGNED_PREKEY, &id_key(id), record).await
    }

    async fn load_signed_prekey(&self, id: u32) -> Result<Option<Vec<u8>>> {
        self.get(bucket::SIGNED_PREKEY, &id_key(id)).await
    }

    async fn load_all_signed_prekeys(&self) -> Result<Vec<(u32, Vec<u8>)>> {
        let rows = self.scan(bucket::SIGNED_PREKEY).await?;
        Ok(rows
            .into_iter()
            .filter_map(|(k, v)| {
                let id: [u8; 4] = k.as_slice().try_into().ok()?;
                Some((u32::from_be_bytes(id), v))
            })
            .collect())
    }

    async fn remove_signed_prekey(&self, id: u32) -> Result<()> {
        self.delete(bucket::SIGNED_PREKEY, &id_key(id)).await
    }

    async fn put_sender_key(&self, address: &str, record: &[u8]) -> Result<()> {
        self.put(bucket::SENDER_KEY, address.as_bytes(), record).await
    }

    async fn get_sender_key(&self, address: &str) -> Result<Option<Vec<u8>>> {
        self.get(bucket::SENDER_KEY, address.as_bytes()).await
    }

    async fn delete_sender_key(&self, address: &str) -> Result<()> {
        self.delete(bucket::SENDER_KEY, address.as_bytes()).await
    }
}
