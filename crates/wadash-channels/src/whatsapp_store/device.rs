//! DeviceStore: the single local device identity.

use async_trait::async_trait;
use wacore::store::error::StoreError;
use wacore::store::traits::DeviceStore;
use wacore::store::Device;

use super::{bucket, Result, SqlxWhatsAppStore};

const DEVICE_KEY: &[u8] = b"self";

#[async_trait]
impl DeviceStore for SqlxWhatsAppStore {
    async fn save(&self, device: &Device) -> Result<()> {
        // Device uses custom serde (key pairs, big arrays) that needs a
        // binary format; serde_json cannot deserialize_bytes.
        let raw =
            bincode::serialize(device).map_err(|e| StoreError::Serialization(e.to_string()))?;
        self.put(bucket::DEVICE, DEVICE_KEY, &raw).await
    }

    async fn load(&self) -> Result<Option<Device>> {
        match self.get(bucket::DEVICE, DEVICE_KEY).await? {
            Some(raw) => bincode::deserialize(&raw)
                .map(Some)
                .map_err(|e| StoreError::Serialization(e.to_string())),
            None => Ok(None),
        }
    }

    async fn exists(&self) -> Result<bool> {
        Ok(self.get(bucket::DEVICE, DEVICE_KEY).await?.is_some())
    }

    async fn create(&self) -> Result<i32> {
        // One device per store; its data arrives later through save().
        Ok(1)
    }
}
