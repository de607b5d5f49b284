//! ProtocolStore: SKDM recipients, LID/PN mappings, base keys, device
//! lists and forget-sender-key marks.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use wacore::store::error::StoreError;
use wacore::store::traits::{DeviceListRecord, LidPnMappingEntry, ProtocolStore};

use super::{bucket, composite, prefix_of, Result, SqlxWhatsAppStore};

/// Stored form of a LID mapping; the LID itself is the row key.
#[derive(Serialize, Deserialize)]
struct LidRow {
    phone_number: String,
    created_at: i64,
    updated_at: i64,
    learning_source: String,
}

impl LidRow {
    fn into_entry(self, lid: String) -> LidPnMappingEntry {
        LidPnMappingEntry {
            lid,
            phone_number: self.phone_number,
            created_at: self.created_at,
            updated_at: self.updated_at,
            learning_source: self.learning_source,
        }
    }
}

fn ser_err(e: serde_json::Error) -> StoreError {
    StoreError::Serialization(e.to_string())
}

fn utf8(raw: Vec<u8>) -> Result<String> {
    String::from_utf8(raw).map_err(|e| StoreError::Serialization(e.to_string()))
}

#[async_trait]
impl ProtocolStore for SqlxWhatsAppStore {
    async fn get_skdm_recipients(&self, group_jid: &str) -> Result<Vec<String>> {
        let rows = self
            .scan_prefix(bucket::SKDM, &prefix_of(group_jid.as_bytes()))
            .await?;
        rows.into_iter().map(|(device, _)| utf8(device)).collect()
    }

    async fn add_skdm_recipients(&self, group_jid: &str, device_jids: &[String]) -> Result<()> {
        for device in device_jids {
            let key = composite(&[group_jid.as_bytes(), device.as_bytes()]);
            self.mark(bucket::SKDM, &key).await?;
        }
        Ok(())
    }

    async fn clear_skdm_recipients(&self, group_jid: &str) -> Result<()> {
        self.delete_prefix(bucket::SKDM, &prefix_of(group_jid.as_bytes()))
            .await
    }

    async fn get_lid_mapping(&self, lid: &str) -> Result<Option<LidPnMappingEntry>> {
        match self.get(bucket::LID, lid.as_bytes()).await? {
            Some(raw) => {
                let row: LidRow = serde_json::from_slice(&raw).map_err(ser_err)?;
                Ok(Some(row.into_entry(lid.to_string())))
            }
            None => Ok(None),
        }
    }

    async fn get_pn_mapping(&self, phone: &str) -> Result<Option<LidPnMappingEntry>> {
        match self.get(bucket::PN, phone.as_bytes()).await? {
            Some(lid) => self.get_lid_mapping(&utf8(lid)?).await,
            None => Ok(None),
        }
    }

    async fn put_lid_mapping(&self, entry: &LidPnMappingEntry) -> Result<()> {
        // A LID that moves to a new number must not stay reachable from the old one.
        if let Some(previous) = self.get_lid_mapping(&entry.lid).await? {
            if previous.phone_number != entry.phone_number {
                self.delete(bucket::PN, previous.phone_number.as_bytes())
                    .await?;
            }
        }

        let row = LidRow {
            phone_number: entry.phone_number.clone(),
            created_at: entry.created_at,
            updated_at: entry.updated_at,
            learning_source: entry.learning_source.clone(),
        };
        let raw = serde_json::to_vec(&row).map_err(ser_err)?;
        self.put(bucket::LID, entry.lid.as_bytes(), &raw).await?;
        self.put(
            bucket::PN,
            entry.phone_number.as_bytes(),
            entry.lid.as_bytes(),
        )
        .await
    }

    async fn get_all_lid_mappings(&self) -> Result<Vec<LidPnMappingEntry>> {
        let rows = self.scan(bucket::LID).await?;
        rows.into_iter()
            .map(|(lid, raw)| {
                let row: LidRow = serde_json::from_slice(&raw).map_err(ser_err)?;
                Ok(row.into_entry(utf8(lid)?))
            })
            .collect()
    }

    async fn save_base_key(&self, address: &str, message_id: &str, base_key: &[u8]) -> Result<()> {
        let key = composite(&[address.as_bytes(), message_id.as_bytes()]);
        self.put(bucket::BASE_KEY, &key, base_key).await
    }

    async fn has_same_base_key(
        &self,
        address: &str,
        message_id: &str,
        current_base_key: &[u8],
    ) -> Result<bool> {
        let key = composite(&[address.as_bytes(), message_id.as_bytes()]);
        Ok(self
            .get(bucket::BASE_KEY, &key)
            .await?
            .is_some_and(|stored| stored == current_base_key))
    }

    async fn delete_base_key(&self, address: &str, message_id: &str) -> Result<()> {
        let key = composite(&[address.as_bytes(), message_id.as_bytes()]);
        self.delete(bucket::BASE_KEY, &key).await
    }

    async fn update_device_list(&self, record: DeviceListRecord) -> Result<()> {
        let raw = serde_json::to_vec(&record).map_err(ser_err)?;
        self.put(bucket::DEVICE_LIST, record.user.as_bytes(), &raw)
            .await
    }

    async fn get_devices(&self, user: &str) -> Result<Option<DeviceListRecord>> {
        match self.get(bucket::DEVICE_LIST, user.as_bytes()).await? {
            Some(raw) => serde_json::from_slice(&raw).map(Some).map_err(ser_err),
            None => Ok(None),
        }
    }

    async fn mark_forget_sender_key(&self, group_jid: &str, participant: &str) -> Result<()> {
        let key = composite(&[group_jid.as_bytes(), participant.as_bytes()]);
        self.mark(bucket::FORGET_MARK, &key).await
    }

    async fn consume_forget_marks(&self, group_jid: &str) -> Result<Vec<String>> {
        let prefix = prefix_of(group_jid.as_bytes());
        let rows = self.scan_prefix(bucket::FORGET_MARK, &prefix).await?;
        self.delete_prefix(bucket::FORGET_MARK, &prefix).await?;
        rows.into_iter().map(|(p, _)| utf8(p)).collect()
    }
}
