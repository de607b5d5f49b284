//! Automation trait implementation for WhatsApp.

use super::send::split_message;
use super::{WhatsAppAutomation, MAX_MESSAGE_CHARS};
use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::{info, warn};
use wacore_binary::jid::Jid;
use wadash_core::{error::WadashError, event::AutomationEvent, traits::Automation};

#[async_trait]
impl Automation for WhatsAppAutomation {
    fn name(&self) -> &str {
        "whatsapp"
    }

    async fn initialize(&self, events: mpsc::Sender<AutomationEvent>) -> Result<(), WadashError> {
        if self.is_running().await {
            return Err(WadashError::Automation(
                "whatsapp client already running".into(),
            ));
        }
        self.build_and_run_bot(events).await
    }

    async fn send_message(&self, recipient: &str, body: &str) -> Result<(), WadashError> {
        let client = self
            .client
            .lock()
            .await
            .clone()
            .ok_or_else(|| WadashError::Automation("whatsapp client not connected".into()))?;

        let jid: Jid = recipient.parse().map_err(|e| {
            WadashError::Automation(format!("invalid whatsapp address '{recipient}': {e}"))
        })?;

        for chunk in split_message(body, MAX_MESSAGE_CHARS) {
            let msg = waproto::whatsapp::Message {
                conversation: Some(chunk.to_string()),
                ..Default::default()
            };
            client
                .send_message(jid.clone(), msg)
                .await
                .map_err(|e| WadashError::Automation(format!("whatsapp send failed: {e}")))?;
        }

        Ok(())
    }

    async fn destroy(&self) -> Result<(), WadashError> {
        if let Some(task) = self.task.lock().await.take() {
            task.abort();
        }
        *self.client.lock().await = None;

        // A fresh bot must start from an empty session to get new QR codes.
        let session_dir = self.session_dir();
        if std::path::Path::new(&session_dir).exists() {
            info!("deleting WhatsApp session at {session_dir}");
            if let Err(e) = std::fs::remove_dir_all(&session_dir) {
                warn!("failed to delete WhatsApp session: {e}");
                return Err(e.into());
            }
        }

        info!("WhatsApp client destroyed");
        Ok(())
    }
}
