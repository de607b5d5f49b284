//! Bot lifecycle: building the WhatsApp bot and mapping its events.

use super::WhatsAppAutomation;
use crate::whatsapp_store::SqlxWhatsAppStore;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use wacore::store::traits::DeviceStore;
use wacore::types::events::Event;
use wadash_core::{error::WadashError, event::AutomationEvent};
use whatsapp_rust::bot::Bot;
use whatsapp_rust_tokio_transport::TokioWebSocketTransportFactory;
use whatsapp_rust_ureq_http_client::UreqHttpClient;

impl WhatsAppAutomation {
    /// Build a bot on the persisted session and run it in the background.
    ///
    /// Pairing challenges and lifecycle changes are forwarded to `events`.
    pub(super) async fn build_and_run_bot(
        &self,
        events: mpsc::Sender<AutomationEvent>,
    ) -> Result<(), WadashError> {
        let db_path = self
            .session_db_path()
            .map_err(|e| WadashError::Automation(format!("session dir unavailable: {e}")))?;

        info!("WhatsApp bot building (session: {db_path})...");

        let backend = Arc::new(
            SqlxWhatsAppStore::new(&db_path)
                .await
                .map_err(|e| WadashError::Automation(format!("whatsapp store init failed: {e}")))?,
        );

        let client_handle = self.client.clone();
        let device_store = backend.clone();

        let mut bot = Bot::builder()
            .with_backend(backend)
            .with_transport_factory(TokioWebSocketTransportFactory::new())
            .with_http_client(UreqHttpClient::new())
            .with_device_props(
                Some(self.config.device_name.clone()),
                None,
                Some(waproto::whatsapp::device_props::PlatformType::Desktop),
            )
            .on_event(move |event, client| {
                let events = events.clone();
                let client_store = client_handle.clone();
                let device_store = device_store.clone();
                async move {
                    match event {
                        Event::PairingQrCode { code, .. } => {
                            info!("WhatsApp QR code generated (scan to pair)");
                            debug!("QR data: {code}");
                            let _ = events.send(AutomationEvent::Qr(code)).await;
                        }
                        Event::PairSuccess(_) => {
                            info!("WhatsApp pairing successful");
                        }
                        Event::Connected(_) => {
                            *client_store.lock().await = Some(client);
                            let client_identity = own_number(&device_store).await;
                            info!("WhatsApp connected as '{client_identity}'");
                            let _ = events
                                .send(AutomationEvent::Ready { client_identity })
                                .await;
                        }
                        Event::Disconnected(_) => {
                            warn!("WhatsApp disconnected");
                            *client_store.lock().await = None;
                            let _ = events.send(AutomationEvent::Disconnected).await;
                        }
                        Event::LoggedOut(_) => {
                            warn!("WhatsApp logged out, session invalidated");
                            *client_store.lock().await = None;
                            let _ = events.send(AutomationEvent::Disconnected).await;
                        }
                        _ => {}
                    }
                }
            })
            .build()
            .await
            .map_err(|e| WadashError::Automation(format!("whatsapp bot build failed: {e}")))?;

        *self.client.lock().await = Some(bot.client());

        let handle = bot
            .run()
            .await
            .map_err(|e| WadashError::Automation(format!("whatsapp bot run failed: {e}")))?;
        *self.task.lock().await = Some(handle);

        info!("WhatsApp bot started");
        Ok(())
    }
}

/// Phone number of the paired account, read from the stored device.
async fn own_number(store: &SqlxWhatsAppStore) -> String {
    match store.load().await {
        Ok(Some(device)) => device.pn.map(|jid| jid.user).unwrap_or_default(),
        Ok(None) => String::new(),
        Err(e) => {
            warn!("failed to read paired device: {e}");
            String::new()
        }
    }
}
