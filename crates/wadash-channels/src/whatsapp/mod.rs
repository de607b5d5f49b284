//! WhatsApp automation via `whatsapp-rust`.
//!
//! Uses the WhatsApp Web protocol (Noise handshake + Signal encryption).
//! Pairing is done by scanning a QR code from the phone's "Linked devices"
//! screen. The session is persisted to
//! `{data_dir}/whatsapp_session/whatsapp.db`.

mod automation;
mod bot;
mod qr;
mod send;


pub use qr::{generate_qr_image, qr_data_url};
pub use send::{recipient_address, split_message, MAX_MESSAGE_CHARS};

use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use wadash_core::{config::WhatsAppConfig, shellexpand};
use whatsapp_rust::client::Client;

/// WhatsApp automation client backed by a linked-device session.
pub struct WhatsAppAutomation {
    pub(super) config: WhatsAppConfig,
    pub(super) data_dir: String,
    /// Client handle for sending; set once the bot is built.
    pub(super) client: Arc<Mutex<Option<Arc<Client>>>>,
    /// Background task running the bot.
    pub(super) task: Mutex<Option<JoinHandle<()>>>,
}

impl WhatsAppAutomation {
    pub fn new(config: WhatsAppConfig, data_dir: &str) -> Self {
        Self {
            config,
            data_dir: data_dir.to_string(),
            client: Arc::new(Mutex::new(None)),
            task: Mutex::new(None),
        }
    }

    /// Whether a bot is currently running.
    pub async fn is_running(&self) -> bool {
        self.task
            .lock()
            .await
            .as_ref()
            .is_some_and(|task| !task.is_finished())
    }

    /// Directory holding the linked-device session.
    pub fn session_dir(&self) -> String {
        session_dir(&self.data_dir)
    }

    /// Session database path, creating its directory if needed.
    pub(super) fn session_db_path(&self) -> Result<String, std::io::Error> {
        let dir = self.session_dir();
        std::fs::create_dir_all(&dir)?;
        Ok(format!("{dir}/whatsapp.db"))
    }
}

/// `{data_dir}/whatsapp_session`, with `~` expanded.
pub fn session_dir(data_dir: &str) -> String {
    format!("{}/whatsapp_session", shellexpand(data_dir))
}
