//! WhatsApp pairing state, driven by automation events and fanned out to
//! every connected browser.

use tokio::sync::{broadcast, RwLock};
use tracing::{debug, error, info};
use wadash_channels::whatsapp::qr_data_url;
use wadash_core::event::{AutomationEvent, PushEvent};

/// Events buffered per subscriber before it starts lagging.
const PUSH_CAPACITY: usize = 32;

/// Where the automation session stands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PairingState {
    Unpaired,
    /// A QR code is waiting to be scanned; `qr_image` is a PNG data URI.
    AwaitingScan { qr_image: String },
    /// Linked to the phone whose number is `client_identity`.
    Paired { client_identity: String },
}

/// Pairing state machine plus the broadcast channel browsers listen on.
pub struct PairingTracker {
    state: RwLock<PairingState>,
    push: broadcast::Sender<PushEvent>,
}

impl Default for PairingTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl PairingTracker {
    pub fn new() -> Self {
        let (push, _) = broadcast::channel(PUSH_CAPACITY);
        Self {
            state: RwLock::new(PairingState::Unpaired),
            push,
        }
    }

    /// Apply one automation event and broadcast the resulting push event.
    pub async fn handle(&self, event: AutomationEvent) {
        let mut state = self.state.write().await;
        match event {
            AutomationEvent::Qr(challenge) => {
                if matches!(*state, PairingState::Paired { .. }) {
                    return;
                }
                let qr_image = match qr_data_url(&challenge) {
                    Ok(url) => url,
                    Err(e) => {
                        error!("failed to render pairing QR code: {e}");
                        return;
                    }
                };
                *state = PairingState::AwaitingScan {
                    qr_image: qr_image.clone(),
                };
                self.broadcast(PushEvent::Qr(qr_image));
            }
            AutomationEvent::Ready { client_identity } => {
                info!("WhatsApp paired as '{client_identity}'");
                self.broadcast(PushEvent::login(&client_identity));
                *state = PairingState::Paired { client_identity };
            }
            AutomationEvent::Disconnected => {
                info!("WhatsApp session ended");
                *state = PairingState::Unpaired;
                self.broadcast(PushEvent::logout());
            }
        }
    }

    pub async fn is_paired(&self) -> bool {
        matches!(*self.state.read().await, PairingState::Paired { .. })
    }

    pub async fn state(&self) -> PairingState {
        self.state.read().await.clone()
    }

    /// Receive every push event broadcast from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<PushEvent> {
        self.push.subscribe()
    }

    /// Number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.push.receiver_count()
    }

    /// The push event describing the current state, for a browser that just
    /// connected. `None` while unpaired.
    pub async fn snapshot(&self) -> Option<PushEvent> {
        match &*self.state.read().await {
            PairingState::Unpaired => None,
            PairingState::AwaitingScan { qr_image } => Some(PushEvent::Qr(qr_image.clone())),
            PairingState::Paired { client_identity } => Some(PushEvent::login(client_identity)),
        }
    }

    /// Mark the session unpaired without notifying browsers. Used when the
    /// dashboard itself tears the session down.
    pub async fn force_unpaired(&self) {
        *self.state.write().await = PairingState::Unpaired;
    }

    fn broadcast(&self, event: PushEvent) {
        let name = event.name();
        if self.push.send(event).is_err() {
            debug!("no browser connected for '{name}' event");
        }
    }
}
