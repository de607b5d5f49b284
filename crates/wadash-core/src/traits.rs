use crate::{error::WadashError, event::AutomationEvent, record::CredentialRecord};
use async_trait::async_trait;
use tokio::sync::mpsc;

/// Credential lookup backend.
///
/// Implementations run exactly one query per call: an equality filter on
/// `username`, limited to one result.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Human-readable backend name.
    fn name(&self) -> &str;

    /// Fetch the record whose username matches exactly, if any.
    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<CredentialRecord>, WadashError>;
}

/// Messaging automation client driving a linked-device session.
///
/// Lifecycle changes are reported through the sender handed to
/// [`initialize`](Automation::initialize); they never surface as errors
/// from the other methods.
#[async_trait]
pub trait Automation: Send + Sync {
    /// Human-readable client name.
    fn name(&self) -> &str;

    /// Start the client. Pairing challenges and lifecycle changes are
    /// delivered on `events` for as long as the client runs.
    async fn initialize(&self, events: mpsc::Sender<AutomationEvent>) -> Result<(), WadashError>;

    /// Send a text message to a recipient address.
    async fn send_message(&self, recipient: &str, body: &str) -> Result<(), WadashError>;

    /// Tear the client down and forget the linked session.
    async fn destroy(&self) -> Result<(), WadashError>;
}
