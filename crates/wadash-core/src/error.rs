use thiserror::Error;

/// Top-level error type for wadash.
#[derive(Debug, Error)]
pub enum WadashError {
    /// Error from the credential store.
    #[error("store error: {0}")]
    Store(String),

    /// Error from the WhatsApp automation client.
    #[error("automation error: {0}")]
    Automation(String),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// QR encoding error.
    #[error("qr error: {0}")]
    Qr(String),

    /// Password hashing error.
    #[error("hash error: {0}")]
    Hash(String),

    /// I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
