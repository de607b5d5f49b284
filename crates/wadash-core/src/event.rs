//! Events flowing in from the automation client and out to browsers.

use serde::{Deserialize, Serialize};

/// Lifecycle event emitted by an [`Automation`](crate::traits::Automation).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AutomationEvent {
    /// A new pairing challenge that must be scanned from the phone.
    Qr(String),
    /// Pairing completed; carries the paired account's phone number.
    Ready { client_identity: String },
    /// The session dropped or was unlinked from the phone.
    Disconnected,
}

/// Event pushed to every connected browser.
///
/// Serializes as `{"event": "<name>", "data": <payload>}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "lowercase")]
pub enum PushEvent {
    /// QR image as a `data:image/png;base64,...` URI.
    Qr(String),
    Login {
        status: String,
        #[serde(rename = "clientNumber")]
        client_number: String,
    },
    Logout {
        status: String,
        message: String,
    },
}

impl PushEvent {
    pub fn login(client_number: &str) -> Self {
        Self::Login {
            status: "success".to_string(),
            client_number: client_number.to_string(),
        }
    }

    pub fn logout() -> Self {
        Self::Logout {
            status: "success".to_string(),
            message: "Logged out successfully".to_string(),
        }
    }

    /// Event name as seen by the browser.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Qr(_) => "qr",
            Self::Login { .. } => "login",
            Self::Logout { .. } => "logout",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_event_wire_format() {
        let json = serde_json::to_value(PushEvent::login("6281234567")).unwrap();
        assert_eq!(json["event"], "login");
        assert_eq!(json["data"]["status"], "success");
        assert_eq!(json["data"]["clientNumber"], "6281234567");

        let json = serde_json::to_value(PushEvent::Qr("data:image/png;base64,AA".into())).unwrap();
        assert_eq!(json["event"], "qr");
        assert_eq!(json["data"], "data:image/png;base64,AA");

        let json = serde_json::to_value(PushEvent::logout()).unwrap();
        assert_eq!(json["event"], "logout");
        assert_eq!(json["data"]["message"], "Logged out successfully");
    }

    #[test]
    fn test_push_event_names() {
        assert_eq!(PushEvent::Qr(String::new()).name(), "qr");
        assert_eq!(PushEvent::login("1").name(), "login");
        assert_eq!(PushEvent::logout().name(), "logout");
    }
}
