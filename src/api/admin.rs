//! WhatsApp admin actions.

use super::error::{ApiError, ApiReply};
use super::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::response::Json;
use serde_json::Value;
use tracing::{error, info, warn};
use wadash_auth::validate::{required_string, FieldError};
use wadash_channels::whatsapp::recipient_address;
use wadash_core::error::WadashError;

/// `POST /admin/whatsapp/send-message`: send `{phone_number, message}`.
pub(super) async fn send_message(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<ApiReply, ApiError> {
    let Json(body) = body?;

    let phone_number = required_field(&body, "phone_number", "Phone number is required")?;
    let message = required_field(&body, "message", "Message is required")?;

    if !state.tracker.is_paired().await {
        return Err(ApiError::Failed(
            "WhatsApp is not logged in. Please scan the QR code to log in.".into(),
        ));
    }

    let recipient = recipient_address(phone_number);
    state
        .automation
        .send_message(&recipient, message)
        .await
        .map_err(|e| {
            error!("sending to {recipient} failed: {e}");
            ApiError::Internal(match e {
                WadashError::Automation(m) => m,
                other => other.to_string(),
            })
        })?;

    info!("message sent to {recipient}");
    Ok(ApiReply::ok("Success", "Message sent successfully"))
}

/// `POST /admin/whatsapp/logout`: unlink the WhatsApp session.
pub(super) async fn logout(State(state): State<AppState>) -> Result<ApiReply, ApiError> {
    if !state.tracker.is_paired().await {
        return Err(ApiError::Failed("WhatsApp is already logged out.".into()));
    }

    state.tracker.force_unpaired().await;
    if let Err(e) = state.automation.destroy().await {
        warn!("WhatsApp teardown failed: {e}");
    }
    info!("WhatsApp session logged out by administrator");

    if state.repair_after_logout {
        let automation = state.automation.clone();
        let events = state.events.clone();
        tokio::spawn(async move {
            if let Err(e) = automation.initialize(events).await {
                error!("WhatsApp re-initialization failed: {e}");
            }
        });
    }

    Ok(ApiReply::ok("Success", "Successfully Logout"))
}

/// A required, non-empty string field of a JSON object body.
fn required_field<'a>(
    body: &'a Value,
    field: &str,
    empty_message: &str,
) -> Result<&'a str, ApiError> {
    required_string(body.get(field), 0).map_err(|e| {
        ApiError::BadRequest(match e {
            FieldError::Missing => format!("\"{field}\" is required"),
            FieldError::NotString => format!("\"{field}\" must be a string"),
            FieldError::Empty | FieldError::TooShort(_) => empty_message.to_string(),
        })
    })
}
