//! # wadash-channels
//!
//! WhatsApp automation for wadash: the linked-device client, its session
//! persistence, and QR encoding for the pairing flow.

pub mod whatsapp;
pub mod whatsapp_store;
