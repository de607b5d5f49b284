//! # wadash-core
//!
//! Core types, traits, configuration, and error handling shared by the
//! wadash dashboard and its integrations.

pub mod config;
pub mod error;
pub mod event;
pub mod record;
pub mod traits;

pub use config::shellexpand;
