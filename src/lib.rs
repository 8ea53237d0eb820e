//! Async Rust client for the Kavenegar SMS and voice-call HTTP API.
//!
//! The crate has three layers: a domain layer (API key, endpoint descriptors and
//! call parameters), a transport layer for wire-format quirks (form encoding of
//! nested values, envelope decoding), and a small client layer that runs one
//! HTTP exchange per call.
//!
//! ```rust,no_run
//! use kavenegar::{ApiKey, KavenegarClient, Params};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = KavenegarClient::new(ApiKey::new("...")?);
//!     let params = Params::new()
//!         .with("receptor", "09121234567")
//!         .with("message", "hello");
//!     let _entries = client.sms_send(Some(&params)).await?;
//!     Ok(())
//! }
//! ```
#![forbid(unsafe_code)]

pub mod client;
pub mod config;
pub mod domain;
mod transport;

pub use client::{
    KavenegarClient, KavenegarClientBuilder, KavenegarError, TransportError, TransportReason,
};
pub use config::{Config, ConfigError};
pub use domain::{ApiKey, Endpoint, Params, ValidationError};
