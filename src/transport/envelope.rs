use serde::Deserialize;
use serde_json::Value;

use crate::domain::Envelope;

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("Error decoding response: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Deserialize)]
struct EnvelopeJson {
    #[serde(rename = "return")]
    status: ReturnJson,
    #[serde(default)]
    entries: Value,
}

#[derive(Debug, Deserialize)]
struct ReturnJson {
    status: i64,
    #[serde(default)]
    message: Option<String>,
}

/// Decode a Kavenegar reply body: `{"return": {"status", "message"}, "entries"}`.
pub fn decode_envelope(body: &str) -> Result<Envelope, DecodeError> {
    let parsed: EnvelopeJson = serde_json::from_str(body)?;
    Ok(Envelope {
        status: parsed.status.status,
        message: parsed.status.message,
        entries: parsed.entries,
    })
}
