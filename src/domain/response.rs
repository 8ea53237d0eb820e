use serde_json::Value;

/// Application-level status Kavenegar uses for a successful call.
pub const STATUS_OK: i64 = 200;

/// Decoded Kavenegar reply.
///
/// Invariant: `entries` is only meaningful when `status == STATUS_OK`.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    pub status: i64,
    pub message: Option<String>,
    pub entries: Value,
}

impl Envelope {
    pub fn is_ok(&self) -> bool {
        self.status == STATUS_OK
    }
}
