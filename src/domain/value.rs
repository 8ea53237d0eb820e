use std::fmt;

use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};

use crate::domain::validation::ValidationError;

const MASK_FILL: &str = "********";

/// Characters escaped in a single URL path segment (the `url` crate's path-segment set).
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

#[derive(Clone, PartialEq, Eq, Hash)]
/// Kavenegar API key.
///
/// The key is embedded in every request URL, so it is treated as a secret:
/// `Debug` and `Display` only ever print the masked form.
///
/// Invariant: non-empty after trimming.
pub struct ApiKey {
    raw: String,
    path_segment: String,
    masked: String,
}

impl ApiKey {
    /// Name used in validation errors and configuration (`api_key`).
    pub const FIELD: &'static str = "api_key";

    /// Create a validated [`ApiKey`] and derive its masked form.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }
        Ok(Self {
            masked: mask(trimmed),
            path_segment: utf8_percent_encode(trimmed, PATH_SEGMENT).to_string(),
            raw: trimmed.to_owned(),
        })
    }

    /// Borrow the raw key.
    pub fn expose(&self) -> &str {
        &self.raw
    }

    /// The key percent-encoded as one URL path segment, as it appears in request URLs.
    pub fn path_segment(&self) -> &str {
        &self.path_segment
    }

    /// Masked display form: first two characters, eight `*`, last two characters.
    pub fn masked(&self) -> &str {
        &self.masked
    }

    /// Replace every occurrence of the key in `text`, raw or percent-encoded,
    /// with the masked form.
    pub fn redact(&self, text: &str) -> String {
        let text = text.replace(&self.raw, &self.masked);
        if self.path_segment == self.raw {
            return text;
        }
        text.replace(&self.path_segment, &self.masked)
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ApiKey").field(&self.masked).finish()
    }
}

impl fmt::Display for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.masked)
    }
}

fn mask(value: &str) -> String {
    let chars = value.chars().collect::<Vec<_>>();
    let head = chars.iter().take(2).collect::<String>();
    let tail = chars[chars.len().saturating_sub(2)..]
        .iter()
        .collect::<String>();
    format!("{head}{MASK_FILL}{tail}")
}
