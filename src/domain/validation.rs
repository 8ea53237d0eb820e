use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
/// A value rejected while constructing a key or a client.
pub enum ValidationError {
    /// The field was empty (or only whitespace).
    Empty { field: &'static str },
    /// The base URL or proxy URL could not be parsed.
    InvalidUrl { field: &'static str, input: String },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty { field } => write!(f, "{field} must not be empty"),
            Self::InvalidUrl { field, input } => write!(f, "invalid {field} url: {input}"),
        }
    }
}

impl std::error::Error for ValidationError {}
