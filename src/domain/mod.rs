//! Domain layer: credential, endpoint descriptors and call parameters (no I/O).

mod request;
mod response;
mod validation;
mod value;

pub use request::{Endpoint, Params};
pub(crate) use response::Envelope;
pub use validation::ValidationError;
pub use value::ApiKey;
