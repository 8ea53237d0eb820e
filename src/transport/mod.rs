//! Transport layer: wire-format details (form encoding, envelope decoding).

mod envelope;
mod params;

pub use envelope::decode_envelope;
pub use params::encode_params;
