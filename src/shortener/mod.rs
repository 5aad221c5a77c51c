//! Short code minting and the reuse-or-create shortening policy.

pub mod code;
pub mod error;
pub mod service;

pub use code::{digest_hex, sample_code, Candidates, CODE_LENGTH, DIGEST_BYTES};
pub use error::{ShortenerError, ShortenerResult};
pub use service::{Shortener, ShortenerConfig};
