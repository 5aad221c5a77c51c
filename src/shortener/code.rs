use blake2::digest::consts::U5;
use blake2::{Blake2b, Digest};
use rand::Rng;

/// Output size of the URL digest, in bytes. Rendered as twice as many hex characters.
pub const DIGEST_BYTES: usize = 5;

/// Number of characters in a short code.
pub const CODE_LENGTH: usize = 5;

type UrlHasher = Blake2b<U5>;

/// BLAKE2b digest of `url` with a 5-byte output length, as lowercase hex.
pub fn digest_hex(url: &str) -> String {
    UrlHasher::digest(url.as_bytes())
        .iter()
        .map(|byte| format!("{byte:02x}"))
        .collect()
}

/// Pick [`CODE_LENGTH`] distinct positions of `digest` and join their characters
/// in the order the positions were drawn.
///
/// `digest` must be ASCII and at least [`CODE_LENGTH`] characters long.
pub fn sample_code<R: Rng + ?Sized>(digest: &str, rng: &mut R) -> String {
    let chars = digest.as_bytes();
    rand::seq::index::sample(rng, chars.len(), CODE_LENGTH)
        .into_iter()
        .map(|position| chars[position] as char)
        .collect()
}

/// Endless sequence of candidate codes for one URL.
///
/// Each step hashes the working URL, samples a code from the digest and then
/// appends the filler character so the next digest differs.
#[derive(Debug, Clone)]
pub struct Candidates {
    working_url: String,
    filler: char,
}

impl Candidates {
    pub fn new(url: &str, filler: char) -> Self {
        Self {
            working_url: url.to_owned(),
            filler,
        }
    }

    /// The URL that the next candidate will be derived from.
    pub fn working_url(&self) -> &str {
        &self.working_url
    }
}

impl Iterator for Candidates {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        let code = sample_code(&digest_hex(&self.working_url), &mut rand::rng());
        self.working_url.push(self.filler);
        Some(code)
    }
}
