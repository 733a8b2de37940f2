//! Idempotency token generation
//!
//! ECS RunTask deduplicates launches that carry the same client token, so the
//! token must be a pure function of its seed. See
//! <https://docs.aws.amazon.com/AmazonECS/latest/APIReference/ECS_Idempotency.html>.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use sha2::{Digest, Sha256};

use crate::domain::task::MAX_TOKEN_LEN;

/// Derives a client token of at most 64 ASCII characters from `seed`
///
/// The seed is hashed with SHA-256 and encoded with the standard base64
/// alphabet. The same seed always yields the same token.
pub fn generate_idempotency_token(seed: &str) -> String {
    let digest = Sha256::digest(seed.as_bytes());
    let mut token = STANDARD.encode(digest);
    token.truncate(MAX_TOKEN_LEN);
    token
}
