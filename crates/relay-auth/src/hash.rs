use std::fmt::{self, Write as _};

use sha2::{Digest, Sha256};

/// SHA-256 digest of an API key, lowercase hex encoded
///
/// The only form in which keys are stored, compared, or logged.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct ApiKeyHash(String);

impl ApiKeyHash {
    /// Length of a hex-encoded SHA-256 digest
    pub const HEX_LEN: usize = 64;

    /// Accept an already-hashed key, e.g. from configuration
    ///
    /// Returns `None` unless the input is exactly 64 lowercase hex characters.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let valid = hex.len() == Self::HEX_LEN
            && hex.bytes().all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b));
        valid.then(|| Self(hex.to_owned()))
    }

    /// Whether `raw_key` hashes to this digest, compared in constant time
    pub fn matches(&self, raw_key: &str) -> bool {
        constant_time_eq(&hash_api_key(raw_key).0, &self.0)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ApiKeyHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for ApiKeyHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Enough to correlate log lines, not enough to brute-force offline
        write!(f, "ApiKeyHash({}…)", &self.0[..8])
    }
}

/// Hash a raw API key
pub fn hash_api_key(raw_key: &str) -> ApiKeyHash {
    let digest = Sha256::digest(raw_key.as_bytes());
    let mut hex = String::with_capacity(ApiKeyHash::HEX_LEN);
    for byte in digest {
        // Writing hex to a String is infallible
        write!(hex, "{byte:02x}").unwrap();
    }
    ApiKeyHash(hex)
}

/// Compare two strings without short-circuiting on the first difference
pub fn constant_time_eq(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let diff = a.bytes().zip(b.bytes()).fold(0u8, |acc, (x, y)| acc | (x ^ y));
    diff == 0
}
