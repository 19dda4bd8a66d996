//! Process-wide JWT signing secret.

use rand::RngCore;

/// Entropy backing a generated secret, in bytes.
const SECRET_BYTES: usize = 64;

/// Symmetric secret used to sign and verify tokens.
///
/// Generated once at startup and never persisted, so a restart invalidates
/// every outstanding token. The secret is passed explicitly through
/// `ServerConfig` rather than held as a global, which lets tests supply
/// deterministic values.
#[derive(Clone)]
pub struct SigningSecret(String);

impl SigningSecret {
    /// Generate a fresh secret from 64 bytes of entropy, hex-encoded.
    pub fn generate() -> Self {
        let mut bytes = [0u8; SECRET_BYTES];
        rand::rng().fill_bytes(&mut bytes);
        Self(hex::encode(bytes))
    }

    /// Wrap an externally supplied secret (env var, file, or tests).
    pub fn from_string(secret: String) -> Self {
        Self(secret)
    }

    /// Byte view used to build the JWT encoding/decoding keys.
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl std::fmt::Debug for SigningSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SigningSecret(..)")
    }
}
