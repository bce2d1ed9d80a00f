//! API token minting.

use std::fmt;

use base32::Alphabet;
use rand::{RngCore, rngs::OsRng};
use zeroize::Zeroize;

/// Prefix every issued token carries.
pub const API_TOKEN_PREFIX: &str = "dryci-";

/// Number of random bytes encoded in a token.
pub const API_TOKEN_SECRET_BYTES: usize = 16;

/// Longest bearer value worth looking up. Anything longer is rejected
/// without touching storage.
pub const MAX_BEARER_TOKEN_LEN: usize = 40;

/// Characters shown when listing tokens.
pub const API_TOKEN_PREFIX_DISPLAY_LEN: usize = 12;

pub struct ApiTokenSecret {
    bytes: [u8; API_TOKEN_SECRET_BYTES],
}

impl ApiTokenSecret {
    #[must_use]
    pub const fn from_bytes(bytes: [u8; API_TOKEN_SECRET_BYTES]) -> Self {
        Self { bytes }
    }

    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; API_TOKEN_SECRET_BYTES] {
        &self.bytes
    }
}

impl fmt::Debug for ApiTokenSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiTokenSecret(**redacted**)")
    }
}

impl Drop for ApiTokenSecret {
    fn drop(&mut self) {
        self.bytes.zeroize();
    }
}

#[must_use]
pub fn generate_api_token_secret() -> ApiTokenSecret {
    let mut secret = [0_u8; API_TOKEN_SECRET_BYTES];

    OsRng.fill_bytes(&mut secret);

    ApiTokenSecret::from_bytes(secret)
}

/// Render a secret as `dryci-` followed by unpadded lowercase base32.
#[must_use]
pub fn format_api_token(secret: &ApiTokenSecret) -> String {
    let encoded = base32::encode(Alphabet::Rfc4648 { padding: false }, secret.as_bytes());

    format!("{API_TOKEN_PREFIX}{}", encoded.to_ascii_lowercase())
}

/// Shortened form safe to print in listings and logs.
#[must_use]
pub fn token_display_prefix(token: &str) -> String {
    token.chars().take(API_TOKEN_PREFIX_DISPLAY_LEN).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formatted_token_has_prefix_and_lowercase_body() {
        let token = format_api_token(&ApiTokenSecret::from_bytes([0xAB; API_TOKEN_SECRET_BYTES]));

        let body = token.strip_prefix(API_TOKEN_PREFIX).unwrap_or_default();

        assert_eq!(body.len(), 26);
        assert!(
            body.chars()
                .all(|c| c.is_ascii_lowercase() || ('2'..='7').contains(&c))
        );
    }

    #[test]
    fn formatted_token_fits_bearer_limit() {
        let token = format_api_token(&generate_api_token_secret());

        assert!(token.len() <= MAX_BEARER_TOKEN_LEN);
    }

    #[test]
    fn generated_tokens_differ() {
        let a = format_api_token(&generate_api_token_secret());
        let b = format_api_token(&generate_api_token_secret());

        assert_ne!(a, b);
    }

    #[test]
    fn secret_debug_is_redacted() {
        let secret = ApiTokenSecret::from_bytes([0x01; API_TOKEN_SECRET_BYTES]);

        assert_eq!(format!("{secret:?}"), "ApiTokenSecret(**redacted**)");
    }

    #[test]
    fn display_prefix_truncates() {
        assert_eq!(
            token_display_prefix("dryci-abcdefghijklmnop"),
            "dryci-abcdef"
        );
    }
}
