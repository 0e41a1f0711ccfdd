//! Hex-to-base64 signature encoding.
//!
//! Digest-style signers produce hex strings; the daemon's verifier expects
//! base64 over the raw bytes. The conversion must be exact — any deviation
//! produces a signature the daemon rejects silently.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

use crate::error::SigningError;

/// Convert a hex string to the base64 form the daemon verifies.
///
/// Whitespace and a leading `0x`/`0X` radix prefix are stripped; the
/// remaining characters are interpreted as big-endian byte pairs. Malformed
/// hex (odd length, non-hex characters) fails — it is never truncated.
pub fn hex_to_base64(hex_str: &str) -> Result<String, SigningError> {
    let cleaned: String = hex_str.chars().filter(|c| !c.is_whitespace()).collect();
    let cleaned = cleaned
        .strip_prefix("0x")
        .or_else(|| cleaned.strip_prefix("0X"))
        .unwrap_or(&cleaned);

    let bytes = hex::decode(cleaned)
        .map_err(|e| SigningError::AlgorithmFailure(format!("malformed hex digest: {e}")))?;

    Ok(STANDARD.encode(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_value() {
        // "Hello" in hex
        assert_eq!(hex_to_base64("48656c6c6f").unwrap(), "SGVsbG8=");
    }

    #[test]
    fn strips_radix_prefix_and_whitespace() {
        assert_eq!(hex_to_base64("0x48 65 6c 6c 6f").unwrap(), "SGVsbG8=");
        assert_eq!(hex_to_base64("  0X48656C6C6F\n").unwrap(), "SGVsbG8=");
    }

    #[test]
    fn empty_hex_is_empty_base64() {
        assert_eq!(hex_to_base64("").unwrap(), "");
    }

    #[test]
    fn odd_length_fails() {
        assert!(hex_to_base64("48656c6c6").is_err());
    }

    #[test]
    fn non_hex_characters_fail() {
        assert!(hex_to_base64("48zz6c6c6f").is_err());
    }

    #[test]
    fn round_trips_raw_bytes() {
        let raw: Vec<u8> = (0u8..=255).collect();
        let encoded = hex_to_base64(&hex::encode(&raw)).unwrap();
        let decoded = STANDARD.decode(encoded).unwrap();
        assert_eq!(decoded, raw);
    }
}
