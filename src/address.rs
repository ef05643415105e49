//! EVM wallet address validation and EIP-55 checksumming

use crate::error::AnalyzerError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A validated 20-byte EVM address
///
/// Holds both the EIP-55 checksummed form (for display and results) and the
/// lowercase form used for case-insensitive comparisons.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WalletAddress {
    checksummed: String,
    lower: String,
}

impl WalletAddress {
    /// EIP-55 mixed-case representation
    pub fn checksummed(&self) -> &str {
        &self.checksummed
    }

    /// Lowercase `0x`-prefixed representation
    pub fn lower(&self) -> &str {
        &self.lower
    }

    /// Case-insensitive comparison against a raw address string from an API
    pub fn matches(&self, other: &str) -> bool {
        other.trim().eq_ignore_ascii_case(&self.lower)
    }
}

impl fmt::Display for WalletAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.checksummed)
    }
}

/// Keccak-256 hash
fn keccak256(data: &[u8]) -> [u8; 32] {
    use tiny_keccak::{Hasher, Keccak};
    let mut hasher = Keccak::v256();
    let mut output = [0u8; 32];
    hasher.update(data);
    hasher.finalize(&mut output);
    output
}

/// EIP-55 mixed-case checksum of a lowercase 40-char hex body (no prefix)
fn eip55_checksum(hex_lower: &str) -> String {
    let hash = keccak256(hex_lower.as_bytes());
    let mut checksummed = String::with_capacity(42);
    checksummed.push_str("0x");
    for (i, c) in hex_lower.chars().enumerate() {
        let hash_nibble = if i % 2 == 0 { hash[i / 2] >> 4 } else { hash[i / 2] & 0x0f };
        if hash_nibble >= 8 {
            checksummed.push(c.to_ascii_uppercase());
        } else {
            checksummed.push(c);
        }
    }
    checksummed
}

/// Parse and validate a wallet address
///
/// Accepts `0x` followed by 40 hex characters. Single-case input is accepted
/// as-is; mixed-case input must carry a valid EIP-55 checksum.
pub fn parse_address(input: &str) -> Result<WalletAddress, AnalyzerError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(AnalyzerError::MissingAddress);
    }

    let body = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .ok_or_else(|| AnalyzerError::InvalidAddress(trimmed.to_string()))?;

    if body.len() != 40 || hex::decode(body).is_err() {
        return Err(AnalyzerError::InvalidAddress(trimmed.to_string()));
    }

    let hex_lower = body.to_ascii_lowercase();
    let checksummed = eip55_checksum(&hex_lower);

    let has_lower = body.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = body.chars().any(|c| c.is_ascii_uppercase());
    if has_lower && has_upper && &checksummed[2..] != body {
        return Err(AnalyzerError::InvalidAddress(trimmed.to_string()));
    }

    Ok(WalletAddress {
        checksummed,
        lower: format!("0x{}", hex_lower),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    // Reference vectors from EIP-55
    const CHECKSUMMED: [&str; 4] = [
        "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed",
        "0xfB6916095ca1df60bB79Ce92cE3Ea74c37c5d359",
        "0xdbF03B407c01E7cD3CBea99509d93f8DDDC8C6FB",
        "0xD1220A0cf47c7B9Be7A2E6BA89F429762e7b9aDb",
    ];

    #[test]
    fn test_eip55_vectors_round_trip() {
        for addr in CHECKSUMMED {
            let parsed = parse_address(addr).unwrap();
            assert_eq!(parsed.checksummed(), addr);
            assert_eq!(parsed.lower(), addr.to_ascii_lowercase());
        }
    }

    #[test]
    fn test_single_case_accepted_and_checksummed() {
        let lower = CHECKSUMMED[0].to_ascii_lowercase();
        let parsed = parse_address(&lower).unwrap();
        assert_eq!(parsed.checksummed(), CHECKSUMMED[0]);

        let upper = format!("0x{}", CHECKSUMMED[1][2..].to_ascii_uppercase());
        assert_eq!(parse_address(&upper).unwrap().checksummed(), CHECKSUMMED[1]);
    }

    #[test]
    fn test_bad_checksum_rejected() {
        // Flip the case of one letter in a valid checksum
        let bad = "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAeD";
        assert!(matches!(parse_address(bad), Err(AnalyzerError::InvalidAddress(_))));
    }

    #[test]
    fn test_wrong_length_and_chars_rejected() {
        assert!(parse_address("0x1234").is_err());
        assert!(parse_address("5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed").is_err());
        assert!(parse_address("0xZZAeb6053F3E94C9b9A09f33669435E7Ef1BeAed").is_err());
        assert!(parse_address("0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed00").is_err());
    }

    #[test]
    fn test_missing_address() {
        assert!(matches!(parse_address(""), Err(AnalyzerError::MissingAddress)));
        assert!(matches!(parse_address("   "), Err(AnalyzerError::MissingAddress)));
    }

    #[test]
    fn test_case_insensitive_match() {
        let parsed = parse_address(CHECKSUMMED[2]).unwrap();
        assert!(parsed.matches(&CHECKSUMMED[2].to_ascii_uppercase().replace("0X", "0x")));
        assert!(parsed.matches(&CHECKSUMMED[2].to_ascii_lowercase()));
        assert!(!parsed.matches(CHECKSUMMED[3]));
    }
}
