//! BIP-39 mnemonic backup and restoration of master key entropy.

use bip39::{Language, Mnemonic};

use crate::error::WalletError;

/// Convert 32 bytes of entropy to a 24-word BIP-39 mnemonic phrase.
pub fn entropy_to_mnemonic(entropy: &[u8; 32]) -> Result<String, WalletError> {
    let m = Mnemonic::from_entropy_in(Language::English, entropy)
        .map_err(|e| WalletError::InvalidMnemonic(e.to_string()))?;
    Ok(m.to_string())
}

/// Parse a BIP-39 mnemonic phrase and extract its 32 bytes of entropy.
///
/// Normalizes whitespace and converts to lowercase before parsing.
pub fn mnemonic_to_entropy(phrase: &str) -> Result<[u8; 32], WalletError> {
    let normalized = phrase
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();
    let m = Mnemonic::parse_in(Language::English, &normalized)
        .map_err(|e| WalletError::InvalidMnemonic(e.to_string()))?;
    let entropy = m.to_entropy();
    let bytes: [u8; 32] = entropy.as_slice().try_into().map_err(|_| {
        WalletError::InvalidMnemonic(format!(
            "expected 32 bytes of entropy, got {}",
            entropy.len()
        ))
    })?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::derive_master_key;

    #[test]
    fn roundtrip_known_vector() {
        let bytes: [u8; 32] = std::array::from_fn(|i| i as u8 + 1);
        let phrase = entropy_to_mnemonic(&bytes).unwrap();
        assert_eq!(mnemonic_to_entropy(&phrase).unwrap(), bytes);
    }

    #[test]
    fn mnemonic_is_24_words() {
        let phrase = entropy_to_mnemonic(&[0xAB; 32]).unwrap();
        let word_count = phrase.split_whitespace().count();
        assert_eq!(word_count, 24, "expected 24 words, got {word_count}: {phrase}");
    }

    #[test]
    fn restored_entropy_derives_same_master_key() {
        let entropy = [0x42; 32];
        let phrase = entropy_to_mnemonic(&entropy).unwrap();
        let restored = mnemonic_to_entropy(&phrase).unwrap();
        assert_eq!(
            derive_master_key(&entropy).unwrap().public_image(),
            derive_master_key(&restored).unwrap().public_image()
        );
    }

    #[test]
    fn invalid_word_rejected() {
        let err = mnemonic_to_entropy("abandon abandon abandon invalidword").unwrap_err();
        assert!(matches!(err, WalletError::InvalidMnemonic(_)));
        assert!(err.to_string().contains("invalid mnemonic"));
    }

    #[test]
    fn bad_checksum_rejected() {
        // 23 x "abandon" + "zoo" fails the 24-word checksum
        let mut phrase = vec!["abandon"; 23].join(" ");
        phrase.push_str(" zoo");
        assert!(mnemonic_to_entropy(&phrase).is_err());
    }

    #[test]
    fn twelve_word_phrase_rejected() {
        // Valid 128-bit mnemonic, but master keys need 256 bits
        let phrase = "abandon abandon abandon abandon abandon abandon \
                      abandon abandon abandon abandon abandon about";
        let err = mnemonic_to_entropy(phrase).unwrap_err();
        assert!(err.to_string().contains("expected 32 bytes"));
    }

    #[test]
    fn whitespace_and_case_normalization() {
        let entropy = [0x55; 32];
        let clean = entropy_to_mnemonic(&entropy).unwrap();
        let messy = clean
            .split_whitespace()
            .collect::<Vec<_>>()
            .join("   \t")
            .to_uppercase();
        assert_eq!(mnemonic_to_entropy(&messy).unwrap(), entropy);
    }
}
