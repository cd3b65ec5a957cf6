//! Wallet error types.

use sigbox_core::error::{AddressError, CoreError, CryptoError};
use sigbox_core::types::BoxId;
use thiserror::Error;

/// Errors that can occur while deriving keys, building, proving or
/// encoding transactions.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WalletError {
    /// Master key entropy must be exactly 32 bytes.
    #[error("invalid entropy length: expected 32 bytes, got {got}")]
    InvalidEntropyLength {
        /// Length actually supplied.
        got: usize,
    },

    /// Bad amounts, empty or duplicate inputs, or mismatched networks.
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),

    /// An input box is not guarded by the supplied key.
    #[error("prover key does not guard input {index} ({box_id})")]
    ProverKeyMismatch {
        /// Input position.
        index: usize,
        /// Box spent by that input.
        box_id: BoxId,
    },

    /// The key map has no entry for an input box.
    #[error("no key for input box {box_id}")]
    MissingKeyForInput {
        /// Box without a key.
        box_id: BoxId,
    },

    /// An input box is guarded by something other than a public key.
    #[error("input {index} is not a pay-to-public-key box")]
    UnsupportedProposition {
        /// Input position.
        index: usize,
    },

    /// An input box id is unknown to the box source.
    #[error("unknown box: {0}")]
    UnknownBox(BoxId),

    /// Input values do not equal transfer + fee + change.
    #[error("unbalanced transaction: inputs {inputs}, outputs {outputs}")]
    UnbalancedTransaction {
        /// Sum of input box values.
        inputs: u64,
        /// Sum of output values.
        outputs: u64,
    },

    /// A value sum overflowed u64.
    #[error("value overflow")]
    ValueOverflow,

    /// Not enough value among candidate boxes.
    #[error("insufficient funds: have {have}, need {need}")]
    InsufficientFunds {
        /// Available value.
        have: u64,
        /// Required value.
        need: u64,
    },

    /// No candidate boxes to select from.
    #[error("no boxes available")]
    NoBoxes,

    /// One entry of a batch failed; earlier entries are discarded.
    #[error("batch entry {index} failed: {source}")]
    BatchFailed {
        /// Position of the failing params.
        index: usize,
        /// Cause.
        source: Box<WalletError>,
    },

    /// Transaction inputs and the supplied input boxes differ in count.
    #[error("input count mismatch: transaction has {expected}, got {got} boxes")]
    InputCountMismatch {
        /// Inputs in the transaction.
        expected: usize,
        /// Boxes supplied.
        got: usize,
    },

    /// A supplied input box does not have the id the transaction spends.
    #[error("input {index} box id mismatch")]
    InputBoxMismatch {
        /// Input position.
        index: usize,
    },

    /// An input's proof failed to parse or verify.
    #[error("invalid proof on input {index}: {source}")]
    InvalidProof {
        /// Input position.
        index: usize,
        /// Cause.
        source: CryptoError,
    },

    /// Key derivation failure.
    #[error("key derivation: {0}")]
    KeyDerivation(String),

    /// Malformed derivation path.
    #[error("invalid derivation path: {0}")]
    InvalidDerivationPath(String),

    /// Invalid BIP-39 mnemonic phrase.
    #[error("invalid mnemonic: {0}")]
    InvalidMnemonic(String),

    /// Encoding or decoding failure.
    #[error("serialization: {0}")]
    Serialization(String),

    /// Address parsing error from sigbox-core.
    #[error(transparent)]
    Address(#[from] AddressError),

    /// Cryptographic error from sigbox-core.
    #[error(transparent)]
    Crypto(#[from] CryptoError),

    /// Core type error from sigbox-core.
    #[error(transparent)]
    Core(#[from] CoreError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use sigbox_core::types::Hash256;

    #[test]
    fn display_entropy_length() {
        let e = WalletError::InvalidEntropyLength { got: 16 };
        assert_eq!(
            e.to_string(),
            "invalid entropy length: expected 32 bytes, got 16"
        );
    }

    #[test]
    fn display_missing_key() {
        let e = WalletError::MissingKeyForInput {
            box_id: BoxId(Hash256([0xAB; 32])),
        };
        assert!(e.to_string().starts_with("no key for input box abab"));
    }

    #[test]
    fn display_batch_failed_includes_cause() {
        let e = WalletError::BatchFailed {
            index: 2,
            source: Box::new(WalletError::NoBoxes),
        };
        assert_eq!(e.to_string(), "batch entry 2 failed: no boxes available");
    }

    #[test]
    fn from_address_error() {
        let err: WalletError = AddressError::InvalidChecksum.into();
        assert_eq!(err, WalletError::Address(AddressError::InvalidChecksum));
    }

    #[test]
    fn from_crypto_error() {
        let err: WalletError = CryptoError::InvalidPublicKey.into();
        assert_eq!(err, WalletError::Crypto(CryptoError::InvalidPublicKey));
    }

    #[test]
    fn clone_and_eq() {
        let e1 = WalletError::InvalidParameters("zero".into());
        assert_eq!(e1.clone(), e1);
    }
}
