//! Error types for the Sigbox core.
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("invalid box id: {0}")] InvalidBoxId(String),
    #[error("invalid hash: {0}")] InvalidHash(String),
    #[error("invalid proposition bytes: {0}")] InvalidProposition(String),
    #[error("serialization: {0}")] Serialization(String),
    #[error("value overflow")] ValueOverflow,
    #[error("too many outputs: {0}")] TooManyOutputs(usize),
    #[error("box source: {0}")] Source(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    #[error("invalid public key bytes")] InvalidPublicKey,
    #[error("invalid secret scalar")] InvalidSecret,
    #[error("invalid proof bytes")] InvalidProof,
    #[error("proof verification failed")] VerificationFailed,
}

/// Address parsing failures (the decode error of the address codec).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
    #[error("invalid base58: {0}")] InvalidBase58(String),
    #[error("invalid length: {0}")] InvalidLength(usize),
    #[error("invalid checksum")] InvalidChecksum,
    #[error("unknown address type: {0:#04x}")] UnknownAddressType(u8),
    #[error("network mismatch: expected {expected:#04x}, got {got:#04x}")] NetworkMismatch { expected: u8, got: u8 },
    #[error("unknown network prefix: {0:#04x}")] UnknownNetwork(u8),
    #[error("invalid public key in address")] InvalidPublicKey,
}
