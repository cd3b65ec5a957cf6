//! # sigbox-wallet: payment transactions over pay-to-public-key boxes.
//!
//! Derives spending keys from 32 bytes of entropy, builds three-output
//! payment transactions, proves their inputs with discrete-log proofs and
//! encodes the result for transport.
//!
//! # Modules
//!
//! - [`error`]: `WalletError` enum
//! - [`keys`]: HMAC-SHA512 extended keys and derivation paths
//! - [`mnemonic`]: BIP-39 backup of master key entropy
//! - [`selection`]: largest-first box selection
//! - [`builder`]: `TxParams` validation and payment transaction building
//! - [`prover`]: single-key and key-map proving, transaction verification
//! - [`encoder`]: JSON and binary encodings of signed transactions

pub mod builder;
pub mod encoder;
pub mod error;
pub mod keys;
pub mod mnemonic;
pub mod prover;
pub mod selection;

// Re-exports for convenient access
pub use builder::{PaymentDraft, TransactionBuilder, TxParams};
pub use error::WalletError;
pub use keys::{DerivationPath, ExtendedPublicKey, ExtendedSecretKey, derive_master_key};
pub use prover::{KeyMap, Prover, verify_transaction};
pub use selection::{BoxSelection, select_boxes};
