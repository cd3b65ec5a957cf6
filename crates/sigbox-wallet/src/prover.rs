//! Proving and verifying payment transactions.
//!
//! Every input of a payment spends a pay-to-public-key box. Proving attaches
//! a [`DlogProof`] per input over the transaction's bytes-to-sign, so the
//! transaction id is the same before and after signing. All guards are
//! checked before the first proof is computed; a failed call produces no
//! partially signed transaction.

use std::collections::BTreeMap;

use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};
use tracing::{debug, info};

use sigbox_core::crypto::{DlogProof, PrivateInput, PublicKey};
use sigbox_core::types::{BoxId, Input, LedgerBox, SignedTransaction, SpendingProof};

use crate::builder::PaymentDraft;
use crate::error::WalletError;

/// Secret keys indexed by the box each one spends.
pub type KeyMap = BTreeMap<BoxId, PrivateInput>;

/// Signs payment drafts.
#[derive(Debug, Clone, Copy, Default)]
pub struct Prover;

impl Prover {
    /// Prove every input with a single key, using the OS RNG for nonces.
    ///
    /// Fails with `ProverKeyMismatch` on the first input not guarded by
    /// `key`'s public image.
    pub fn prove(draft: &PaymentDraft, key: &PrivateInput) -> Result<SignedTransaction, WalletError> {
        Self::prove_with_rng(draft, key, &mut OsRng)
    }

    /// Single-key proving with a caller-supplied RNG.
    pub fn prove_with_rng<R: RngCore + CryptoRng>(
        draft: &PaymentDraft,
        key: &PrivateInput,
        rng: &mut R,
    ) -> Result<SignedTransaction, WalletError> {
        let image = key.public_image();
        for (index, b) in draft.input_boxes().iter().enumerate() {
            if guard_key(index, b)? != &image {
                return Err(WalletError::ProverKeyMismatch {
                    index,
                    box_id: b.box_id(),
                });
            }
        }
        let keys = vec![key; draft.input_boxes().len()];
        Ok(sign(draft, &keys, rng))
    }

    /// Prove each input with the key mapped to its box id, using the OS RNG.
    ///
    /// Fails with `MissingKeyForInput` when an input has no entry and with
    /// `ProverKeyMismatch` when an entry does not guard its box. The map is
    /// consumed and its keys are zeroized when proving ends.
    pub fn prove_with_keys(draft: &PaymentDraft, keys: KeyMap) -> Result<SignedTransaction, WalletError> {
        Self::prove_with_keys_rng(draft, keys, &mut OsRng)
    }

    /// Multi-key proving with a caller-supplied RNG.
    pub fn prove_with_keys_rng<R: RngCore + CryptoRng>(
        draft: &PaymentDraft,
        keys: KeyMap,
        rng: &mut R,
    ) -> Result<SignedTransaction, WalletError> {
        let mut selected = Vec::with_capacity(draft.input_boxes().len());
        for (index, b) in draft.input_boxes().iter().enumerate() {
            let box_id = b.box_id();
            let key = keys
                .get(&box_id)
                .ok_or(WalletError::MissingKeyForInput { box_id })?;
            if guard_key(index, b)? != &key.public_image() {
                return Err(WalletError::ProverKeyMismatch { index, box_id });
            }
            selected.push(key);
        }
        Ok(sign(draft, &selected, rng))
    }
}

/// Verify a signed transaction against the boxes it spends.
///
/// Checks that `input_boxes` matches the inputs one to one, that every proof
/// verifies against its box's guard, and that input and output values
/// balance.
pub fn verify_transaction(
    tx: &SignedTransaction,
    input_boxes: &[LedgerBox],
) -> Result<(), WalletError> {
    if tx.inputs.len() != input_boxes.len() {
        return Err(WalletError::InputCountMismatch {
            expected: tx.inputs.len(),
            got: input_boxes.len(),
        });
    }

    let message = tx.bytes_to_sign();
    let mut input_total: u64 = 0;
    for (index, (input, b)) in tx.inputs.iter().zip(input_boxes).enumerate() {
        if input.box_id != b.box_id() {
            return Err(WalletError::InputBoxMismatch { index });
        }
        let public_key = guard_key(index, b)?;
        DlogProof::from_bytes(&input.spending_proof.proof_bytes)
            .and_then(|proof| proof.verify(public_key, &message))
            .map_err(|source| WalletError::InvalidProof { index, source })?;
        input_total = input_total
            .checked_add(b.value())
            .ok_or(WalletError::ValueOverflow)?;
    }

    let output_total = tx.total_output_value().ok_or(WalletError::ValueOverflow)?;
    if input_total != output_total {
        return Err(WalletError::UnbalancedTransaction {
            inputs: input_total,
            outputs: output_total,
        });
    }
    Ok(())
}

fn guard_key(index: usize, b: &LedgerBox) -> Result<&PublicKey, WalletError> {
    b.proposition()
        .public_key()
        .ok_or(WalletError::UnsupportedProposition { index })
}

/// `keys[i]` proves input `i`. Guards have already been checked.
fn sign<R: RngCore + CryptoRng>(
    draft: &PaymentDraft,
    keys: &[&PrivateInput],
    rng: &mut R,
) -> SignedTransaction {
    let unsigned = draft.tx();
    let message = unsigned.bytes_to_sign();
    let inputs = unsigned
        .inputs
        .iter()
        .zip(keys)
        .enumerate()
        .map(|(index, (input, key))| {
            let proof = DlogProof::prove(key, &message, rng);
            debug!(index, box_id = %input.box_id, "proved input");
            Input {
                box_id: input.box_id,
                spending_proof: SpendingProof {
                    proof_bytes: proof.to_bytes().to_vec(),
                },
            }
        })
        .collect();
    let signed = SignedTransaction {
        inputs,
        outputs: unsigned.outputs.clone(),
    };
    info!(tx_id = %signed.id(), inputs = signed.inputs.len(), "signed transaction");
    signed
}
