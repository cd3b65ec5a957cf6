//! Payment transaction builder.
//!
//! Turns validated [`TxParams`] into an unsigned transaction with exactly
//! three outputs, in this order:
//!
//! 1. recipient box (`transfer`, guarded by the recipient's key)
//! 2. fee box (`fee`, guarded by the fee-collection proposition)
//! 3. change box (`change`, guarded by the change address's key)
//!
//! Input values are resolved through a [`BoxSource`] and must equal
//! `transfer + fee + change` exactly. Building never touches key material.

use std::collections::HashSet;

use tracing::debug;

use sigbox_core::address::Address;
use sigbox_core::constants::MIN_FEE;
use sigbox_core::traits::BoxSource;
use sigbox_core::types::{BoxCandidate, BoxId, LedgerBox, Proposition, UnsignedInput, UnsignedTransaction};

use crate::error::WalletError;

/// Validated parameters for one payment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxParams {
    recipient: Address,
    change_address: Address,
    transfer: u64,
    fee: u64,
    change: u64,
    inputs: Vec<BoxId>,
    height: u32,
}

impl TxParams {
    /// Validate payment parameters against the default minimum fee.
    ///
    /// See [`TransactionBuilder::tx_params`].
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        recipient: Address,
        change_address: Address,
        transfer: u64,
        fee: u64,
        change: u64,
        inputs: Vec<BoxId>,
        height: u32,
    ) -> Result<Self, WalletError> {
        TransactionBuilder::default().tx_params(
            recipient,
            change_address,
            transfer,
            fee,
            change,
            inputs,
            height,
        )
    }

    /// Recipient address.
    pub fn recipient(&self) -> &Address {
        &self.recipient
    }

    /// Address receiving the change box.
    pub fn change_address(&self) -> &Address {
        &self.change_address
    }

    /// Value sent to the recipient.
    pub fn transfer(&self) -> u64 {
        self.transfer
    }

    /// Miner fee.
    pub fn fee(&self) -> u64 {
        self.fee
    }

    /// Value returned to the change address.
    pub fn change(&self) -> u64 {
        self.change
    }

    /// Input box ids, in spending order.
    pub fn inputs(&self) -> &[BoxId] {
        &self.inputs
    }

    /// Creation height stamped on every output.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// `transfer + fee + change`, or `None` on overflow.
    pub fn output_total(&self) -> Option<u64> {
        self.transfer
            .checked_add(self.fee)?
            .checked_add(self.change)
    }
}

/// An unsigned transaction together with the boxes its inputs spend.
///
/// Input boxes are kept in input order so the prover can check each guard
/// without another lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentDraft {
    tx: UnsignedTransaction,
    input_boxes: Vec<LedgerBox>,
}

impl PaymentDraft {
    /// Pair an unsigned transaction with the boxes it spends.
    ///
    /// The boxes must match the transaction inputs one to one, in order.
    pub fn new(tx: UnsignedTransaction, input_boxes: Vec<LedgerBox>) -> Result<Self, WalletError> {
        if tx.inputs.len() != input_boxes.len() {
            return Err(WalletError::InputCountMismatch {
                expected: tx.inputs.len(),
                got: input_boxes.len(),
            });
        }
        for (index, (input, b)) in tx.inputs.iter().zip(&input_boxes).enumerate() {
            if input.box_id != b.box_id() {
                return Err(WalletError::InputBoxMismatch { index });
            }
        }
        Ok(Self { tx, input_boxes })
    }

    /// The unsigned transaction.
    pub fn tx(&self) -> &UnsignedTransaction {
        &self.tx
    }

    /// Boxes spent by the transaction, in input order.
    pub fn input_boxes(&self) -> &[LedgerBox] {
        &self.input_boxes
    }

    /// Split into the transaction and its input boxes.
    pub fn into_parts(self) -> (UnsignedTransaction, Vec<LedgerBox>) {
        (self.tx, self.input_boxes)
    }
}

/// Builder for payment transactions.
///
/// # Example
/// ```ignore
/// let builder = TransactionBuilder::new();
/// let params = builder.tx_params(to, change_to, 25_000_000, 1_000_000, 20_000, ids, 32_987)?;
/// let draft = builder.payment_transaction(&params, &utxos)?;
/// ```
#[derive(Debug, Clone)]
pub struct TransactionBuilder {
    min_fee: u64,
}

impl TransactionBuilder {
    /// Create a builder enforcing [`MIN_FEE`].
    pub fn new() -> Self {
        Self { min_fee: MIN_FEE }
    }

    /// Override the minimum fee (default: [`MIN_FEE`]).
    pub fn set_min_fee(&mut self, min_fee: u64) -> &mut Self {
        self.min_fee = min_fee;
        self
    }

    /// Minimum fee enforced by [`tx_params`](Self::tx_params).
    pub fn min_fee(&self) -> u64 {
        self.min_fee
    }

    /// Validate payment parameters.
    ///
    /// Fails with `InvalidParameters` when the transfer is zero, the fee is
    /// below the minimum, the input list is empty or has duplicates, or the
    /// two addresses belong to different networks.
    #[allow(clippy::too_many_arguments)]
    pub fn tx_params(
        &self,
        recipient: Address,
        change_address: Address,
        transfer: u64,
        fee: u64,
        change: u64,
        inputs: Vec<BoxId>,
        height: u32,
    ) -> Result<TxParams, WalletError> {
        if transfer == 0 {
            return Err(WalletError::InvalidParameters(
                "transfer amount must be non-zero".into(),
            ));
        }
        if fee < self.min_fee {
            return Err(WalletError::InvalidParameters(format!(
                "fee {fee} below minimum {}",
                self.min_fee
            )));
        }
        if inputs.is_empty() {
            return Err(WalletError::InvalidParameters("no input boxes".into()));
        }
        let mut seen = HashSet::with_capacity(inputs.len());
        for id in &inputs {
            if !seen.insert(id) {
                return Err(WalletError::InvalidParameters(format!(
                    "duplicate input box {id}"
                )));
            }
        }
        if recipient.network() != change_address.network() {
            return Err(WalletError::InvalidParameters(format!(
                "recipient on {}, change address on {}",
                recipient.network().name(),
                change_address.network().name()
            )));
        }
        Ok(TxParams {
            recipient,
            change_address,
            transfer,
            fee,
            change,
            inputs,
            height,
        })
    }

    /// Build the unsigned payment transaction for `params`.
    ///
    /// Every input box is resolved through `source`; unknown ids fail with
    /// `UnknownBox`. Input and output sums use checked arithmetic and must
    /// be equal, else `UnbalancedTransaction`.
    pub fn payment_transaction(
        &self,
        params: &TxParams,
        source: &dyn BoxSource,
    ) -> Result<PaymentDraft, WalletError> {
        let mut input_boxes = Vec::with_capacity(params.inputs.len());
        let mut input_total: u64 = 0;
        for id in &params.inputs {
            let b = source.get_box(id)?.ok_or(WalletError::UnknownBox(*id))?;
            input_total = input_total
                .checked_add(b.value())
                .ok_or(WalletError::ValueOverflow)?;
            input_boxes.push(b);
        }

        let output_total = params.output_total().ok_or(WalletError::ValueOverflow)?;
        if input_total != output_total {
            return Err(WalletError::UnbalancedTransaction {
                inputs: input_total,
                outputs: output_total,
            });
        }

        let outputs = vec![
            BoxCandidate {
                value: params.transfer,
                proposition: params.recipient.to_proposition(),
                creation_height: params.height,
            },
            BoxCandidate {
                value: params.fee,
                proposition: Proposition::fee(),
                creation_height: params.height,
            },
            BoxCandidate {
                value: params.change,
                proposition: params.change_address.to_proposition(),
                creation_height: params.height,
            },
        ];
        let tx = UnsignedTransaction {
            inputs: params
                .inputs
                .iter()
                .map(|id| UnsignedInput { box_id: *id })
                .collect(),
            outputs,
        };

        debug!(
            tx_id = %tx.id(),
            inputs = tx.inputs.len(),
            transfer = params.transfer,
            fee = params.fee,
            change = params.change,
            "built payment transaction"
        );

        Ok(PaymentDraft { tx, input_boxes })
    }

    /// Build one transaction per params entry, in order.
    ///
    /// Aborts on the first failure with `BatchFailed { index, .. }`; nothing
    /// built before the failure is returned.
    pub fn payment_transactions(
        &self,
        params: &[TxParams],
        source: &dyn BoxSource,
    ) -> Result<Vec<PaymentDraft>, WalletError> {
        params
            .iter()
            .enumerate()
            .map(|(index, p)| {
                self.payment_transaction(p, source)
                    .map_err(|e| WalletError::BatchFailed {
                        index,
                        source: Box::new(e),
                    })
            })
            .collect()
    }

    /// Build one transaction per params entry, recording each outcome.
    ///
    /// The result has one entry per params index; a failure never affects
    /// other entries.
    pub fn payment_transactions_partial(
        &self,
        params: &[TxParams],
        source: &dyn BoxSource,
    ) -> Vec<Result<PaymentDraft, WalletError>> {
        params
            .iter()
            .map(|p| self.payment_transaction(p, source))
            .collect()
    }
}

impl Default for TransactionBuilder {
    fn default() -> Self {
        Self::new()
    }
}
