//! Core ledger types: boxes, spending conditions, transactions.
//!
//! All monetary values are in nano-units (1 coin = 10^9 nano-units).
//! A box is an unspent output identified by a [`BoxId`]; a transaction
//! consumes boxes by id and creates new [`BoxCandidate`]s.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::constants::{FEE_SCRIPT_DELAY, TX_VERSION};
use crate::crypto::PublicKey;
use crate::error::CoreError;

/// A 32-byte hash value.
///
/// Used for transaction ids and box ids (both BLAKE3).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Hash256(pub [u8; 32]);

impl Hash256 {
    /// The zero hash.
    pub const ZERO: Self = Self([0u8; 32]);

    /// Return the underlying bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// BLAKE3 digest of `data`.
    pub fn digest(data: &[u8]) -> Self {
        Self(blake3::hash(data).into())
    }
}

impl fmt::Display for Hash256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl FromStr for Hash256 {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = hex::decode(s).map_err(|e| CoreError::InvalidHash(format!("{s}: {e}")))?;
        let bytes: [u8; 32] = raw
            .try_into()
            .map_err(|_| CoreError::InvalidHash(format!("{s}: expected 32 bytes")))?;
        Ok(Self(bytes))
    }
}

impl From<[u8; 32]> for Hash256 {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl Serialize for Hash256 {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if serializer.is_human_readable() {
            serializer.serialize_str(&self.to_string())
        } else {
            self.0.serialize(serializer)
        }
    }
}

impl<'de> Deserialize<'de> for Hash256 {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        if deserializer.is_human_readable() {
            let s = String::deserialize(deserializer)?;
            s.parse().map_err(serde::de::Error::custom)
        } else {
            Ok(Self(<[u8; 32]>::deserialize(deserializer)?))
        }
    }
}

/// Transaction identifier: BLAKE3 of the transaction's bytes-to-sign.
pub type TxId = Hash256;

/// Identifier of a box, written as 64 lowercase hex characters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BoxId(pub Hash256);

impl BoxId {
    /// Return the underlying bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        self.0.as_bytes()
    }
}

impl fmt::Display for BoxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for BoxId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<Hash256>()
            .map(BoxId)
            .map_err(|_| CoreError::InvalidBoxId(s.to_string()))
    }
}

/// Tag byte of a pay-to-public-key tree.
const TREE_TAG_DLOG: u8 = 0x01;
/// Tag byte of the fee-collection tree.
const TREE_TAG_FEE: u8 = 0x02;

/// Spending condition guarding a box.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Proposition {
    /// Spendable by whoever proves knowledge of the discrete log of the key.
    ProveDlog(PublicKey),
    /// The miner fee script: claimable by the block producer, and by anyone
    /// after `delay` blocks.
    FeeCollection {
        /// Blocks before the fee becomes freely claimable.
        delay: u32,
    },
}

impl Proposition {
    /// The standard fee-collection proposition.
    pub fn fee() -> Self {
        Proposition::FeeCollection {
            delay: FEE_SCRIPT_DELAY,
        }
    }

    /// The guarding key, for pay-to-public-key propositions.
    pub fn public_key(&self) -> Option<&PublicKey> {
        match self {
            Proposition::ProveDlog(pk) => Some(pk),
            Proposition::FeeCollection { .. } => None,
        }
    }

    /// Serialized tree bytes.
    pub fn to_tree_bytes(&self) -> Vec<u8> {
        match self {
            Proposition::ProveDlog(pk) => {
                let mut out = Vec::with_capacity(33);
                out.push(TREE_TAG_DLOG);
                out.extend_from_slice(&pk.to_bytes());
                out
            }
            Proposition::FeeCollection { delay } => {
                let mut out = Vec::with_capacity(5);
                out.push(TREE_TAG_FEE);
                out.extend_from_slice(&delay.to_le_bytes());
                out
            }
        }
    }

    /// Parse serialized tree bytes.
    pub fn from_tree_bytes(bytes: &[u8]) -> Result<Self, CoreError> {
        match bytes.split_first() {
            Some((&TREE_TAG_DLOG, rest)) => {
                let key: [u8; 32] = rest
                    .try_into()
                    .map_err(|_| CoreError::InvalidProposition("bad key length".into()))?;
                let pk = PublicKey::from_bytes(&key)
                    .map_err(|e| CoreError::InvalidProposition(e.to_string()))?;
                Ok(Proposition::ProveDlog(pk))
            }
            Some((&TREE_TAG_FEE, rest)) => {
                let delay: [u8; 4] = rest
                    .try_into()
                    .map_err(|_| CoreError::InvalidProposition("bad delay length".into()))?;
                Ok(Proposition::FeeCollection {
                    delay: u32::from_le_bytes(delay),
                })
            }
            Some((tag, _)) => Err(CoreError::InvalidProposition(format!(
                "unknown tag {tag:#04x}"
            ))),
            None => Err(CoreError::InvalidProposition("empty".into())),
        }
    }
}

impl Serialize for Proposition {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if serializer.is_human_readable() {
            serializer.serialize_str(&hex::encode(self.to_tree_bytes()))
        } else {
            self.to_tree_bytes().serialize(serializer)
        }
    }
}

impl<'de> Deserialize<'de> for Proposition {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let bytes = if deserializer.is_human_readable() {
            let s = String::deserialize(deserializer)?;
            hex::decode(&s).map_err(serde::de::Error::custom)?
        } else {
            Vec::<u8>::deserialize(deserializer)?
        };
        Self::from_tree_bytes(&bytes).map_err(serde::de::Error::custom)
    }
}

/// An output before it is bound to a transaction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoxCandidate {
    /// Value in nano-units.
    pub value: u64,
    /// Spending condition, named `tree` in JSON like transaction outputs.
    #[serde(rename = "tree")]
    pub proposition: Proposition,
    /// Chain height at which the output was created.
    pub creation_height: u32,
}

impl BoxCandidate {
    /// Canonical byte layout: value ‖ tree length ‖ tree ‖ creation height,
    /// integers little-endian.
    pub fn to_bytes(&self) -> Vec<u8> {
        let tree = self.proposition.to_tree_bytes();
        let mut out = Vec::with_capacity(8 + 2 + tree.len() + 4);
        out.extend_from_slice(&self.value.to_le_bytes());
        out.extend_from_slice(&(tree.len() as u16).to_le_bytes());
        out.extend_from_slice(&tree);
        out.extend_from_slice(&self.creation_height.to_le_bytes());
        out
    }
}

/// A box bound to the transaction that created it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerBox {
    /// Value, condition and creation height.
    #[serde(flatten)]
    pub candidate: BoxCandidate,
    /// Creating transaction.
    pub transaction_id: TxId,
    /// Output index within the creating transaction.
    pub index: u16,
}

impl LedgerBox {
    /// BLAKE3 of candidate bytes ‖ transaction id ‖ output index.
    pub fn box_id(&self) -> BoxId {
        let mut data = self.candidate.to_bytes();
        data.extend_from_slice(self.transaction_id.as_bytes());
        data.extend_from_slice(&self.index.to_le_bytes());
        BoxId(Hash256::digest(&data))
    }

    /// Value in nano-units.
    pub fn value(&self) -> u64 {
        self.candidate.value
    }

    /// Spending condition.
    pub fn proposition(&self) -> &Proposition {
        &self.candidate.proposition
    }
}

/// Reference to a box being spent, not yet proven.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnsignedInput {
    /// Box being spent.
    pub box_id: BoxId,
}

/// Proof that the spender satisfies a box's condition.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpendingProof {
    /// Encoded proof; a discrete-log proof for pay-to-public-key boxes.
    pub proof_bytes: Vec<u8>,
}

/// A proven input.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Input {
    /// Box being spent.
    pub box_id: BoxId,
    /// Proof authorising the spend.
    pub spending_proof: SpendingProof,
}

/// A transaction whose inputs carry no proofs yet.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnsignedTransaction {
    /// Boxes consumed, in signing order.
    pub inputs: Vec<UnsignedInput>,
    /// Boxes created.
    pub outputs: Vec<BoxCandidate>,
}

impl UnsignedTransaction {
    /// The message every input proof is bound to.
    pub fn bytes_to_sign(&self) -> Vec<u8> {
        bytes_to_sign(self.inputs.iter().map(|i| &i.box_id), &self.outputs)
    }

    /// Transaction id.
    pub fn id(&self) -> TxId {
        Hash256::digest(&self.bytes_to_sign())
    }

    /// Outputs bound to this transaction's id.
    pub fn output_boxes(&self) -> Result<Vec<LedgerBox>, CoreError> {
        bind_outputs(self.id(), &self.outputs)
    }

    /// Sum of all output values. Returns None on overflow.
    pub fn total_output_value(&self) -> Option<u64> {
        total_value(&self.outputs)
    }
}

/// A transaction with a spending proof on every input.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedTransaction {
    /// Proven inputs, in the order they were signed.
    pub inputs: Vec<Input>,
    /// Boxes created.
    pub outputs: Vec<BoxCandidate>,
}

impl SignedTransaction {
    /// The message every input proof is bound to. Proofs are excluded, so
    /// this equals the bytes-to-sign of the unsigned form.
    pub fn bytes_to_sign(&self) -> Vec<u8> {
        bytes_to_sign(self.inputs.iter().map(|i| &i.box_id), &self.outputs)
    }

    /// Transaction id; identical to the id of the unsigned form.
    pub fn id(&self) -> TxId {
        Hash256::digest(&self.bytes_to_sign())
    }

    /// Outputs bound to this transaction's id.
    pub fn output_boxes(&self) -> Result<Vec<LedgerBox>, CoreError> {
        bind_outputs(self.id(), &self.outputs)
    }

    /// Sum of all output values. Returns None on overflow.
    pub fn total_output_value(&self) -> Option<u64> {
        total_value(&self.outputs)
    }

    /// Strip the proofs.
    pub fn to_unsigned(&self) -> UnsignedTransaction {
        UnsignedTransaction {
            inputs: self
                .inputs
                .iter()
                .map(|i| UnsignedInput { box_id: i.box_id })
                .collect(),
            outputs: self.outputs.clone(),
        }
    }
}

/// Fixed layout: version ‖ input count ‖ box ids ‖ output count ‖ candidates,
/// counts as little-endian u32.
fn bytes_to_sign<'a>(
    box_ids: impl ExactSizeIterator<Item = &'a BoxId>,
    outputs: &[BoxCandidate],
) -> Vec<u8> {
    let mut data = Vec::with_capacity(1 + 4 + box_ids.len() * 32 + 4 + outputs.len() * 51);
    data.push(TX_VERSION);
    data.extend_from_slice(&(box_ids.len() as u32).to_le_bytes());
    for id in box_ids {
        data.extend_from_slice(id.as_bytes());
    }
    data.extend_from_slice(&(outputs.len() as u32).to_le_bytes());
    for output in outputs {
        data.extend_from_slice(&output.to_bytes());
    }
    data
}

fn bind_outputs(transaction_id: TxId, outputs: &[BoxCandidate]) -> Result<Vec<LedgerBox>, CoreError> {
    outputs
        .iter()
        .enumerate()
        .map(|(i, candidate)| {
            let index = u16::try_from(i).map_err(|_| CoreError::TooManyOutputs(outputs.len()))?;
            Ok(LedgerBox {
                candidate: candidate.clone(),
                transaction_id,
                index,
            })
        })
        .collect()
}

fn total_value(outputs: &[BoxCandidate]) -> Option<u64> {
    outputs
        .iter()
        .try_fold(0u64, |acc, out| acc.checked_add(out.value))
}
