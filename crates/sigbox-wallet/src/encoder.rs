//! External encodings of signed transactions.
//!
//! - JSON for transport: compact, camelCase, fixed field order, byte
//!   values as lowercase hex. Outputs carry their derived box ids.
//! - Binary via bincode 2 (standard config) for storage and hashing.
//!
//! Both encodings are deterministic: identical transactions always produce
//! identical output.

use serde::{Deserialize, Serialize};

use sigbox_core::types::{
    BoxCandidate, BoxId, Input, LedgerBox, Proposition, SignedTransaction, SpendingProof, TxId,
};

use crate::error::WalletError;

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct TransactionJson {
    id: TxId,
    inputs: Vec<InputJson>,
    outputs: Vec<OutputJson>,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct InputJson {
    box_id: BoxId,
    spending_proof: ProofJson,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct ProofJson {
    proof_bytes: String,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct OutputJson {
    box_id: BoxId,
    value: u64,
    tree: Proposition,
    creation_height: u32,
    transaction_id: TxId,
    index: u16,
}

/// Encode a signed transaction as compact JSON.
pub fn to_json(tx: &SignedTransaction) -> Result<String, WalletError> {
    let id = tx.id();
    let inputs = tx
        .inputs
        .iter()
        .map(|i| InputJson {
            box_id: i.box_id,
            spending_proof: ProofJson {
                proof_bytes: hex::encode(&i.spending_proof.proof_bytes),
            },
        })
        .collect();
    let outputs = tx
        .output_boxes()?
        .into_iter()
        .map(|b| OutputJson {
            box_id: b.box_id(),
            value: b.candidate.value,
            tree: b.candidate.proposition,
            creation_height: b.candidate.creation_height,
            transaction_id: b.transaction_id,
            index: b.index,
        })
        .collect();
    serde_json::to_string(&TransactionJson { id, inputs, outputs })
        .map_err(|e| WalletError::Serialization(e.to_string()))
}

/// Decode a signed transaction from JSON produced by [`to_json`].
///
/// The embedded transaction id and every output's box id, transaction id
/// and index must match the values derived from the decoded content.
pub fn from_json(json: &str) -> Result<SignedTransaction, WalletError> {
    let parsed: TransactionJson =
        serde_json::from_str(json).map_err(|e| WalletError::Serialization(e.to_string()))?;

    let inputs = parsed
        .inputs
        .into_iter()
        .map(|i| {
            let proof_bytes = hex::decode(&i.spending_proof.proof_bytes)
                .map_err(|e| WalletError::Serialization(format!("proof bytes: {e}")))?;
            Ok(Input {
                box_id: i.box_id,
                spending_proof: SpendingProof { proof_bytes },
            })
        })
        .collect::<Result<Vec<_>, WalletError>>()?;
    let outputs: Vec<BoxCandidate> = parsed
        .outputs
        .iter()
        .map(|o| BoxCandidate {
            value: o.value,
            proposition: o.tree.clone(),
            creation_height: o.creation_height,
        })
        .collect();
    let tx = SignedTransaction { inputs, outputs };

    let id = tx.id();
    if id != parsed.id {
        return Err(WalletError::Serialization(format!(
            "transaction id {} does not match content ({id})",
            parsed.id
        )));
    }
    for (expected, o) in tx.output_boxes()?.iter().zip(&parsed.outputs) {
        if !output_matches(expected, o) {
            return Err(WalletError::Serialization(format!(
                "output {} does not match its box id",
                o.index
            )));
        }
    }
    Ok(tx)
}

fn output_matches(expected: &LedgerBox, o: &OutputJson) -> bool {
    expected.box_id() == o.box_id
        && expected.transaction_id == o.transaction_id
        && expected.index == o.index
}

/// Encode a signed transaction in the canonical binary form.
pub fn to_bytes(tx: &SignedTransaction) -> Result<Vec<u8>, WalletError> {
    bincode::serde::encode_to_vec(tx, bincode::config::standard())
        .map_err(|e| WalletError::Serialization(e.to_string()))
}

/// Decode a signed transaction from [`to_bytes`] output. Trailing bytes are
/// rejected.
pub fn from_bytes(bytes: &[u8]) -> Result<SignedTransaction, WalletError> {
    let (tx, read): (SignedTransaction, usize) =
        bincode::serde::decode_from_slice(bytes, bincode::config::standard())
            .map_err(|e| WalletError::Serialization(e.to_string()))?;
    if read != bytes.len() {
        return Err(WalletError::Serialization(format!(
            "{} trailing bytes",
            bytes.len() - read
        )));
    }
    Ok(tx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use curve25519_dalek::scalar::Scalar;
    use sigbox_core::crypto::PrivateInput;
    use sigbox_core::types::Hash256;

    fn sample() -> SignedTransaction {
        let pk = PrivateInput::from_scalar(Scalar::from(5u64))
            .unwrap()
            .public_image();
        SignedTransaction {
            inputs: vec![Input {
                box_id: BoxId(Hash256([0x11; 32])),
                spending_proof: SpendingProof {
                    proof_bytes: vec![0xAB; 64],
                },
            }],
            outputs: vec![
                BoxCandidate {
                    value: 25_000_000,
                    proposition: Proposition::ProveDlog(pk),
                    creation_height: 32_987,
                },
                BoxCandidate {
                    value: 1_000_000,
                    proposition: Proposition::fee(),
                    creation_height: 32_987,
                },
                BoxCandidate {
                    value: 20_000,
                    proposition: Proposition::ProveDlog(pk),
                    creation_height: 32_987,
                },
            ],
        }
    }

    #[test]
    fn json_field_layout() {
        let json = to_json(&sample()).unwrap();
        let v: serde_json::Value = serde_json::from_str(&json).unwrap();
        let keys: Vec<&str> = v.as_object().unwrap().keys().map(String::as_str).collect();
        assert!(keys.contains(&"id") && keys.contains(&"inputs") && keys.contains(&"outputs"));
        assert_eq!(v["inputs"][0]["boxId"], "11".repeat(32));
        assert_eq!(v["inputs"][0]["spendingProof"]["proofBytes"], "ab".repeat(64));
        assert_eq!(v["outputs"][1]["value"], 1_000_000);
        assert_eq!(v["outputs"][1]["tree"], "02d0020000");
        assert_eq!(v["outputs"][2]["index"], 2);
        assert_eq!(v["outputs"][0]["creationHeight"], 32_987);
        assert_eq!(v["id"], sample().id().to_string());
        assert_eq!(v["outputs"][0]["transactionId"], v["id"]);
    }

    #[test]
    fn json_starts_with_id_and_is_compact() {
        let json = to_json(&sample()).unwrap();
        assert!(json.starts_with("{\"id\":\""));
        assert!(!json.contains('\n'));
        assert!(!json.contains(": "));
    }

    #[test]
    fn json_deterministic() {
        assert_eq!(to_json(&sample()).unwrap(), to_json(&sample()).unwrap());
    }

    #[test]
    fn json_roundtrip() {
        let tx = sample();
        assert_eq!(from_json(&to_json(&tx).unwrap()).unwrap(), tx);
    }

    #[test]
    fn json_rejects_wrong_id() {
        let json = to_json(&sample()).unwrap();
        let id = sample().id().to_string();
        let tampered = json.replacen(&id, &"00".repeat(32), 1);
        assert!(matches!(from_json(&tampered), Err(WalletError::Serialization(_))));
    }

    #[test]
    fn json_rejects_tampered_value() {
        let json = to_json(&sample()).unwrap();
        let tampered = json.replacen("\"value\":20000", "\"value\":20001", 1);
        assert_ne!(json, tampered);
        assert!(from_json(&tampered).is_err());
    }

    #[test]
    fn json_rejects_garbage() {
        assert!(matches!(from_json("{"), Err(WalletError::Serialization(_))));
        assert!(matches!(from_json("[]"), Err(WalletError::Serialization(_))));
    }

    #[test]
    fn bytes_deterministic_and_decode() {
        let tx = sample();
        let a = to_bytes(&tx).unwrap();
        assert_eq!(a, to_bytes(&tx).unwrap());
        assert_eq!(from_bytes(&a).unwrap(), tx);
    }

    #[test]
    fn bytes_reject_trailing_data() {
        let mut bytes = to_bytes(&sample()).unwrap();
        bytes.push(0);
        assert!(from_bytes(&bytes).unwrap_err().to_string().contains("trailing"));
    }

    #[test]
    fn bytes_reject_truncated() {
        let bytes = to_bytes(&sample()).unwrap();
        assert!(from_bytes(&bytes[..bytes.len() - 1]).is_err());
    }
}
