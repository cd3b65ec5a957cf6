//! JSON input files read by the CLI.
//!
//! - request: one payment (`pay`, `pay-multi`) or a list (`pay-batch`)
//! - utxos: the boxes available for spending, as a list of ledger boxes
//! - keys: box id → signing key, for `pay-multi`

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use sigbox_core::address::Address;
use sigbox_core::constants::NetworkType;
use sigbox_core::traits::UtxoSet;
use sigbox_core::types::{BoxId, LedgerBox};
use sigbox_wallet::{DerivationPath, ExtendedSecretKey, KeyMap, TransactionBuilder, TxParams, derive_master_key};

/// One payment, as written in a request file.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PaymentRequest {
    pub recipient: Address,
    pub change_address: Address,
    pub transfer: u64,
    pub fee: u64,
    pub change: u64,
    pub inputs: Vec<BoxId>,
    pub height: u32,
}

impl PaymentRequest {
    /// Validate into builder params, checking both addresses are on `network`.
    pub fn to_params(&self, builder: &TransactionBuilder, network: NetworkType) -> Result<TxParams> {
        for (role, addr) in [("recipient", &self.recipient), ("change", &self.change_address)] {
            if addr.network() != network {
                bail!(
                    "{role} address {addr} is on {}, expected {}",
                    addr.network().name(),
                    network.name()
                );
            }
        }
        builder
            .tx_params(
                self.recipient,
                self.change_address,
                self.transfer,
                self.fee,
                self.change,
                self.inputs.clone(),
                self.height,
            )
            .context("invalid payment parameters")
    }
}

/// Signing key material: master key entropy and an optional derivation path.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct KeySpec {
    pub entropy: String,
    #[serde(default)]
    pub path: Option<String>,
}

impl KeySpec {
    /// Derive the extended key this spec names.
    pub fn derive(&self) -> Result<ExtendedSecretKey> {
        derive_key(&self.entropy, self.path.as_deref())
    }
}

/// Derive a key from hex entropy, following `path` when given.
pub fn derive_key(entropy_hex: &str, path: Option<&str>) -> Result<ExtendedSecretKey> {
    let entropy = hex::decode(entropy_hex.trim()).context("entropy must be hex")?;
    let master = derive_master_key(&entropy).context("failed to derive master key")?;
    match path {
        Some(p) => {
            let path: DerivationPath = p.parse().context("invalid derivation path")?;
            master.derive(&path).context("failed to derive child key")
        }
        None => Ok(master),
    }
}

fn read_json<T: DeserializeOwned>(path: &Path, what: &str) -> Result<T> {
    let data = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {what} file {}", path.display()))?;
    serde_json::from_str(&data)
        .with_context(|| format!("failed to parse {what} file {}", path.display()))
}

/// Read a single payment request.
pub fn load_request(path: &Path) -> Result<PaymentRequest> {
    read_json(path, "request")
}

/// Read a list of payment requests.
pub fn load_requests(path: &Path) -> Result<Vec<PaymentRequest>> {
    read_json(path, "request")
}

/// Read the spendable boxes into a [`UtxoSet`].
pub fn load_utxos(path: &Path) -> Result<UtxoSet> {
    let boxes: Vec<LedgerBox> = read_json(path, "utxos")?;
    Ok(boxes.into_iter().collect())
}

/// Read a keys file and derive one private input per box.
pub fn load_keys(path: &Path) -> Result<KeyMap> {
    let specs: BTreeMap<BoxId, KeySpec> = read_json(path, "keys")?;
    specs
        .into_iter()
        .map(|(box_id, spec)| {
            let key = spec
                .derive()
                .with_context(|| format!("bad key for box {box_id}"))?;
            Ok((box_id, key.private_input().clone()))
        })
        .collect()
}
