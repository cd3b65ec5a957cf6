//! Shared test helpers for end-to-end and property tests.

use sigbox_core::address::Address;
use sigbox_core::constants::NetworkType;
use sigbox_core::traits::UtxoSet;
use sigbox_core::types::{BoxCandidate, BoxId, Hash256, LedgerBox, Proposition};
use sigbox_wallet::{ExtendedSecretKey, derive_master_key};

/// Network used by the scenarios.
pub const NETWORK: NetworkType = NetworkType::Testnet;

/// Chain height stamped on scenario outputs.
pub const HEIGHT: u32 = 32_987;

/// Master key derived from 32 copies of `seed`.
pub fn key(seed: u8) -> ExtendedSecretKey {
    derive_master_key(&[seed; 32]).expect("32 bytes of entropy")
}

/// Testnet address of `key`.
pub fn address(key: &ExtendedSecretKey) -> Address {
    key.address(NETWORK)
}

/// A box of `value` guarded by `proposition`, created by a fake transaction
/// identified by `tag`.
pub fn make_box(proposition: Proposition, value: u64, tag: u8) -> LedgerBox {
    LedgerBox {
        candidate: BoxCandidate {
            value,
            proposition,
            creation_height: HEIGHT - 100,
        },
        transaction_id: Hash256([tag; 32]),
        index: 0,
    }
}

/// Insert one box per value, all owned by `owner`, returning their ids in order.
pub fn fund(utxos: &mut UtxoSet, owner: &ExtendedSecretKey, values: &[u64], first_tag: u8) -> Vec<BoxId> {
    let proposition = address(owner).to_proposition();
    values
        .iter()
        .enumerate()
        .map(|(i, &v)| utxos.insert(make_box(proposition.clone(), v, first_tag.wrapping_add(i as u8))))
        .collect()
}
