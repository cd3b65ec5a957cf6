//! Hierarchical deterministic key derivation.
//!
//! The master extended key is `HMAC-SHA512("sigbox seed", entropy)`: the left
//! half reduced mod ℓ is the secret scalar, the right half the chain code.
//! Children are additive tweaks of the parent:
//!
//! - hardened (`index >= 2^31`): `I = HMAC(chain, 0x00 ‖ w ‖ index)`
//! - normal: `I = HMAC(chain, P ‖ index)`
//!
//! and `w_child = w + I_L`, `chain_child = I_R`. Normal children can also be
//! derived from the parent's [`ExtendedPublicKey`] as `P + I_L·G`.

use curve25519_dalek::scalar::Scalar;
use hmac::{Hmac, Mac};
use sha2::Sha512;
use std::fmt;
use std::str::FromStr;
use zeroize::{Zeroize, ZeroizeOnDrop};

use sigbox_core::address::Address;
use sigbox_core::constants::{ENTROPY_LEN, MASTER_KEY_HMAC_KEY, NetworkType};
use sigbox_core::crypto::{PrivateInput, PublicKey};

use crate::error::WalletError;

type HmacSha512 = Hmac<Sha512>;

/// First hardened child index.
pub const HARDENED_OFFSET: u32 = 0x8000_0000;

/// Coin type used in the default payment path `m/44'/429'/0'/0/i`.
pub const PAYMENT_COIN_TYPE: u32 = 429;

/// Whether `index` selects a hardened child.
pub fn is_hardened(index: u32) -> bool {
    index >= HARDENED_OFFSET
}

/// A path of child indices from the master key, written `m/44'/429'/0'/0/0`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct DerivationPath(Vec<u32>);

impl DerivationPath {
    /// The master path `m`.
    pub fn master() -> Self {
        Self(Vec::new())
    }

    /// The default payment path `m/44'/429'/0'/0/index`.
    pub fn payment(index: u32) -> Self {
        Self(vec![
            44 | HARDENED_OFFSET,
            PAYMENT_COIN_TYPE | HARDENED_OFFSET,
            HARDENED_OFFSET,
            0,
            index,
        ])
    }

    /// Child indices from the master key.
    pub fn indices(&self) -> &[u32] {
        &self.0
    }

    /// This path extended by one child.
    pub fn extend(&self, index: u32) -> Self {
        let mut indices = self.0.clone();
        indices.push(index);
        Self(indices)
    }
}

impl fmt::Display for DerivationPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "m")?;
        for &index in &self.0 {
            if is_hardened(index) {
                write!(f, "/{}'", index - HARDENED_OFFSET)?;
            } else {
                write!(f, "/{index}")?;
            }
        }
        Ok(())
    }
}

impl FromStr for DerivationPath {
    type Err = WalletError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.trim().split('/');
        if parts.next() != Some("m") {
            return Err(WalletError::InvalidDerivationPath(format!(
                "{s}: must start with 'm'"
            )));
        }
        let mut indices = Vec::new();
        for part in parts {
            let (digits, hardened) = match part.strip_suffix('\'') {
                Some(d) => (d, true),
                None => (part, false),
            };
            let index: u32 = digits
                .parse()
                .map_err(|_| WalletError::InvalidDerivationPath(format!("{s}: bad index '{part}'")))?;
            if is_hardened(index) {
                return Err(WalletError::InvalidDerivationPath(format!(
                    "{s}: index {index} out of range"
                )));
            }
            indices.push(if hardened { index | HARDENED_OFFSET } else { index });
        }
        Ok(Self(indices))
    }
}

/// A secret scalar with its chain code and derivation path.
///
/// Secret material is zeroized on drop and never printed by `Debug`.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct ExtendedSecretKey {
    key: PrivateInput,
    chain_code: [u8; 32],
    #[zeroize(skip)]
    path: DerivationPath,
}

impl ExtendedSecretKey {
    /// Derive the master key from exactly 32 bytes of entropy.
    ///
    /// Pure and reproducible: the same entropy always yields the same key.
    pub fn derive_master_key(entropy: &[u8]) -> Result<Self, WalletError> {
        if entropy.len() != ENTROPY_LEN {
            return Err(WalletError::InvalidEntropyLength {
                got: entropy.len(),
            });
        }
        let (il, chain_code) = hmac_split(MASTER_KEY_HMAC_KEY, &[entropy])?;
        let key = PrivateInput::from_scalar(il)
            .map_err(|_| WalletError::KeyDerivation("master key is zero".into()))?;
        Ok(Self {
            key,
            chain_code,
            path: DerivationPath::master(),
        })
    }

    /// The DLog prover input for this key.
    pub fn private_input(&self) -> &PrivateInput {
        &self.key
    }

    /// The public image of the secret scalar.
    pub fn public_image(&self) -> PublicKey {
        self.key.public_image()
    }

    /// Pay-to-public-key address of this key on `network`.
    pub fn address(&self, network: NetworkType) -> Address {
        Address::p2pk(self.public_image(), network)
    }

    /// The matching extended public key.
    pub fn public_key(&self) -> ExtendedPublicKey {
        ExtendedPublicKey {
            key: self.public_image(),
            chain_code: self.chain_code,
            path: self.path.clone(),
        }
    }

    /// Path from the master key.
    pub fn path(&self) -> &DerivationPath {
        &self.path
    }

    /// Derive the child at `index` (hardened when `index >= 2^31`).
    pub fn child(&self, index: u32) -> Result<Self, WalletError> {
        let index_bytes = index.to_be_bytes();
        let (il, chain_code) = if is_hardened(index) {
            let mut secret = self.key.to_bytes();
            let split = hmac_split(&self.chain_code, &[&[0u8][..], &secret[..], &index_bytes[..]]);
            secret.zeroize();
            split?
        } else {
            let public = self.public_image().to_bytes();
            hmac_split(&self.chain_code, &[&public[..], &index_bytes[..]])?
        };
        let key = PrivateInput::from_scalar(self.key.as_scalar() + il)
            .map_err(|_| WalletError::KeyDerivation(format!("child {index} is zero")))?;
        Ok(Self {
            key,
            chain_code,
            path: self.path.extend(index),
        })
    }

    /// Derive every child along `path`, starting from this key.
    pub fn derive(&self, path: &DerivationPath) -> Result<Self, WalletError> {
        let mut current = self.clone();
        for &index in path.indices() {
            current = current.child(index)?;
        }
        Ok(current)
    }
}

impl fmt::Debug for ExtendedSecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtendedSecretKey")
            .field("path", &self.path.to_string())
            .field("public_image", &self.public_image())
            .finish_non_exhaustive()
    }
}

/// Derive the master extended key from 32 bytes of entropy.
pub fn derive_master_key(entropy: &[u8]) -> Result<ExtendedSecretKey, WalletError> {
    ExtendedSecretKey::derive_master_key(entropy)
}

/// A public key with its chain code, able to derive normal children.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExtendedPublicKey {
    key: PublicKey,
    chain_code: [u8; 32],
    path: DerivationPath,
}

impl ExtendedPublicKey {
    /// The public key.
    pub fn key(&self) -> &PublicKey {
        &self.key
    }

    /// Path from the master key.
    pub fn path(&self) -> &DerivationPath {
        &self.path
    }

    /// Derive the normal child at `index`. Hardened indices need the secret key.
    pub fn child(&self, index: u32) -> Result<Self, WalletError> {
        if is_hardened(index) {
            return Err(WalletError::KeyDerivation(format!(
                "hardened index {index} needs the secret key"
            )));
        }
        let (il, chain_code) =
            hmac_split(&self.chain_code, &[&self.key.to_bytes()[..], &index.to_be_bytes()[..]])?;
        let key = self
            .key
            .tweak_add(&il)
            .map_err(|_| WalletError::KeyDerivation(format!("child {index} is identity")))?;
        Ok(Self {
            key,
            chain_code,
            path: self.path.extend(index),
        })
    }
}

/// HMAC-SHA512 over the concatenated `parts`; returns `(I_L mod ℓ, I_R)`.
fn hmac_split(key: &[u8], parts: &[&[u8]]) -> Result<(Scalar, [u8; 32]), WalletError> {
    let mut mac = HmacSha512::new_from_slice(key)
        .map_err(|e| WalletError::KeyDerivation(e.to_string()))?;
    for part in parts {
        mac.update(part);
    }
    let mut out: [u8; 64] = mac.finalize().into_bytes().into();
    let mut il = [0u8; 32];
    let mut ir = [0u8; 32];
    il.copy_from_slice(&out[..32]);
    ir.copy_from_slice(&out[32..]);
    out.zeroize();
    let scalar = Scalar::from_bytes_mod_order(il);
    il.zeroize();
    Ok((scalar, ir))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn master(byte: u8) -> ExtendedSecretKey {
        derive_master_key(&[byte; 32]).unwrap()
    }

    // --- Master key ---

    #[test]
    fn master_key_deterministic() {
        let k1 = master(1);
        let k2 = master(1);
        assert_eq!(k1.public_image(), k2.public_image());
        assert_eq!(k1.private_input().to_bytes(), k2.private_input().to_bytes());
    }

    #[test]
    fn master_key_differs_per_entropy() {
        assert_ne!(master(1).public_image(), master(2).public_image());
    }

    #[test]
    fn master_key_rejects_short_entropy() {
        assert_eq!(
            derive_master_key(&[0u8; 16]).unwrap_err(),
            WalletError::InvalidEntropyLength { got: 16 }
        );
    }

    #[test]
    fn master_key_rejects_long_entropy() {
        assert_eq!(
            derive_master_key(&[0u8; 33]).unwrap_err(),
            WalletError::InvalidEntropyLength { got: 33 }
        );
    }

    #[test]
    fn master_path_is_m() {
        assert_eq!(master(3).path().to_string(), "m");
    }

    #[test]
    fn debug_hides_secret() {
        let k = master(4);
        let debug = format!("{k:?}");
        assert!(debug.contains("ExtendedSecretKey"));
        assert!(!debug.contains(&hex::encode(k.private_input().to_bytes())));
    }

    // --- Children ---

    #[test]
    fn child_deterministic_and_distinct() {
        let m = master(5);
        assert_eq!(m.child(0).unwrap().public_image(), m.child(0).unwrap().public_image());
        assert_ne!(m.child(0).unwrap().public_image(), m.child(1).unwrap().public_image());
        assert_ne!(m.child(0).unwrap().public_image(), m.public_image());
    }

    #[test]
    fn hardened_differs_from_normal() {
        let m = master(6);
        assert_ne!(
            m.child(7).unwrap().public_image(),
            m.child(7 | HARDENED_OFFSET).unwrap().public_image()
        );
    }

    #[test]
    fn public_child_matches_private_child() {
        let m = master(7).child(HARDENED_OFFSET).unwrap();
        for i in 0..4 {
            let from_secret = m.child(i).unwrap().public_key();
            let from_public = m.public_key().child(i).unwrap();
            assert_eq!(from_secret, from_public);
        }
    }

    #[test]
    fn public_child_rejects_hardened() {
        let err = master(8).public_key().child(HARDENED_OFFSET).unwrap_err();
        assert!(matches!(err, WalletError::KeyDerivation(_)));
    }

    #[test]
    fn derive_path_equals_chained_children() {
        let m = master(9);
        let path = DerivationPath::payment(3);
        let by_path = m.derive(&path).unwrap();
        let mut chained = m.clone();
        for &i in path.indices() {
            chained = chained.child(i).unwrap();
        }
        assert_eq!(by_path.public_image(), chained.public_image());
        assert_eq!(by_path.path(), &path);
    }

    #[test]
    fn address_uses_public_image() {
        let k = master(10);
        let addr = k.address(NetworkType::Testnet);
        assert_eq!(addr.public_key(), &k.public_image());
        assert_eq!(addr.network(), NetworkType::Testnet);
    }

    // --- DerivationPath ---

    #[test]
    fn path_display_and_parse() {
        let path = DerivationPath::payment(0);
        assert_eq!(path.to_string(), "m/44'/429'/0'/0/0");
        assert_eq!("m/44'/429'/0'/0/0".parse::<DerivationPath>().unwrap(), path);
    }

    #[test]
    fn path_parse_master() {
        assert_eq!("m".parse::<DerivationPath>().unwrap(), DerivationPath::master());
    }

    #[test]
    fn path_parse_rejects_garbage() {
        for bad in ["", "44'/0", "m/x", "m/1''", "m/2147483648"] {
            assert!(
                matches!(
                    bad.parse::<DerivationPath>(),
                    Err(WalletError::InvalidDerivationPath(_))
                ),
                "accepted {bad}"
            );
        }
    }

    // --- proptest ---

    fn arb_path() -> impl Strategy<Value = DerivationPath> {
        prop::collection::vec((0u32..HARDENED_OFFSET, any::<bool>()), 0..8).prop_map(|steps| {
            DerivationPath(
                steps
                    .into_iter()
                    .map(|(i, hardened)| if hardened { i | HARDENED_OFFSET } else { i })
                    .collect(),
            )
        })
    }

    proptest! {
        #[test]
        fn path_display_parse_roundtrip(path in arb_path()) {
            let parsed: DerivationPath = path.to_string().parse().unwrap();
            prop_assert_eq!(parsed, path);
        }

        #[test]
        fn public_child_matches_private_child_prop(seed in any::<u8>(), index in 0u32..HARDENED_OFFSET) {
            let parent = master(seed);
            let from_secret = parent.child(index).unwrap();
            let from_public = parent.public_key().child(index).unwrap();
            prop_assert_eq!(from_public.key(), &from_secret.public_image());
            prop_assert_eq!(from_public, from_secret.public_key());
        }
    }
}
