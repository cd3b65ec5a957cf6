//! Discrete-log keys and proofs for the Sigbox protocol.
//!
//! Keys live in the Ristretto255 group (curve25519-dalek). A box guarded by
//! `ProveDlog(P)` is spent by a non-interactive proof of knowledge of `w`
//! such that `P = w·G`.
//!
//! # Proof scheme
//!
//! Schnorr's protocol made non-interactive with the Fiat–Shamir transform:
//! - commitment `a = r·G` for a fresh random nonce `r`
//! - challenge `e = H(domain ‖ P ‖ a ‖ message)` reduced mod ℓ
//! - response `z = r + e·w`
//!
//! The proof is `e ‖ z` (64 bytes). The verifier recomputes `a = z·G − e·P`
//! and checks the challenge. Because the nonce is fresh per call, proving the
//! same message twice yields different but equally valid proofs.

use curve25519_dalek::ristretto::{CompressedRistretto, RistrettoPoint};
use curve25519_dalek::scalar::Scalar;
use curve25519_dalek::traits::IsIdentity;
use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha512};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::constants::DLOG_CHALLENGE_DOMAIN;
use crate::error::CryptoError;

/// Length in bytes of an encoded [`DlogProof`].
pub const PROOF_LEN: usize = 64;

/// Secret scalar `w` of a discrete-log statement.
///
/// The scalar is zeroized on drop and never printed by `Debug`.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct PrivateInput {
    w: Scalar,
}

impl PrivateInput {
    /// Wrap a scalar. The zero scalar has no usable public image and is rejected.
    pub fn from_scalar(w: Scalar) -> Result<Self, CryptoError> {
        if w == Scalar::ZERO {
            return Err(CryptoError::InvalidSecret);
        }
        Ok(Self { w })
    }

    /// Parse a canonical little-endian scalar encoding.
    pub fn from_bytes(bytes: [u8; 32]) -> Result<Self, CryptoError> {
        let w: Option<Scalar> = Scalar::from_canonical_bytes(bytes).into();
        Self::from_scalar(w.ok_or(CryptoError::InvalidSecret)?)
    }

    /// Sample a uniformly random secret.
    pub fn random<R: RngCore + CryptoRng>(rng: &mut R) -> Self {
        loop {
            let w = Scalar::random(rng);
            if w != Scalar::ZERO {
                return Self { w };
            }
        }
    }

    /// The public image `w·G`.
    pub fn public_image(&self) -> PublicKey {
        PublicKey::from_point(RistrettoPoint::mul_base(&self.w))
    }

    /// The underlying scalar. Handle with care.
    pub fn as_scalar(&self) -> &Scalar {
        &self.w
    }

    /// Canonical scalar bytes. Handle with care.
    pub fn to_bytes(&self) -> [u8; 32] {
        self.w.to_bytes()
    }
}

impl fmt::Debug for PrivateInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrivateInput")
            .field("public_image", &self.public_image())
            .finish_non_exhaustive()
    }
}

/// A group element `P = w·G` guarding a pay-to-public-key box.
#[derive(Clone, Copy)]
pub struct PublicKey {
    point: RistrettoPoint,
}

impl PublicKey {
    fn from_point(point: RistrettoPoint) -> Self {
        Self { point }
    }

    /// Decode a compressed point. Non-canonical encodings and the identity
    /// element are rejected.
    pub fn from_bytes(bytes: &[u8; 32]) -> Result<Self, CryptoError> {
        let point = CompressedRistretto(*bytes)
            .decompress()
            .ok_or(CryptoError::InvalidPublicKey)?;
        if point.is_identity() {
            return Err(CryptoError::InvalidPublicKey);
        }
        Ok(Self { point })
    }

    /// Compressed 32-byte encoding.
    pub fn to_bytes(&self) -> [u8; 32] {
        self.point.compress().to_bytes()
    }

    /// The decompressed group element.
    pub fn as_point(&self) -> &RistrettoPoint {
        &self.point
    }

    /// Add a public tweak `t·G` (used by non-hardened child derivation).
    pub fn tweak_add(&self, t: &Scalar) -> Result<Self, CryptoError> {
        let point = self.point + RistrettoPoint::mul_base(t);
        if point.is_identity() {
            return Err(CryptoError::InvalidPublicKey);
        }
        Ok(Self { point })
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", hex::encode(self.to_bytes()))
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.to_bytes()))
    }
}

impl PartialEq for PublicKey {
    fn eq(&self, other: &Self) -> bool {
        self.point == other.point
    }
}

impl Eq for PublicKey {}

impl std::hash::Hash for PublicKey {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.to_bytes().hash(state);
    }
}

impl Serialize for PublicKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if serializer.is_human_readable() {
            serializer.serialize_str(&hex::encode(self.to_bytes()))
        } else {
            self.to_bytes().serialize(serializer)
        }
    }
}

impl<'de> Deserialize<'de> for PublicKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let bytes: [u8; 32] = if deserializer.is_human_readable() {
            let s = String::deserialize(deserializer)?;
            let raw = hex::decode(&s).map_err(serde::de::Error::custom)?;
            raw.try_into()
                .map_err(|_| serde::de::Error::custom("public key must be 32 bytes"))?
        } else {
            <[u8; 32]>::deserialize(deserializer)?
        };
        Self::from_bytes(&bytes).map_err(serde::de::Error::custom)
    }
}

/// Non-interactive proof of knowledge of a discrete logarithm, bound to a message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DlogProof {
    challenge: Scalar,
    response: Scalar,
}

impl DlogProof {
    /// Prove knowledge of `secret` for its public image, bound to `message`.
    pub fn prove<R: RngCore + CryptoRng>(
        secret: &PrivateInput,
        message: &[u8],
        rng: &mut R,
    ) -> Self {
        let public_key = secret.public_image();
        let mut r = Scalar::random(rng);
        let commitment = RistrettoPoint::mul_base(&r).compress();
        let challenge = compute_challenge(&public_key, &commitment, message);
        let response = r + challenge * secret.w;
        r.zeroize();
        Self {
            challenge,
            response,
        }
    }

    /// Verify this proof against `public_key` and `message`.
    pub fn verify(&self, public_key: &PublicKey, message: &[u8]) -> Result<(), CryptoError> {
        // a = z·G − e·P
        let commitment = RistrettoPoint::vartime_double_scalar_mul_basepoint(
            &-self.challenge,
            &public_key.point,
            &self.response,
        )
        .compress();
        if compute_challenge(public_key, &commitment, message) == self.challenge {
            Ok(())
        } else {
            Err(CryptoError::VerificationFailed)
        }
    }

    /// Encode as `challenge ‖ response`.
    pub fn to_bytes(&self) -> [u8; PROOF_LEN] {
        let mut out = [0u8; PROOF_LEN];
        out[..32].copy_from_slice(self.challenge.as_bytes());
        out[32..].copy_from_slice(self.response.as_bytes());
        out
    }

    /// Decode `challenge ‖ response`; both halves must be canonical scalars.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        if bytes.len() != PROOF_LEN {
            return Err(CryptoError::InvalidProof);
        }
        let mut e = [0u8; 32];
        let mut z = [0u8; 32];
        e.copy_from_slice(&bytes[..32]);
        z.copy_from_slice(&bytes[32..]);
        let challenge: Option<Scalar> = Scalar::from_canonical_bytes(e).into();
        let response: Option<Scalar> = Scalar::from_canonical_bytes(z).into();
        match (challenge, response) {
            (Some(challenge), Some(response)) => Ok(Self {
                challenge,
                response,
            }),
            _ => Err(CryptoError::InvalidProof),
        }
    }
}

fn compute_challenge(
    public_key: &PublicKey,
    commitment: &CompressedRistretto,
    message: &[u8],
) -> Scalar {
    let mut hasher = Sha512::new();
    hasher.update(DLOG_CHALLENGE_DOMAIN);
    hasher.update(public_key.to_bytes());
    hasher.update(commitment.as_bytes());
    hasher.update(message);
    Scalar::from_hash(hasher)
}
