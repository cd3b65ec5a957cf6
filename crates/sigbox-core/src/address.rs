//! Pay-to-public-key addresses and the address codec.
//!
//! Wire layout before Base58:
//!
//! ```text
//! prefix (1) ‖ public key (32) ‖ checksum (4)
//! ```
//!
//! `prefix = network prefix + address type`, and the checksum is the first
//! four bytes of BLAKE3 over prefix and key. Mainnet P2PK addresses carry
//! prefix `0x01`, testnet `0x11`.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::constants::NetworkType;
use crate::crypto::PublicKey;
use crate::error::AddressError;
use crate::types::Proposition;

/// Address type nibble for pay-to-public-key.
pub const P2PK_TYPE: u8 = 0x01;

const CHECKSUM_LEN: usize = 4;
const ENCODED_LEN: usize = 1 + 32 + CHECKSUM_LEN;

/// A pay-to-public-key address.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Address {
    network: NetworkType,
    public_key: PublicKey,
}

impl Address {
    /// Create an address from a public key and network.
    pub fn p2pk(public_key: PublicKey, network: NetworkType) -> Self {
        Self {
            network,
            public_key,
        }
    }

    /// The key guarding boxes sent to this address.
    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    /// The network this address belongs to.
    pub fn network(&self) -> NetworkType {
        self.network
    }

    /// The spending condition of boxes paid to this address.
    pub fn to_proposition(&self) -> Proposition {
        Proposition::ProveDlog(self.public_key)
    }

    /// First byte of the encoded address.
    pub fn head_byte(&self) -> u8 {
        self.network.prefix() + P2PK_TYPE
    }

    /// Encode as a Base58 string.
    pub fn encode(&self) -> String {
        let mut raw = Vec::with_capacity(ENCODED_LEN);
        raw.push(self.head_byte());
        raw.extend_from_slice(&self.public_key.to_bytes());
        let checksum = checksum(&raw);
        raw.extend_from_slice(&checksum);
        bs58::encode(raw).into_string()
    }

    /// Decode a Base58 address on any known network.
    pub fn decode(s: &str) -> Result<Self, AddressError> {
        let raw = bs58::decode(s)
            .into_vec()
            .map_err(|e| AddressError::InvalidBase58(e.to_string()))?;
        if raw.len() != ENCODED_LEN {
            return Err(AddressError::InvalidLength(raw.len()));
        }

        let (body, check) = raw.split_at(ENCODED_LEN - CHECKSUM_LEN);
        if checksum(body) != check {
            return Err(AddressError::InvalidChecksum);
        }

        let head = body[0];
        let address_type = head & 0x0F;
        let prefix = head & 0xF0;
        if address_type != P2PK_TYPE {
            return Err(AddressError::UnknownAddressType(address_type));
        }
        let network = NetworkType::from_prefix(prefix).ok_or(AddressError::UnknownNetwork(prefix))?;

        let mut key = [0u8; 32];
        key.copy_from_slice(&body[1..]);
        let public_key = PublicKey::from_bytes(&key).map_err(|_| AddressError::InvalidPublicKey)?;

        Ok(Self {
            network,
            public_key,
        })
    }
}

fn checksum(body: &[u8]) -> [u8; CHECKSUM_LEN] {
    let hash = blake3::hash(body);
    let mut out = [0u8; CHECKSUM_LEN];
    out.copy_from_slice(&hash.as_bytes()[..CHECKSUM_LEN]);
    out
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.encode())
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::decode(s)
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.encode())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::decode(&s).map_err(serde::de::Error::custom)
    }
}

/// Address codec bound to one network prefix.
///
/// Decoding through an encoder rejects addresses from other networks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AddressEncoder {
    network: NetworkType,
}

impl AddressEncoder {
    /// Create an encoder for `network`.
    pub fn new(network: NetworkType) -> Self {
        Self { network }
    }

    /// The network prefix byte this encoder accepts.
    pub fn network_prefix(&self) -> u8 {
        self.network.prefix()
    }

    /// Build the P2PK address of `public_key` on this encoder's network.
    pub fn p2pk(&self, public_key: PublicKey) -> Address {
        Address::p2pk(public_key, self.network)
    }

    /// Encode an address. The address keeps its own network byte.
    pub fn to_base58(&self, address: &Address) -> String {
        address.encode()
    }

    /// Decode an address, requiring it to belong to this encoder's network.
    pub fn from_base58(&self, s: &str) -> Result<Address, AddressError> {
        let address = Address::decode(s)?;
        if address.network != self.network {
            return Err(AddressError::NetworkMismatch {
                expected: self.network.prefix(),
                got: address.network.prefix(),
            });
        }
        Ok(address)
    }
}
