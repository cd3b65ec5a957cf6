//! Protocol constants. All monetary values in nano-units (1 coin = 10^9 nano-units).

pub const COIN: u64 = 1_000_000_000;

/// Smallest fee a payment transaction may carry.
pub const MIN_FEE: u64 = 1_000_000;

/// Blocks a fee box stays claimable only by the miner of the including block.
pub const FEE_SCRIPT_DELAY: u32 = 720;

/// Version byte mixed into every transaction's bytes-to-sign.
pub const TX_VERSION: u8 = 1;

/// Hard cap on outputs per transaction; output indices are encoded as u16.
pub const MAX_OUTPUTS: usize = u16::MAX as usize;

/// Domain separator for discrete-log proof challenges.
pub const DLOG_CHALLENGE_DOMAIN: &[u8] = b"sigbox-dlog-challenge-v1";

/// HMAC key used to derive the master extended key from entropy.
pub const MASTER_KEY_HMAC_KEY: &[u8] = b"sigbox seed";

/// Length of the entropy accepted by master key derivation.
pub const ENTROPY_LEN: usize = 32;

/// Network selector: Mainnet or Testnet.
///
/// The prefix byte is combined with the address type to form the first byte
/// of every encoded address.
///
/// # Examples
///
/// ```
/// use sigbox_core::constants::NetworkType;
/// assert_eq!(NetworkType::Mainnet.prefix(), 0x00);
/// assert_eq!(NetworkType::Testnet.prefix(), 0x10);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkType {
    /// Production network.
    #[default]
    Mainnet,
    /// Public test network.
    Testnet,
}

impl NetworkType {
    /// Network prefix byte used by the address codec.
    pub fn prefix(&self) -> u8 {
        match self {
            Self::Mainnet => 0x00,
            Self::Testnet => 0x10,
        }
    }

    /// Look up a network from its prefix byte.
    pub fn from_prefix(prefix: u8) -> Option<Self> {
        match prefix {
            0x00 => Some(Self::Mainnet),
            0x10 => Some(Self::Testnet),
            _ => None,
        }
    }

    /// Lowercase display name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Mainnet => "mainnet",
            Self::Testnet => "testnet",
        }
    }
}

impl std::str::FromStr for NetworkType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mainnet" => Ok(Self::Mainnet),
            "testnet" => Ok(Self::Testnet),
            other => Err(format!("unknown network: {other}")),
        }
    }
}
