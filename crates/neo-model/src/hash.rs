use {
    base64::{Engine, prelude::BASE64_STANDARD},
    hex_literal::hex,
    ripemd::Ripemd160,
    serde::{Deserialize, Deserializer, de},
    sha2::{Digest, Sha256},
    std::{fmt, str::FromStr},
    thiserror::Error,
};

/// Version byte prepended to a script hash when it is encoded as an address.
pub const ADDRESS_VERSION: u8 = 0x35;

#[derive(Debug, Error, PartialEq)]
pub enum ParseError {
    #[error("invalid hex: {0}")]
    Hex(#[from] hex::FromHexError),
    #[error("invalid base64: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("expected {expected} bytes but got {actual}")]
    Length { expected: usize, actual: usize },
    #[error("invalid address: {0}")]
    Address(String),
}

/// A 160-bit script hash identifying a contract or an account.
///
/// The bytes are stored in wire order (little-endian), which is the order in
/// which they appear in scripts, serialized transactions and stack items.
/// The textual representation is the reversed (big-endian) hex string that
/// explorers, configuration and RPC parameters use.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScriptHash([u8; 20]);

impl ScriptHash {
    /// The native Policy contract, which exposes the network fee per byte.
    pub const POLICY_CONTRACT: Self = Self(hex!("7bc681c0a1f71d543457b68bba8d5f9fdd4e5ecc"));

    pub const fn from_le_bytes(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Builds a script hash from bytes in wire order, e.g. the contents of a
    /// `ByteString` stack item.
    pub fn from_wire(bytes: &[u8]) -> Result<Self, ParseError> {
        let bytes: [u8; 20] = bytes.try_into().map_err(|_| ParseError::Length {
            expected: 20,
            actual: bytes.len(),
        })?;
        Ok(Self(bytes))
    }

    /// Decodes the base64 representation used by stack items.
    pub fn from_base64(value: &str) -> Result<Self, ParseError> {
        Self::from_wire(&BASE64_STANDARD.decode(value)?)
    }

    /// Hash of a verification script (`RIPEMD160(SHA256(script))`).
    pub fn from_script(script: &[u8]) -> Self {
        Self(Ripemd160::digest(Sha256::digest(script)).into())
    }

    /// Decodes a base58check address (e.g. `N...`).
    pub fn from_address(address: &str) -> Result<Self, ParseError> {
        let data = bs58::decode(address)
            .with_check(None)
            .into_vec()
            .map_err(|err| ParseError::Address(err.to_string()))?;
        match data.split_first() {
            Some((&ADDRESS_VERSION, hash)) => Self::from_wire(hash),
            _ => Err(ParseError::Address(format!(
                "{address} does not carry address version {ADDRESS_VERSION:#04x}"
            ))),
        }
    }

    pub fn to_address(&self) -> String {
        let mut data = Vec::with_capacity(21);
        data.push(ADDRESS_VERSION);
        data.extend_from_slice(&self.0);
        bs58::encode(data).with_check().into_string()
    }

    pub fn as_le_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// The `0x` prefixed form the node expects in RPC parameters.
    pub fn to_prefixed_string(&self) -> String {
        format!("0x{self}")
    }
}

impl FromStr for ScriptHash {
    type Err = ParseError;

    /// Accepts the big-endian hex form (with or without `0x`) as well as an
    /// address.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let value = value.trim();
        let hex_value = value.strip_prefix("0x").unwrap_or(value);
        if hex_value.len() != 40 {
            return Self::from_address(value);
        }
        let mut bytes: [u8; 20] = hex::decode(hex_value)?
            .try_into()
            .map_err(|bytes: Vec<u8>| ParseError::Length {
                expected: 20,
                actual: bytes.len(),
            })?;
        bytes.reverse();
        Ok(Self(bytes))
    }
}

impl fmt::Display for ScriptHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut bytes = self.0;
        bytes.reverse();
        f.write_str(&hex::encode(bytes))
    }
}

impl fmt::Debug for ScriptHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{self}")
    }
}

/// A 256-bit transaction hash, stored in wire order.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct TxHash([u8; 32]);

impl TxHash {
    pub const fn from_le_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Hash of an unsigned transaction serialization.
    pub fn of(unsigned: &[u8]) -> Self {
        Self(sha256(unsigned))
    }

    pub fn as_le_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl FromStr for TxHash {
    type Err = ParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let value = value.trim();
        let value = value.strip_prefix("0x").unwrap_or(value);
        let mut bytes: [u8; 32] =
            hex::decode(value)?
                .try_into()
                .map_err(|bytes: Vec<u8>| ParseError::Length {
                    expected: 32,
                    actual: bytes.len(),
                })?;
        bytes.reverse();
        Ok(Self(bytes))
    }
}

impl<'de> Deserialize<'de> for TxHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        value.parse().map_err(de::Error::custom)
    }
}

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut bytes = self.0;
        bytes.reverse();
        write!(f, "0x{}", hex::encode(bytes))
    }
}

impl fmt::Debug for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

pub fn sha256(data: &[u8]) -> [u8; 32] {
    Sha256::digest(data).into()
}

/// Compares a base64 encoded script hash, as returned in a stack item, with an
/// address.
pub fn base64_matches_address(base64_hash: &str, address: &str) -> bool {
    match (
        ScriptHash::from_base64(base64_hash),
        ScriptHash::from_address(address),
    ) {
        (Ok(hash), Ok(other)) => hash == other,
        _ => false,
    }
}
