use {
    crate::{hash::ScriptHash, script::ScriptBuilder},
    p256::ecdsa::{Signature, SigningKey, VerifyingKey, signature::Signer as _},
    std::{fmt, str::FromStr},
    thiserror::Error,
};

const WIF_VERSION: u8 = 0x80;
const WIF_COMPRESSED_FLAG: u8 = 0x01;

#[derive(Debug, Error)]
pub enum KeyError {
    #[error("private key is neither a WIF nor 64 hex characters")]
    Format,
    #[error("WIF checksum or version mismatch")]
    Wif,
    #[error("not a valid secp256r1 key")]
    Curve,
    #[error("public key must be 33 bytes in compressed form (02 or 03 prefix)")]
    NotCompressed,
    #[error("invalid public key hex: {0}")]
    Hex(#[from] hex::FromHexError),
}

/// A compressed secp256r1 public key.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct PublicKey([u8; 33]);

impl PublicKey {
    /// Parses a compressed SEC1 point. Uncompressed and hybrid encodings are
    /// rejected rather than re-encoded.
    pub fn from_sec1(bytes: &[u8]) -> Result<Self, KeyError> {
        if bytes.len() != 33 || !matches!(bytes[0], 0x02 | 0x03) {
            return Err(KeyError::NotCompressed);
        }
        let key = VerifyingKey::from_sec1_bytes(bytes).map_err(|_| KeyError::Curve)?;
        Ok(Self::from(&key))
    }

    pub fn as_bytes(&self) -> &[u8; 33] {
        &self.0
    }

    /// The single-signature verification script for this key.
    pub fn verification_script(&self) -> Vec<u8> {
        let mut builder = ScriptBuilder::new();
        builder
            .push_bytes(&self.0)
            .syscall(ScriptBuilder::CRYPTO_CHECK_SIG);
        builder.into_bytes()
    }

    pub fn script_hash(&self) -> ScriptHash {
        ScriptHash::from_script(&self.verification_script())
    }
}

impl From<&VerifyingKey> for PublicKey {
    fn from(key: &VerifyingKey) -> Self {
        let point = key.to_encoded_point(true);
        let mut bytes = [0u8; 33];
        bytes.copy_from_slice(point.as_bytes());
        Self(bytes)
    }
}

impl FromStr for PublicKey {
    type Err = KeyError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let value = value.trim();
        Self::from_sec1(&hex::decode(value.strip_prefix("0x").unwrap_or(value))?)
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({self})")
    }
}

/// A single-signature account backed by a private key held in memory.
pub struct Account {
    key: SigningKey,
    public_key: PublicKey,
    script_hash: ScriptHash,
}

impl Account {
    pub fn from_private_key(bytes: &[u8]) -> Result<Self, KeyError> {
        let key = SigningKey::from_slice(bytes).map_err(|_| KeyError::Curve)?;
        let public_key = PublicKey::from(key.verifying_key());
        Ok(Self {
            key,
            public_key,
            script_hash: public_key.script_hash(),
        })
    }

    /// Decodes a compressed-key WIF (`0x80 ‖ key ‖ 0x01`, base58check).
    pub fn from_wif(wif: &str) -> Result<Self, KeyError> {
        let data = bs58::decode(wif)
            .with_check(None)
            .into_vec()
            .map_err(|_| KeyError::Wif)?;
        match data.as_slice() {
            [WIF_VERSION, key @ .., WIF_COMPRESSED_FLAG] if key.len() == 32 => {
                Self::from_private_key(key)
            }
            _ => Err(KeyError::Wif),
        }
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    pub fn script_hash(&self) -> ScriptHash {
        self.script_hash
    }

    pub fn address(&self) -> String {
        self.script_hash.to_address()
    }

    /// ECDSA (secp256r1, SHA-256) signature in `r ‖ s` form.
    pub fn sign(&self, message: &[u8]) -> [u8; 64] {
        let signature: Signature = self.key.sign(message);
        let mut bytes = [0u8; 64];
        bytes.copy_from_slice(&signature.to_bytes());
        bytes
    }
}

impl FromStr for Account {
    type Err = KeyError;

    /// Accepts either a WIF or a 64 character hex private key.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let value = value.trim();
        if value.len() == 64 && value.chars().all(|c| c.is_ascii_hexdigit()) {
            return Self::from_private_key(&hex::decode(value)?);
        }
        if value.len() == 52 {
            return Self::from_wif(value);
        }
        Err(KeyError::Format)
    }
}

impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Account")
            .field("address", &self.address())
            .field("public_key", &self.public_key)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        p256::ecdsa::signature::Verifier,
    };

    const PRIVATE_KEY: &str =
        "0101010101010101010101010101010101010101010101010101010101010101";

    fn wif_for(key: &[u8]) -> String {
        let mut data = vec![WIF_VERSION];
        data.extend_from_slice(key);
        data.push(WIF_COMPRESSED_FLAG);
        bs58::encode(data).with_check().into_string()
    }

    #[test]
    fn wif_and_hex_yield_same_account() {
        let key = hex::decode(PRIVATE_KEY).unwrap();
        let from_hex: Account = PRIVATE_KEY.parse().unwrap();
        let from_wif: Account = wif_for(&key).parse().unwrap();
        assert_eq!(from_hex.script_hash(), from_wif.script_hash());
        assert_eq!(from_hex.public_key(), from_wif.public_key());
    }

    #[test]
    fn verification_script_layout() {
        let account: Account = PRIVATE_KEY.parse().unwrap();
        let script = account.public_key().verification_script();
        assert_eq!(script.len(), 40);
        assert_eq!(&script[..2], &[0x0c, 0x21]);
        assert_eq!(&script[2..35], account.public_key().as_bytes());
        assert_eq!(&script[35..], &hex_literal::hex!("4156e7b327"));
        assert_eq!(account.script_hash(), ScriptHash::from_script(&script));
    }

    #[test]
    fn signatures_verify() {
        let account: Account = PRIVATE_KEY.parse().unwrap();
        let signature = account.sign(b"message");
        let key = VerifyingKey::from_sec1_bytes(account.public_key().as_bytes()).unwrap();
        let signature = Signature::from_slice(&signature).unwrap();
        assert!(key.verify(b"message", &signature).is_ok());
    }

    #[test]
    fn public_key_round_trip() {
        let account: Account = PRIVATE_KEY.parse().unwrap();
        let text = account.public_key().to_string();
        assert_eq!(text.len(), 66);
        assert_eq!(&text.parse::<PublicKey>().unwrap(), account.public_key());
    }

    #[test]
    fn rejects_garbage_keys() {
        assert!(matches!("nope".parse::<Account>(), Err(KeyError::Format)));
        assert!("00".repeat(32).parse::<Account>().is_err());
        assert!("05".repeat(33).parse::<PublicKey>().is_err());
    }

    #[test]
    fn only_compressed_public_keys() {
        let account: Account = PRIVATE_KEY.parse().unwrap();
        let key = VerifyingKey::from_sec1_bytes(account.public_key().as_bytes()).unwrap();
        let uncompressed = key.to_encoded_point(false);
        assert!(matches!(
            PublicKey::from_sec1(uncompressed.as_bytes()),
            Err(KeyError::NotCompressed)
        ));

        let mut compact = *account.public_key().as_bytes();
        compact[0] = 0x05;
        assert!(matches!(
            PublicKey::from_sec1(&compact),
            Err(KeyError::NotCompressed)
        ));

        // A compressed key with an x coordinate off the curve.
        let mut off_curve = [0xffu8; 33];
        off_curve[0] = 0x02;
        assert!(matches!(
            PublicKey::from_sec1(&off_curve),
            Err(KeyError::Curve)
        ));
    }

    #[test]
    fn debug_hides_private_key() {
        let account: Account = PRIVATE_KEY.parse().unwrap();
        assert!(!format!("{account:?}").contains(PRIVATE_KEY));
    }
}
