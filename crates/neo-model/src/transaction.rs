//! Neo N3 transaction layout and signing.
//!
//! A [`Transaction`] starts without fees. Both the network fee and the system
//! fee have to be set before it can be signed, and signing consumes it into
//! an immutable [`SignedTransaction`].

use {
    crate::{
        account::Account,
        hash::{ScriptHash, TxHash, sha256},
        script::ScriptBuilder,
    },
    std::fmt,
    thiserror::Error,
};

/// Authorization rule limiting where a signer's witness is valid.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WitnessScope {
    /// The witness only covers calls made directly by the entry script.
    CalledByEntry,
}

impl WitnessScope {
    pub fn as_u8(self) -> u8 {
        match self {
            Self::CalledByEntry => 0x01,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::CalledByEntry => "CalledByEntry",
        }
    }
}

impl fmt::Display for WitnessScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Signer {
    pub account: ScriptHash,
    pub scope: WitnessScope,
}

impl Signer {
    pub fn called_by_entry(account: ScriptHash) -> Self {
        Self {
            account,
            scope: WitnessScope::CalledByEntry,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Witness {
    pub invocation: Vec<u8>,
    pub verification: Vec<u8>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SignError {
    #[error("the {0} fee has not been estimated")]
    MissingFee(&'static str),
    #[error("account {actual:?} is not the signer {expected:?} of the transaction")]
    WrongAccount {
        expected: ScriptHash,
        actual: ScriptHash,
    },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transaction {
    pub version: u8,
    pub nonce: u32,
    system_fee: Option<i64>,
    network_fee: Option<i64>,
    pub valid_until_block: u32,
    pub signers: Vec<Signer>,
    pub script: Vec<u8>,
}

impl Transaction {
    /// A fee-less version 0 transaction with a random nonce.
    pub fn new(script: Vec<u8>, signers: Vec<Signer>, valid_until_block: u32) -> Self {
        Self {
            version: 0,
            nonce: rand::random(),
            system_fee: None,
            network_fee: None,
            valid_until_block,
            signers,
            script,
        }
    }

    pub fn system_fee(&self) -> Option<i64> {
        self.system_fee
    }

    pub fn network_fee(&self) -> Option<i64> {
        self.network_fee
    }

    pub fn set_system_fee(&mut self, fee: i64) {
        self.system_fee = Some(fee);
    }

    pub fn set_network_fee(&mut self, fee: i64) {
        self.network_fee = Some(fee);
    }

    /// The serialization without witnesses. Missing fees are written as 0.
    pub fn unsigned_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(32 + self.script.len());
        out.push(self.version);
        out.extend_from_slice(&self.nonce.to_le_bytes());
        out.extend_from_slice(&self.system_fee.unwrap_or_default().to_le_bytes());
        out.extend_from_slice(&self.network_fee.unwrap_or_default().to_le_bytes());
        out.extend_from_slice(&self.valid_until_block.to_le_bytes());
        write_var_int(&mut out, self.signers.len());
        for signer in &self.signers {
            out.extend_from_slice(signer.account.as_le_bytes());
            out.push(signer.scope.as_u8());
        }
        // No attributes.
        write_var_int(&mut out, 0);
        write_var_bytes(&mut out, &self.script);
        out
    }

    /// Size in bytes of the transaction serialized with its (still empty)
    /// witness list.
    pub fn serialized_size(&self) -> usize {
        self.unsigned_bytes().len() + 1
    }

    pub fn hash(&self) -> TxHash {
        TxHash::of(&self.unsigned_bytes())
    }

    /// Signs the transaction for the network identified by `magic`.
    pub fn sign(self, account: &Account, magic: u32) -> Result<SignedTransaction, SignError> {
        if self.network_fee.is_none() {
            return Err(SignError::MissingFee("network"));
        }
        if self.system_fee.is_none() {
            return Err(SignError::MissingFee("system"));
        }
        if let Some(signer) = self.signers.first()
            && signer.account != account.script_hash()
        {
            return Err(SignError::WrongAccount {
                expected: signer.account,
                actual: account.script_hash(),
            });
        }

        let unsigned = self.unsigned_bytes();
        let hash = TxHash::of(&unsigned);
        let signature = account.sign(&sign_data(magic, &unsigned));

        let mut invocation = ScriptBuilder::new();
        invocation.push_bytes(&signature);
        Ok(SignedTransaction {
            transaction: self,
            witness: Witness {
                invocation: invocation.into_bytes(),
                verification: account.public_key().verification_script(),
            },
            hash,
        })
    }
}

/// A signed transaction. Nothing about it can be changed anymore.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignedTransaction {
    transaction: Transaction,
    witness: Witness,
    hash: TxHash,
}

impl SignedTransaction {
    pub fn transaction(&self) -> &Transaction {
        &self.transaction
    }

    pub fn witness(&self) -> &Witness {
        &self.witness
    }

    pub fn hash(&self) -> TxHash {
        self.hash
    }

    /// The full wire serialization including the witness.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = self.transaction.unsigned_bytes();
        write_var_int(&mut out, 1);
        write_var_bytes(&mut out, &self.witness.invocation);
        write_var_bytes(&mut out, &self.witness.verification);
        out
    }
}

fn write_var_int(out: &mut Vec<u8>, value: usize) {
    if let Ok(byte) = u8::try_from(value)
        && byte < 0xfd
    {
        out.push(byte);
    } else if let Ok(value) = u16::try_from(value) {
        out.push(0xfd);
        out.extend_from_slice(&value.to_le_bytes());
    } else if let Ok(value) = u32::try_from(value) {
        out.push(0xfe);
        out.extend_from_slice(&value.to_le_bytes());
    } else {
        out.push(0xff);
        out.extend_from_slice(&(value as u64).to_le_bytes());
    }
}

fn write_var_bytes(out: &mut Vec<u8>, data: &[u8]) {
    write_var_int(out, data.len());
    out.extend_from_slice(data);
}

/// The message signed for a transaction on the network `magic`.
pub fn sign_data(magic: u32, unsigned: &[u8]) -> Vec<u8> {
    let mut message = magic.to_le_bytes().to_vec();
    message.extend_from_slice(&sha256(unsigned));
    message
}
