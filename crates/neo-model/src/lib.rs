//! Neo N3 protocol types needed to talk to deployed contracts: script hashes,
//! contract parameters, NeoVM script building, stack item decoding,
//! transaction serialization and single-signature accounts.

pub mod account;
pub mod hash;
pub mod param;
pub mod script;
pub mod stack;
pub mod transaction;

pub use {
    account::{Account, KeyError, PublicKey},
    hash::{ParseError, ScriptHash, TxHash},
    param::ContractParam,
    script::{ContractCall, EncodeError, ScriptBuilder},
    stack::{DecodeError, StackItem},
    transaction::{SignError, SignedTransaction, Signer, Transaction, Witness, WitnessScope},
};
