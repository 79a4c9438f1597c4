use {
    crate::{account::PublicKey, hash::ScriptHash},
    num::BigInt,
    serde::{Serialize, Serializer, ser::SerializeStruct},
};

/// A typed argument of a contract invocation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ContractParam {
    Hash160(ScriptHash),
    Integer(BigInt),
    String(String),
    PublicKey(PublicKey),
    Array(Vec<ContractParam>),
}

impl ContractParam {
    pub fn hash160(hash: ScriptHash) -> Self {
        Self::Hash160(hash)
    }

    pub fn integer(value: impl Into<BigInt>) -> Self {
        Self::Integer(value.into())
    }

    pub fn string(value: impl Into<String>) -> Self {
        Self::String(value.into())
    }

    pub fn public_key(key: PublicKey) -> Self {
        Self::PublicKey(key)
    }

    pub fn array(items: impl IntoIterator<Item = ContractParam>) -> Self {
        Self::Array(items.into_iter().collect())
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Hash160(_) => "Hash160",
            Self::Integer(_) => "Integer",
            Self::String(_) => "String",
            Self::PublicKey(_) => "PublicKey",
            Self::Array(_) => "Array",
        }
    }
}

/// The `{"type": ..., "value": ...}` form accepted by `invokefunction`.
impl Serialize for ContractParam {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ContractParam", 2)?;
        state.serialize_field("type", self.kind())?;
        match self {
            Self::Hash160(hash) => state.serialize_field("value", &hash.to_prefixed_string())?,
            Self::Integer(value) => state.serialize_field("value", &value.to_string())?,
            Self::String(value) => state.serialize_field("value", value)?,
            Self::PublicKey(key) => state.serialize_field("value", &key.to_string())?,
            Self::Array(items) => state.serialize_field("value", items)?,
        }
        state.end()
    }
}
