use {
    crate::{
        account::PublicKey,
        hash::{ParseError, ScriptHash},
    },
    base64::{Engine, prelude::BASE64_STANDARD},
    num::{BigInt, ToPrimitive, Zero},
    serde::Deserialize,
    serde_json::Value,
    thiserror::Error,
};

#[derive(Debug, Error, PartialEq)]
pub enum DecodeError {
    #[error("expected a {expected} stack item but found {found}")]
    UnexpectedType {
        expected: &'static str,
        found: &'static str,
    },
    #[error("invalid integer {0:?}")]
    InvalidInteger(String),
    #[error("invalid base64: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("integer {value} does not fit into {target}")]
    Overflow { value: BigInt, target: &'static str },
    #[error("invalid script hash: {0}")]
    ScriptHash(#[from] ParseError),
    #[error("invalid public key bytes")]
    PublicKey,
    #[error("byte string is not valid UTF-8")]
    Utf8,
    #[error("unknown stack item type {0:?}")]
    UnknownType(String),
    #[error("malformed {0} stack item")]
    Malformed(&'static str),
}

/// A value on the result stack of a NeoVM invocation, in the JSON form the
/// node returns it.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawStackItem")]
pub enum StackItem {
    Any,
    Pointer(i64),
    Boolean(bool),
    /// Decimal text as returned by the node.
    Integer(String),
    /// Base64 text.
    ByteString(String),
    /// Base64 text.
    Buffer(String),
    Array(Vec<StackItem>),
    Struct(Vec<StackItem>),
    Map(Vec<(StackItem, StackItem)>),
    InteropInterface,
}

#[derive(Deserialize)]
struct RawStackItem {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    value: Value,
}

#[derive(Deserialize)]
struct RawMapEntry {
    key: StackItem,
    value: StackItem,
}

impl TryFrom<RawStackItem> for StackItem {
    type Error = DecodeError;

    fn try_from(raw: RawStackItem) -> Result<Self, Self::Error> {
        let items = |value: Value, kind: &'static str| {
            serde_json::from_value::<Vec<StackItem>>(value)
                .map_err(|_| DecodeError::Malformed(kind))
        };
        let text = |value: Value, kind: &'static str| match value {
            Value::String(text) => Ok(text),
            Value::Null => Ok(String::new()),
            _ => Err(DecodeError::Malformed(kind)),
        };
        Ok(match raw.kind.as_str() {
            "Any" => Self::Any,
            "Pointer" => Self::Pointer(
                raw.value
                    .as_i64()
                    .ok_or(DecodeError::Malformed("Pointer"))?,
            ),
            "Boolean" => Self::Boolean(match raw.value {
                Value::Bool(value) => value,
                Value::String(text) => text.eq_ignore_ascii_case("true"),
                _ => return Err(DecodeError::Malformed("Boolean")),
            }),
            "Integer" => Self::Integer(match raw.value {
                Value::Number(number) => number.to_string(),
                other => text(other, "Integer")?,
            }),
            "ByteString" => Self::ByteString(text(raw.value, "ByteString")?),
            "Buffer" => Self::Buffer(text(raw.value, "Buffer")?),
            "Array" => Self::Array(items(raw.value, "Array")?),
            "Struct" => Self::Struct(items(raw.value, "Struct")?),
            "Map" => Self::Map(
                serde_json::from_value::<Vec<RawMapEntry>>(raw.value)
                    .map_err(|_| DecodeError::Malformed("Map"))?
                    .into_iter()
                    .map(|entry| (entry.key, entry.value))
                    .collect(),
            ),
            "InteropInterface" => Self::InteropInterface,
            other => return Err(DecodeError::UnknownType(other.to_owned())),
        })
    }
}

impl StackItem {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Any => "Any",
            Self::Pointer(_) => "Pointer",
            Self::Boolean(_) => "Boolean",
            Self::Integer(_) => "Integer",
            Self::ByteString(_) => "ByteString",
            Self::Buffer(_) => "Buffer",
            Self::Array(_) => "Array",
            Self::Struct(_) => "Struct",
            Self::Map(_) => "Map",
            Self::InteropInterface => "InteropInterface",
        }
    }

    fn unexpected(&self, expected: &'static str) -> DecodeError {
        DecodeError::UnexpectedType {
            expected,
            found: self.kind(),
        }
    }

    /// Interprets the item as an integer.
    ///
    /// Contracts frequently return numbers that were stored in storage as raw
    /// bytes, so `ByteString`s are read as little-endian two's complement.
    /// Booleans map to 0 and 1 and `Any` (null) maps to 0.
    pub fn as_integer(&self) -> Result<BigInt, DecodeError> {
        match self {
            Self::Integer(text) => text
                .parse()
                .map_err(|_| DecodeError::InvalidInteger(text.clone())),
            Self::Boolean(value) => Ok(BigInt::from(u8::from(*value))),
            Self::ByteString(_) | Self::Buffer(_) => {
                Ok(BigInt::from_signed_bytes_le(&self.as_bytes()?))
            }
            Self::Any => Ok(BigInt::zero()),
            other => Err(other.unexpected("Integer")),
        }
    }

    pub fn as_u32(&self) -> Result<u32, DecodeError> {
        let value = self.as_integer()?;
        value.to_u32().ok_or(DecodeError::Overflow {
            value,
            target: "u32",
        })
    }

    pub fn as_u64(&self) -> Result<u64, DecodeError> {
        let value = self.as_integer()?;
        value.to_u64().ok_or(DecodeError::Overflow {
            value,
            target: "u64",
        })
    }

    pub fn as_i64(&self) -> Result<i64, DecodeError> {
        let value = self.as_integer()?;
        value.to_i64().ok_or(DecodeError::Overflow {
            value,
            target: "i64",
        })
    }

    pub fn as_bool(&self) -> Result<bool, DecodeError> {
        match self {
            Self::Boolean(value) => Ok(*value),
            Self::Integer(_) | Self::ByteString(_) | Self::Buffer(_) => {
                Ok(!self.as_integer()?.is_zero())
            }
            Self::Any => Ok(false),
            other => Err(other.unexpected("Boolean")),
        }
    }

    pub fn as_bytes(&self) -> Result<Vec<u8>, DecodeError> {
        match self {
            Self::ByteString(text) | Self::Buffer(text) => Ok(BASE64_STANDARD.decode(text)?),
            other => Err(other.unexpected("ByteString")),
        }
    }

    pub fn as_string(&self) -> Result<String, DecodeError> {
        String::from_utf8(self.as_bytes()?).map_err(|_| DecodeError::Utf8)
    }

    /// A script hash in wire order, e.g. an owner or a token.
    pub fn as_script_hash(&self) -> Result<ScriptHash, DecodeError> {
        Ok(ScriptHash::from_wire(&self.as_bytes()?)?)
    }

    pub fn as_public_key(&self) -> Result<PublicKey, DecodeError> {
        PublicKey::from_sec1(&self.as_bytes()?).map_err(|_| DecodeError::PublicKey)
    }

    pub fn as_array(&self) -> Result<&[StackItem], DecodeError> {
        match self {
            Self::Array(items) | Self::Struct(items) => Ok(items),
            other => Err(other.unexpected("Array")),
        }
    }

    /// Shorthand for decoding every element of an array item.
    pub fn map_array<T>(
        &self,
        decode: impl Fn(&StackItem) -> Result<T, DecodeError>,
    ) -> Result<Vec<T>, DecodeError> {
        self.as_array()?.iter().map(decode).collect()
    }
}
