use {
    crate::{hash::ScriptHash, param::ContractParam},
    num::{BigInt, Signed, ToPrimitive},
    std::fmt,
    thiserror::Error,
};

mod opcode {
    pub const PUSHINT8: u8 = 0x00;
    pub const PUSHM1: u8 = 0x0f;
    pub const PUSH0: u8 = 0x10;
    pub const PUSHDATA1: u8 = 0x0c;
    pub const PUSHDATA2: u8 = 0x0d;
    pub const PUSHDATA4: u8 = 0x0e;
    pub const SYSCALL: u8 = 0x41;
    pub const PACK: u8 = 0xc0;
    pub const NEWARRAY0: u8 = 0xc2;
}

/// Call flags allowing the callee everything (`CallFlags.All`).
const CALL_FLAGS_ALL: i64 = 0x0f;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EncodeError {
    #[error("integer {0} does not fit into 256 bits")]
    IntegerTooLarge(BigInt),
}

/// Emits NeoVM bytecode.
#[derive(Debug, Default)]
pub struct ScriptBuilder {
    script: Vec<u8>,
}

impl ScriptBuilder {
    pub const CONTRACT_CALL: &'static str = "System.Contract.Call";
    pub const CRYPTO_CHECK_SIG: &'static str = "System.Crypto.CheckSig";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.script
    }

    pub fn emit(&mut self, opcode: u8) -> &mut Self {
        self.script.push(opcode);
        self
    }

    /// Pushes an integer with the smallest encoding available.
    pub fn push_integer(&mut self, value: &BigInt) -> Result<&mut Self, EncodeError> {
        if let Some(small) = value.to_i64().filter(|v| (-1..=16).contains(v)) {
            let opcode = match small {
                -1 => opcode::PUSHM1,
                n => opcode::PUSH0 + u8::try_from(n).unwrap_or_default(),
            };
            return Ok(self.emit(opcode));
        }
        let bytes = value.to_signed_bytes_le();
        let (opcode, width) = match bytes.len() {
            1 => (opcode::PUSHINT8, 1),
            2 => (opcode::PUSHINT8 + 1, 2),
            3..=4 => (opcode::PUSHINT8 + 2, 4),
            5..=8 => (opcode::PUSHINT8 + 3, 8),
            9..=16 => (opcode::PUSHINT8 + 4, 16),
            17..=32 => (opcode::PUSHINT8 + 5, 32),
            _ => return Err(EncodeError::IntegerTooLarge(value.clone())),
        };
        let pad = if value.is_negative() { 0xff } else { 0x00 };
        self.script.push(opcode);
        self.script.extend_from_slice(&bytes);
        self.script.resize(self.script.len() + width - bytes.len(), pad);
        Ok(self)
    }

    pub fn push_bytes(&mut self, data: &[u8]) -> &mut Self {
        let len = data.len();
        if let Ok(len) = u8::try_from(len) {
            self.script.extend_from_slice(&[opcode::PUSHDATA1, len]);
        } else if let Ok(len) = u16::try_from(len) {
            self.script.push(opcode::PUSHDATA2);
            self.script.extend_from_slice(&len.to_le_bytes());
        } else {
            // Scripts are far below 4GiB, the conversion cannot fail in practice.
            let len = u32::try_from(len).unwrap_or(u32::MAX);
            self.script.push(opcode::PUSHDATA4);
            self.script.extend_from_slice(&len.to_le_bytes());
        }
        self.script.extend_from_slice(data);
        self
    }

    pub fn push_param(&mut self, param: &ContractParam) -> Result<&mut Self, EncodeError> {
        match param {
            ContractParam::Hash160(hash) => Ok(self.push_bytes(hash.as_le_bytes())),
            ContractParam::Integer(value) => self.push_integer(value),
            ContractParam::String(value) => Ok(self.push_bytes(value.as_bytes())),
            ContractParam::PublicKey(key) => Ok(self.push_bytes(key.as_bytes())),
            ContractParam::Array(items) => self.push_array(items),
        }
    }

    /// Pushes the items in reverse order followed by `count PACK`, so that the
    /// packed array has the original order. Empty arrays are `NEWARRAY0`.
    pub fn push_array(&mut self, items: &[ContractParam]) -> Result<&mut Self, EncodeError> {
        if items.is_empty() {
            return Ok(self.emit(opcode::NEWARRAY0));
        }
        for item in items.iter().rev() {
            self.push_param(item)?;
        }
        self.push_integer(&BigInt::from(items.len()))?;
        Ok(self.emit(opcode::PACK))
    }

    pub fn syscall(&mut self, name: &str) -> &mut Self {
        self.script.push(opcode::SYSCALL);
        self.script.extend_from_slice(&interop_id(name));
        self
    }

    /// `System.Contract.Call(hash, method, flags, args)`.
    pub fn contract_call(
        &mut self,
        contract: &ScriptHash,
        operation: &str,
        args: &[ContractParam],
    ) -> Result<&mut Self, EncodeError> {
        self.push_array(args)?;
        self.push_integer(&BigInt::from(CALL_FLAGS_ALL))?;
        self.push_bytes(operation.as_bytes());
        self.push_bytes(contract.as_le_bytes());
        Ok(self.syscall(Self::CONTRACT_CALL))
    }
}

/// Interop services are addressed by the first four bytes of the SHA-256 of
/// their name.
pub fn interop_id(name: &str) -> [u8; 4] {
    let digest = crate::hash::sha256(name.as_bytes());
    [digest[0], digest[1], digest[2], digest[3]]
}

/// A single contract method invocation with its arguments.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContractCall {
    pub contract: ScriptHash,
    pub operation: String,
    pub args: Vec<ContractParam>,
}

impl ContractCall {
    pub fn new(
        contract: ScriptHash,
        operation: impl Into<String>,
        args: Vec<ContractParam>,
    ) -> Self {
        Self {
            contract,
            operation: operation.into(),
            args,
        }
    }

    pub fn to_script(&self) -> Result<Vec<u8>, EncodeError> {
        let mut builder = ScriptBuilder::new();
        builder.contract_call(&self.contract, &self.operation, &self.args)?;
        Ok(builder.into_bytes())
    }
}

impl fmt::Display for ContractCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}::{}", self.contract, self.operation)
    }
}

#[cfg(test)]
mod tests {
    use {super::*, hex_literal::hex};

    fn pushed(value: i64) -> Vec<u8> {
        let mut builder = ScriptBuilder::new();
        builder.push_integer(&BigInt::from(value)).unwrap();
        builder.into_bytes()
    }

    #[test]
    fn interop_ids() {
        assert_eq!(interop_id(ScriptBuilder::CONTRACT_CALL), hex!("627d5b52"));
        assert_eq!(interop_id(ScriptBuilder::CRYPTO_CHECK_SIG), hex!("56e7b327"));
    }

    #[test]
    fn integer_encodings() {
        assert_eq!(pushed(-1), [0x0f]);
        assert_eq!(pushed(0), [0x10]);
        assert_eq!(pushed(16), [0x20]);
        assert_eq!(pushed(40), [0x00, 0x28]);
        assert_eq!(pushed(-2), [0x00, 0xfe]);
        assert_eq!(pushed(128), [0x01, 0x80, 0x00]);
        assert_eq!(pushed(100_000_000), [0x02, 0x00, 0xe1, 0xf5, 0x05]);
        assert_eq!(pushed(-100_000), [0x02, 0x60, 0x79, 0xfe, 0xff]);
        assert_eq!(
            pushed(1 << 40),
            [0x03, 0x00, 0x00, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00]
        );
    }

    #[test]
    fn rejects_huge_integers() {
        let mut builder = ScriptBuilder::new();
        let huge = BigInt::from(1) << 300;
        assert_eq!(
            builder.push_integer(&huge).unwrap_err(),
            EncodeError::IntegerTooLarge(huge)
        );
    }

    #[test]
    fn push_data_prefixes() {
        let mut builder = ScriptBuilder::new();
        builder.push_bytes(&[0xaa; 3]).push_bytes(&[0xbb; 300]);
        let script = builder.into_bytes();
        assert_eq!(&script[..5], &[0x0c, 0x03, 0xaa, 0xaa, 0xaa]);
        assert_eq!(&script[5..8], &[0x0d, 0x2c, 0x01]);
        assert_eq!(script.len(), 5 + 3 + 300);
    }

    #[test]
    fn contract_call_layout() {
        let vault: ScriptHash = "abcdef0123456789abcdef0123456789abcdef01".parse().unwrap();
        let collateral: ScriptHash = "abcd000000000000000000000000000000000000".parse().unwrap();
        let call = ContractCall::new(
            vault,
            "setMaxLoanToValue",
            vec![
                ContractParam::hash160(collateral),
                ContractParam::integer(40),
            ],
        );
        let script = call.to_script().unwrap();

        let mut expected = vec![0x00, 0x28, 0x0c, 0x14];
        expected.extend_from_slice(collateral.as_le_bytes());
        expected.extend_from_slice(&[0x12, 0xc0, 0x1f, 0x0c, 0x11]);
        expected.extend_from_slice(b"setMaxLoanToValue");
        expected.extend_from_slice(&[0x0c, 0x14]);
        expected.extend_from_slice(vault.as_le_bytes());
        expected.extend_from_slice(&hex!("41627d5b52"));
        assert_eq!(script, expected);
    }

    #[test]
    fn empty_arguments_use_newarray0() {
        let hash: ScriptHash = "abcdef0123456789abcdef0123456789abcdef01".parse().unwrap();
        let script = ContractCall::new(hash, "getOwner", vec![]).to_script().unwrap();
        assert_eq!(&script[..2], &[0xc2, 0x1f]);
    }
}
