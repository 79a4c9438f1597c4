//! Wire types of the node's JSON-RPC API.

use {
    neo_model::{Signer, StackItem},
    serde::{Deserialize, Serialize},
};

/// Final state of the virtual machine after a simulated invocation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum VmState {
    Halt,
    Fault,
    #[serde(other)]
    Other,
}

/// Result of `invokefunction` and `invokescript`.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct InvokeResult {
    /// Base64 of the executed script.
    #[serde(default)]
    pub script: String,
    pub state: VmState,
    /// GAS consumed in fractions (10^-8), as decimal text.
    #[serde(rename = "gasconsumed")]
    pub gas_consumed: String,
    #[serde(default)]
    pub exception: Option<String>,
    #[serde(default)]
    pub stack: Vec<StackItem>,
}

impl InvokeResult {
    pub fn is_halt(&self) -> bool {
        self.state == VmState::Halt
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SignerDto {
    pub account: String,
    pub scopes: &'static str,
}

impl From<&Signer> for SignerDto {
    fn from(signer: &Signer) -> Self {
        Self {
            account: signer.account.to_prefixed_string(),
            scopes: signer.scope.as_str(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct SentTransaction {
    pub hash: neo_model::TxHash,
}
