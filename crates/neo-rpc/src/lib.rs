//! Client for the JSON-RPC API of a Neo N3 node.

pub mod client;
pub mod dto;
pub mod http;

pub use {
    client::RpcClient,
    dto::{InvokeResult, VmState},
    http::HttpTransport,
};
use {
    neo_model::{ContractParam, ScriptHash, Signer, TxHash},
    thiserror::Error,
};

#[derive(Debug, Error)]
pub enum Error {
    #[error("node unavailable: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("HTTP error {0}")]
    Http(reqwest::StatusCode),
    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },
    #[error("response carries neither a result nor an error")]
    EmptyResponse,
}

/// The node operations used by the admin client.
#[cfg_attr(any(test, feature = "test-util"), mockall::automock)]
#[async_trait::async_trait]
pub trait NodeRpc: Send + Sync {
    /// Simulates a single contract call (`invokefunction`).
    async fn invoke_function(
        &self,
        contract: ScriptHash,
        operation: &str,
        params: &[ContractParam],
    ) -> Result<InvokeResult, Error>;

    /// Simulates an arbitrary script with the given signers (`invokescript`).
    async fn invoke_script(&self, script: &[u8], signers: &[Signer])
    -> Result<InvokeResult, Error>;

    /// Number of blocks in the chain, i.e. the current height plus one.
    async fn block_count(&self) -> Result<u32, Error>;

    /// Broadcasts a signed transaction.
    async fn send_raw_transaction(&self, transaction: &[u8]) -> Result<TxHash, Error>;

    /// Height of the block that included the transaction, `None` while it is
    /// unknown to the node.
    async fn transaction_height(&self, hash: TxHash) -> Result<Option<u32>, Error>;
}
