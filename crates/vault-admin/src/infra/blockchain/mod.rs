//! Generic contract-call layer on top of the node RPC: simulated reads and
//! transaction building.

use {
    neo_model::{
        ContractCall,
        ContractParam,
        DecodeError,
        EncodeError,
        ScriptHash,
        Signer,
        StackItem,
        Transaction,
    },
    neo_rpc::{InvokeResult, NodeRpc},
    std::{fmt, sync::Arc},
    thiserror::Error,
};

pub mod fees;

pub use fees::{FeeEstimating, NodeFeeEstimator};

/// Number of blocks after the current height for which a built transaction
/// stays valid.
pub const VALID_FOR_BLOCKS: u32 = 10;

#[derive(Debug, Error)]
pub enum Error {
    #[error("node unavailable: {0}")]
    NodeUnavailable(#[from] neo_rpc::Error),
    #[error("execution of {context} faulted: {exception}")]
    ExecutionFault { context: String, exception: String },
    #[error("{0} returned an empty stack")]
    EmptyStack(String),
    #[error("failed to decode result: {0}")]
    Decode(#[from] DecodeError),
    #[error("failed to encode script: {0}")]
    Encode(#[from] EncodeError),
}

/// Fails unless the simulated execution halted cleanly.
pub fn ensure_halt(result: &InvokeResult, context: impl fmt::Display) -> Result<(), Error> {
    if result.is_halt() {
        return Ok(());
    }
    Err(Error::ExecutionFault {
        context: context.to_string(),
        exception: result
            .exception
            .clone()
            .unwrap_or_else(|| format!("VM state {:?}", result.state)),
    })
}

/// Access to the Neo network through a node.
#[derive(Clone)]
pub struct Neo {
    rpc: Arc<dyn NodeRpc>,
}

impl Neo {
    pub fn new(rpc: Arc<dyn NodeRpc>) -> Self {
        Self { rpc }
    }

    pub fn rpc(&self) -> &Arc<dyn NodeRpc> {
        &self.rpc
    }

    pub fn contract(&self, hash: ScriptHash) -> Contract {
        Contract {
            neo: self.clone(),
            hash,
        }
    }

    /// Simulates the call and returns the first item of the result stack.
    /// A faulted execution is an error, never an empty value.
    pub async fn invoke_read(&self, call: &ContractCall) -> Result<StackItem, Error> {
        let result = self
            .rpc
            .invoke_function(call.contract, &call.operation, &call.args)
            .await?;
        ensure_halt(&result, call)?;
        result
            .stack
            .into_iter()
            .next()
            .ok_or_else(|| Error::EmptyStack(call.to_string()))
    }

    /// Builds an unsigned, fee-less transaction executing the call, valid
    /// for the next [`VALID_FOR_BLOCKS`] blocks and signed by `signer` with
    /// the `CalledByEntry` scope.
    pub async fn build_transaction(
        &self,
        call: &ContractCall,
        signer: ScriptHash,
    ) -> Result<Transaction, Error> {
        let script = call.to_script()?;
        let height = self.rpc.block_count().await?;
        let transaction = Transaction::new(
            script,
            vec![Signer::called_by_entry(signer)],
            height.saturating_add(VALID_FOR_BLOCKS),
        );
        super::observe::transaction_built(call, signer, &transaction);
        Ok(transaction)
    }
}

impl fmt::Debug for Neo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Neo").finish_non_exhaustive()
    }
}

/// A deployed contract. Domain wrappers are thin layers over this.
#[derive(Clone, Debug)]
pub struct Contract {
    neo: Neo,
    hash: ScriptHash,
}

impl Contract {
    pub fn hash(&self) -> ScriptHash {
        self.hash
    }

    pub fn neo(&self) -> &Neo {
        &self.neo
    }

    pub fn call(&self, operation: &str, args: Vec<ContractParam>) -> ContractCall {
        ContractCall::new(self.hash, operation, args)
    }

    pub async fn read<T>(
        &self,
        operation: &str,
        args: Vec<ContractParam>,
        decode: impl FnOnce(&StackItem) -> Result<T, DecodeError>,
    ) -> Result<T, Error> {
        let item = self.neo.invoke_read(&self.call(operation, args)).await?;
        Ok(decode(&item)?)
    }

    pub async fn transaction(
        &self,
        operation: &str,
        args: Vec<ContractParam>,
        signer: ScriptHash,
    ) -> Result<Transaction, Error> {
        self.neo
            .build_transaction(&self.call(operation, args), signer)
            .await
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        neo_rpc::{MockNodeRpc, VmState},
        serde_json::json,
    };

    fn vault() -> ScriptHash {
        "abcdef0123456789abcdef0123456789abcdef01".parse().unwrap()
    }

    fn result(state: VmState, stack: serde_json::Value) -> InvokeResult {
        InvokeResult {
            script: String::new(),
            state,
            gas_consumed: "1000".to_owned(),
            exception: (state == VmState::Fault)
                .then(|| "ASSERT is executed with false result.".to_owned()),
            stack: serde_json::from_value(stack).unwrap(),
        }
    }

    #[tokio::test]
    async fn faulted_reads_are_errors() {
        let mut rpc = MockNodeRpc::new();
        rpc.expect_invoke_function()
            .returning(|_, _, _| {
                Ok(result(
                    VmState::Fault,
                    json!([{"type": "Integer", "value": "0"}]),
                ))
            });
        let neo = Neo::new(Arc::new(rpc));
        let err = neo
            .contract(vault())
            .read("getMaxLoanToValue", vec![], StackItem::as_u32)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::ExecutionFault { .. }));
    }

    #[tokio::test]
    async fn empty_stack_is_an_error() {
        let mut rpc = MockNodeRpc::new();
        rpc.expect_invoke_function()
            .returning(|_, _, _| Ok(result(VmState::Halt, json!([]))));
        let neo = Neo::new(Arc::new(rpc));
        let err = neo
            .invoke_read(&ContractCall::new(vault(), "getTime", vec![]))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::EmptyStack(_)));
    }

    #[tokio::test]
    async fn transport_errors_mean_node_unavailable() {
        let mut rpc = MockNodeRpc::new();
        rpc.expect_block_count().returning(|| {
            Err(neo_rpc::Error::Rpc {
                code: -32603,
                message: "internal error".to_owned(),
            })
        });
        let neo = Neo::new(Arc::new(rpc));
        let err = neo
            .build_transaction(&ContractCall::new(vault(), "getTime", vec![]), vault())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NodeUnavailable(_)));
    }

    #[tokio::test]
    async fn transactions_are_valid_for_ten_blocks() {
        let mut rpc = MockNodeRpc::new();
        rpc.expect_block_count().returning(|| Ok(4_200));
        let neo = Neo::new(Arc::new(rpc));
        let owner: ScriptHash = "0123456789abcdef0123456789abcdef01234567".parse().unwrap();
        let call = ContractCall::new(vault(), "setGasAdmin", vec![ContractParam::hash160(owner)]);
        let tx = neo.build_transaction(&call, owner).await.unwrap();

        assert_eq!(tx.valid_until_block, 4_210);
        assert_eq!(tx.signers, vec![Signer::called_by_entry(owner)]);
        assert_eq!(tx.script, call.to_script().unwrap());
        assert_eq!(tx.network_fee(), None);
        assert_eq!(tx.system_fee(), None);
    }
}
