use {
    super::{Error, Neo, ensure_halt},
    neo_model::{ContractCall, DecodeError, ScriptHash, Transaction},
};

/// Bytes a single-signature witness adds to a transaction once attached.
pub const WITNESS_SIZE: i64 = 109;
/// Cost of executing the verification script of a single-signature account.
pub const WITNESS_PROCESSING_FEE: i64 = 1_000_390;

/// Estimates the fees of an unsigned transaction.
#[cfg_attr(any(test, feature = "test-util"), mockall::automock)]
#[async_trait::async_trait]
pub trait FeeEstimating: Send + Sync {
    /// Fee for size and witness verification, in GAS fractions.
    async fn network_fee(&self, transaction: &Transaction) -> Result<i64, Error>;

    /// Fee for executing the script, in GAS fractions. Fails with
    /// [`Error::ExecutionFault`] if the simulated execution does not halt.
    async fn system_fee(&self, transaction: &Transaction) -> Result<i64, Error>;
}

/// `fee_per_byte * (size + WITNESS_SIZE) + WITNESS_PROCESSING_FEE`, where
/// `size` is the serialized transaction size in bytes.
pub fn network_fee(fee_per_byte: i64, size: usize) -> i64 {
    let size = i64::try_from(size)
        .unwrap_or(i64::MAX)
        .saturating_add(WITNESS_SIZE);
    fee_per_byte
        .saturating_mul(size)
        .saturating_add(WITNESS_PROCESSING_FEE)
}

/// Estimates fees by asking the node.
#[derive(Clone, Debug)]
pub struct NodeFeeEstimator {
    neo: Neo,
}

impl NodeFeeEstimator {
    pub fn new(neo: Neo) -> Self {
        Self { neo }
    }
}

#[async_trait::async_trait]
impl FeeEstimating for NodeFeeEstimator {
    async fn network_fee(&self, transaction: &Transaction) -> Result<i64, Error> {
        let policy = ContractCall::new(ScriptHash::POLICY_CONTRACT, "getFeePerByte", vec![]);
        let fee_per_byte = self.neo.invoke_read(&policy).await?.as_i64()?;
        Ok(network_fee(fee_per_byte, transaction.serialized_size()))
    }

    async fn system_fee(&self, transaction: &Transaction) -> Result<i64, Error> {
        let result = self
            .neo
            .rpc()
            .invoke_script(&transaction.script, &transaction.signers)
            .await?;
        ensure_halt(&result, "transaction script")?;
        let gas: i64 = result
            .gas_consumed
            .parse()
            .map_err(|_| DecodeError::InvalidInteger(result.gas_consumed.clone()))?;
        Ok(gas)
    }
}
