//! Events that are meaningful to an admin run. Each function logs its event
//! so that the log of a run reads as a record of what was configured.

use {
    neo_model::{ContractCall, ScriptHash, Transaction, TxHash},
    std::{fmt::Display, time::Duration},
};

/// GAS amounts are integers of 10^-8 GAS.
const GAS_DECIMALS: u32 = 8;

fn gas(amount: i64) -> String {
    let sign = if amount < 0 { "-" } else { "" };
    let amount = amount.unsigned_abs();
    let unit = 10_u64.pow(GAS_DECIMALS);
    format!(
        "{sign}{}.{:0width$}",
        amount / unit,
        amount % unit,
        width = GAS_DECIMALS as usize
    )
}

pub fn transaction_built(call: &ContractCall, signer: ScriptHash, transaction: &Transaction) {
    tracing::debug!(
        %call,
        args = ?call.args,
        signer = %signer.to_address(),
        valid_until_block = transaction.valid_until_block,
        "transaction created"
    );
}

pub fn network_fee(description: &str, fee: i64) {
    tracing::debug!(description, fee = %gas(fee), "network fee set");
}

pub fn system_fee(description: &str, fee: i64) {
    tracing::debug!(description, fee = %gas(fee), "system fee set");
}

pub fn not_submitting(description: &str) {
    tracing::info!("Not submitting {description} transaction since dry run...");
}

pub fn submitting(description: &str) {
    tracing::info!("Submitting {description} transaction...");
}

pub fn submitted(description: &str, hash: TxHash) {
    tracing::info!(description, %hash, "transaction submitted");
}

pub fn unexpected_hash(description: &str, expected: TxHash, returned: TxHash) {
    tracing::warn!(description, %expected, %returned, "node returned a different transaction hash");
}

pub fn waiting_for_confirmation(count: usize, timeout: Duration) {
    tracing::info!(count, ?timeout, "waiting for transactions to be included");
}

pub fn pending(hash: TxHash) {
    tracing::trace!(%hash, "transaction still pending");
}

pub fn confirmed(hash: TxHash, height: u32) {
    tracing::debug!(%hash, height, "transaction included");
}

pub fn signed_price(payload: &str) {
    tracing::debug!(payload, "fetched signed price");
}

/// A value read back from chain after configuring it.
pub fn read_back(label: &str, value: impl Display) {
    tracing::info!("{label}={value}");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_gas() {
        assert_eq!(gas(1_209_390), "0.01209390");
        assert_eq!(gas(100_000_000), "1.00000000");
        assert_eq!(gas(-5), "-0.00000005");
    }
}
