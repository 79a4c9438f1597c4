//! NEP-17 fungible tokens.

use {
    crate::infra::blockchain::{Contract, Error, Neo},
    neo_model::{ContractParam, ScriptHash, StackItem, Transaction},
    num::{BigInt, Integer, Signed},
};

#[derive(Clone, Debug)]
pub struct Token(Contract);

impl Token {
    pub fn new(neo: &Neo, hash: ScriptHash) -> Self {
        Self(neo.contract(hash))
    }

    pub fn hash(&self) -> ScriptHash {
        self.0.hash()
    }

    pub async fn balance_of(&self, account: ScriptHash) -> Result<BigInt, Error> {
        self.0
            .read(
                "balanceOf",
                vec![ContractParam::hash160(account)],
                StackItem::as_integer,
            )
            .await
    }

    pub async fn total_supply(&self) -> Result<BigInt, Error> {
        self.0
            .read("totalSupply", vec![], StackItem::as_integer)
            .await
    }

    pub async fn decimals(&self) -> Result<u32, Error> {
        self.0.read("decimals", vec![], StackItem::as_u32).await
    }

    pub async fn owner(&self) -> Result<ScriptHash, Error> {
        self.0
            .read("getOwner", vec![], StackItem::as_script_hash)
            .await
    }

    /// Transfers `amount` base units. `data` is handed to the receiver's
    /// `onNEP17Payment` and may be empty.
    pub async fn transfer(
        &self,
        from: ScriptHash,
        to: ScriptHash,
        amount: impl Into<BigInt>,
        data: Vec<ContractParam>,
    ) -> Result<Transaction, Error> {
        self.0
            .transaction(
                "transfer",
                vec![
                    ContractParam::hash160(from),
                    ContractParam::hash160(to),
                    ContractParam::integer(amount),
                    ContractParam::array(data),
                ],
                from,
            )
            .await
    }
}

/// Formats an amount of base units as a decimal number, e.g. `150000000`
/// with 8 decimals as `1.5`.
pub fn format_units(amount: &BigInt, decimals: u32) -> String {
    let unit = num::pow(BigInt::from(10), decimals as usize);
    let (whole, fraction) = amount.abs().div_rem(&unit);
    let sign = if amount.is_negative() { "-" } else { "" };
    if decimals == 0 || fraction == BigInt::from(0) {
        return format!("{sign}{whole}");
    }
    let fraction = format!("{:0>width$}", fraction.to_string(), width = decimals as usize);
    format!("{sign}{whole}.{}", fraction.trim_end_matches('0'))
}
