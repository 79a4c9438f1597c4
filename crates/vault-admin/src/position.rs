//! Changes to the owner's own vault position.
//!
//! Withdrawing collateral and minting FUSD are checked on chain against a
//! recently signed price, so both fetch one from the price oracle right
//! before the transaction is built.

use {
    crate::{
        domain::{Token, Vault, fusd::FUSD_DECIMALS, token::format_units},
        infra::{
            Confirmation,
            Neo,
            PriceOracle,
            Submitter,
            config::Contracts,
            observe,
            oracle::SignedPrice,
        },
    },
    anyhow::{Context, Result},
    neo_model::ScriptHash,
    num::BigInt,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    Deposit,
    Withdraw,
    Mint,
    Repay,
}

pub struct Position {
    neo: Neo,
    submitter: Submitter,
    confirmation: Confirmation,
    oracle: PriceOracle,
    vault: Vault,
    fusd: Token,
}

impl Position {
    pub fn new(
        neo: &Neo,
        submitter: Submitter,
        confirmation: Confirmation,
        oracle: PriceOracle,
        contracts: &Contracts,
    ) -> Self {
        Self {
            neo: neo.clone(),
            submitter,
            confirmation,
            oracle,
            vault: Vault::new(neo, contracts.vault),
            fusd: Token::new(neo, contracts.fusd),
        }
    }

    /// Submits one change of the FUSD vault backed by `collateral` and, once
    /// it is included, logs the resulting balances.
    pub async fn run(&self, action: Action, collateral: ScriptHash, amount: BigInt) -> Result<()> {
        let owner = self.submitter.owner().script_hash();
        let fusd = self.fusd.hash();
        let vault = &self.vault;

        let (transaction, operation) = match action {
            Action::Deposit => (
                vault
                    .deposit_collateral(
                        &Token::new(&self.neo, collateral),
                        fusd,
                        amount.clone(),
                        owner,
                    )
                    .await,
                "depositCollateral",
            ),
            Action::Withdraw => {
                let price = self.signed_price().await?;
                (
                    vault
                        .withdraw_collateral(collateral, fusd, amount.clone(), &price, owner)
                        .await,
                    "withdrawCollateral",
                )
            }
            Action::Mint => {
                let price = self.signed_price().await?;
                (
                    vault
                        .mint_f_token(collateral, fusd, amount.clone(), &price, owner)
                        .await,
                    "mintFToken",
                )
            }
            Action::Repay => (
                vault
                    .repay_f_token(&self.fusd, collateral, amount.clone(), owner)
                    .await,
                "repayFToken",
            ),
        };
        let description = format!("Vault::{operation}({collateral}, {amount})");
        let transaction = transaction.with_context(|| format!("building {description}"))?;

        let Some(hash) = self
            .submitter
            .submit(transaction, &description)
            .await
            .with_context(|| format!("submitting {description}"))?
        else {
            return Ok(());
        };
        self.confirmation
            .wait(&[hash])
            .await
            .context("waiting for confirmation")?;

        let balance = vault.vault_balance(collateral, fusd, owner).await?;
        observe::read_back("Vault::Collateral balance", &balance.collateral_balance);
        observe::read_back(
            "Vault::FUSD balance",
            format_units(&balance.f_token_balance, FUSD_DECIMALS),
        );
        Ok(())
    }

    async fn signed_price(&self) -> Result<SignedPrice> {
        let price = self
            .oracle
            .signed_price()
            .await
            .context("fetching signed price")?;
        observe::signed_price(&price.payload);
        Ok(price)
    }
}
