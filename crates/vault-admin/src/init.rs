//! The one-shot configuration of a fresh deployment.
//!
//! Contracts are configured in a fixed order: FUSD first so that the vault
//! is allowed to mint it, then the vault, then the price feed. After the
//! setters of a contract are submitted the run waits for their inclusion and
//! reads every configured value back into the log.

use {
    crate::{
        domain::{Fusd, PriceFeed, Vault, fusd::FUSD_DECIMALS, token::format_units},
        infra::{
            Confirmation,
            Neo,
            Submitter,
            blockchain,
            config::Contracts,
            observe,
        },
    },
    anyhow::{Context, Result},
    neo_model::{PublicKey, ScriptHash, Transaction, TxHash},
    std::fmt::Display,
};

/// Liquidation bonus in percent, per collateral.
const LIQUIDATION_BONUS: u32 = 5;
/// Annual interest in percent.
const BNEO_ANNUAL_INTEREST: u32 = 4;
const BTC_ANNUAL_INTEREST: u32 = 6;
const FLUND_ANNUAL_INTEREST: u32 = 6;

pub struct Initializer {
    submitter: Submitter,
    confirmation: Confirmation,
    contracts: Contracts,
    feed_signer: PublicKey,
    fusd: Fusd,
    vault: Vault,
    price_feed: PriceFeed,
}

/// Hashes of the transactions submitted for one contract.
#[derive(Default)]
struct Submitted(Vec<TxHash>);

impl Initializer {
    pub fn new(
        neo: &Neo,
        submitter: Submitter,
        confirmation: Confirmation,
        contracts: Contracts,
        feed_signer: PublicKey,
    ) -> Self {
        Self {
            fusd: Fusd::new(neo, contracts.fusd),
            vault: Vault::new(neo, contracts.vault),
            price_feed: PriceFeed::new(neo, contracts.price_feed),
            submitter,
            confirmation,
            contracts,
            feed_signer,
        }
    }

    pub async fn run(&self) -> Result<()> {
        self.init_fusd().await.context("FUSD initialization")?;
        self.init_vault().await.context("vault initialization")?;
        self.init_price_feed()
            .await
            .context("price feed initialization")?;
        Ok(())
    }

    fn owner(&self) -> ScriptHash {
        self.submitter.owner().script_hash()
    }

    async fn submit(
        &self,
        submitted: &mut Submitted,
        transaction: Result<Transaction, blockchain::Error>,
        description: &str,
    ) -> Result<()> {
        let transaction = transaction.with_context(|| format!("building {description}"))?;
        if let Some(hash) = self
            .submitter
            .submit(transaction, description)
            .await
            .with_context(|| format!("submitting {description}"))?
        {
            submitted.0.push(hash);
        }
        Ok(())
    }

    async fn confirm(&self, submitted: Submitted) -> Result<()> {
        self.confirmation
            .wait(&submitted.0)
            .await
            .context("waiting for confirmation")
    }

    async fn init_fusd(&self) -> Result<()> {
        let mut submitted = Submitted::default();
        let owner = self.owner();

        self.submit(
            &mut submitted,
            self.fusd
                .set_vault_script_hash(self.contracts.vault, owner)
                .await,
            "FUSD::setVaultScriptHash()",
        )
        .await?;

        self.confirm(submitted).await?;

        observe::read_back(
            "FUSD::Vault script hash",
            self.fusd.vault_script_hash().await?,
        );
        Ok(())
    }

    async fn init_vault(&self) -> Result<()> {
        let mut submitted = Submitted::default();
        let owner = self.owner();
        let Contracts {
            flund,
            fusd,
            price_feed,
            bneo,
            btc,
            fusdt,
            ..
        } = self.contracts;
        let vault = &self.vault;

        self.submit(
            &mut submitted,
            vault.set_flund_hash(flund, owner).await,
            "Vault::setFLUNDHash()",
        )
        .await?;
        self.submit(
            &mut submitted,
            vault.set_bneo_hash(bneo, owner).await,
            "Vault::setbNEOHash()",
        )
        .await?;
        self.submit(
            &mut submitted,
            vault.set_quote_token_hash(fusdt, owner).await,
            "Vault::setQuoteTokenHash()",
        )
        .await?;
        self.submit(
            &mut submitted,
            vault.set_price_feed_hash(price_feed, owner).await,
            "Vault::setPriceFeedHash()",
        )
        .await?;
        self.submit(
            &mut submitted,
            vault.set_signer(self.feed_signer, owner).await,
            &format!("Vault::setSigner({})", self.feed_signer),
        )
        .await?;
        self.submit(
            &mut submitted,
            vault.set_gas_admin(owner, owner).await,
            &format!("Vault::setGasAdmin({owner})"),
        )
        .await?;
        self.submit(
            &mut submitted,
            vault.set_lrb_fund_admin(owner, owner).await,
            &format!("Vault::setLRBFundAdmin({owner})"),
        )
        .await?;
        self.submit(
            &mut submitted,
            vault.set_security_fund_admin(owner, owner).await,
            &format!("Vault::setSecurityFundAdmin({owner})"),
        )
        .await?;

        for (name, collateral) in [("fWBTC", btc), ("bNEO", bneo), ("FLUND", flund)] {
            self.submit(
                &mut submitted,
                vault.support_collateral(collateral, owner).await,
                &format!("Vault::supportCollateral({name})"),
            )
            .await?;
        }
        self.submit(
            &mut submitted,
            vault.support_f_token(fusd, owner).await,
            "Vault::supportFToken(FUSD)",
        )
        .await?;

        // Loan-to-value, liquidation limit and penalty keep the contract
        // defaults.
        for (name, collateral) in [("bNEO", bneo), ("fWBTC", btc), ("FLUND", flund)] {
            self.submit(
                &mut submitted,
                vault
                    .set_liquidation_bonus(collateral, LIQUIDATION_BONUS, owner)
                    .await,
                &format!("Vault::setLiquidationBonus({name}, {LIQUIDATION_BONUS})"),
            )
            .await?;
        }
        for (name, collateral, interest) in [
            ("bNEO", bneo, BNEO_ANNUAL_INTEREST),
            ("fWBTC", btc, BTC_ANNUAL_INTEREST),
            ("FLUND", flund, FLUND_ANNUAL_INTEREST),
        ] {
            self.submit(
                &mut submitted,
                vault.set_annual_interest(collateral, interest, owner).await,
                &format!("Vault::setAnnualInterest({name}, {interest})"),
            )
            .await?;
        }

        self.confirm(submitted).await?;

        observe::read_back("Vault::FLUND hash", vault.flund_hash().await?);
        observe::read_back("Vault::bNEO hash", vault.bneo_hash().await?);
        observe::read_back("Vault::Quote token hash", vault.quote_token_hash().await?);
        observe::read_back("Vault::Price feed hash", vault.price_feed_hash().await?);
        observe::read_back("Vault::Vault signers", list(&vault.signers().await?));
        observe::read_back("Vault::GAS admin", vault.gas_admin().await?);
        observe::read_back("Vault::LRB Fund admin", vault.lrb_fund_admin().await?);
        observe::read_back(
            "Vault::Security Fund admin",
            vault.security_fund_admin().await?,
        );
        observe::read_back(
            "Vault::bNEO supported collateral",
            vault.is_collateral_supported(bneo).await?,
        );
        observe::read_back(
            "Vault::fWBTC supported collateral",
            vault.is_collateral_supported(btc).await?,
        );
        observe::read_back(
            "Vault::FLUND supported collateral",
            vault.is_collateral_supported(flund).await?,
        );
        observe::read_back(
            "Vault::FUSD supported fToken",
            vault.is_f_token_supported(fusd).await?,
        );
        observe::read_back(
            "Vault::Max LTV",
            per_collateral(
                vault.max_loan_to_value(bneo).await?,
                vault.max_loan_to_value(btc).await?,
                vault.max_loan_to_value(flund).await?,
            ),
        );
        observe::read_back(
            "Vault::Max Init LTV",
            per_collateral(
                vault.max_init_loan_to_value(bneo).await?,
                vault.max_init_loan_to_value(btc).await?,
                vault.max_init_loan_to_value(flund).await?,
            ),
        );
        observe::read_back(
            "Vault::Liquidation limit",
            per_collateral(
                vault.liquidation_limit(bneo).await?,
                vault.liquidation_limit(btc).await?,
                vault.liquidation_limit(flund).await?,
            ),
        );
        observe::read_back(
            "Vault::Liquidation penalty",
            per_collateral(
                vault.liquidation_penalty(bneo).await?,
                vault.liquidation_penalty(btc).await?,
                vault.liquidation_penalty(flund).await?,
            ),
        );
        observe::read_back(
            "Vault::Liquidation bonus",
            per_collateral(
                vault.liquidation_bonus(bneo).await?,
                vault.liquidation_bonus(btc).await?,
                vault.liquidation_bonus(flund).await?,
            ),
        );
        observe::read_back(
            "Vault::Annual interest",
            per_collateral(
                vault.annual_interest(bneo).await?,
                vault.annual_interest(btc).await?,
                vault.annual_interest(flund).await?,
            ),
        );
        observe::read_back(
            "Vault::FUSD mint limit",
            format_units(&vault.mint_limit_per_block(fusd).await?, FUSD_DECIMALS),
        );
        observe::read_back(
            "Vault::FUSD liquidate limit",
            format_units(
                &vault.liquidate_limit_per_block(fusd).await?,
                FUSD_DECIMALS,
            ),
        );
        Ok(())
    }

    async fn init_price_feed(&self) -> Result<()> {
        let mut submitted = Submitted::default();
        let owner = self.owner();
        let Contracts {
            flund,
            fusd,
            bneo,
            btc,
            flm,
            fusdt,
            swap_factory,
            ..
        } = self.contracts;
        let feed = &self.price_feed;

        self.submit(
            &mut submitted,
            feed.set_flm_hash(flm, owner).await,
            "PriceFeed::setFLMHash()",
        )
        .await?;
        self.submit(
            &mut submitted,
            feed.set_flund_hash(flund, owner).await,
            "PriceFeed::setFLUNDHash()",
        )
        .await?;
        self.submit(
            &mut submitted,
            feed.set_swap_factory_hash(swap_factory, owner).await,
            "PriceFeed::setSwapFactoryHash()",
        )
        .await?;

        let paths = [
            ("FUSD", fusd),
            ("bNEO", bneo),
            ("fWBTC", btc),
            ("FLM", flm),
        ];
        for (name, token) in paths {
            self.submit(
                &mut submitted,
                feed.set_path(token, fusdt, &[token, fusdt], owner).await,
                &format!("PriceFeed::setPath({name}, fUSDT)"),
            )
            .await?;
        }

        self.confirm(submitted).await?;

        observe::read_back("PriceFeed::FLM hash", feed.flm_hash().await?);
        observe::read_back("PriceFeed::FLUND hash", feed.flund_hash().await?);
        observe::read_back("PriceFeed::Factory", feed.swap_factory_hash().await?);
        for (name, token) in paths {
            observe::read_back(
                &format!("PriceFeed::{name}-fUSDT Path"),
                list(&feed.path(token, fusdt).await?),
            );
        }
        Ok(())
    }
}

fn list<T: Display>(items: &[T]) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

fn per_collateral(bneo: u32, btc: u32, flund: u32) -> String {
    format!("bNEO={bneo}, fWBTC={btc}, FLUND={flund}")
}
