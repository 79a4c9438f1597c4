//! The collateralized debt vault.
//!
//! Owners configure which tokens may be locked as collateral, which fTokens
//! may be minted against them and the risk parameters per collateral. Users
//! deposit collateral through a NEP-17 transfer to the vault, mint and
//! withdraw against a signed price, and repay by transferring fTokens back.

use {
    super::token::Token,
    crate::infra::{
        blockchain::{Contract, Error, Neo},
        oracle::SignedPrice,
    },
    neo_model::{ContractParam, DecodeError, PublicKey, ScriptHash, StackItem, Transaction},
    num::BigInt,
};

/// Collateral and debt of one account in one vault.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VaultBalance {
    pub collateral: ScriptHash,
    pub f_token: ScriptHash,
    pub collateral_balance: BigInt,
    pub f_token_balance: BigInt,
}

impl VaultBalance {
    fn decode(item: &StackItem) -> Result<Self, DecodeError> {
        match item.as_array()? {
            [collateral, f_token, collateral_balance, f_token_balance] => Ok(Self {
                collateral: collateral.as_script_hash()?,
                f_token: f_token.as_script_hash()?,
                collateral_balance: collateral_balance.as_integer()?,
                f_token_balance: f_token_balance.as_integer()?,
            }),
            _ => Err(DecodeError::Malformed("vault balance")),
        }
    }
}

/// One entry of the paged listing of every vault for a collateral and fToken
/// pair.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AccountVaultBalance {
    pub account: ScriptHash,
    pub collateral_balance: BigInt,
    pub f_token_balance: BigInt,
}

impl AccountVaultBalance {
    fn decode(item: &StackItem) -> Result<Self, DecodeError> {
        match item.as_array()? {
            [account, collateral_balance, f_token_balance] => Ok(Self {
                account: account.as_script_hash()?,
                collateral_balance: collateral_balance.as_integer()?,
                f_token_balance: f_token_balance.as_integer()?,
            }),
            _ => Err(DecodeError::Malformed("account vault balance")),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Vault(Contract);

impl Vault {
    pub fn new(neo: &Neo, hash: ScriptHash) -> Self {
        Self(neo.contract(hash))
    }

    pub fn hash(&self) -> ScriptHash {
        self.0.hash()
    }

    async fn set_hash(
        &self,
        operation: &str,
        hash: ScriptHash,
        signer: ScriptHash,
    ) -> Result<Transaction, Error> {
        self.0
            .transaction(operation, vec![ContractParam::hash160(hash)], signer)
            .await
    }

    async fn set_collateral_parameter(
        &self,
        operation: &str,
        collateral: ScriptHash,
        value: u32,
        signer: ScriptHash,
    ) -> Result<Transaction, Error> {
        self.0
            .transaction(
                operation,
                vec![
                    ContractParam::hash160(collateral),
                    ContractParam::integer(value),
                ],
                signer,
            )
            .await
    }

    async fn get_hash(&self, operation: &str) -> Result<ScriptHash, Error> {
        self.0
            .read(operation, vec![], StackItem::as_script_hash)
            .await
    }

    async fn get_collateral_parameter(
        &self,
        operation: &str,
        collateral: ScriptHash,
    ) -> Result<u32, Error> {
        self.0
            .read(
                operation,
                vec![ContractParam::hash160(collateral)],
                StackItem::as_u32,
            )
            .await
    }

    async fn get_flag(&self, operation: &str, token: ScriptHash) -> Result<bool, Error> {
        self.0
            .read(
                operation,
                vec![ContractParam::hash160(token)],
                StackItem::as_bool,
            )
            .await
    }

    // Contract references.

    pub async fn set_flund_hash(
        &self,
        flund: ScriptHash,
        signer: ScriptHash,
    ) -> Result<Transaction, Error> {
        self.set_hash("setFLUNDHash", flund, signer).await
    }

    pub async fn set_bneo_hash(
        &self,
        bneo: ScriptHash,
        signer: ScriptHash,
    ) -> Result<Transaction, Error> {
        self.set_hash("setbNEOHash", bneo, signer).await
    }

    pub async fn set_lrb_fund_hash(
        &self,
        fund: ScriptHash,
        signer: ScriptHash,
    ) -> Result<Transaction, Error> {
        self.set_hash("setLRBFundHash", fund, signer).await
    }

    pub async fn set_quote_token_hash(
        &self,
        quote: ScriptHash,
        signer: ScriptHash,
    ) -> Result<Transaction, Error> {
        self.set_hash("setQuoteTokenHash", quote, signer).await
    }

    pub async fn set_price_feed_hash(
        &self,
        price_feed: ScriptHash,
        signer: ScriptHash,
    ) -> Result<Transaction, Error> {
        self.set_hash("setPriceFeedHash", price_feed, signer).await
    }

    pub async fn flund_hash(&self) -> Result<ScriptHash, Error> {
        self.get_hash("getFLUNDHash").await
    }

    pub async fn bneo_hash(&self) -> Result<ScriptHash, Error> {
        self.get_hash("getbNEOHash").await
    }

    pub async fn quote_token_hash(&self) -> Result<ScriptHash, Error> {
        self.get_hash("getQuoteTokenHash").await
    }

    pub async fn price_feed_hash(&self) -> Result<ScriptHash, Error> {
        self.get_hash("getPriceFeedHash").await
    }

    // Roles.

    /// Registers a key whose price signatures the vault accepts.
    pub async fn set_signer(
        &self,
        key: PublicKey,
        signer: ScriptHash,
    ) -> Result<Transaction, Error> {
        self.0
            .transaction("setSigner", vec![ContractParam::public_key(key)], signer)
            .await
    }

    pub async fn signers(&self) -> Result<Vec<PublicKey>, Error> {
        self.0
            .read("getSigners", vec![], |item| {
                item.map_array(StackItem::as_public_key)
            })
            .await
    }

    pub async fn set_gas_admin(
        &self,
        admin: ScriptHash,
        signer: ScriptHash,
    ) -> Result<Transaction, Error> {
        self.set_hash("setGasAdmin", admin, signer).await
    }

    pub async fn set_lrb_fund_admin(
        &self,
        admin: ScriptHash,
        signer: ScriptHash,
    ) -> Result<Transaction, Error> {
        self.set_hash("setLRBFundAdmin", admin, signer).await
    }

    pub async fn set_security_fund_admin(
        &self,
        admin: ScriptHash,
        signer: ScriptHash,
    ) -> Result<Transaction, Error> {
        self.set_hash("setSecurityFundAdmin", admin, signer).await
    }

    pub async fn gas_admin(&self) -> Result<ScriptHash, Error> {
        self.get_hash("getGasAdmin").await
    }

    pub async fn lrb_fund_admin(&self) -> Result<ScriptHash, Error> {
        self.get_hash("getLRBFundAdmin").await
    }

    pub async fn security_fund_admin(&self) -> Result<ScriptHash, Error> {
        self.get_hash("getSecurityFundAdmin").await
    }

    pub async fn whitelist_liquidator(
        &self,
        liquidator: ScriptHash,
        signer: ScriptHash,
    ) -> Result<Transaction, Error> {
        self.set_hash("whitelistLiquidator", liquidator, signer)
            .await
    }

    // Supported tokens.

    pub async fn support_collateral(
        &self,
        collateral: ScriptHash,
        signer: ScriptHash,
    ) -> Result<Transaction, Error> {
        self.set_hash("supportCollateral", collateral, signer).await
    }

    pub async fn support_f_token(
        &self,
        f_token: ScriptHash,
        signer: ScriptHash,
    ) -> Result<Transaction, Error> {
        self.set_hash("supportFToken", f_token, signer).await
    }

    pub async fn is_collateral_supported(&self, collateral: ScriptHash) -> Result<bool, Error> {
        self.get_flag("isCollateralSupported", collateral).await
    }

    pub async fn is_f_token_supported(&self, f_token: ScriptHash) -> Result<bool, Error> {
        self.get_flag("isFTokenSupported", f_token).await
    }

    // Risk parameters per collateral, in percent.

    pub async fn set_max_loan_to_value(
        &self,
        collateral: ScriptHash,
        percent: u32,
        signer: ScriptHash,
    ) -> Result<Transaction, Error> {
        self.set_collateral_parameter("setMaxLoanToValue", collateral, percent, signer)
            .await
    }

    pub async fn set_max_init_loan_to_value(
        &self,
        collateral: ScriptHash,
        percent: u32,
        signer: ScriptHash,
    ) -> Result<Transaction, Error> {
        self.set_collateral_parameter("setMaxInitLoanToValue", collateral, percent, signer)
            .await
    }

    pub async fn set_liquidation_limit(
        &self,
        collateral: ScriptHash,
        percent: u32,
        signer: ScriptHash,
    ) -> Result<Transaction, Error> {
        self.set_collateral_parameter("setLiquidationLimit", collateral, percent, signer)
            .await
    }

    pub async fn set_liquidation_penalty(
        &self,
        collateral: ScriptHash,
        percent: u32,
        signer: ScriptHash,
    ) -> Result<Transaction, Error> {
        self.set_collateral_parameter("setLiquidationPenalty", collateral, percent, signer)
            .await
    }

    pub async fn set_liquidation_bonus(
        &self,
        collateral: ScriptHash,
        percent: u32,
        signer: ScriptHash,
    ) -> Result<Transaction, Error> {
        self.set_collateral_parameter("setLiquidationBonus", collateral, percent, signer)
            .await
    }

    pub async fn set_annual_interest(
        &self,
        collateral: ScriptHash,
        percent: u32,
        signer: ScriptHash,
    ) -> Result<Transaction, Error> {
        self.set_collateral_parameter("setAnnualInterest", collateral, percent, signer)
            .await
    }

    pub async fn max_loan_to_value(&self, collateral: ScriptHash) -> Result<u32, Error> {
        self.get_collateral_parameter("getMaxLoanToValue", collateral)
            .await
    }

    pub async fn max_init_loan_to_value(&self, collateral: ScriptHash) -> Result<u32, Error> {
        self.get_collateral_parameter("getMaxInitLoanToValue", collateral)
            .await
    }

    pub async fn liquidation_limit(&self, collateral: ScriptHash) -> Result<u32, Error> {
        self.get_collateral_parameter("getLiquidationLimit", collateral)
            .await
    }

    pub async fn liquidation_penalty(&self, collateral: ScriptHash) -> Result<u32, Error> {
        self.get_collateral_parameter("getLiquidationPenalty", collateral)
            .await
    }

    pub async fn liquidation_bonus(&self, collateral: ScriptHash) -> Result<u32, Error> {
        self.get_collateral_parameter("getLiquidationBonus", collateral)
            .await
    }

    pub async fn annual_interest(&self, collateral: ScriptHash) -> Result<u32, Error> {
        self.get_collateral_parameter("getAnnualInterest", collateral)
            .await
    }

    pub async fn interest_multiplier(&self, token: ScriptHash) -> Result<BigInt, Error> {
        self.0
            .read(
                "getInterestMultiplier",
                vec![ContractParam::hash160(token)],
                StackItem::as_integer,
            )
            .await
    }

    /// Maximum amount of the fToken mintable per block, in base units.
    pub async fn mint_limit_per_block(&self, f_token: ScriptHash) -> Result<BigInt, Error> {
        self.0
            .read(
                "getMintLimitPerBlock",
                vec![ContractParam::hash160(f_token)],
                StackItem::as_integer,
            )
            .await
    }

    /// Maximum amount of the fToken liquidatable per block, in base units.
    pub async fn liquidate_limit_per_block(&self, f_token: ScriptHash) -> Result<BigInt, Error> {
        self.0
            .read(
                "getLiquidateLimitPerBlock",
                vec![ContractParam::hash160(f_token)],
                StackItem::as_integer,
            )
            .await
    }

    // State.

    pub async fn is_paused(&self) -> Result<bool, Error> {
        self.0.read("isPaused", vec![], StackItem::as_bool).await
    }

    /// Current block time in milliseconds.
    pub async fn time(&self) -> Result<u64, Error> {
        self.0.read("getTime", vec![], StackItem::as_u64).await
    }

    /// Time until which the last price used for the vault stays valid.
    pub async fn price_expiry(
        &self,
        collateral: ScriptHash,
        f_token: ScriptHash,
        account: ScriptHash,
    ) -> Result<u64, Error> {
        self.0
            .read(
                "getPriceExpiry",
                vec![
                    ContractParam::hash160(collateral),
                    ContractParam::hash160(f_token),
                    ContractParam::hash160(account),
                ],
                StackItem::as_u64,
            )
            .await
    }

    pub async fn on_chain_price(&self, token: ScriptHash, decimals: u32) -> Result<BigInt, Error> {
        self.0
            .read(
                "getOnChainPrice",
                vec![
                    ContractParam::hash160(token),
                    ContractParam::integer(decimals),
                ],
                StackItem::as_integer,
            )
            .await
    }

    pub async fn vault_balance(
        &self,
        collateral: ScriptHash,
        f_token: ScriptHash,
        account: ScriptHash,
    ) -> Result<VaultBalance, Error> {
        self.0
            .read(
                "getVaultBalance",
                vec![
                    ContractParam::hash160(collateral),
                    ContractParam::hash160(f_token),
                    ContractParam::hash160(account),
                ],
                VaultBalance::decode,
            )
            .await
    }

    pub async fn vault_balances(&self, account: ScriptHash) -> Result<Vec<VaultBalance>, Error> {
        self.0
            .read(
                "getVaultBalances",
                vec![ContractParam::hash160(account)],
                |item| item.map_array(VaultBalance::decode),
            )
            .await
    }

    /// One page of every vault for the collateral and fToken pair.
    pub async fn all_vaults(
        &self,
        collateral: ScriptHash,
        f_token: ScriptHash,
        page_size: u32,
        page: u32,
    ) -> Result<Vec<AccountVaultBalance>, Error> {
        self.0
            .read(
                "getAllVaults",
                vec![
                    ContractParam::hash160(collateral),
                    ContractParam::hash160(f_token),
                    ContractParam::integer(page_size),
                    ContractParam::integer(page),
                ],
                |item| item.map_array(AccountVaultBalance::decode),
            )
            .await
    }

    // User operations. Amounts are in base units of the token.

    /// Locks collateral by transferring it to the vault.
    pub async fn deposit_collateral(
        &self,
        collateral: &Token,
        f_token: ScriptHash,
        amount: impl Into<BigInt>,
        account: ScriptHash,
    ) -> Result<Transaction, Error> {
        collateral
            .transfer(
                account,
                self.hash(),
                amount,
                vec![
                    ContractParam::string("DEPOSIT"),
                    ContractParam::hash160(f_token),
                ],
            )
            .await
    }

    /// Repays debt by transferring fTokens to the vault.
    pub async fn repay_f_token(
        &self,
        f_token: &Token,
        collateral: ScriptHash,
        amount: impl Into<BigInt>,
        account: ScriptHash,
    ) -> Result<Transaction, Error> {
        f_token
            .transfer(
                account,
                self.hash(),
                amount,
                vec![
                    ContractParam::string("REPAY"),
                    ContractParam::hash160(collateral),
                ],
            )
            .await
    }

    pub async fn withdraw_collateral(
        &self,
        collateral: ScriptHash,
        f_token: ScriptHash,
        amount: impl Into<BigInt>,
        price: &SignedPrice,
        account: ScriptHash,
    ) -> Result<Transaction, Error> {
        self.priced_operation("withdrawCollateral", collateral, f_token, amount, price, account)
            .await
    }

    pub async fn mint_f_token(
        &self,
        collateral: ScriptHash,
        f_token: ScriptHash,
        amount: impl Into<BigInt>,
        price: &SignedPrice,
        account: ScriptHash,
    ) -> Result<Transaction, Error> {
        self.priced_operation("mintFToken", collateral, f_token, amount, price, account)
            .await
    }

    async fn priced_operation(
        &self,
        operation: &str,
        collateral: ScriptHash,
        f_token: ScriptHash,
        amount: impl Into<BigInt>,
        price: &SignedPrice,
        account: ScriptHash,
    ) -> Result<Transaction, Error> {
        self.0
            .transaction(
                operation,
                vec![
                    ContractParam::hash160(collateral),
                    ContractParam::hash160(f_token),
                    ContractParam::hash160(account),
                    ContractParam::integer(amount),
                    ContractParam::string(price.payload.clone()),
                    ContractParam::string(price.signature.clone()),
                ],
                account,
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        base64::prelude::*,
        neo_model::ContractCall,
        neo_rpc::{InvokeResult, MockNodeRpc, VmState},
        serde_json::{Value, json},
        std::sync::Arc,
    };

    const VAULT: &str = "abcdef0123456789abcdef0123456789abcdef01";
    const COLLATERAL: &str = "abcd000000000000000000000000000000000000";

    fn hash(value: &str) -> ScriptHash {
        value.parse().unwrap()
    }

    fn halt(stack: Value) -> InvokeResult {
        InvokeResult {
            script: String::new(),
            state: VmState::Halt,
            gas_consumed: "0".to_owned(),
            exception: None,
            stack: serde_json::from_value(stack).unwrap(),
        }
    }

    fn wire(hash: ScriptHash) -> Value {
        json!({"type": "ByteString", "value": BASE64_STANDARD.encode(hash.as_le_bytes())})
    }

    fn vault(rpc: MockNodeRpc) -> Vault {
        Vault::new(&Neo::new(Arc::new(rpc)), hash(VAULT))
    }

    #[tokio::test]
    async fn set_max_loan_to_value() {
        let mut rpc = MockNodeRpc::new();
        rpc.expect_block_count().returning(|| Ok(100));
        let owner = hash("0123456789abcdef0123456789abcdef01234567");

        let tx = vault(rpc)
            .set_max_loan_to_value(hash(COLLATERAL), 40, owner)
            .await
            .unwrap();
        let expected = ContractCall::new(
            hash(VAULT),
            "setMaxLoanToValue",
            vec![
                ContractParam::Hash160(hash(COLLATERAL)),
                ContractParam::Integer(40.into()),
            ],
        );
        assert_eq!(tx.script, expected.to_script().unwrap());
        assert_eq!(tx.valid_until_block, 110);
    }

    #[tokio::test]
    async fn get_max_loan_to_value() {
        let mut rpc = MockNodeRpc::new();
        rpc.expect_invoke_function()
            .withf(|contract, operation, params| {
                *contract == hash(VAULT)
                    && operation == "getMaxLoanToValue"
                    && params == [ContractParam::Hash160(hash(COLLATERAL))]
            })
            .times(1)
            .returning(|_, _, _| Ok(halt(json!([{"type": "Integer", "value": "40"}]))));
        assert_eq!(
            vault(rpc).max_loan_to_value(hash(COLLATERAL)).await.unwrap(),
            40
        );
    }

    #[tokio::test]
    async fn deposit_is_a_transfer_to_the_vault() {
        let mut rpc = MockNodeRpc::new();
        rpc.expect_block_count().returning(|| Ok(1));
        let neo = Neo::new(Arc::new(rpc));
        let vault = Vault::new(&neo, hash(VAULT));
        let collateral = Token::new(&neo, hash(COLLATERAL));
        let f_token = hash("1111111111111111111111111111111111111111");
        let owner = hash("0123456789abcdef0123456789abcdef01234567");

        let tx = vault
            .deposit_collateral(&collateral, f_token, 1_000, owner)
            .await
            .unwrap();
        let expected = ContractCall::new(
            hash(COLLATERAL),
            "transfer",
            vec![
                ContractParam::Hash160(owner),
                ContractParam::Hash160(hash(VAULT)),
                ContractParam::Integer(1_000.into()),
                ContractParam::Array(vec![
                    ContractParam::String("DEPOSIT".to_owned()),
                    ContractParam::Hash160(f_token),
                ]),
            ],
        );
        assert_eq!(tx.script, expected.to_script().unwrap());
    }

    #[tokio::test]
    async fn mint_embeds_the_signed_price() {
        let mut rpc = MockNodeRpc::new();
        rpc.expect_block_count().returning(|| Ok(1));
        let f_token = hash("1111111111111111111111111111111111111111");
        let owner = hash("0123456789abcdef0123456789abcdef01234567");
        let price = SignedPrice {
            payload: r#"{"fusd":"1"}"#.to_owned(),
            signature: "ffee".to_owned(),
        };

        let tx = vault(rpc)
            .mint_f_token(hash(COLLATERAL), f_token, 5, &price, owner)
            .await
            .unwrap();
        let expected = ContractCall::new(
            hash(VAULT),
            "mintFToken",
            vec![
                ContractParam::Hash160(hash(COLLATERAL)),
                ContractParam::Hash160(f_token),
                ContractParam::Hash160(owner),
                ContractParam::Integer(5.into()),
                ContractParam::String(price.payload.clone()),
                ContractParam::String(price.signature.clone()),
            ],
        );
        assert_eq!(tx.script, expected.to_script().unwrap());
    }

    #[tokio::test]
    async fn vault_balances() {
        let collateral = hash(COLLATERAL);
        let f_token = hash("1111111111111111111111111111111111111111");
        let stack = json!([{"type": "Array", "value": [
            {"type": "Struct", "value": [
                wire(collateral),
                wire(f_token),
                {"type": "Integer", "value": "250000000"},
                {"type": "Integer", "value": "0"},
            ]},
        ]}]);
        let mut rpc = MockNodeRpc::new();
        rpc.expect_invoke_function()
            .returning(move |_, _, _| Ok(halt(stack.clone())));

        let balances = vault(rpc).vault_balances(collateral).await.unwrap();
        assert_eq!(
            balances,
            vec![VaultBalance {
                collateral,
                f_token,
                collateral_balance: 250_000_000.into(),
                f_token_balance: 0.into(),
            }]
        );
    }

    #[tokio::test]
    async fn short_vault_listing_is_malformed() {
        let mut rpc = MockNodeRpc::new();
        rpc.expect_invoke_function().returning(|_, _, _| {
            Ok(halt(json!([{"type": "Array", "value": [
                {"type": "Array", "value": [{"type": "Integer", "value": "1"}]},
            ]}])))
        });
        let err = vault(rpc)
            .all_vaults(hash(COLLATERAL), hash(COLLATERAL), 10, 0)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Decode(DecodeError::Malformed("account vault balance"))
        ));
    }

    #[tokio::test]
    async fn signers_are_public_keys() {
        let key: PublicKey = "03b209fd4f53a7170ea4444e0cb0a6bb6a53c2bd016926989cf85f9b0fba17a70c"
            .parse()
            .unwrap();
        let encoded = BASE64_STANDARD.encode(key.as_bytes());
        let mut rpc = MockNodeRpc::new();
        rpc.expect_invoke_function().returning(move |_, _, _| {
            Ok(halt(json!([{"type": "Array", "value": [
                {"type": "ByteString", "value": encoded},
            ]}])))
        });
        assert_eq!(vault(rpc).signers().await.unwrap(), vec![key]);
    }
}
