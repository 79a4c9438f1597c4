use {
    super::token::Token,
    crate::infra::blockchain::{Contract, Error, Neo},
    neo_model::{ContractParam, ScriptHash, StackItem, Transaction},
};

pub const FUSD_DECIMALS: u32 = 8;

/// The FUSD stablecoin. Only the vault it is registered with may mint and
/// burn it.
#[derive(Clone, Debug)]
pub struct Fusd(Contract);

impl Fusd {
    pub fn new(neo: &Neo, hash: ScriptHash) -> Self {
        Self(neo.contract(hash))
    }

    pub fn hash(&self) -> ScriptHash {
        self.0.hash()
    }

    /// The NEP-17 interface of the stablecoin.
    pub fn token(&self) -> Token {
        Token::new(self.0.neo(), self.0.hash())
    }

    pub async fn set_vault_script_hash(
        &self,
        vault: ScriptHash,
        signer: ScriptHash,
    ) -> Result<Transaction, Error> {
        self.0
            .transaction(
                "setVaultScriptHash",
                vec![ContractParam::hash160(vault)],
                signer,
            )
            .await
    }

    pub async fn vault_script_hash(&self) -> Result<ScriptHash, Error> {
        self.0
            .read("getVaultScriptHash", vec![], StackItem::as_script_hash)
            .await
    }
}
