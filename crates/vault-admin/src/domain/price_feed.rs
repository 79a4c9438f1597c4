//! The on-chain price feed. Prices are derived from swap pool ratios along a
//! configured path of tokens ending in the quote token.

use {
    crate::infra::blockchain::{Contract, Error, Neo},
    neo_model::{ContractParam, ScriptHash, StackItem, Transaction},
    num::BigInt,
};

#[derive(Clone, Debug)]
pub struct PriceFeed(Contract);

impl PriceFeed {
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

    async fn get_hash(&self, operation: &str) -> Result<ScriptHash, Error> {
        self.0
            .read(operation, vec![], StackItem::as_script_hash)
            .await
    }

    pub async fn set_flm_hash(
        &self,
        flm: ScriptHash,
        signer: ScriptHash,
    ) -> Result<Transaction, Error> {
        self.set_hash("setFLMHash", flm, signer).await
    }

    pub async fn set_flund_hash(
        &self,
        flund: ScriptHash,
        signer: ScriptHash,
    ) -> Result<Transaction, Error> {
        self.set_hash("setFLUNDHash", flund, signer).await
    }

    pub async fn set_swap_factory_hash(
        &self,
        factory: ScriptHash,
        signer: ScriptHash,
    ) -> Result<Transaction, Error> {
        self.set_hash("setSwapFactoryHash", factory, signer).await
    }

    /// Sets the chain of tokens whose pools price `from` in `to`.
    pub async fn set_path(
        &self,
        from: ScriptHash,
        to: ScriptHash,
        path: &[ScriptHash],
        signer: ScriptHash,
    ) -> Result<Transaction, Error> {
        self.0
            .transaction(
                "setPath",
                vec![
                    ContractParam::hash160(from),
                    ContractParam::hash160(to),
                    ContractParam::array(path.iter().copied().map(ContractParam::hash160)),
                ],
                signer,
            )
            .await
    }

    pub async fn flm_hash(&self) -> Result<ScriptHash, Error> {
        self.get_hash("getFLMHash").await
    }

    pub async fn flund_hash(&self) -> Result<ScriptHash, Error> {
        self.get_hash("getFLUNDHash").await
    }

    pub async fn swap_factory_hash(&self) -> Result<ScriptHash, Error> {
        self.get_hash("getSwapFactoryHash").await
    }

    pub async fn path(&self, from: ScriptHash, to: ScriptHash) -> Result<Vec<ScriptHash>, Error> {
        self.0
            .read(
                "getPath",
                vec![ContractParam::hash160(from), ContractParam::hash160(to)],
                |item| item.map_array(StackItem::as_script_hash),
            )
            .await
    }

    pub async fn swap_pair(
        &self,
        token_a: ScriptHash,
        token_b: ScriptHash,
    ) -> Result<ScriptHash, Error> {
        self.0
            .read(
                "getSwapPair",
                vec![
                    ContractParam::hash160(token_a),
                    ContractParam::hash160(token_b),
                ],
                StackItem::as_script_hash,
            )
            .await
    }

    /// Reserve ratio of the pools along the path from `from` to `to`.
    pub async fn ratio(&self, from: ScriptHash, to: ScriptHash) -> Result<Vec<BigInt>, Error> {
        self.0
            .read(
                "getRatio",
                vec![ContractParam::hash160(from), ContractParam::hash160(to)],
                |item| item.map_array(StackItem::as_integer),
            )
            .await
    }

    pub async fn flund_flm_ratio(&self) -> Result<Vec<BigInt>, Error> {
        self.0
            .read("getFlundFlmRatio", vec![], |item| {
                item.map_array(StackItem::as_integer)
            })
            .await
    }

    /// Price of `base` in `quote`, scaled by `10^decimals`.
    pub async fn price(
        &self,
        base: ScriptHash,
        quote: ScriptHash,
        decimals: u32,
    ) -> Result<BigInt, Error> {
        self.0
            .read(
                "getPrice",
                vec![
                    ContractParam::hash160(base),
                    ContractParam::hash160(quote),
                    ContractParam::integer(decimals),
                ],
                StackItem::as_integer,
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
        serde_json::json,
        std::sync::Arc,
    };

    fn hash(byte: u8) -> ScriptHash {
        ScriptHash::from_le_bytes([byte; 20])
    }

    #[tokio::test]
    async fn set_path_encodes_an_array_of_hashes() {
        let mut rpc = MockNodeRpc::new();
        rpc.expect_block_count().returning(|| Ok(10));
        let feed = PriceFeed::new(&Neo::new(Arc::new(rpc)), hash(1));
        let tx = feed
            .set_path(hash(2), hash(3), &[hash(2), hash(3)], hash(9))
            .await
            .unwrap();
        let expected = ContractCall::new(
            hash(1),
            "setPath",
            vec![
                ContractParam::Hash160(hash(2)),
                ContractParam::Hash160(hash(3)),
                ContractParam::Array(vec![
                    ContractParam::Hash160(hash(2)),
                    ContractParam::Hash160(hash(3)),
                ]),
            ],
        );
        assert_eq!(tx.script, expected.to_script().unwrap());
    }

    #[tokio::test]
    async fn path_decodes_every_hash() {
        let path = [hash(4), hash(5)];
        let items = path
            .iter()
            .map(|hash| {
                json!({"type": "ByteString", "value": BASE64_STANDARD.encode(hash.as_le_bytes())})
            })
            .collect::<Vec<_>>();
        let stack = json!([{"type": "Array", "value": items}]);
        let mut rpc = MockNodeRpc::new();
        rpc.expect_invoke_function()
            .withf(|_, operation, params| {
                operation == "getPath"
                    && params == [ContractParam::Hash160(hash(4)), ContractParam::Hash160(hash(6))]
            })
            .returning(move |_, _, _| {
                Ok(InvokeResult {
                    script: String::new(),
                    state: VmState::Halt,
                    gas_consumed: "0".to_owned(),
                    exception: None,
                    stack: serde_json::from_value(stack.clone()).unwrap(),
                })
            });
        let feed = PriceFeed::new(&Neo::new(Arc::new(rpc)), hash(1));
        assert_eq!(feed.path(hash(4), hash(6)).await.unwrap(), path);
    }
}
