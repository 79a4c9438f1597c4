//! Read access to the swap pools the price feed derives prices from.

use {
    super::token::Token,
    crate::infra::blockchain::{Contract, Error, Neo},
    neo_model::{ContractParam, ScriptHash, StackItem},
    num::BigInt,
};

#[derive(Clone, Debug)]
pub struct SwapFactory(Contract);

impl SwapFactory {
    pub fn new(neo: &Neo, hash: ScriptHash) -> Self {
        Self(neo.contract(hash))
    }

    /// The pair contract trading `token_a` against `token_b`.
    pub async fn exchange_pair(
        &self,
        token_a: ScriptHash,
        token_b: ScriptHash,
    ) -> Result<ScriptHash, Error> {
        self.0
            .read(
                "getExchangePair",
                vec![
                    ContractParam::hash160(token_a),
                    ContractParam::hash160(token_b),
                ],
                StackItem::as_script_hash,
            )
            .await
    }
}

#[derive(Clone, Debug)]
pub struct SwapPair(Contract);

impl SwapPair {
    pub fn new(neo: &Neo, hash: ScriptHash) -> Self {
        Self(neo.contract(hash))
    }

    pub async fn token0(&self) -> Result<ScriptHash, Error> {
        self.0
            .read("getToken0", vec![], StackItem::as_script_hash)
            .await
    }

    pub async fn token1(&self) -> Result<ScriptHash, Error> {
        self.0
            .read("getToken1", vec![], StackItem::as_script_hash)
            .await
    }

    /// Decimals of the first token of the pair.
    pub async fn decimals0(&self) -> Result<u32, Error> {
        Token::new(self.0.neo(), self.token0().await?)
            .decimals()
            .await
    }

    /// Decimals of the second token of the pair.
    pub async fn decimals1(&self) -> Result<u32, Error> {
        Token::new(self.0.neo(), self.token1().await?)
            .decimals()
            .await
    }

    pub async fn reserves(&self) -> Result<Vec<BigInt>, Error> {
        self.0
            .read("getReserves", vec![], |item| {
                item.map_array(StackItem::as_integer)
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        base64::prelude::*,
        neo_rpc::{InvokeResult, MockNodeRpc, VmState},
        serde_json::json,
        std::sync::Arc,
    };

    fn halt(stack: serde_json::Value) -> InvokeResult {
        InvokeResult {
            script: String::new(),
            state: VmState::Halt,
            gas_consumed: "0".to_owned(),
            exception: None,
            stack: serde_json::from_value(stack).unwrap(),
        }
    }

    #[tokio::test]
    async fn decimals_are_read_from_the_token() {
        let pair: ScriptHash = "4d5a85b0c83777df72cfb665a933970e4e20c0ec".parse().unwrap();
        let token: ScriptHash = "48c40d4666f93408be1bef038b6722404d9a4c2a".parse().unwrap();
        let wire = BASE64_STANDARD.encode(token.as_le_bytes());

        let mut rpc = MockNodeRpc::new();
        rpc.expect_invoke_function()
            .withf(move |contract, operation, _| *contract == pair && operation == "getToken0")
            .times(1)
            .returning(move |_, _, _| Ok(halt(json!([{"type": "ByteString", "value": wire}]))));
        rpc.expect_invoke_function()
            .withf(move |contract, operation, _| *contract == token && operation == "decimals")
            .times(1)
            .returning(|_, _, _| Ok(halt(json!([{"type": "Integer", "value": "8"}]))));

        let pair = SwapPair::new(&Neo::new(Arc::new(rpc)), pair);
        assert_eq!(pair.decimals0().await.unwrap(), 8);
    }

    #[tokio::test]
    async fn reserves() {
        let mut rpc = MockNodeRpc::new();
        rpc.expect_invoke_function().returning(|_, _, _| {
            Ok(halt(json!([{"type": "Array", "value": [
                {"type": "Integer", "value": "1500000000"},
                {"type": "Integer", "value": "27000000000000000000"},
            ]}])))
        });
        let pair = SwapPair::new(&Neo::new(Arc::new(rpc)), ScriptHash::POLICY_CONTRACT);
        assert_eq!(
            pair.reserves().await.unwrap(),
            vec![
                BigInt::from(1_500_000_000_u64),
                "27000000000000000000".parse::<BigInt>().unwrap(),
            ]
        );
    }
}
