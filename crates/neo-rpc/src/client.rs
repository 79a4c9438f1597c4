use {
    crate::{
        Error,
        NodeRpc,
        dto::{InvokeResult, SentTransaction, SignerDto},
        http::HttpTransport,
    },
    base64::{Engine, prelude::BASE64_STANDARD},
    neo_model::{ContractParam, ScriptHash, Signer, TxHash},
    reqwest::Client,
    serde_json::json,
    url::Url,
};

/// Error codes of `gettransactionheight` for transactions that are not in a
/// block yet: -100 on nodes before 3.6, -103 since.
const UNKNOWN_TRANSACTION: [i64; 2] = [-100, -103];

#[derive(Clone, Debug)]
pub struct RpcClient {
    transport: HttpTransport,
}

impl RpcClient {
    pub fn new(client: Client, url: Url) -> Self {
        Self {
            transport: HttpTransport::new(client, url, "node".to_owned()),
        }
    }
}

#[async_trait::async_trait]
impl NodeRpc for RpcClient {
    async fn invoke_function(
        &self,
        contract: ScriptHash,
        operation: &str,
        params: &[ContractParam],
    ) -> Result<InvokeResult, Error> {
        self.transport
            .execute(
                "invokefunction",
                json!([contract.to_prefixed_string(), operation, params]),
            )
            .await
    }

    async fn invoke_script(
        &self,
        script: &[u8],
        signers: &[Signer],
    ) -> Result<InvokeResult, Error> {
        let signers: Vec<SignerDto> = signers.iter().map(SignerDto::from).collect();
        self.transport
            .execute(
                "invokescript",
                json!([BASE64_STANDARD.encode(script), signers]),
            )
            .await
    }

    async fn block_count(&self) -> Result<u32, Error> {
        self.transport.execute("getblockcount", json!([])).await
    }

    async fn send_raw_transaction(&self, transaction: &[u8]) -> Result<TxHash, Error> {
        let sent: SentTransaction = self
            .transport
            .execute(
                "sendrawtransaction",
                json!([BASE64_STANDARD.encode(transaction)]),
            )
            .await?;
        Ok(sent.hash)
    }

    async fn transaction_height(&self, hash: TxHash) -> Result<Option<u32>, Error> {
        match self
            .transport
            .execute("gettransactionheight", json!([hash.to_string()]))
            .await
        {
            Ok(height) => Ok(Some(height)),
            Err(Error::Rpc { code, message }) if UNKNOWN_TRANSACTION.contains(&code) => {
                tracing::trace!(%hash, code, %message, "transaction not yet included");
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use {super::*, serde_json::Value};

    /// A node answering every request with `response`.
    async fn node(response: Value) -> RpcClient {
        let app = axum::Router::new().route(
            "/",
            axum::routing::post(move || async move { axum::Json(response) }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
        RpcClient::new(Client::new(), format!("http://{addr}/").parse().unwrap())
    }

    fn transaction() -> TxHash {
        TxHash::of(&[0x00, 0x01, 0x02])
    }

    #[tokio::test]
    async fn included_transaction() {
        let client = node(json!({"jsonrpc": "2.0", "id": 0, "result": 1234})).await;
        assert_eq!(
            client.transaction_height(transaction()).await.unwrap(),
            Some(1234)
        );
    }

    #[tokio::test]
    async fn unknown_transaction_is_pending() {
        for code in UNKNOWN_TRANSACTION {
            let client = node(json!({
                "jsonrpc": "2.0",
                "id": 0,
                "error": {"code": code, "message": "Unknown transaction"}
            }))
            .await;
            assert_eq!(client.transaction_height(transaction()).await.unwrap(), None);
        }
    }

    #[tokio::test]
    async fn other_rpc_errors_are_propagated() {
        let client = node(json!({
            "jsonrpc": "2.0",
            "id": 0,
            "error": {"code": -32601, "message": "Method not found"}
        }))
        .await;
        assert!(matches!(
            client.transaction_height(transaction()).await,
            Err(Error::Rpc { code: -32601, .. })
        ));
    }
}
