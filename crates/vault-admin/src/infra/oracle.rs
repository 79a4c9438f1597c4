//! Client for the off-chain service that signs token prices. The vault only
//! mints and releases collateral against a recently signed price.

use {
    reqwest::{Client, StatusCode},
    serde::Deserialize,
    serde_json::Value,
    thiserror::Error,
    url::Url,
};

#[derive(Debug, Error)]
pub enum Error {
    #[error("price oracle unavailable: {0}")]
    Request(#[source] reqwest::Error),
    #[error("price oracle returned HTTP {0}")]
    Http(StatusCode),
    #[error("invalid price oracle response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// A price payload together with the signature the vault verifies it with.
/// Both are passed to the contract verbatim.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignedPrice {
    pub payload: String,
    pub signature: String,
}

#[derive(Deserialize)]
struct Response {
    payload: Value,
    signature: String,
}

#[derive(Clone, Debug)]
pub struct PriceOracle {
    client: Client,
    url: Url,
}

impl PriceOracle {
    pub fn new(client: Client, url: Url) -> Self {
        Self { client, url }
    }

    pub async fn signed_price(&self) -> Result<SignedPrice, Error> {
        let response = self
            .client
            .get(self.url.clone())
            .send()
            .await
            .map_err(Error::Request)?;
        let status = response.status();
        let text = response.text().await.map_err(Error::Request)?;
        tracing::trace!(%status, body = %text, "price oracle response");
        if !status.is_success() {
            return Err(Error::Http(status));
        }
        decode(&text)
    }
}

/// The payload is usually a JSON document serialized into a string; if the
/// service returns it as an object it is serialized compactly instead.
fn decode(text: &str) -> Result<SignedPrice, Error> {
    let Response { payload, signature } = serde_json::from_str(text)?;
    let payload = match payload {
        Value::String(payload) => payload,
        other => serde_json::to_string(&other)?,
    };
    Ok(SignedPrice { payload, signature })
}

#[cfg(test)]
pub(crate) mod tests {
    use {super::*, serde_json::json};

    /// Serves `body` with `status` on a local port and returns its URL.
    pub async fn serve(status: StatusCode, body: String) -> Url {
        let app = axum::Router::new().route(
            "/token-info/test-signed-prices",
            axum::routing::get(move || async move { (status, body) }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
        format!("http://{addr}/token-info/test-signed-prices?fusd=1&bneo=14")
            .parse()
            .unwrap()
    }

    #[tokio::test]
    async fn fetches_signed_price() {
        let url = serve(
            StatusCode::OK,
            json!({"payload": "{\"bneo\":14}", "signature": "ef56"}).to_string(),
        )
        .await;
        let price = PriceOracle::new(Client::new(), url)
            .signed_price()
            .await
            .unwrap();
        assert_eq!(
            price,
            SignedPrice {
                payload: r#"{"bneo":14}"#.to_owned(),
                signature: "ef56".to_owned(),
            }
        );
    }

    #[tokio::test]
    async fn http_errors_are_reported() {
        let url = serve(StatusCode::BAD_GATEWAY, "bad gateway".to_owned()).await;
        let result = PriceOracle::new(Client::new(), url).signed_price().await;
        assert!(matches!(result, Err(Error::Http(StatusCode::BAD_GATEWAY))));
    }

    #[test]
    fn string_payload_is_kept_verbatim() {
        let price = decode(
            r#"{"payload": "{\"fusd\": 100000000000000000000, \"timestamp\": 1}", "signature": "ab12"}"#,
        )
        .unwrap();
        assert_eq!(
            price,
            SignedPrice {
                payload: r#"{"fusd": 100000000000000000000, "timestamp": 1}"#.to_owned(),
                signature: "ab12".to_owned(),
            }
        );
    }

    #[test]
    fn object_payload_is_serialized() {
        let price = decode(r#"{"payload": {"bneo": "1400"}, "signature": "cd34"}"#).unwrap();
        assert_eq!(price.payload, r#"{"bneo":"1400"}"#);
        assert_eq!(price.signature, "cd34");
    }

    #[test]
    fn missing_signature() {
        assert!(matches!(
            decode(r#"{"payload": "x"}"#),
            Err(Error::Decode(_))
        ));
    }
}
