use {
    crate::Error,
    reqwest::{Client, header},
    serde::{Deserialize, Serialize, de::DeserializeOwned},
    std::{
        fmt::{Debug, Formatter},
        sync::{
            Arc,
            atomic::{AtomicUsize, Ordering},
        },
    },
    url::Url,
};

/// JSON-RPC 2.0 over HTTP POST.
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
    inner: Arc<Inner>,
}

struct Inner {
    url: Url,
    id: AtomicUsize,
    /// Name of the transport used in logs to distinguish different transports.
    name: String,
}

#[derive(Serialize)]
struct Request<'a, P> {
    jsonrpc: &'static str,
    id: usize,
    method: &'a str,
    params: P,
}

#[derive(Deserialize)]
struct Response<R> {
    result: Option<R>,
    error: Option<ErrorObject>,
}

#[derive(Deserialize)]
struct ErrorObject {
    code: i64,
    message: String,
}

impl HttpTransport {
    pub fn new(client: Client, url: Url, name: String) -> Self {
        Self {
            client,
            inner: Arc::new(Inner {
                url,
                id: AtomicUsize::new(0),
                name,
            }),
        }
    }

    fn next_id(&self) -> usize {
        self.inner.id.fetch_add(1, Ordering::SeqCst)
    }

    /// Calls `method` and decodes its `result`.
    pub async fn execute<P, R>(&self, method: &str, params: P) -> Result<R, Error>
    where
        P: Serialize,
        R: DeserializeOwned,
    {
        let inner = &self.inner;
        let id = self.next_id();
        let body = request_body(id, method, params)?;
        tracing::trace!(name = %inner.name, %id, %body, "executing request");
        let response = self
            .client
            .post(inner.url.clone())
            .header(header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(|err| {
                tracing::warn!(name = %inner.name, %id, %err, "failed to send request");
                Error::Transport(err)
            })?;
        let status = response.status();
        let text = response.text().await.map_err(|err| {
            tracing::warn!(name = %inner.name, %id, %err, "failed to get response body");
            Error::Transport(err)
        })?;
        // Log the raw text before decoding to get more information on responses that
        // aren't valid json.
        tracing::trace!(name = %inner.name, %id, body = %text.trim(), "received response");
        if !status.is_success() {
            return Err(Error::Http(status));
        }
        decode_response(&text)
    }
}

fn request_body<P: Serialize>(id: usize, method: &str, params: P) -> Result<String, Error> {
    Ok(serde_json::to_string(&Request {
        jsonrpc: "2.0",
        id,
        method,
        params,
    })?)
}

fn decode_response<R: DeserializeOwned>(text: &str) -> Result<R, Error> {
    let response: Response<R> = serde_json::from_str(text)?;
    match (response.result, response.error) {
        (_, Some(error)) => Err(Error::Rpc {
            code: error.code,
            message: error.message,
        }),
        (Some(result), None) => Ok(result),
        (None, None) => Err(Error::EmptyResponse),
    }
}

impl Debug for HttpTransport {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport")
            .field("url", &self.inner.url)
            .finish()
    }
}
