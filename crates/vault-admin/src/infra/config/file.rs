use {
    super::Error,
    serde::Deserialize,
    std::path::Path,
    tokio::fs,
};

/// Contents of an environment file such as `config/test.json`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Config {
    pub private_key: Option<String>,
    pub rpc_node_url: Option<String>,
    pub network_magic: Option<u32>,
    pub flund_script_hash: Option<String>,
    pub fusd_script_hash: Option<String>,
    pub vault_script_hash: Option<String>,
    pub price_feed_script_hash: Option<String>,
    pub bneo_script_hash: Option<String>,
    pub btc_script_hash: Option<String>,
    pub flm_script_hash: Option<String>,
    pub fusdt_script_hash: Option<String>,
    pub swap_factory_script_hash: Option<String>,
    pub feed_signer: Option<String>,
    pub dry_run: Option<bool>,
    pub price_oracle_url: Option<String>,
}

/// Reads the environment file. A missing file is an error.
pub async fn load(path: &Path) -> Result<Config, Error> {
    let data = fs::read_to_string(path).await.map_err(|source| Error::Io {
        path: path.to_owned(),
        source,
    })?;
    // Not printing the offending content because it could leak the private key.
    serde_json::from_str(&data).map_err(|source| Error::Syntax {
        path: path.to_owned(),
        source,
    })
}
