//! The validated process configuration.
//!
//! Values are merged from three sources: the command line (or environment
//! variables), the environment file and built-in defaults, in that order of
//! precedence. The result is validated once and never changes afterwards.

use {
    crate::infra::cli::{Args, Collateral, Environment},
    neo_model::{Account, PublicKey, ScriptHash},
    std::{
        fmt::{self, Display, Formatter},
        path::PathBuf,
        sync::Arc,
        time::Duration,
    },
    thiserror::Error,
    url::Url,
};

pub mod file;

const DEFAULT_NETWORK_MAGIC: u32 = 0;
const DEFAULT_DRY_RUN: bool = true;
const DEFAULT_PRICE_ORACLE_URL: &str = "https://api.flamingo.finance/token-info/test-signed-prices?fusd=100000000000000000000&bneo=1400000000000000000000";

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to read config file {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config file {path:?}: {source}")]
    Syntax {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("invalid value for {key}: {reason}")]
    Validation { key: &'static str, reason: String },
}

impl Error {
    fn validation(key: &'static str, reason: impl ToString) -> Self {
        Self::Validation {
            key,
            reason: reason.to_string(),
        }
    }
}

/// Script hashes of every contract the client talks to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Contracts {
    pub flund: ScriptHash,
    pub fusd: ScriptHash,
    pub vault: ScriptHash,
    pub price_feed: ScriptHash,
    pub bneo: ScriptHash,
    pub btc: ScriptHash,
    pub flm: ScriptHash,
    pub fusdt: ScriptHash,
    pub swap_factory: ScriptHash,
}

impl Contracts {
    pub fn collateral(&self, collateral: Collateral) -> ScriptHash {
        match collateral {
            Collateral::Bneo => self.bneo,
            Collateral::Btc => self.btc,
            Collateral::Flund => self.flund,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ConfirmationConfig {
    pub timeout: Duration,
    pub poll_interval: Duration,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub environment: Environment,
    pub owner: Arc<Account>,
    pub rpc_node_url: Url,
    pub network_magic: u32,
    pub contracts: Contracts,
    pub feed_signer: PublicKey,
    pub dry_run: bool,
    pub price_oracle_url: Url,
    pub http_timeout: Duration,
    pub confirmation: ConfirmationConfig,
}

impl Config {
    /// Reads the environment file selected by the arguments and merges it
    /// with them.
    pub async fn load(args: &Args) -> Result<Self, Error> {
        let file = file::load(&args.config_file()).await?;
        Self::merge(args, file)
    }

    pub fn merge(args: &Args, file: file::Config) -> Result<Self, Error> {
        let private_key = required(
            "privateKey",
            args.private_key.clone().or(file.private_key),
        )?;
        let owner = private_key
            .parse::<Account>()
            .map_err(|err| Error::validation("privateKey", err))?;

        let rpc_node_url = required(
            "rpcNodeUrl",
            args.rpc_node_url.clone().or(file.rpc_node_url),
        )?;
        let rpc_node_url = rpc_node_url
            .parse::<Url>()
            .map_err(|err| Error::validation("rpcNodeUrl", err))?;

        let feed_signer = required(
            "feedSigner",
            args.feed_signer.clone().or(file.feed_signer),
        )?;
        let feed_signer = feed_signer
            .parse::<PublicKey>()
            .map_err(|err| Error::validation("feedSigner", err))?;

        let price_oracle_url = match (&args.price_oracle_url, file.price_oracle_url) {
            (Some(url), _) => url.clone(),
            (None, Some(url)) => url
                .parse()
                .map_err(|err| Error::validation("priceOracleUrl", err))?,
            (None, None) => DEFAULT_PRICE_ORACLE_URL
                .parse()
                .map_err(|err| Error::validation("priceOracleUrl", err))?,
        };

        let contracts = Contracts {
            flund: script_hash(
                "flundScriptHash",
                args.flund_script_hash.clone().or(file.flund_script_hash),
            )?,
            fusd: script_hash(
                "fusdScriptHash",
                args.fusd_script_hash.clone().or(file.fusd_script_hash),
            )?,
            vault: script_hash(
                "vaultScriptHash",
                args.vault_script_hash.clone().or(file.vault_script_hash),
            )?,
            price_feed: script_hash(
                "priceFeedScriptHash",
                args.price_feed_script_hash
                    .clone()
                    .or(file.price_feed_script_hash),
            )?,
            bneo: script_hash(
                "bneoScriptHash",
                args.bneo_script_hash.clone().or(file.bneo_script_hash),
            )?,
            btc: script_hash(
                "btcScriptHash",
                args.btc_script_hash.clone().or(file.btc_script_hash),
            )?,
            flm: script_hash(
                "flmScriptHash",
                args.flm_script_hash.clone().or(file.flm_script_hash),
            )?,
            fusdt: script_hash(
                "fusdtScriptHash",
                args.fusdt_script_hash.clone().or(file.fusdt_script_hash),
            )?,
            swap_factory: script_hash(
                "swapFactoryScriptHash",
                args.swap_factory_script_hash
                    .clone()
                    .or(file.swap_factory_script_hash),
            )?,
        };

        Ok(Self {
            environment: args.environment,
            owner: Arc::new(owner),
            rpc_node_url,
            network_magic: args
                .network_magic
                .or(file.network_magic)
                .unwrap_or(DEFAULT_NETWORK_MAGIC),
            contracts,
            feed_signer,
            dry_run: args.dry_run.or(file.dry_run).unwrap_or(DEFAULT_DRY_RUN),
            price_oracle_url,
            http_timeout: args.http_timeout,
            confirmation: ConfirmationConfig {
                timeout: args.confirmation_timeout,
                poll_interval: args.confirmation_poll_interval,
            },
        })
    }
}

fn required(key: &'static str, value: Option<String>) -> Result<String, Error> {
    value
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| Error::validation(key, "missing"))
}

/// Contract hashes must be given as 40 hex characters, addresses are not
/// accepted here.
fn script_hash(key: &'static str, value: Option<String>) -> Result<ScriptHash, Error> {
    let value = required(key, value)?;
    let value = value.trim();
    let digits = value.strip_prefix("0x").unwrap_or(value);
    if digits.len() != 40 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(Error::validation(key, "expected 40 hex characters"));
    }
    digits
        .parse()
        .map_err(|err| Error::validation(key, err))
}

impl Display for Config {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let Self {
            environment,
            owner,
            rpc_node_url,
            network_magic,
            contracts,
            feed_signer,
            dry_run,
            price_oracle_url,
            http_timeout,
            confirmation,
        } = self;

        writeln!(f, "env: {environment:?}")?;
        writeln!(f, "private_key: SECRET")?;
        writeln!(f, "owner: {}", owner.address())?;
        writeln!(f, "rpc_node_url: {rpc_node_url}")?;
        writeln!(f, "network_magic: {network_magic}")?;
        writeln!(f, "flund_script_hash: {}", contracts.flund)?;
        writeln!(f, "fusd_script_hash: {}", contracts.fusd)?;
        writeln!(f, "vault_script_hash: {}", contracts.vault)?;
        writeln!(f, "price_feed_script_hash: {}", contracts.price_feed)?;
        writeln!(f, "bneo_script_hash: {}", contracts.bneo)?;
        writeln!(f, "btc_script_hash: {}", contracts.btc)?;
        writeln!(f, "flm_script_hash: {}", contracts.flm)?;
        writeln!(f, "fusdt_script_hash: {}", contracts.fusdt)?;
        writeln!(f, "swap_factory_script_hash: {}", contracts.swap_factory)?;
        writeln!(f, "feed_signer: {feed_signer}")?;
        writeln!(f, "dry_run: {dry_run}")?;
        writeln!(f, "price_oracle_url: {price_oracle_url}")?;
        writeln!(f, "http_timeout: {http_timeout:?}")?;
        writeln!(f, "confirmation_timeout: {:?}", confirmation.timeout)?;
        writeln!(
            f,
            "confirmation_poll_interval: {:?}",
            confirmation.poll_interval
        )?;
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use {super::*, crate::infra::cli};

    pub const PRIVATE_KEY: &str =
        "0101010101010101010101010101010101010101010101010101010101010101";
    pub const FEED_SIGNER: &str =
        "03b209fd4f53a7170ea4444e0cb0a6bb6a53c2bd016926989cf85f9b0fba17a70c";

    fn hash(byte: u8) -> String {
        format!("{byte:02x}").repeat(20)
    }

    pub fn file() -> file::Config {
        file::Config {
            private_key: Some(PRIVATE_KEY.to_owned()),
            rpc_node_url: Some("https://testnet1.neo.coz.io:443".to_owned()),
            network_magic: Some(894_710_606),
            flund_script_hash: Some(hash(1)),
            fusd_script_hash: Some(hash(2)),
            vault_script_hash: Some(format!("0x{}", hash(3))),
            price_feed_script_hash: Some(hash(4)),
            bneo_script_hash: Some(hash(5)),
            btc_script_hash: Some(hash(6)),
            flm_script_hash: Some(hash(7)),
            fusdt_script_hash: Some(hash(8)),
            swap_factory_script_hash: Some(hash(9)),
            feed_signer: Some(FEED_SIGNER.to_owned()),
            dry_run: None,
            price_oracle_url: None,
        }
    }

    fn args(extra: &[&str]) -> Args {
        cli::tests::parse(extra)
    }

    #[test]
    fn file_values_and_defaults() {
        let config = Config::merge(&args(&[]), file()).unwrap();
        assert!(config.dry_run);
        assert_eq!(config.network_magic, 894_710_606);
        assert_eq!(config.contracts.vault.to_string(), hash(3));
        assert_eq!(config.contracts.swap_factory.to_string(), hash(9));
        assert_eq!(config.price_oracle_url.as_str(), DEFAULT_PRICE_ORACLE_URL);
    }

    #[test]
    fn command_line_overrides_file() {
        let config = Config::merge(
            &args(&[
                "--dry-run",
                "false",
                "--network-magic",
                "860833102",
                "--vault-script-hash",
                &hash(10),
            ]),
            file(),
        )
        .unwrap();
        assert!(!config.dry_run);
        assert_eq!(config.network_magic, 860_833_102);
        assert_eq!(config.contracts.vault.to_string(), hash(10));
    }

    #[test]
    fn network_magic_defaults_to_zero() {
        let config = Config::merge(
            &args(&[]),
            file::Config {
                network_magic: None,
                ..file()
            },
        )
        .unwrap();
        assert_eq!(config.network_magic, 0);
    }

    #[test]
    fn validation_names_the_key() {
        let cases = [
            (
                file::Config {
                    private_key: None,
                    ..file()
                },
                "privateKey",
            ),
            (
                file::Config {
                    private_key: Some("not a key".to_owned()),
                    ..file()
                },
                "privateKey",
            ),
            (
                file::Config {
                    rpc_node_url: Some("not a url".to_owned()),
                    ..file()
                },
                "rpcNodeUrl",
            ),
            (
                file::Config {
                    bneo_script_hash: Some("abcd".to_owned()),
                    ..file()
                },
                "bneoScriptHash",
            ),
            (
                file::Config {
                    fusdt_script_hash: Some(String::new()),
                    ..file()
                },
                "fusdtScriptHash",
            ),
            (
                file::Config {
                    feed_signer: Some(hash(1)),
                    ..file()
                },
                "feedSigner",
            ),
            (
                file::Config {
                    vault_script_hash: Some(format!("0x0x{}", hash(3))),
                    ..file()
                },
                "vaultScriptHash",
            ),
        ];
        for (file, expected) in cases {
            match Config::merge(&args(&[]), file) {
                Err(Error::Validation { key, .. }) => assert_eq!(key, expected),
                other => panic!("expected a validation error for {expected}, got {other:?}"),
            }
        }
    }

    #[test]
    fn feed_signer_must_be_compressed() {
        let compact = format!("05{}", &FEED_SIGNER[2..]);
        let uncompressed = format!("04{}", "00".repeat(64));
        for signer in [compact, uncompressed] {
            let result = Config::merge(
                &args(&[]),
                file::Config {
                    feed_signer: Some(signer.clone()),
                    ..file()
                },
            );
            assert!(
                matches!(result, Err(Error::Validation { key: "feedSigner", .. })),
                "{signer} was accepted"
            );
        }

        let config = Config::merge(&args(&[]), file()).unwrap();
        assert_eq!(config.feed_signer.to_string(), FEED_SIGNER);
    }

    #[test]
    fn display_hides_private_key() {
        let config = Config::merge(&args(&[]), file()).unwrap();
        let text = config.to_string();
        assert!(text.contains("private_key: SECRET"));
        assert!(!text.contains(PRIVATE_KEY));
    }
}
