use {
    num::BigInt,
    std::{path::PathBuf, time::Duration},
    tracing::level_filters::LevelFilter,
    url::Url,
};

/// Every setting that can also be provided by the environment file is
/// optional here; a value given on the command line or through the
/// environment takes precedence over the file.
#[derive(Debug, clap::Parser)]
pub struct Args {
    #[clap(long, env, default_value = "warn,vault_admin=debug,neo_rpc=debug")]
    pub log_filter: String,

    /// At which log level logs should be printed to stderr instead of stdout.
    #[clap(long, env, default_value = "error")]
    pub log_stderr_threshold: LevelFilter,

    /// Whether to use JSON format for the logs.
    #[clap(long, env, default_value = "false")]
    pub use_json_logs: bool,

    /// Selects the configuration file `config/<env>.json`.
    #[clap(long = "env", env = "NODE_ENV", value_enum, default_value = "test")]
    pub environment: Environment,

    /// Explicit path of the configuration file, overriding `--env`.
    #[clap(long, env)]
    pub config_file: Option<PathBuf>,

    /// Private key of the contract owner, as WIF or 64 hex characters.
    #[clap(long, env)]
    pub private_key: Option<String>,

    /// JSON-RPC endpoint of the Neo node.
    #[clap(long, env)]
    pub rpc_node_url: Option<String>,

    /// Magic number of the network the transactions are signed for.
    #[clap(long, env)]
    pub network_magic: Option<u32>,

    #[clap(long, env)]
    pub flund_script_hash: Option<String>,

    #[clap(long, env)]
    pub fusd_script_hash: Option<String>,

    #[clap(long, env)]
    pub vault_script_hash: Option<String>,

    #[clap(long, env)]
    pub price_feed_script_hash: Option<String>,

    #[clap(long, env)]
    pub bneo_script_hash: Option<String>,

    #[clap(long, env)]
    pub btc_script_hash: Option<String>,

    #[clap(long, env)]
    pub flm_script_hash: Option<String>,

    #[clap(long, env)]
    pub fusdt_script_hash: Option<String>,

    #[clap(long, env)]
    pub swap_factory_script_hash: Option<String>,

    /// Compressed public key of the price signer registered on the vault.
    #[clap(long, env)]
    pub feed_signer: Option<String>,

    /// Estimate fees for every transaction without broadcasting any of them.
    #[clap(long, env)]
    pub dry_run: Option<bool>,

    /// Endpoint serving signed price payloads for mint and withdraw
    /// transactions.
    #[clap(long, env)]
    pub price_oracle_url: Option<Url>,

    /// Timeout for every HTTP request to the node and the price oracle.
    #[clap(
        long,
        env,
        default_value = "30s",
        value_parser = humantime::parse_duration,
    )]
    pub http_timeout: Duration,

    /// How long to wait for submitted transactions to be included.
    #[clap(
        long,
        env,
        default_value = "2m",
        value_parser = humantime::parse_duration,
    )]
    pub confirmation_timeout: Duration,

    /// How often to poll the node for submitted transactions.
    #[clap(
        long,
        env,
        default_value = "5s",
        value_parser = humantime::parse_duration,
    )]
    pub confirmation_poll_interval: Duration,

    /// What to do; configures the contracts when omitted.
    #[clap(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, clap::Subcommand)]
pub enum Command {
    /// Configures freshly deployed contracts.
    Init,
    /// Locks collateral in the owner's vault.
    Deposit(PositionArgs),
    /// Releases collateral against a signed price.
    Withdraw(PositionArgs),
    /// Mints FUSD against a signed price.
    Mint(PositionArgs),
    /// Returns minted FUSD to the vault.
    Repay(PositionArgs),
}

#[derive(Debug, clap::Args)]
pub struct PositionArgs {
    #[clap(long, value_enum)]
    pub collateral: Collateral,

    /// Amount in base units of the transferred token.
    #[clap(long)]
    pub amount: BigInt,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum Collateral {
    Bneo,
    Btc,
    Flund,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum Environment {
    Prod,
    Test,
}

impl Environment {
    pub fn config_file(self) -> PathBuf {
        let name = match self {
            Self::Prod => "prod",
            Self::Test => "test",
        };
        PathBuf::from(format!("config/{name}.json"))
    }
}

impl Args {
    pub fn config_file(&self) -> PathBuf {
        self.config_file
            .clone()
            .unwrap_or_else(|| self.environment.config_file())
    }
}
