use {
    crate::{
        infra::{
            Config,
            Confirmation,
            Neo,
            PriceOracle,
            Submitter,
            blockchain::NodeFeeEstimator,
            cli::{self, Command},
        },
        init::Initializer,
        position::{Action, Position},
    },
    anyhow::{Context, Result},
    clap::Parser,
    neo_rpc::RpcClient,
    std::sync::Arc,
};

pub async fn main() {
    if let Err(err) = run(std::env::args()).await {
        tracing::error!(?err, "vault administration failed");
        std::process::exit(1);
    }
}

/// Configures the contracts of the selected environment, or changes the
/// owner's vault position when a position command is given. Separate from
/// [`main`] so that it can be driven with explicit arguments.
pub async fn run(args: impl Iterator<Item = String>) -> Result<()> {
    let args = cli::Args::parse_from(args);
    let mut obs_config = observe::Config::default().with_env_filter(&args.log_filter);
    if let Some(level) = args.log_stderr_threshold.into_level() {
        obs_config = obs_config.with_stderr_threshold(level);
    }
    if args.use_json_logs {
        obs_config = obs_config.with_json_format();
    }
    observe::tracing::initialize(&obs_config);

    let config = Config::load(&args).await.context("loading configuration")?;
    tracing::info!("running vault administration with validated configuration:\n{config}");

    let client = reqwest::Client::builder()
        .timeout(config.http_timeout)
        .build()
        .context("building HTTP client")?;
    let rpc: Arc<dyn neo_rpc::NodeRpc> =
        Arc::new(RpcClient::new(client.clone(), config.rpc_node_url.clone()));
    let neo = Neo::new(rpc.clone());
    let submitter = Submitter::new(
        rpc.clone(),
        Arc::new(NodeFeeEstimator::new(neo.clone())),
        config.owner.clone(),
        config.network_magic,
        config.dry_run,
    );
    let confirmation = Confirmation::new(rpc, config.confirmation);

    let (action, position) = match args.command.unwrap_or(Command::Init) {
        Command::Init => {
            return Initializer::new(
                &neo,
                submitter,
                confirmation,
                config.contracts,
                config.feed_signer,
            )
            .run()
            .await;
        }
        Command::Deposit(position) => (Action::Deposit, position),
        Command::Withdraw(position) => (Action::Withdraw, position),
        Command::Mint(position) => (Action::Mint, position),
        Command::Repay(position) => (Action::Repay, position),
    };
    let oracle = PriceOracle::new(client, config.price_oracle_url.clone());
    Position::new(&neo, submitter, confirmation, oracle, &config.contracts)
        .run(
            action,
            config.contracts.collateral(position.collateral),
            position.amount,
        )
        .await
}
