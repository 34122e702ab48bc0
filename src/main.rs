use anyhow::{bail, Context, Result};
use boards_client::cli::{
    format_balances, format_hash, split_render_path, AccountCmd, Cli, CliObserver, Commands,
    ConfigAction, GlobalOpts, LogFormat, RenderCmd,
};
use boards_client::{BoardAction, ChainClient, Client, NodeConfig, Submitter};
use boards_log::{debug, init_tracing, init_tracing_with_level};
use boards_types::Config;
use clap::Parser;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.global_opts.log_format {
        LogFormat::Text => init_tracing_with_level(&cli.global_opts.log_level),
        LogFormat::Json => init_tracing(),
    }
    .map_err(|e| anyhow::anyhow!(e))?;

    let opts = &cli.global_opts;
    match &cli.command {
        Commands::Render(cmd) => render_command(opts, cmd).await,
        Commands::Post(cmd) => submit_command(opts, cmd.action(), cmd.view.as_deref()).await,
        Commands::Reply(cmd) => submit_command(opts, cmd.action(), cmd.view.as_deref()).await,
        Commands::Account(cmd) => account_command(opts, cmd).await,
        Commands::Balance(cmd) => balance_command(opts, cmd).await,
        Commands::Config(cmd) => config_command(opts, &cmd.action),
        Commands::Version => version_command(),
    }
}

fn connect(config: &Config) -> Result<Arc<dyn ChainClient>> {
    let node = NodeConfig::from_config(config)
        .with_context(|| format!("invalid node url '{}'", config.client.node_url))?;
    debug!(node = %node.node_url, "connecting");
    Ok(Arc::new(Client::new(node)?))
}

async fn render_command(opts: &GlobalOpts, cmd: &RenderCmd) -> Result<()> {
    let config = opts.load_config()?;
    let chain = connect(&config)?;

    let (pkg_path, path) = split_render_path(&cmd.path, &config.realm.boards_path);
    let content = chain.render(&pkg_path, &path).await?;
    println!("{content}");
    Ok(())
}

async fn submit_command(opts: &GlobalOpts, action: BoardAction, view: Option<&str>) -> Result<()> {
    let config = opts.load_config()?;
    let signer = opts.require_signer()?;
    let caller = signer.address().to_string();

    let chain = connect(&config)?;
    let observer = CliObserver::new(chain.clone(), &config, view);
    let submitter = Submitter::new(&config, chain)?
        .with_signer(Arc::new(signer))
        .with_observer(Arc::new(observer));

    let outcome = submitter.submit(Some(&caller), &action).await?;
    println!("committed {}", format_hash(&outcome.hash));
    println!("hash: {}", outcome.hash);
    if let Some(height) = outcome.height {
        println!("height: {height}");
    }
    Ok(())
}

async fn account_command(opts: &GlobalOpts, cmd: &AccountCmd) -> Result<()> {
    let config = opts.load_config()?;
    let chain = connect(&config)?;

    let account = chain.get_account(&cmd.address.to_string()).await?;
    println!("{}", serde_json::to_string_pretty(&account)?);
    Ok(())
}

async fn balance_command(opts: &GlobalOpts, cmd: &AccountCmd) -> Result<()> {
    let config = opts.load_config()?;
    let chain = connect(&config)?;

    let coins = chain.query_balances(&cmd.address.to_string()).await?;
    if coins.is_empty() {
        println!("no balances");
    }
    for line in format_balances(&config.tokens, &coins) {
        println!("{line}");
    }
    Ok(())
}

fn config_command(opts: &GlobalOpts, action: &ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let config = opts.load_config()?;
            print!("{}", toml::to_string_pretty(&config)?);
        }
        ConfigAction::Init { overwrite } => {
            let path = opts.home_dir()?.join("config.toml");
            if path.exists() && !overwrite {
                bail!(
                    "{} already exists, pass --overwrite to replace it",
                    path.display()
                );
            }

            let mut config = Config::default();
            if let Some(node) = &opts.node {
                config.client.node_url = node.clone();
            }
            if let Some(chain_id) = &opts.chain_id {
                config.chain.id = chain_id.clone();
            }
            config.validate()?;
            config.save_to(&path)?;
            println!("wrote {}", path.display());
        }
    }
    Ok(())
}

fn version_command() -> Result<()> {
    println!("boards {}", env!("CARGO_PKG_VERSION"));
    println!("build: {}", env!("CARGO_PKG_NAME"));
    Ok(())
}
