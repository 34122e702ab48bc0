//! Command-line definitions for the `boards` binary

use crate::signer::{LocalSigner, SignerError};
use crate::submit::{BoardAction, SubmissionObserver};
use crate::ChainClient;
use async_trait::async_trait;
use boards_log::warn;
use boards_math::{elide_middle, format_address, Coin, DenomRegistry};
use boards_types::{Address, Config, ConfigError};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::sync::Arc;

/// Width used when showing transaction hashes
pub const HASH_DISPLAY_LEN: usize = 28;

/// Boards client CLI
#[derive(Parser, Debug)]
#[command(name = "boards")]
#[command(about = "Read and post to the boards realm of a Gno chain")]
#[command(version)]
pub struct Cli {
    #[command(flatten)]
    pub global_opts: GlobalOpts,

    #[command(subcommand)]
    pub command: Commands,
}

/// Global CLI options
#[derive(Args, Clone, Debug)]
pub struct GlobalOpts {
    /// Node RPC endpoint
    #[arg(long, global = true)]
    pub node: Option<String>,

    /// Chain ID
    #[arg(long, global = true)]
    pub chain_id: Option<String>,

    /// Home directory holding config.toml
    #[arg(long, global = true)]
    pub home: Option<PathBuf>,

    /// Log filter (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,

    /// Log output format; json output is filtered by RUST_LOG
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    /// Hex secp256k1 private key used to sign
    #[arg(long, global = true, env = "BOARDS_KEY_HEX", hide_env_values = true)]
    pub key_hex: Option<String>,
}

impl GlobalOpts {
    /// Home directory from the flag, or `~/.boards`
    pub fn home_dir(&self) -> Result<PathBuf, ConfigError> {
        match &self.home {
            Some(home) => Ok(home.clone()),
            None => Config::default_home(),
        }
    }

    /// Config from the home directory with `--node` and `--chain-id` applied
    pub fn load_config(&self) -> Result<Config, ConfigError> {
        let mut config = Config::load_from_home(&self.home_dir()?)?;
        if let Some(node) = &self.node {
            config.client.node_url = node.clone();
        }
        if let Some(chain_id) = &self.chain_id {
            config.chain.id = chain_id.clone();
        }
        config.validate()?;
        Ok(config)
    }

    /// Signer for the configured key, if one was given
    pub fn signer(&self) -> Result<Option<LocalSigner>, SignerError> {
        self.key_hex.as_deref().map(LocalSigner::from_hex).transpose()
    }

    /// Signer for the configured key, failing when none was given
    pub fn require_signer(&self) -> Result<LocalSigner, SignerError> {
        self.signer()?.ok_or_else(|| {
            SignerError::Unavailable(
                "no signing key: pass --key-hex or set BOARDS_KEY_HEX".to_string(),
            )
        })
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

/// CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the rendered content of a realm path
    Render(RenderCmd),

    /// Create a thread on a board
    Post(PostCmd),

    /// Reply to a post inside a thread
    Reply(ReplyCmd),

    /// Show account number and sequence
    Account(AccountCmd),

    /// Show balances
    Balance(AccountCmd),

    /// Configuration management
    Config(ConfigCmd),

    /// Print version information
    Version,
}

#[derive(Parser, Debug)]
pub struct RenderCmd {
    /// `<pkg_path>:<path>`, or a path inside the boards realm
    #[arg(default_value = "")]
    pub path: String,
}

#[derive(Parser, Debug)]
pub struct PostCmd {
    /// Board id
    #[arg(long)]
    pub bid: u64,

    #[arg(long)]
    pub title: String,

    #[arg(long)]
    pub body: String,

    /// Render this path after the post is committed
    #[arg(long)]
    pub view: Option<String>,
}

#[derive(Parser, Debug)]
pub struct ReplyCmd {
    /// Board id
    #[arg(long)]
    pub bid: u64,

    #[arg(long)]
    pub thread_id: u64,

    /// Post being replied to
    #[arg(long)]
    pub post_id: u64,

    #[arg(long)]
    pub message: String,

    /// Render this path after the reply is committed
    #[arg(long)]
    pub view: Option<String>,
}

#[derive(Parser, Debug)]
pub struct AccountCmd {
    pub address: Address,
}

#[derive(Parser, Debug)]
pub struct ConfigCmd {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the effective configuration
    Show,

    /// Write the default configuration to the home directory
    Init {
        /// Replace an existing file
        #[arg(long)]
        overwrite: bool,
    },
}

impl PostCmd {
    pub fn action(&self) -> BoardAction {
        BoardAction::CreatePost {
            bid: self.bid,
            title: self.title.clone(),
            body: self.body.clone(),
        }
    }
}

impl ReplyCmd {
    pub fn action(&self) -> BoardAction {
        BoardAction::CreateReply {
            bid: self.bid,
            thread_id: self.thread_id,
            post_id: self.post_id,
            body: self.message.clone(),
        }
    }
}

/// Split `gno.land/r/foo:some/path` into package and render path. Input
/// without a package prefix renders inside `default_pkg`.
pub fn split_render_path(input: &str, default_pkg: &str) -> (String, String) {
    match input.split_once(':') {
        Some((pkg, path)) if pkg.contains('/') => (pkg.to_string(), path.to_string()),
        _ => (default_pkg.to_string(), input.to_string()),
    }
}

/// Shorten a transaction hash for display
pub fn format_hash(hash: &str) -> String {
    elide_middle(hash, HASH_DISPLAY_LEN)
}

/// One display line per coin; unknown denoms are shown raw
pub fn format_balances(registry: &DenomRegistry, coins: &[Coin]) -> Vec<String> {
    coins
        .iter()
        .map(|coin| {
            registry
                .format_price(coin)
                .unwrap_or_else(|_| coin.to_string())
        })
        .collect()
}

/// Prints the caller's balance and an optional view after a submission
pub struct CliObserver {
    chain: Arc<dyn ChainClient>,
    tokens: DenomRegistry,
    view: Option<(String, String)>,
}

impl CliObserver {
    pub fn new(chain: Arc<dyn ChainClient>, config: &Config, view: Option<&str>) -> Self {
        Self {
            chain,
            tokens: config.tokens.clone(),
            view: view.map(|v| split_render_path(v, &config.realm.boards_path)),
        }
    }
}

#[async_trait]
impl SubmissionObserver for CliObserver {
    async fn refresh_balance(&self, address: &str) {
        match self.chain.query_balances(address).await {
            Ok(coins) => {
                let balances = format_balances(&self.tokens, &coins);
                println!("balance of {}: {}", format_address(address), balances.join(", "));
            }
            Err(e) => warn!(address, error = %e, "failed to refresh balance"),
        }
    }

    async fn reload_view(&self) {
        let Some((pkg_path, path)) = &self.view else {
            return;
        };
        match self.chain.render(pkg_path, path).await {
            Ok(content) => println!("{content}"),
            Err(e) => warn!(pkg_path = %pkg_path, path = %path, error = %e, "failed to reload view"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_parse_reply() {
        let cli = Cli::try_parse_from([
            "boards",
            "reply",
            "--bid",
            "3",
            "--thread-id",
            "7",
            "--post-id",
            "12",
            "--message",
            "hello",
        ])
        .unwrap();

        match cli.command {
            Commands::Reply(cmd) => assert_eq!(
                cmd.action(),
                BoardAction::CreateReply {
                    bid: 3,
                    thread_id: 7,
                    post_id: 12,
                    body: "hello".to_string(),
                }
            ),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_rejects_bad_address() {
        assert!(Cli::try_parse_from(["boards", "account", "cosmos1abc"]).is_err());
        assert!(Cli::try_parse_from([
            "boards",
            "balance",
            "g1jg8mtutu9khhfwc4nxmuhcpftf0pajdhfvsqf5"
        ])
        .is_ok());
    }

    #[test]
    fn test_global_opts_after_subcommand() {
        let cli =
            Cli::try_parse_from(["boards", "render", "--node", "http://node:26657"]).unwrap();
        assert_eq!(cli.global_opts.node.as_deref(), Some("http://node:26657"));
        assert_eq!(cli.global_opts.log_level, "warn");
    }

    #[test]
    fn test_split_render_path() {
        assert_eq!(
            split_render_path("gno.land/r/demo/users:alice", "gno.land/r/boards"),
            ("gno.land/r/demo/users".to_string(), "alice".to_string())
        );
        assert_eq!(
            split_render_path("testboard/7", "gno.land/r/boards"),
            ("gno.land/r/boards".to_string(), "testboard/7".to_string())
        );
        assert_eq!(
            split_render_path("", "gno.land/r/boards"),
            ("gno.land/r/boards".to_string(), String::new())
        );
    }

    #[test]
    fn test_load_config_applies_overrides() {
        let dir = tempdir().unwrap();
        let cli = Cli::try_parse_from([
            "boards",
            "--home",
            dir.path().to_str().unwrap(),
            "--chain-id",
            "portal-loop",
            "--node",
            "https://rpc.example:443",
            "config",
            "show",
        ])
        .unwrap();

        let config = cli.global_opts.load_config().unwrap();
        assert_eq!(config.chain.id, "portal-loop");
        assert_eq!(config.client.node_url, "https://rpc.example:443");
        assert_eq!(config.gas.default_limit, 2_000_000);
    }

    #[test]
    fn test_signer_from_key_hex() {
        let mut opts = Cli::try_parse_from(["boards", "version"]).unwrap().global_opts;
        opts.key_hex = None;
        assert!(opts.signer().unwrap().is_none());

        opts.key_hex = Some("0x".to_string() + &"01".repeat(32));
        assert!(opts.signer().unwrap().is_some());

        opts.key_hex = Some("nothex".to_string());
        assert!(opts.signer().is_err());
    }

    #[test]
    fn test_require_signer_without_key() {
        let mut opts = Cli::try_parse_from(["boards", "version"]).unwrap().global_opts;
        opts.key_hex = None;
        assert!(matches!(
            opts.require_signer(),
            Err(SignerError::Unavailable(_))
        ));
    }

    #[test]
    fn test_parse_log_format() {
        let cli = Cli::try_parse_from(["boards", "version"]).unwrap();
        assert_eq!(cli.global_opts.log_format, LogFormat::Text);

        let cli = Cli::try_parse_from(["boards", "--log-format", "json", "version"]).unwrap();
        assert_eq!(cli.global_opts.log_format, LogFormat::Json);
        assert!(Cli::try_parse_from(["boards", "--log-format", "xml", "version"]).is_err());
    }

    #[test]
    fn test_format_hash() {
        let hash = "q2s9Jm0Vbx4d1R6TfWzPnL8yHcK3aEoG5uXiMtQjS7w=";
        let shown = format_hash(hash);
        assert_eq!(shown.chars().count(), HASH_DISPLAY_LEN);
        assert!(shown.starts_with("q2s9Jm0Vbx4d1R"));
        assert!(shown.ends_with("5uXiMtQjS7w="));
        assert_eq!(format_hash("short"), "short");
    }

    #[test]
    fn test_format_balances() {
        let registry = DenomRegistry::default();
        let coins = vec![
            Coin::new("ugnot", 1_500_000).unwrap(),
            Coin::new("uatom", 42).unwrap(),
        ];
        assert_eq!(
            format_balances(&registry, &coins),
            vec!["1.5 GNOT".to_string(), "42uatom".to_string()]
        );
    }
}
