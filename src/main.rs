use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use solana_sdk::commitment_config::CommitmentConfig;
use solana_sdk::signature::read_keypair_file;
use std::fs;
use std::path::PathBuf;

use token_launchpad::ops::{AuthorityClear, IssueRequest, Launchpad, Progress};
use token_launchpad::rpc::RpcLedgerClient;
use token_launchpad::{ConfirmationState, LaunchConfig, Stage};

#[derive(Parser)]
#[command(name = "launchpad", version, about = "Solana token launchpad CLI")]
struct Cli {
    /// Cluster name (devnet, testnet, mainnet, localnet) or RPC URL
    #[arg(long)]
    cluster: Option<String>,

    /// Path to the payer keypair file
    #[arg(long)]
    keypair: Option<String>,

    /// Launchpad config file (treasury and fee overrides)
    #[arg(long)]
    config: Option<String>,

    #[arg(long, value_enum, default_value = "text")]
    output: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum, PartialEq, Eq)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new token mint and issue its initial supply (0.1 SOL fee)
    Create(CreateArgs),
    /// Permanently remove the mint and freeze authorities (0.05 SOL fee)
    Revoke(RevokeArgs),
    /// Show the active fee schedule and treasury
    Fees,
}

#[derive(Parser)]
struct CreateArgs {
    /// Initial supply in whole tokens
    #[arg(long)]
    supply: String,

    #[arg(long, default_value_t = 9)]
    decimals: u8,

    /// Display name, not written on chain
    #[arg(long)]
    name: Option<String>,

    /// Display symbol, not written on chain
    #[arg(long)]
    symbol: Option<String>,
}

#[derive(Parser)]
struct RevokeArgs {
    /// Mint address to make immutable
    mint: String,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    run(cli)
}

fn run(cli: Cli) -> Result<()> {
    let launch_config = match cli.config.as_deref() {
        Some(path) => {
            let contents = fs::read_to_string(expand_tilde(path))
                .with_context(|| format!("Failed to read config: {}", path))?;
            LaunchConfig::from_toml(&contents)?
        }
        None => LaunchConfig::default(),
    };

    match &cli.command {
        Commands::Fees => handle_fees(&cli, &launch_config),
        Commands::Create(args) => {
            let ctx = build_context(&cli)?;
            handle_create(&cli, ctx, launch_config, args)
        }
        Commands::Revoke(args) => {
            let ctx = build_context(&cli)?;
            handle_revoke(&cli, ctx, launch_config, args)
        }
    }
}

#[derive(Debug, Clone)]
struct ClusterInfo {
    url: String,
    label: Option<String>,
}

struct CliContext {
    ledger: RpcLedgerClient,
    cluster: ClusterInfo,
}

fn build_context(cli: &Cli) -> Result<CliContext> {
    let solana_config = load_solana_cli_config().ok();

    let cluster_value = if let Some(value) = cli.cluster.as_deref() {
        value.to_string()
    } else if let Some(config) = solana_config.as_ref() {
        config.json_rpc_url.clone()
    } else {
        "devnet".to_string()
    };
    let cluster = resolve_cluster(&cluster_value)?;

    let keypair_value = if let Some(value) = cli.keypair.as_deref() {
        value.to_string()
    } else if let Some(config) = solana_config.as_ref() {
        config.keypair_path.clone()
    } else {
        return Err(anyhow!(
            "Missing keypair path. Use --keypair or Solana CLI config."
        ));
    };
    let keypair_path = expand_tilde(&keypair_value);
    let payer = read_keypair_file(&keypair_path)
        .map_err(|err| anyhow!("Failed to read keypair: {}", err))?;

    let commitment = parse_commitment(
        solana_config
            .as_ref()
            .and_then(|config| config.commitment.as_deref()),
    );

    Ok(CliContext {
        ledger: RpcLedgerClient::new(cluster.url.clone(), payer, commitment),
        cluster,
    })
}

/// Prints stage transition lines as the orchestration advances.
struct CliProgress {
    enabled: bool,
}

impl Progress for CliProgress {
    fn on_stage(&self, stage: Stage, state: ConfirmationState) {
        if !self.enabled {
            return;
        }
        let state = match state {
            ConfirmationState::Submitted => "submitted",
            ConfirmationState::Confirmed => "confirmed",
            ConfirmationState::Failed => "failed",
        };
        println!("[{}] {}", stage, state);
    }
}

fn handle_create(
    cli: &Cli,
    ctx: CliContext,
    launch_config: LaunchConfig,
    args: &CreateArgs,
) -> Result<()> {
    let supply = parse_supply(&args.supply)?;
    let request = IssueRequest {
        decimals: args.decimals,
        supply,
    };

    let launchpad = Launchpad::new(ctx.ledger, launch_config);
    let progress = CliProgress {
        enabled: cli.output == OutputFormat::Text,
    };
    let receipt = launchpad.issue_token(&request, &progress)?;

    let explorer = explorer_url(&receipt.supply_signature.to_string(), &ctx.cluster);
    if cli.output == OutputFormat::Json {
        let output = CreateOutput {
            mint: receipt.mint.to_string(),
            holding: receipt.holding.to_string(),
            decimals: receipt.decimals,
            initial_supply: receipt.initial_supply.to_string(),
            name: args.name.clone(),
            symbol: args.symbol.clone(),
            fee_signature: receipt.fee.signature.to_string(),
            supply_signature: receipt.supply_signature.to_string(),
            explorer,
        };
        print_json(&output)
    } else {
        let label = match (&args.name, &args.symbol) {
            (Some(name), Some(symbol)) => format!("{} ({})", name, symbol),
            (Some(name), None) => name.clone(),
            (None, Some(symbol)) => symbol.clone(),
            (None, None) => "Token".to_string(),
        };
        println!("{} created", label);
        println!("Mint:    {}", receipt.mint);
        println!("Holding: {}", receipt.holding);
        println!(
            "Supply:  {} ({} base units)",
            supply, receipt.initial_supply
        );
        println!("Fee tx:  {}", receipt.fee.signature);
        println!("Mint tx: {}", receipt.supply_signature);
        if let Some(url) = explorer {
            println!("Explorer: {}", url);
        }
        Ok(())
    }
}

fn handle_revoke(
    cli: &Cli,
    ctx: CliContext,
    launch_config: LaunchConfig,
    args: &RevokeArgs,
) -> Result<()> {
    let launchpad = Launchpad::new(ctx.ledger, launch_config);
    let progress = CliProgress {
        enabled: cli.output == OutputFormat::Text,
    };
    let receipt = launchpad.revoke_authorities(&args.mint, &progress)?;

    if cli.output == OutputFormat::Json {
        let output = RevokeOutput {
            mint: receipt.mint.to_string(),
            fee_signature: receipt.fee.signature.to_string(),
            mint_authority: authority_output(&receipt.mint_authority),
            freeze_authority: authority_output(&receipt.freeze_authority),
        };
        print_json(&output)
    } else {
        println!("Authorities removed from {}", receipt.mint);
        println!(
            "Mint authority:   {}",
            describe_clear(&receipt.mint_authority)
        );
        println!(
            "Freeze authority: {}",
            describe_clear(&receipt.freeze_authority)
        );
        println!("Fee tx: {}", receipt.fee.signature);
        Ok(())
    }
}

fn handle_fees(cli: &Cli, config: &LaunchConfig) -> Result<()> {
    if cli.output == OutputFormat::Json {
        let output = FeesOutput {
            treasury: config.treasury.to_string(),
            mint_fee_lamports: config.fees.mint_fee_lamports,
            authority_removal_fee_lamports: config.fees.authority_removal_fee_lamports,
        };
        print_json(&output)
    } else {
        println!("Treasury: {}", config.treasury);
        println!(
            "Token creation fee:    {} SOL",
            format_sol(config.fees.mint_fee_lamports)
        );
        println!(
            "Authority removal fee: {} SOL",
            format_sol(config.fees.authority_removal_fee_lamports)
        );
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
struct SolanaCliConfig {
    json_rpc_url: String,
    keypair_path: String,
    commitment: Option<String>,
}

fn load_solana_cli_config() -> Result<SolanaCliConfig> {
    let path = default_solana_config_path();
    let contents = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read Solana config: {}", path.display()))?;
    serde_yaml::from_str(&contents).context("Failed to parse Solana config")
}

fn default_solana_config_path() -> PathBuf {
    let mut path = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push(".config");
    path.push("solana");
    path.push("cli");
    path.push("config.yml");
    path
}

fn resolve_cluster(input: &str) -> Result<ClusterInfo> {
    let lowered = input.to_lowercase();
    let (url, label) = match lowered.as_str() {
        "devnet" => (
            "https://api.devnet.solana.com".to_string(),
            Some("devnet".to_string()),
        ),
        "testnet" => (
            "https://api.testnet.solana.com".to_string(),
            Some("testnet".to_string()),
        ),
        "mainnet" | "mainnet-beta" => (
            "https://api.mainnet-beta.solana.com".to_string(),
            Some("mainnet-beta".to_string()),
        ),
        "localnet" => (
            "http://127.0.0.1:8899".to_string(),
            Some("localnet".to_string()),
        ),
        _ => {
            if input.starts_with("http://") || input.starts_with("https://") {
                let label = if lowered.contains("devnet") {
                    Some("devnet".to_string())
                } else if lowered.contains("testnet") {
                    Some("testnet".to_string())
                } else if lowered.contains("mainnet") {
                    Some("mainnet-beta".to_string())
                } else {
                    None
                };
                (input.to_string(), label)
            } else {
                return Err(anyhow!("Unknown cluster: {}", input));
            }
        }
    };
    Ok(ClusterInfo { url, label })
}

fn parse_commitment(value: Option<&str>) -> CommitmentConfig {
    match value.unwrap_or("confirmed") {
        "processed" => CommitmentConfig::processed(),
        "finalized" => CommitmentConfig::finalized(),
        _ => CommitmentConfig::confirmed(),
    }
}

fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/").or_else(|| path.strip_prefix("~\\")) {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

fn parse_supply(value: &str) -> Result<u64> {
    let sanitized = value.replace('_', "");
    sanitized
        .parse()
        .map_err(|_| anyhow!("Invalid supply: {}", value))
}

fn format_sol(lamports: u64) -> String {
    let whole = lamports / 1_000_000_000;
    let frac = lamports % 1_000_000_000;
    let formatted = format!("{}.{:09}", whole, frac);
    formatted
        .trim_end_matches('0')
        .trim_end_matches('.')
        .to_string()
}

fn explorer_url(signature: &str, cluster: &ClusterInfo) -> Option<String> {
    cluster.label.as_ref().map(|label| {
        format!(
            "https://explorer.solana.com/tx/{}?cluster={}",
            signature, label
        )
    })
}

fn describe_clear(clear: &AuthorityClear) -> String {
    match clear {
        AuthorityClear::Cleared(signature) => format!("cleared ({})", signature),
        AuthorityClear::AlreadyClear => "already clear".to_string(),
    }
}

fn authority_output(clear: &AuthorityClear) -> AuthorityOutput {
    match clear {
        AuthorityClear::Cleared(signature) => AuthorityOutput {
            status: "cleared".to_string(),
            signature: Some(signature.to_string()),
        },
        AuthorityClear::AlreadyClear => AuthorityOutput {
            status: "already-clear".to_string(),
            signature: None,
        },
    }
}

#[derive(Serialize)]
struct CreateOutput {
    mint: String,
    holding: String,
    decimals: u8,
    initial_supply: String,
    name: Option<String>,
    symbol: Option<String>,
    fee_signature: String,
    supply_signature: String,
    explorer: Option<String>,
}

#[derive(Serialize)]
struct RevokeOutput {
    mint: String,
    fee_signature: String,
    mint_authority: AuthorityOutput,
    freeze_authority: AuthorityOutput,
}

#[derive(Serialize)]
struct AuthorityOutput {
    status: String,
    signature: Option<String>,
}

#[derive(Serialize)]
struct FeesOutput {
    treasury: String,
    mint_fee_lamports: u64,
    authority_removal_fee_lamports: u64,
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{format_sol, parse_supply, resolve_cluster};

    #[test]
    fn parses_supplies_with_separators() {
        assert_eq!(parse_supply("1000000").unwrap(), 1_000_000);
        assert_eq!(parse_supply("1_000_000_000").unwrap(), 1_000_000_000);
        assert!(parse_supply("1.5").is_err());
        assert!(parse_supply("-1").is_err());
    }

    #[test]
    fn formats_lamports_as_sol() {
        assert_eq!(format_sol(100_000_000), "0.1");
        assert_eq!(format_sol(50_000_000), "0.05");
        assert_eq!(format_sol(1_000_000_000), "1");
        assert_eq!(format_sol(0), "0");
    }

    #[test]
    fn resolves_known_clusters() {
        let cluster = resolve_cluster("devnet").unwrap();
        assert_eq!(cluster.url, "https://api.devnet.solana.com");
        assert_eq!(cluster.label.as_deref(), Some("devnet"));

        let custom = resolve_cluster("https://rpc.example.com").unwrap();
        assert!(custom.label.is_none());

        assert!(resolve_cluster("moonnet").is_err());
    }
}
