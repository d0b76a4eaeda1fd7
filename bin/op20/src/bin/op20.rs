//! Query and move an OP_20 token from the command line.
//!
//! - `metadata`: name, symbol, decimals and supplies
//! - `balance`: balance and allowance of an address or public key
//! - `transfer` / `approve`: simulate, then hand the call to the wallet
//! - `check-config`: validate the configuration and print it

use clap::{Parser, Subcommand};
use client::RemoteWallet;
use config::AppConfig;
use eyre::{eyre, WrapErr};
use op20::{balance_with_metadata, load_config, render, submit, Write};
use session::{Notice, Session};
use std::{path::PathBuf, process::ExitCode};
use token::TokenService;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "op20")]
#[command(about = "Interact with an OP_20 token contract")]
struct Cli {
    /// TOML file with the configuration keys (defaults to the process environment)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Wallet bridge endpoint, overrides WALLET_URL from the configuration
    #[arg(long, env = "WALLET_URL")]
    wallet_url: Option<String>,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show token name, symbol, decimals and supplies
    Metadata,

    /// Show balance and allowance of an address or public key
    Balance { address: String },

    /// Transfer tokens to an address or public key
    Transfer {
        #[arg(long)]
        to: String,

        /// Amount in token units, e.g. 1.5
        #[arg(long)]
        amount: String,

        /// Sender, defaults to the connected wallet account
        #[arg(long)]
        from: Option<String>,
    },

    /// Approve the configured spender
    Approve {
        /// Amount in token units, e.g. 1.5
        #[arg(long)]
        amount: String,

        /// Sender, defaults to the connected wallet account
        #[arg(long)]
        from: Option<String>,
    },

    /// Validate the configuration and print it
    CheckConfig,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.json_logs);

    match run(cli).await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{}", render::notice(&Notice::from_error(&*err)));
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(json: bool) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
}

async fn run(cli: Cli) -> eyre::Result<ExitCode> {
    let config = load_config(cli.config.as_deref())?;

    info!(
        chain = %config.network.chain_name,
        token = %config.token.token_address,
        "Loaded config"
    );

    if matches!(cli.command, Command::CheckConfig) {
        println!("{}", render::config_summary(&config));
        return Ok(ExitCode::SUCCESS);
    }

    let service = TokenService::connect(&config).wrap_err("Failed to create RPC transport")?;

    match cli.command {
        Command::CheckConfig => {}
        Command::Metadata => {
            let metadata = service.get_token_metadata().await?;
            println!("{}", render::metadata(&metadata));
        }
        Command::Balance { address } => {
            let (metadata, balance) = balance_with_metadata(&service, &address).await?;
            println!("{}", render::balance(&address, &metadata, &balance));
        }
        Command::Transfer { to, amount, from } => {
            let write = Write::Transfer {
                to: &to,
                amount: &amount,
            };
            return send(&service, &config, cli.wallet_url, write, from.as_deref()).await;
        }
        Command::Approve { amount, from } => {
            let write = Write::Approve { amount: &amount };
            return send(&service, &config, cli.wallet_url, write, from.as_deref()).await;
        }
    }

    Ok(ExitCode::SUCCESS)
}

async fn send(
    service: &TokenService<client::HttpTransport>,
    config: &AppConfig,
    wallet_url: Option<String>,
    write: Write<'_>,
    sender: Option<&str>,
) -> eyre::Result<ExitCode> {
    let wallet_url = wallet_url
        .or_else(|| config.wallet_url.clone())
        .ok_or_else(|| eyre!("No wallet endpoint configured, set WALLET_URL"))?;
    let wallet = RemoteWallet::new(&wallet_url, config.network.request_timeout)
        .wrap_err("Failed to create wallet client")?;

    let mut session = Session::new();
    let submission = submit(service, &wallet, &mut session, write, sender).await?;
    info!(account = %submission.account, "Wallet session active");

    // The failed modal carries the error, so it is the only report.
    if submission.outcome.is_err() {
        eprintln!("{}", render::modal(&submission.modal));
        return Ok(ExitCode::FAILURE);
    }
    println!("{}", render::modal(&submission.modal));

    match (&submission.refresh, session.data()) {
        (Some(err), _) => eprintln!("{}", render::notice(&Notice::from_error(err))),
        (None, Some(data)) => println!(
            "Updated balance on {}: {} base units (allowance {})",
            data.network_name, data.user_balance, data.allowance
        ),
        (None, None) => {}
    }

    Ok(ExitCode::SUCCESS)
}
