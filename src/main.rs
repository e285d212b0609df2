use std::str::FromStr;

use alloy::primitives::{Address, U256};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use mintrelay::api;
use mintrelay::config;
use mintrelay::request::{MintParams, PreparedMint};
use mintrelay::wallet::WalletSession;

#[derive(Parser, Debug)]
#[command(name = "mintrelay", about = "signature-relayed NFT minting")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the relay API with the funding account from the environment
    Serve,
    /// Build, sign, and relay a single mint as a client
    Mint {
        /// Token metadata URI, e.g. ipfs://Qm.../0
        #[arg(long)]
        uri: String,

        /// Recipient; defaults to the signing wallet's address
        #[arg(long, value_parser = Address::from_str)]
        to: Option<Address>,

        /// Signing key; a throwaway wallet is generated when omitted
        #[arg(long)]
        private_key: Option<String>,

        #[arg(long, default_value_t = 1)]
        quantity: u64,

        #[arg(long, default_value = "http://localhost:7777")]
        relay_url: String,
    },
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .pretty()
        .try_init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Serve => serve().await,
        Commands::Mint {
            uri,
            to,
            private_key,
            quantity,
            relay_url,
        } => mint(uri, to, private_key, quantity, relay_url).await,
    }
}

async fn serve() -> eyre::Result<()> {
    let config = config::init();
    tracing::info!("Starting mintrelay with config: {:?}", config);

    let state = api::AppState::from_config(&config).await?;
    api::start_api(&config, state).await?;

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutting down");
    Ok(())
}

/// Client side of the flow: the relay's /prepare endpoint supplies the
/// request and domain, the local wallet signs, /relay pays and broadcasts.
async fn mint(
    uri: String,
    to: Option<Address>,
    private_key: Option<String>,
    quantity: u64,
    relay_url: String,
) -> eyre::Result<()> {
    let wallet = match private_key {
        Some(key) => WalletSession::from_hex(&key)?,
        None => WalletSession::random(),
    };

    let params = MintParams {
        to: to.unwrap_or(wallet.address()),
        uri,
        quantity: U256::from(quantity),
        ..Default::default()
    };

    let client = reqwest::Client::new();
    let prepared: PreparedMint = client
        .post(format!("{relay_url}/prepare"))
        .json(&params)
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    tracing::info!(
        uid = %prepared.request.uid,
        signer = %wallet.address(),
        to = %prepared.request.to,
        "signing mint request"
    );
    let signed = wallet.sign_mint(&prepared).await?;

    let res = client
        .post(format!("{relay_url}/relay"))
        .json(&signed)
        .send()
        .await?;
    let status = res.status();
    let body = res.text().await?;

    if status.is_success() {
        println!("{body}");
        Ok(())
    } else {
        Err(eyre::eyre!("relay rejected mint ({status}): {body}"))
    }
}
