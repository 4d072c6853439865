//! bountyhub CLI
//!
//! Command-line interface for creating and browsing token campaigns.
//!
//! # Usage
//!
//! ```bash
//! bountyhub campaigns list --status active --sort budget-desc
//! bountyhub campaigns mine --format json
//! bountyhub link https://zora.co/coin/base:0x92cbce3c432b7e4d073d6f646dccd9bf1dfa0b6b
//! bountyhub verify --family clanker --link https://www.clanker.world/clanker/0x2DD7...
//! bountyhub create --family zora --link 0x92cb... --title "Spotlight" \
//!     --description "Post about SPOT" --start 2025-05-01 --end 2025-05-11 \
//!     --budget 20 --keyword spot --keyword zora
//! ```

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bountyhub_core::{SortOrder, TokenFamily};

mod commands;
mod config;
mod output;

#[derive(Parser)]
#[command(name = "bountyhub")]
#[command(author = "bountyhub")]
#[command(version)]
#[command(about = "Create and browse creator-token campaigns on Base", long_about = None)]
struct Cli {
    /// Campaign backend URL
    #[arg(long, env = "BOUNTYHUB_BACKEND_URL", global = true)]
    backend_url: Option<String>,

    /// Base JSON-RPC endpoint
    #[arg(long, env = "BOUNTYHUB_RPC_URL", global = true)]
    rpc_url: Option<String>,

    /// Private key of the signing wallet
    #[arg(long, env = "BOUNTYHUB_PRIVATE_KEY", hide_env_values = true, global = true)]
    private_key: Option<String>,

    /// Zora API key
    #[arg(long, env = "BOUNTYHUB_ZORA_API_KEY", hide_env_values = true, global = true)]
    zora_api_key: Option<String>,

    /// Address receiving the campaign budget share
    #[arg(long, env = "BOUNTYHUB_PROTOCOL_ADDRESS", global = true)]
    protocol_address: Option<String>,

    /// Output format [default: table, or output.default_format from config]
    #[arg(long, short, global = true)]
    format: Option<output::OutputFormat>,

    /// Profile name from config file
    #[arg(long, short, global = true)]
    profile: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Browse campaigns
    Campaigns {
        #[command(subcommand)]
        action: CampaignCommands,
    },
    /// Extract the token address from a link
    Link { input: String },
    /// Verify ownership of a token
    Verify {
        #[arg(long)]
        family: TokenFamily,
        #[arg(long)]
        link: String,
        /// Wallet to verify for [default: the signing wallet]
        #[arg(long)]
        address: Option<String>,
    },
    /// Create a campaign
    Create(CreateArgs),
    /// Configure CLI
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum CampaignCommands {
    /// List campaigns
    List {
        /// Match title, description or keywords
        #[arg(long)]
        search: Option<String>,
        #[arg(long, default_value_t = SortOrder::DateDesc)]
        sort: SortOrder,
        /// Only show active, upcoming or completed campaigns
        #[arg(long)]
        status: Option<bountyhub_core::CampaignStatus>,
    },
    /// Get campaign details
    Get { id: String },
    /// Campaigns created by a wallet
    Mine {
        /// Creator address [default: the signing wallet]
        #[arg(long)]
        address: Option<String>,
    },
}

#[derive(clap::Args)]
struct CreateArgs {
    #[arg(long)]
    family: TokenFamily,
    /// Token link or address
    #[arg(long)]
    link: String,
    #[arg(long)]
    title: String,
    #[arg(long)]
    description: String,
    /// Start date (YYYY-MM-DD or RFC 3339)
    #[arg(long)]
    start: String,
    /// End date (YYYY-MM-DD or RFC 3339)
    #[arg(long)]
    end: String,
    /// Share of rewards for the campaign, in percent
    #[arg(long)]
    budget: u8,
    /// Campaign keyword (repeatable)
    #[arg(long = "keyword")]
    keywords: Vec<String>,
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Set configuration value
    Set { key: String, value: String },
    /// Get configuration value
    Get { key: String },
    /// List all configuration
    List,
    /// Initialize configuration
    Init,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let overrides = config::Overrides {
        backend_url: cli.backend_url,
        rpc_url: cli.rpc_url,
        private_key: cli.private_key,
        zora_api_key: cli.zora_api_key,
        protocol_address: cli.protocol_address,
    };

    let result = match config::Context::load(cli.profile.as_deref(), overrides) {
        Ok(ctx) => {
            let format = cli.format.unwrap_or_else(|| ctx.default_format());
            match cli.command {
                Commands::Campaigns { action } => commands::campaigns::handle(action, &ctx, format).await,
                Commands::Link { input } => commands::link::handle(&input, format),
                Commands::Verify { family, link, address } => {
                    commands::verify::handle(family, &link, address.as_deref(), &ctx, format).await
                }
                Commands::Create(args) => commands::create::handle(args, &ctx, format).await,
                Commands::Config { action } => commands::config::handle(action, &ctx, format),
            }
        }
        Err(e) => Err(e),
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
