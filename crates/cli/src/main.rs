//! Luxe CLI - drive the storefront client core from a terminal.
//!
//! # Usage
//!
//! ```bash
//! # Search a catalog file, cheapest first
//! luxe search catalog.json --query hoodie --sort price-low
//!
//! # Search-modal suggestions (trending searches for an empty query)
//! luxe suggest catalog.json hood
//!
//! # Count down to a sale
//! luxe countdown --until 2026-12-01T00:00:00Z
//!
//! # Recent searches
//! luxe recent list
//! luxe recent add "ai hoodie"
//!
//! # Sign in (password read from $LUXE_PASSWORD)
//! luxe login -e shopper@example.com
//! ```
//!
//! # Commands
//!
//! - `search` - Filter, sort and paginate a catalog
//! - `suggest` - Quick suggestions for a partial query
//! - `countdown` - Tick down to a target instant
//! - `recent` - List, add or clear recent searches
//! - `login` / `signup` - Authenticate against the identity service

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;
use std::process::ExitCode;

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use luxe_storefront::config::StorefrontConfig;
use luxe_storefront::error::Result;

mod commands;

#[derive(Parser)]
#[command(name = "luxe")]
#[command(author, version, about = "Luxe storefront client tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search a catalog file
    Search(SearchArgs),
    /// Show search-modal suggestions for a partial query
    Suggest {
        /// Catalog JSON file (array of products)
        catalog: PathBuf,

        /// Partial query; empty shows trending searches
        #[arg(default_value = "")]
        query: String,
    },
    /// Count down to a target instant
    Countdown {
        /// Target instant (RFC 3339)
        #[arg(short, long)]
        until: DateTime<Utc>,

        /// Stop after this many ticks instead of running to zero
        #[arg(long)]
        ticks: Option<usize>,
    },
    /// Manage recent searches
    Recent {
        #[command(subcommand)]
        action: RecentAction,
    },
    /// Sign in and claim the daily login reward
    Login {
        /// Account email address
        #[arg(short, long)]
        email: String,

        /// Environment variable holding the password
        #[arg(long, default_value = "LUXE_PASSWORD")]
        password_env: String,
    },
    /// Create an account
    Signup {
        /// Display name
        #[arg(short, long)]
        name: String,

        /// Account email address
        #[arg(short, long)]
        email: String,

        /// Environment variable holding the password
        #[arg(long, default_value = "LUXE_PASSWORD")]
        password_env: String,
    },
}

#[derive(clap::Args)]
struct SearchArgs {
    /// Catalog JSON file (array of products)
    catalog: PathBuf,

    /// Text to match against names and tags
    #[arg(short, long, default_value = "")]
    query: String,

    /// featured, price-low, price-high, newest or rating
    #[arg(short, long, default_value = "featured")]
    sort: String,

    /// Only this category
    #[arg(long)]
    category: Option<String>,

    /// Only this brand
    #[arg(long)]
    brand: Option<String>,

    /// Inclusive minimum price
    #[arg(long)]
    min_price: Option<Decimal>,

    /// Inclusive maximum price
    #[arg(long)]
    max_price: Option<Decimal>,

    /// Hide out-of-stock products
    #[arg(long)]
    in_stock: bool,

    /// 1-based results page
    #[arg(short, long, default_value_t = 1)]
    page: usize,
}

#[derive(Subcommand)]
enum RecentAction {
    /// Show recent searches, most recent first
    List,
    /// Record a search
    Add {
        /// Query to record
        query: String,
    },
    /// Forget all recent searches
    Clear,
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &StorefrontConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Sentry must be initialized before the tracing subscriber
    let config = StorefrontConfig::from_env();
    let _sentry_guard = config.as_ref().ok().and_then(init_sentry);

    // Defaults to info level for our crates if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "luxe_storefront=info,luxe_cli=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    let config = match config {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Failed to load configuration");
            return ExitCode::FAILURE;
        }
    };

    match run(cli, &config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            e.report();
            tracing::error!("{}", e.user_message());
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli, config: &StorefrontConfig) -> Result<()> {
    match cli.command {
        Commands::Search(args) => commands::search::run(config, args.into()).await?,
        Commands::Suggest { catalog, query } => commands::search::suggest(&catalog, &query).await?,
        Commands::Countdown { until, ticks } => {
            commands::countdown::run(until, config.countdown_tick, ticks).await;
        }
        Commands::Recent { action } => match action {
            RecentAction::List => commands::recent::list(config).await,
            RecentAction::Add { query } => commands::recent::add(config, &query).await?,
            RecentAction::Clear => commands::recent::clear(config).await?,
        },
        Commands::Login {
            email,
            password_env,
        } => commands::account::login(config, &email, &password_env).await?,
        Commands::Signup {
            name,
            email,
            password_env,
        } => commands::account::signup(config, &name, &email, &password_env).await?,
    }
    Ok(())
}

impl From<SearchArgs> for commands::search::SearchOptions {
    fn from(args: SearchArgs) -> Self {
        Self {
            catalog: args.catalog,
            query: args.query,
            sort: args.sort,
            category: args.category,
            brand: args.brand,
            min_price: args.min_price,
            max_price: args.max_price,
            in_stock: args.in_stock,
            page: args.page,
        }
    }
}
