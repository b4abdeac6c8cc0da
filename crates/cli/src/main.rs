//! Marketstall CLI - storefront and back-office from the terminal.
//!
//! # Usage
//!
//! ```bash
//! # Browse and buy
//! mstall products list --category electronics
//! mstall cart add 665f1c2e9b1d4a0012ab34cd --quantity 2
//! mstall auth login -e shopper@example.com -p secret
//! mstall checkout
//!
//! # Back-office (admin session required)
//! mstall admin dashboard
//! mstall admin orders status 6650a1 delivered
//! ```
//!
//! # Environment Variables
//!
//! - `MARKETSTALL_API_URL` - API base URL (default `http://localhost:8080/api`)
//! - `MARKETSTALL_STATE_DIR` - where the cart and session are kept
//! - `SENTRY_DSN` - enables error reporting
//! - `RUST_LOG` - log filter

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::Arc;

use clap::{Parser, Subcommand};
use marketstall_storefront::{ClientConfig, Storefront};
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod output;

use commands::CommandError;
use commands::account::AccountAction;
use commands::admin::AdminAction;
use commands::auth::AuthAction;
use commands::cart::CartAction;
use commands::checkout::CheckoutArgs;
use commands::orders::OrdersAction;
use commands::products::ProductsAction;
use output::ConsoleNotifier;

#[derive(Parser)]
#[command(name = "mstall")]
#[command(author, version, about = "Marketstall storefront and back-office")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Browse the catalog
    Products {
        #[command(subcommand)]
        action: ProductsAction,
    },
    /// Manage the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Sign in and out
    Auth {
        #[command(subcommand)]
        action: AuthAction,
    },
    /// Account settings
    Account {
        #[command(subcommand)]
        action: AccountAction,
    },
    /// Order history
    Orders {
        #[command(subcommand)]
        action: OrdersAction,
    },
    /// Pay for the cart
    Checkout(CheckoutArgs),
    /// List categories
    Categories {
        /// Include inactive categories
        #[arg(long)]
        admin: bool,
    },
    /// Back-office
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
}

/// Initialize Sentry error tracking and return the guard that must be kept
/// alive.
fn init_sentry(config: &ClientConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry.dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry
                .environment
                .clone()
                .map(std::borrow::Cow::Owned),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    if guard.is_enabled() {
        Some(guard)
    } else {
        None
    }
}

fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        tracing::Level::TRACE => sentry_tracing::EventFilter::Ignore,
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Sentry must be initialized before the tracing subscriber
    let config = ClientConfig::from_env();
    let _sentry_guard = config.as_ref().ok().and_then(init_sentry);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        "mstall=info,marketstall_storefront=info,marketstall_admin=info,warn".into()
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    let result = match config {
        Ok(config) => run(cli, config).await,
        Err(e) => Err(e.into()),
    };

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: ClientConfig) -> Result<(), CommandError> {
    let app = Storefront::open(config, Arc::new(ConsoleNotifier))?;

    match cli.command {
        Commands::Products { action } => commands::products::run(&app, action).await?,
        Commands::Cart { action } => commands::cart::run(&app, action).await?,
        Commands::Auth { action } => commands::auth::run(&app, action).await?,
        Commands::Account { action } => commands::account::run(&app, action).await?,
        Commands::Orders { action } => commands::orders::run(&app, action).await?,
        Commands::Checkout(args) => commands::checkout::run(&app, args).await?,
        Commands::Categories { admin } => commands::categories::run(&app, admin),
        Commands::Admin { action } => commands::admin::run(&app, action).await?,
    }
    Ok(())
}
