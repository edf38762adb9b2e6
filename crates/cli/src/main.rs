//! Lindo CLI - drive the storefront from a terminal.
//!
//! # Usage
//!
//! ```bash
//! # Browse
//! lindo catalog products
//! lindo catalog search "baby wipes"
//!
//! # Shop as a guest, then sign in (the guest cart is replayed once)
//! lindo cart add 64f1c2 --quantity 2
//! lindo login --email mama@lindo.rw --password '...'
//! lindo cart show
//!
//! # Place an order
//! lindo checkout --full-name "Aline Uwase" --phone 0788000000 \
//!     --street "KG 11 Ave" --city Kigali --payment dpo
//! ```
//!
//! # Commands
//!
//! - `catalog` - Products, categories, search
//! - `cart` - Show and edit the cart
//! - `wishlist` - Show and toggle saved products
//! - `login` / `register` / `logout` / `avatar` - Account
//! - `checkout` - Place an order
//! - `admin` - Vendor dashboard gate

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use lindo_storefront::config::StorefrontConfig;
use lindo_storefront::state::Storefront;
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

use commands::CommandError;

#[derive(Parser)]
#[command(name = "lindo")]
#[command(author, version, about = "Lindo storefront from the command line")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Browse the catalog
    Catalog {
        #[command(subcommand)]
        action: CatalogAction,
    },
    /// Show and edit the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Show and edit the wishlist
    Wishlist {
        #[command(subcommand)]
        action: WishlistAction,
    },
    /// Sign in; the guest cart and wishlist are replayed into the account
    Login {
        #[arg(short, long)]
        email: String,

        #[arg(short, long)]
        password: String,
    },
    /// Create an account and sign in
    Register {
        #[arg(long)]
        first_name: String,

        #[arg(long)]
        last_name: String,

        #[arg(short, long)]
        email: String,

        #[arg(short, long)]
        password: String,
    },
    /// Sign out
    Logout,
    /// Upload a profile picture
    Avatar {
        /// Image file
        path: PathBuf,
    },
    /// Place an order for the current cart
    Checkout(commands::checkout::CheckoutArgs),
    /// Vendor dashboard gate
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
}

#[derive(Subcommand)]
enum CatalogAction {
    /// Home page banners, category icons and promotions
    Home,
    /// List every product
    Products,
    /// List categories
    Categories,
    /// Show one product with related products
    Product { id: String },
    /// Search products
    Search { query: String },
    /// List a category's products
    Category { id: String },
}

#[derive(Subcommand)]
enum CartAction {
    /// Show the cart and subtotal
    Show,
    /// Add a product
    Add {
        id: String,

        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
    },
    /// Increase a line by one
    Inc { id: String },
    /// Decrease a line by one (never below one)
    Dec { id: String },
    /// Remove a line
    Remove { id: String },
    /// Empty the cart
    Clear,
}

#[derive(Subcommand)]
enum WishlistAction {
    /// Show saved products
    Show,
    /// Save or unsave a product
    Toggle { id: String },
}

#[derive(Subcommand)]
enum AdminAction {
    /// Open an admin session
    Login {
        #[arg(short, long)]
        username: String,

        #[arg(short, long)]
        password: String,
    },
    /// Close the admin session
    Logout,
    /// Show whether an admin session is open
    Status,
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
async fn main() {
    let config = match StorefrontConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing_subscriber::fmt::init();
            tracing::error!("Invalid configuration: {e}");
            std::process::exit(2);
        }
    };

    // Sentry must be initialised before the subscriber
    let _sentry_guard = init_sentry(&config);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "lindo_storefront=info,lindo_cli=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli, config).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: StorefrontConfig) -> Result<(), CommandError> {
    let store = Storefront::open(config)?;

    match cli.command {
        Commands::Catalog { action } => match action {
            CatalogAction::Home => commands::catalog::home(&store).await?,
            CatalogAction::Products => commands::catalog::products(&store).await?,
            CatalogAction::Categories => commands::catalog::categories(&store).await?,
            CatalogAction::Product { id } => commands::catalog::product(&store, &id).await?,
            CatalogAction::Search { query } => commands::catalog::search(&store, &query).await?,
            CatalogAction::Category { id } => commands::catalog::category(&store, &id).await?,
        },
        Commands::Cart { action } => match action {
            CartAction::Show => commands::cart::show(&store).await?,
            CartAction::Add { id, quantity } => {
                commands::cart::add(&store, &id, quantity).await?;
            }
            CartAction::Inc { id } => commands::cart::change(&store, &id, 1).await?,
            CartAction::Dec { id } => commands::cart::change(&store, &id, -1).await?,
            CartAction::Remove { id } => commands::cart::remove(&store, &id).await?,
            CartAction::Clear => commands::cart::clear(&store).await?,
        },
        Commands::Wishlist { action } => match action {
            WishlistAction::Show => commands::wishlist::show(&store).await?,
            WishlistAction::Toggle { id } => commands::wishlist::toggle(&store, &id).await?,
        },
        Commands::Login { email, password } => {
            commands::account::login(&store, &email, password).await?;
        }
        Commands::Register {
            first_name,
            last_name,
            email,
            password,
        } => {
            commands::account::register(&store, first_name, last_name, &email, password).await?;
        }
        Commands::Logout => commands::account::logout(&store).await?,
        Commands::Avatar { path } => commands::account::avatar(&store, &path).await?,
        Commands::Checkout(args) => commands::checkout::run(&store, args).await?,
        Commands::Admin { action } => match action {
            AdminAction::Login { username, password } => {
                commands::admin::login(&store, &username, &password)?;
            }
            AdminAction::Logout => commands::admin::logout(&store)?,
            AdminAction::Status => commands::admin::status(&store),
        },
    }
    Ok(())
}
