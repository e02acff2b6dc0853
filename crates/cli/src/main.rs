//! Mid Shop CLI - Browse the catalog and manage your cart from a terminal.
//!
//! # Usage
//!
//! ```bash
//! # Sign in (the session is kept in the local state directory)
//! mid-shop login -u jane -p secret
//!
//! # Browse
//! mid-shop products list --category smartphones --sort price-desc --page 1
//! mid-shop products show 5
//!
//! # Cart
//! mid-shop cart add 5 -q 2
//! mid-shop cart update 5 3
//! mid-shop cart show
//! ```
//!
//! # Environment Variables
//!
//! - `MID_SHOP_API_URL`, `MID_SHOP_LOGIN_PATH`, `MID_SHOP_STATE_DIR`,
//!   `MID_SHOP_CATALOG_CACHE_TTL_SECS` - see `mid_shop_client::config`
//! - `SENTRY_DSN` - Enables error reporting when set
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `RUST_LOG` - Log filter (default: `mid_shop_client=info,mid_shop_cli=info`)

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use mid_shop_client::config::get_optional_env;
use mid_shop_core::{ProductId, ProductQuery, ProductSort};
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod output;

#[derive(Parser)]
#[command(name = "mid-shop")]
#[command(author, version, about = "Mid Shop storefront CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in
    Login {
        #[arg(short, long)]
        username: String,

        #[arg(short, long)]
        password: String,
    },
    /// Create an account and sign in
    Register {
        #[arg(short, long)]
        username: String,

        #[arg(short, long)]
        email: String,

        #[arg(short, long)]
        password: String,

        #[arg(long)]
        first_name: Option<String>,

        #[arg(long)]
        last_name: Option<String>,
    },
    /// Sign out on this device
    Logout,
    /// Show who is signed in
    Whoami,
    /// Browse products
    Products {
        #[command(subcommand)]
        action: ProductsAction,
    },
    /// List product categories
    Categories,
    /// Manage the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Manage favorite products
    Favorites {
        #[command(subcommand)]
        action: FavoritesAction,
    },
}

#[derive(Subcommand)]
enum ProductsAction {
    /// List a page of products
    List {
        /// Only products in this category (slug)
        #[arg(short, long)]
        category: Option<String>,

        /// Free-text search
        #[arg(short, long)]
        search: Option<String>,

        /// Sort as `<field>-<order>` (`id`, `title`, `price`, `rating`; `asc`, `desc`)
        #[arg(long, default_value = "id-asc")]
        sort: ProductSort,

        /// Zero-based page number
        #[arg(long, default_value_t = 0)]
        page: u32,

        #[arg(long, default_value_t = ProductQuery::DEFAULT_PAGE_SIZE)]
        page_size: u32,
    },
    /// Show one product
    Show { id: ProductId },
}

#[derive(Subcommand)]
enum CartAction {
    /// Show the cart
    Show,
    /// Add a product
    Add {
        id: ProductId,

        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
    },
    /// Set the quantity of a line
    Update {
        id: ProductId,

        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },
    /// Remove a line
    Remove { id: ProductId },
    /// Remove everything
    Clear,
}

#[derive(Subcommand)]
enum FavoritesAction {
    /// List favorite products
    List,
    /// Mark a product as favorite
    Add { id: ProductId },
    /// Unmark a favorite product
    Remove { id: ProductId },
    /// Flip the favorite mark of a product
    Toggle { id: ProductId },
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry() -> Option<sentry::ClientInitGuard> {
    let dsn = get_optional_env("SENTRY_DSN")?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: get_optional_env("SENTRY_ENVIRONMENT").map(std::borrow::Cow::Owned),
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
    // Load .env before reading SENTRY_DSN
    dotenvy::dotenv().ok();

    // Initialize Sentry (must be done before tracing subscriber)
    let _sentry_guard = init_sentry();

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "mid_shop_client=info,mid_shop_cli=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        output::failure(&e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CliError> {
    let ctx = commands::Context::from_env()?;

    match cli.command {
        Commands::Login { username, password } => {
            commands::auth::login(&ctx, username, password).await?;
        }
        Commands::Register {
            username,
            email,
            password,
            first_name,
            last_name,
        } => {
            commands::auth::register(
                &ctx,
                mid_shop_core::Registration {
                    username,
                    email,
                    password,
                    first_name,
                    last_name,
                },
            )
            .await?;
        }
        Commands::Logout => commands::auth::logout(&ctx),
        Commands::Whoami => commands::auth::whoami(&ctx),
        Commands::Products { action } => match action {
            ProductsAction::List {
                category,
                search,
                sort,
                page,
                page_size,
            } => {
                let mut query = ProductQuery::page(page, page_size).with_sort(sort);
                if let Some(search) = search {
                    query = query.with_search(search);
                }
                commands::products::list(&ctx, category.as_deref(), &query).await?;
            }
            ProductsAction::Show { id } => commands::products::show(&ctx, id).await?,
        },
        Commands::Categories => commands::products::categories(&ctx).await?,
        Commands::Cart { action } => match action {
            CartAction::Show => commands::cart::show(&ctx).await?,
            CartAction::Add { id, quantity } => commands::cart::add(&ctx, id, quantity).await?,
            CartAction::Update { id, quantity } => {
                commands::cart::update(&ctx, id, quantity).await?;
            }
            CartAction::Remove { id } => commands::cart::remove(&ctx, id).await?,
            CartAction::Clear => commands::cart::clear(&ctx).await?,
        },
        Commands::Favorites { action } => match action {
            FavoritesAction::List => commands::favorites::list(&ctx).await?,
            FavoritesAction::Add { id } => commands::favorites::add(&ctx, id).await?,
            FavoritesAction::Remove { id } => commands::favorites::remove(&ctx, id).await?,
            FavoritesAction::Toggle { id } => commands::favorites::toggle(&ctx, id).await?,
        },
    }
    Ok(())
}
