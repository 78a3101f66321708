use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use futures::{StreamExt, TryStreamExt};
use resale_ledger::config::Config;
use resale_ledger::storage::memory::MemoryStorage;
use resale_ledger::storage::postgres::PostgresStorage;
use resale_ledger::storage::unconfigured::UnconfiguredStorage;
use resale_ledger::storage::LedgerStorage;
use resale_ledger::web::{self, AppState, AuthSettings};
use resale_ledger::{Ledger, NewProduct, Store};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "resale-ledger", version, about = "Resale inventory and profit tracking")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP API.
    Serve {
        #[arg(long, env = "SERVER_HOST")]
        host: Option<String>,
        #[arg(long, env = "SERVER_PORT")]
        port: Option<u16>,
        /// Keep everything in process memory instead of PostgreSQL.
        #[arg(long)]
        in_memory: bool,
    },
    /// Bulk-load products for one store from a JSON array.
    Seed {
        /// Matched case-insensitively against existing store names; created
        /// when nothing matches.
        #[arg(long)]
        store: String,
        #[arg(long)]
        file: PathBuf,
    },
}

/// One entry of a seed file. The store comes from the command line.
#[derive(Debug, Deserialize)]
struct SeedItem {
    name: String,
    purchase_price: Decimal,
    purchase_date: NaiveDate,
    #[serde(default)]
    sale_price: Option<Decimal>,
    #[serde(default)]
    sale_date: Option<NaiveDate>,
    #[serde(default)]
    sold_at: Option<String>,
    #[serde(default)]
    product_url: Option<String>,
}

impl SeedItem {
    fn into_product(self, store: &Store) -> NewProduct {
        NewProduct {
            name: self.name,
            store_id: store.id,
            purchase_price: self.purchase_price,
            purchase_date: self.purchase_date,
            sale_price: self.sale_price,
            sale_date: self.sale_date,
            sold_at: self.sold_at,
            product_url: self.product_url,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("resale_ledger=info,tower_http=info")),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::from_env().context("Failed to read configuration")?;

    match cli.command {
        Command::Serve {
            host,
            port,
            in_memory,
        } => {
            let config = config.with_address(host, port);
            if in_memory {
                info!("using in-memory storage");
                return run_server(MemoryStorage::new(), &config).await;
            }
            match config.database_url() {
                Some(url) => {
                    match PostgresStorage::new(url, *config.database_max_connections()).await {
                        Ok(storage) => run_server(storage, &config).await,
                        Err(err) => {
                            warn!(error = %err, "database unavailable, serving setup guidance");
                            run_server(UnconfiguredStorage::because(err.to_string()), &config)
                                .await
                        }
                    }
                }
                None => {
                    warn!("DATABASE_URL not set, serving setup guidance");
                    run_server(UnconfiguredStorage::new(), &config).await
                }
            }
        }
        Command::Seed { store, file } => {
            let url = config
                .database_url()
                .as_deref()
                .context("DATABASE_URL must be set to seed")?;
            let storage = PostgresStorage::new(url, *config.database_max_connections())
                .await
                .context("Failed to connect to database")?;
            seed(&Ledger::new(storage), &store, &file).await
        }
    }
}

async fn run_server<S: LedgerStorage + 'static>(storage: S, config: &Config) -> Result<()> {
    let addr = config.socket_addr()?;
    let state = AppState::new(Ledger::new(storage), AuthSettings::from(config));
    let app = web::router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("listening on http://{addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "failed to listen for shutdown signal");
    }
}

async fn seed<S: LedgerStorage>(ledger: &Ledger<S>, store_name: &str, file: &Path) -> Result<()> {
    let raw = tokio::fs::read_to_string(file)
        .await
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let items: Vec<SeedItem> =
        serde_json::from_str(&raw).with_context(|| format!("Invalid seed file {}", file.display()))?;

    let store = find_or_create_store(ledger, store_name).await?;
    info!(store = %store.name, count = items.len(), "seeding products");

    let created: Vec<_> = futures::stream::iter(items)
        .then(|item| ledger.create_product(item.into_product(&store)))
        .inspect_ok(|product| info!(name = %product.name, "added product"))
        .try_collect()
        .await
        .context("Failed to add product")?;

    info!(count = created.len(), store = %store.name, "seed complete");
    Ok(())
}

async fn find_or_create_store<S: LedgerStorage>(ledger: &Ledger<S>, name: &str) -> Result<Store> {
    let needle = name.to_lowercase();
    let existing = ledger
        .list_stores()
        .await
        .context("Failed to fetch stores")?
        .into_iter()
        .find(|store| store.name.to_lowercase().contains(&needle));

    match existing {
        Some(store) => Ok(store),
        None => Ok(ledger
            .create_store(name)
            .await
            .context("Failed to create store")?),
    }
}
