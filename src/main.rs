use axum::Router;
use clap::Parser;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use giftwell::config::Config;
use giftwell::db::{create_pool, init_db, queries, AppState};
use giftwell::handlers;
use giftwell::models::CreateDonor;
use giftwell::payments::StripeClient;

#[derive(Parser, Debug)]
#[command(name = "giftwell")]
#[command(about = "Donation service with webhook-driven payment reconciliation")]
struct Cli {
    /// Seed the database with dev donors (dev mode only)
    #[arg(long)]
    seed: bool,

    /// Delete the database on exit (dev mode only, useful for fresh starts)
    #[arg(long)]
    ephemeral: bool,
}

/// Seeds a couple of dev donors for local testing. Only runs in dev mode
/// and when the donors table is empty.
fn seed_dev_data(state: &AppState) {
    let conn = state.db.get().expect("Failed to get db connection for seeding");

    let existing = queries::list_recent_donors(&conn, 1).expect("Failed to query donors");
    if !existing.is_empty() {
        tracing::info!("Database already has donors, skipping seed");
        return;
    }

    tracing::info!("Seeding dev donors");

    let seeds = [
        ("Ada Lovelace", "ada@giftwell.local", "GB"),
        ("Grace Hopper", "grace@giftwell.local", "US"),
    ];
    for (name, email, country) in seeds {
        let input = CreateDonor {
            full_name: Some(name.to_string()),
            email: Some(email.to_string()),
            country: Some(country.to_string()),
        };
        let donor = queries::create_donor(&conn, &input).expect("Failed to create dev donor");
        tracing::info!("Donor: {} (id: {})", email, donor.id);
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "giftwell=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();

    if config.dev_mode {
        tracing::info!("Running in DEVELOPMENT mode");
    }
    if config.stripe_webhook_secret.is_empty() {
        tracing::warn!("STRIPE_WEBHOOK_SECRET is not set; webhook deliveries will be rejected");
    }

    let db_pool = create_pool(&config.database_path).expect("Failed to create database pool");
    {
        let conn = db_pool.get().expect("Failed to get connection");
        init_db(&conn).expect("Failed to initialize database");
    }

    let state = AppState {
        db: db_pool,
        stripe: StripeClient::new(&config.stripe_secret_key, &config.stripe_webhook_secret),
        base_url: config.base_url.clone(),
        default_currency: config.default_currency.clone(),
    };

    // Seed dev data if --seed flag is passed (only in dev mode)
    if cli.seed {
        if !config.dev_mode {
            tracing::warn!("--seed flag ignored: not in dev mode (set GIFTWELL_ENV=dev)");
        } else {
            seed_dev_data(&state);
        }
    }

    let app = Router::new()
        .merge(handlers::router())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state);

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind to address");

    let cleanup_on_exit = cli.ephemeral && config.dev_mode;
    let db_path = config.database_path.clone();

    if cleanup_on_exit {
        tracing::info!("EPHEMERAL MODE: database will be deleted on exit");
    }

    tracing::info!("Giftwell server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Failed to start server");

    if cleanup_on_exit {
        tracing::info!("Cleaning up ephemeral database...");
        if let Err(e) = std::fs::remove_file(&db_path) {
            tracing::warn!("Failed to remove {}: {}", db_path, e);
        } else {
            tracing::info!("Removed {}", db_path);
        }
        let _ = std::fs::remove_file(format!("{}-wal", db_path));
        let _ = std::fs::remove_file(format!("{}-shm", db_path));
    }
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    tracing::info!("Shutdown signal received, stopping server...");
}
