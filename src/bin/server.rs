use std::{
    fs::OpenOptions,
    net::{IpAddr, SocketAddr},
    sync::{Arc, Mutex},
};

use axum::{
    Router,
    extract::{MatchedPath, Request},
    middleware,
};
use axum_server::Handle;
use clap::Parser;
use rusqlite::Connection;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{EnvFilter, Layer, filter, layer::SubscriberExt, util::SubscriberInitExt};

use ledger_rs::{
    AppState, BalancePolicy, CompanyDeletePolicy, LedgerConfig, build_router, graceful_shutdown,
    logging_middleware,
};

/// The REST API server for ledger_rs.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the application SQLite database.
    #[arg(long, env = "DB_PATH")]
    db_path: String,

    /// The address to listen on.
    #[arg(long, env = "HOST", default_value = "127.0.0.1")]
    host: IpAddr,

    /// The port to serve the API from.
    #[arg(short, long, env = "PORT", default_value_t = 3000)]
    port: u16,

    /// How the balances of other transactions are handled when a transaction
    /// is edited or deleted.
    #[arg(long, env = "BALANCE_POLICY", value_enum, default_value_t)]
    balance_policy: BalancePolicy,

    /// What happens to a company's transactions when the company is deleted.
    #[arg(long, env = "COMPANY_DELETE_POLICY", value_enum, default_value_t)]
    company_delete_policy: CompanyDeletePolicy,

    /// Reject transactions for companies that have not been created.
    #[arg(long, env = "REQUIRE_KNOWN_COMPANY")]
    require_known_company: bool,

    /// File path for the debug log.
    #[arg(long, env = "LOG_PATH", default_value = "debug.log")]
    log_path: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    setup_logging(&args.log_path)?;

    let addr = SocketAddr::new(args.host, args.port);
    let ledger_config = LedgerConfig {
        balance_policy: args.balance_policy,
        company_delete_policy: args.company_delete_policy,
        require_known_company: args.require_known_company,
    };
    tracing::info!("Starting with {ledger_config:?}");

    let connection = Connection::open(&args.db_path)?;
    let state = AppState::new(connection, ledger_config)?;
    let db_connection = state.db_connection.clone();

    let handle = Handle::new();
    tokio::spawn(graceful_shutdown(handle.clone()));

    let router = add_tracing_layer(build_router(state))
        .layer(middleware::from_fn(logging_middleware));

    tracing::info!("HTTP server listening on {}", addr);
    axum_server::bind(addr)
        .handle(handle)
        .serve(router.into_make_service())
        .await?;

    close_database(db_connection);

    Ok(())
}

fn setup_logging(log_path: &str) -> Result<(), std::io::Error> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let stdout_log = tracing_subscriber::fmt::layer()
        .pretty()
        .with_filter(env_filter);

    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)?;

    let debug_log = tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .with_writer(Arc::new(log_file))
        .with_filter(filter::LevelFilter::DEBUG);

    tracing_subscriber::registry()
        .with(stdout_log)
        .with(debug_log)
        .init();

    Ok(())
}

fn add_tracing_layer(router: Router) -> Router {
    let tracing_layer = TraceLayer::new_for_http()
        .make_span_with(|req: &Request| {
            let method = req.method();
            let uri = req.uri();

            let matched_path = req
                .extensions()
                .get::<MatchedPath>()
                .map(|matched_path| matched_path.as_str());

            tracing::debug_span!("request", %method, %uri, matched_path)
        })
        // Errors are logged where they are turned into responses.
        .on_failure(());

    router.layer(tracing_layer)
}

fn close_database(db_connection: Arc<Mutex<Connection>>) {
    let connection = match Arc::try_unwrap(db_connection) {
        Ok(mutex) => mutex,
        Err(_) => {
            tracing::warn!("Database connection is still in use, skipping close.");
            return;
        }
    };

    match connection.into_inner() {
        Ok(connection) => {
            if let Err((_, error)) = connection.close() {
                tracing::error!("Could not close the database connection: {error}");
            }
        }
        Err(error) => tracing::error!("Database lock was poisoned: {error}"),
    }
}
