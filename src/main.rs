//! Exam Engine service entrypoint.

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use exam_engine::{api, config::Config, db, services::scheduler, AppState};

/// OBI Exam Engine - assessment execution microservice
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Port to bind to (overrides the PORT environment variable)
    #[arg(short, long, value_name = "PORT")]
    port: Option<u16>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("exam_engine={log_level}").into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Exam Engine starting...");

    let mut config = Config::from_env()?;
    if let Some(port) = args.port {
        config.port = port;
    }

    info!("Connecting to database...");
    let pool = db::connect(&config).await?;
    db::migrate(&pool).await?;
    info!("Database ready");

    scheduler::spawn(pool.clone());

    let state = AppState::new(pool);
    let app = api::build_router(state);

    let bind_addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("Listening on http://{bind_addr}");

    axum::serve(listener, app).await?;

    Ok(())
}
