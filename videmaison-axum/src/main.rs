use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::http::{HeaderName, HeaderValue, Method, header};
use clap::Parser;
use tokio::sync::watch;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use videmaison::{AppConfig, MailerConfig, VideMaisonBuilder};
use videmaison_axum::{AppState, PushHub, create_router};

/// Vide Maison backend server
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Command to execute (defaults to `serve`)
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Run the HTTP server
    Serve,
    /// Run database migrations and exit
    Migrate,
    /// Print version information
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Version => {
            println!("Vide Maison v{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Commands::Migrate => {
            init_tracing();
            migrate().await
        }
        Commands::Serve => {
            init_tracing();
            serve().await
        }
    }
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "videmaison=info,videmaison_axum=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

async fn migrate() -> anyhow::Result<()> {
    let config = AppConfig::from_env()?;
    let app = VideMaisonBuilder::new()
        .with_sqlite(&config.database_url)
        .await?
        .with_jwt(config.jwt_config())
        .build()
        .await?;

    app.migrate().await?;
    tracing::info!(database_url = %config.database_url, "Migrations applied");
    Ok(())
}

async fn serve() -> anyhow::Result<()> {
    let config = AppConfig::from_env()?;
    let push = Arc::new(PushHub::default());

    let builder = VideMaisonBuilder::new()
        .with_sqlite(&config.database_url)
        .await?
        .with_jwt(config.jwt_config())
        .with_push_channel(push.clone())
        .apply_migrations(true);

    let builder = match MailerConfig::from_env() {
        Ok(mailer) => builder.with_mailer(mailer),
        Err(e) => {
            tracing::warn!(error = %e, "Mailer configuration invalid, running without email");
            builder
        }
    };
    let app = Arc::new(builder.build().await?);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let cleanup_tasks = app.start_background_tasks(shutdown_rx);

    let router = create_router(AppState::new(app, push))
        .layer(cors_layer(&config.cors_origins))
        .layer(TraceLayer::new_for_http());

    let bind_address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("failed to bind {bind_address}"))?;
    tracing::info!("Vide Maison listening on http://{}", bind_address);

    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    let _ = shutdown_tx.send(true);
    for task in cleanup_tasks {
        let _ = task.await;
    }
    tracing::info!("Server stopped");
    Ok(())
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static("x-csrf-token"),
        ])
        .expose_headers([header::RETRY_AFTER])
        .allow_credentials(true)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
