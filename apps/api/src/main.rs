mod auth;
mod config;
mod db;
mod errors;
mod goals;
mod models;
mod networking;
mod partners;
mod profile;
mod resources;
mod routes;
mod state;
mod store;
#[cfg(test)]
mod test_support;

use anyhow::{Context, Result};
use aws_config::Region;
use aws_sdk_s3::config::Credentials;
use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use std::sync::Arc;

use crate::auth::{JwtKeys, LogMailer, OAuthClient};
use crate::config::{Config, S3Config};
use crate::db::create_pool;
use crate::profile::storage::{LocalPhotoStore, PhotoStore, S3PhotoStore};
use crate::routes::build_router;
use crate::state::AppState;
use crate::store::tokens::RedisTokenStore;
use crate::store::{DocumentStore, PgDocumentStore};

#[derive(Debug, Parser)]
#[command(name = "careerdesk", version, about = "Job-search and networking CRM API")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP API (default).
    Serve,
    /// Hand every document owned by a legacy development id to a real account.
    MigrateOwner {
        /// Owner id the documents were created under, e.g. the old `x-dev-user-id` value.
        #[arg(long)]
        from: String,
        /// Id of the registered user that should own them.
        #[arg(long)]
        to: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(config).await,
        Command::MigrateOwner { from, to } => migrate_owner(&config, &from, &to).await,
    }
}

async fn serve(config: Config) -> Result<()> {
    info!("Starting CareerDesk API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url).await?;
    let store: Arc<dyn DocumentStore> = Arc::new(PgDocumentStore::new(db));

    // Initialize Redis
    let redis = redis::Client::open(config.redis_url.clone())
        .context("REDIS_URL is not a valid Redis URL")?;
    info!("Redis client initialized");

    // Photos go to S3 / MinIO when configured, local disk otherwise
    let photos: Arc<dyn PhotoStore> = match &config.s3 {
        Some(s3) => {
            let client = build_s3_client(s3).await;
            info!("S3 photo storage initialized (bucket: {})", s3.bucket);
            Arc::new(S3PhotoStore::new(client, &s3.bucket, &s3.endpoint))
        }
        None => {
            info!("Local photo storage at {}", config.upload_dir);
            Arc::new(LocalPhotoStore::new(&config.upload_dir, &config.public_base_url))
        }
    };

    let oauth = OAuthClient::from_config(&config)?;
    info!(
        "OAuth providers: google={} microsoft={}",
        config.google.is_some(),
        config.microsoft.is_some()
    );

    // Build app state
    let state = AppState {
        store,
        tokens: Arc::new(RedisTokenStore::new(redis)),
        photos,
        mailer: Arc::new(LogMailer),
        oauth,
        jwt: JwtKeys::new(&config.jwt_secret, config.jwt_expiry_secs),
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict CORS to FRONTEND_URL once the client is served from a fixed origin

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Reassigns everything created under a legacy owner id in one statement.
async fn migrate_owner(config: &Config, from: &str, to: &str) -> Result<()> {
    if from == to {
        anyhow::bail!("--from and --to must differ");
    }
    let db = create_pool(&config.database_url).await?;
    let moved = PgDocumentStore::new(db)
        .reassign_owner(from, to)
        .await
        .with_context(|| format!("failed to reassign documents from {from} to {to}"))?;
    info!("Reassigned {moved} documents from {from} to {to}");
    Ok(())
}

/// Constructs an S3 client configured for MinIO (local) or AWS (production).
async fn build_s3_client(s3: &S3Config) -> aws_sdk_s3::Client {
    let credentials = Credentials::new(
        &s3.access_key_id,
        &s3.secret_access_key,
        None,
        None,
        "careerdesk-static",
    );

    let s3_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(Region::new("us-east-1"))
        .credentials_provider(credentials)
        .endpoint_url(&s3.endpoint)
        .load()
        .await;

    aws_sdk_s3::Client::new(&s3_config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults_to_serve() {
        let cli = Cli::try_parse_from(["careerdesk"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_cli_migrate_owner_args() {
        let cli = Cli::try_parse_from([
            "careerdesk",
            "migrate-owner",
            "--from",
            "dev-user",
            "--to",
            "6f1c",
        ])
        .unwrap();
        match cli.command {
            Some(Command::MigrateOwner { from, to }) => {
                assert_eq!(from, "dev-user");
                assert_eq!(to, "6f1c");
            }
            other => panic!("unexpected command: {other:?}"),
        }
        assert!(Cli::try_parse_from(["careerdesk", "migrate-owner", "--from", "x"]).is_err());
    }
}
