mod config;
mod constants;
mod domain;
mod ingest;
mod models;
mod routes;
mod services;

use anyhow::Context;
use axum::{
    Router,
    http::{HeaderValue, Method, header},
    routing::get,
};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::EnvFilter;

use config::AppConfig;
use ingest::{MetadataSource, YtDlp};
use services::news::NewsClient;
use services::otp::OtpClient;
use services::search::VideoSearchClient;

const DEFAULT_LOG_FILTER: &str = "vidshelf=info,tower_http=info";

struct AppState {
    db: PgPool,
    config: AppConfig,
    jwt_secret: Vec<u8>,
    extractor: Arc<dyn MetadataSource>,
    search: VideoSearchClient,
    news: NewsClient,
    otp: OtpClient,
}

async fn health() -> &'static str {
    "ok"
}

fn cors_layer(origin: &str) -> anyhow::Result<CorsLayer> {
    let origin: HeaderValue = origin
        .parse()
        .with_context(|| format!("CORS_ORIGIN is not a valid origin: {origin}"))?;

    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
        .allow_credentials(true))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    let config = AppConfig::from_env()?;

    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .connect(&config.database_url)
        .await
        .context("failed to connect to database")?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("failed to run migrations")?;

    let cors = config.cors_origin.as_deref().map(cors_layer).transpose()?;
    let bind_address = config.bind_address.clone();

    let search = VideoSearchClient::new(&config.video_search_url, config.http_timeout)
        .context("failed to build search client")?;
    let news = NewsClient::new(
        &config.news_api_url,
        config.news_api_key.as_deref(),
        config.http_timeout,
    )
    .context("failed to build news client")?;
    let otp = OtpClient::new(
        &config.otp_service_url,
        config.otp_api_key.as_deref(),
        config.http_timeout,
    )
    .context("failed to build otp client")?;

    let state = Arc::new(AppState {
        db: pool,
        jwt_secret: config.jwt_secret.as_bytes().to_vec(),
        extractor: Arc::new(YtDlp::new(&config.ytdlp_path, config.extraction_timeout)),
        search,
        news,
        otp,
        config,
    });

    let app = Router::new()
        .route("/health", get(health))
        .merge(routes::build_routes())
        .layer(TraceLayer::new_for_http());
    let app = match cors {
        Some(cors) => app.layer(cors),
        None => app,
    };
    let app = app.with_state(state);

    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("failed to bind to {bind_address}"))?;

    info!(address = %bind_address, "listening");
    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}
