use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::{middleware, Router};
use clap::Parser;
use log::{error, info};
use migration::{Migrator, MigratorTrait};
use sea_orm::{DatabaseConnection, DbErr, SqlxPostgresConnector};
use serde::Deserialize;
use sqlx::postgres::PgPoolOptions;
use sqlx::{Pool, Postgres};
use tower_http::cors::CorsLayer;

use crate::handlers::{auth_handlers, like_handlers, music_handlers, post_handlers, user_handlers};

mod audio_probe;
mod auth_middleware;
mod handlers;
mod responses;
mod sanitize;
mod storage;
mod storage_sweep;

/// Shared per-request context: the sea-orm connection for entity work, the
/// raw pool for the composite queries, and the service configuration.
#[derive(Clone)]
pub struct AppState {
    pub connection: DatabaseConnection,
    pub pool: Pool<Postgres>,
    pub config: Arc<Config>,
}

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(long, short, default_value_t = 3)]
    verbosity: usize,
    #[arg(long, short, default_value_t = false)]
    quiet: bool,
    #[arg(long, short)]
    config: String,
}

#[derive(Deserialize)]
pub struct Config {
    pub port: u16,
    pub postgres: String,
    pub storage_root: String,
    pub max_upload_mb: u64,
}

impl Config {
    pub fn storage_root_path(&self) -> &Path {
        Path::new(&self.storage_root)
    }
}

#[tokio::main]
async fn main() -> Result<(), DbErr> {
    let args = Args::parse();
    stderrlog::new()
        .verbosity(args.verbosity)
        .quiet(args.quiet)
        .timestamp(stderrlog::Timestamp::Millisecond)
        .init()
        .unwrap();

    info!("Configuration path: {}", args.config);
    let config_string = match fs::read_to_string(&args.config) {
        Ok(config_string) => config_string,
        Err(err) => {
            error!("Error opening configuration file: {}", err);
            return Ok(());
        }
    };
    let config: Config = match serde_json::from_str(&config_string) {
        Ok(config) => config,
        Err(err) => {
            error!("Malformed configuration: {}", err);
            return Ok(());
        }
    };

    let pool = match PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.postgres)
        .await
    {
        Ok(pool) => pool,
        Err(err) => {
            error!("Error connecting to database: {}", err);
            return Ok(());
        }
    };
    let connection = SqlxPostgresConnector::from_sqlx_postgres_pool(pool.to_owned());

    Migrator::up(&connection, None).await?;

    let storage_root = PathBuf::from(&config.storage_root);
    storage_sweep::run(&connection, &storage_root).await;

    let state = AppState {
        connection,
        pool,
        config: Arc::new(config),
    };

    // Leave headroom above the configured cap so the multipart framing
    // itself never trips the limit before our own size check does.
    let body_limit = (state.config.max_upload_mb as usize + 1) * 1024 * 1024;

    let protected: Router<AppState> = Router::new()
        .route(
            "/users",
            get(user_handlers::users_get).post(user_handlers::users_post),
        )
        .route(
            "/posts",
            get(post_handlers::posts_get).post(post_handlers::posts_post),
        )
        .route("/likes", post(like_handlers::likes_post))
        .route(
            "/music",
            get(music_handlers::music_get).post(music_handlers::music_post),
        )
        .layer(DefaultBodyLimit::max(body_limit))
        .route_layer(middleware::from_fn_with_state(
            state.to_owned(),
            auth_middleware::session_auth,
        ));

    let api: Router<AppState> = Router::new()
        .route(
            "/auth",
            get(auth_handlers::auth_get).post(auth_handlers::auth_post),
        )
        .merge(protected);

    let app = Router::new()
        .route("/", get(|| async { "SoundConnect API" }))
        .nest("/api", api)
        .layer(CorsLayer::permissive())
        .with_state(state.to_owned());

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", state.config.port))
        .await
        .unwrap();
    info!("Listening on 0.0.0.0:{}", state.config.port);
    info!("Welcome to SoundConnect!");
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .unwrap();
    Ok(())
}
