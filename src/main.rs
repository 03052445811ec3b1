use qna_server::core::{AppState, Config};
use qna_server::create_router;
use qna_server::repositories::UserRepository;
use qna_server::store::RedisStore;
use sqlx::mysql::MySqlPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Senza secret, database o store il processo non parte
    let config = Config::from_env()?;

    // Log leggibili in sviluppo, filtro configurabile via RUST_LOG
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if config.app_env == "development" {
        tracing_subscriber::fmt().with_env_filter(filter).pretty().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    config.print_info();

    let pool = MySqlPoolOptions::new()
        .max_connections(config.max_connections)
        .max_lifetime(Duration::from_secs(config.connection_lifetime_secs))
        .connect(&config.database_url)
        .await?;

    let store = RedisStore::connect(
        &config.redis_url,
        Duration::from_secs(config.store_timeout_secs),
    )
    .await?;

    let state = Arc::new(AppState::new(
        Arc::new(UserRepository::new(pool)),
        Arc::new(store),
        config.jwt_secret.clone(),
        config.jwt_audience.clone(),
    ));

    let app = create_router(state);

    let addr = SocketAddr::new(config.server_host.parse()?, config.server_port);
    info!("Server listening on http://{}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
