use std::net::{Ipv4Addr, SocketAddr};

use tracing::info;
use tracing_subscriber::EnvFilter;

use serene_forum::config::AppConfig;
use serene_forum::database::client::{Database, DbConfig};
use serene_forum::init;
use serene_forum::middleware::error::AppResult;
use serene_forum::middleware::mw_ctx::create_ctx_state;

#[tokio::main]
async fn main() -> AppResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::from_env();

    let db = Database::connect(DbConfig {
        url: &config.db_url,
        database: &config.db_database,
        namespace: &config.db_namespace,
        username: config.db_username.as_deref(),
        password: config.db_password.as_deref(),
    })
    .await;

    init::run_migrations(&db).await?;

    let ctx_state = create_ctx_state(db);
    let routes_all = init::main_router(&ctx_state);

    let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, config.listen_port));
    info!("->> LISTENING on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind listener");

    axum::serve(listener, routes_all.into_make_service())
        .await
        .expect("server error");

    Ok(())
}
