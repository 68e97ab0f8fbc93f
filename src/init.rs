use std::sync::Arc;

use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{http::StatusCode, Router};
use tower_http::trace::TraceLayer;

use crate::database::client::Database;
use crate::middleware::error::AppResult;
use crate::middleware::mw_ctx::CtxState;
use crate::routes::{events, posts, replies};

pub async fn run_migrations(database: &Database) -> AppResult<()> {
    database.posts.mutate_db().await?;
    database.replies.mutate_db().await?;
    Ok(())
}

pub fn main_router(ctx_state: &Arc<CtxState>) -> Router {
    Router::new()
        .route("/hc", get(get_hc))
        .merge(posts::routes())
        .merge(replies::routes())
        .merge(events::routes())
        .with_state(ctx_state.clone())
        .layer(TraceLayer::new_for_http())
}

async fn get_hc() -> Response {
    const VERSION: &str = env!("CARGO_PKG_VERSION");
    (StatusCode::OK, format!("v{}", VERSION)).into_response()
}
