use std::sync::Arc;

use axum::extract::{Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::entities::post::Post;
use crate::middleware::ctx::Ctx;
use crate::middleware::error::{AppError, CtxError, CtxResult};
use crate::middleware::mw_ctx::{AppEvent, AppEventType, CtxState};
use crate::middleware::utils::db_utils::{Pagination, QryOrder};
use crate::services::reply_service::ANONYMOUS_AUTHOR;

pub fn routes() -> Router<Arc<CtxState>> {
    Router::new()
        .route("/api/posts", post(create_post))
        .route("/api/posts", get(get_posts))
}

#[derive(Debug, Deserialize, Validate)]
pub struct PostInput {
    #[validate(length(min = 1, message = "Title cannot be empty"))]
    pub title: String,
    #[validate(length(min = 1, message = "Content cannot be empty"))]
    pub content: String,
    pub author: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct GetPostsQuery {
    pub order_dir: Option<QryOrder>,
    pub start: Option<u32>,
    pub count: Option<u16>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GetPostsResponse {
    pub posts: Vec<Post>,
}

async fn create_post(
    State(state): State<Arc<CtxState>>,
    ctx: Ctx,
    Json(body): Json<PostInput>,
) -> CtxResult<Json<Post>> {
    body.validate().map_err(CtxError::from(&ctx))?;
    if body.title.trim().is_empty() || body.content.trim().is_empty() {
        return Err(ctx.to_ctx_error(AppError::Generic {
            description: "Title and content cannot be empty".to_string(),
        }));
    }

    let author = body
        .author
        .filter(|a| !a.trim().is_empty())
        .unwrap_or_else(|| ANONYMOUS_AUTHOR.to_string());

    let created = state
        .db
        .posts
        .create(&body.title, &body.content, &author)
        .await
        .map_err(CtxError::from(&ctx))?;

    let _ = state.event_sender.send(AppEvent {
        event: AppEventType::PostAdded,
        post_id: Some(created.id.id.to_raw()),
    });

    Ok(Json(created))
}

async fn get_posts(
    State(state): State<Arc<CtxState>>,
    ctx: Ctx,
    Query(query): Query<GetPostsQuery>,
) -> CtxResult<Json<GetPostsResponse>> {
    let defaults = Pagination::default();
    let pagination = Pagination {
        order_dir: query.order_dir,
        start: query.start.unwrap_or(defaults.start),
        count: query.count.unwrap_or(defaults.count),
    };
    let posts = state
        .db
        .posts
        .list(pagination)
        .await
        .map_err(CtxError::from(&ctx))?;

    Ok(Json(GetPostsResponse { posts }))
}
