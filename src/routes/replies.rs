use std::convert::Infallible;
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::routing::{get, post};
use axum::{Json, Router};
use futures::stream::{self, Stream};
use futures::StreamExt;
use serde_json::json;
use tracing::debug;

use crate::entities::reply::Reply;
use crate::interfaces::replies::{RepliesGatewayInterface, ReplySubscription};
use crate::middleware::ctx::Ctx;
use crate::middleware::error::{CtxError, CtxResult};
use crate::middleware::mw_ctx::CtxState;
use crate::services::reply_feed::ReplyFeed;
use crate::services::reply_service::{ReplyInput, ReplyService};
use crate::services::reply_tree::ReplyNode;

pub fn routes() -> Router<Arc<CtxState>> {
    Router::new()
        .route("/api/posts/:post_id/replies", post(create_reply))
        .route("/api/posts/:post_id/replies", get(get_replies))
        .route("/api/posts/:post_id/replies/live", get(live_replies))
}

async fn create_reply(
    State(state): State<Arc<CtxState>>,
    ctx: Ctx,
    Path(post_id): Path<String>,
    Json(body): Json<ReplyInput>,
) -> CtxResult<Json<Reply>> {
    let service = ReplyService::new(
        &state.db.posts,
        &state.db.replies,
        &state.event_sender,
        &ctx,
    );
    let reply = service.create(&post_id, body).await?;
    Ok(Json(reply))
}

async fn get_replies(
    State(state): State<Arc<CtxState>>,
    ctx: Ctx,
    Path(post_id): Path<String>,
) -> CtxResult<Json<Vec<ReplyNode>>> {
    state
        .db
        .posts
        .must_exist(&post_id)
        .await
        .map_err(CtxError::from(&ctx))?;

    let mut feed = ReplyFeed::new(state.db.replies.clone(), post_id);
    feed.refresh().await.map_err(CtxError::from(&ctx))?;
    Ok(Json(feed.tree()))
}

enum LivePhase {
    Initial,
    Waiting,
}

/// Forest snapshots for one live view: one on subscribe, then a fresh one
/// per change notification. Ends, releasing the subscription, when the
/// change channel closes.
pub fn live_reply_forests<G: RepliesGatewayInterface>(
    feed: ReplyFeed<G>,
    subscription: ReplySubscription,
) -> impl Stream<Item = Vec<ReplyNode>> {
    stream::unfold(
        (feed, subscription, LivePhase::Initial),
        |(mut feed, mut sub, phase)| async move {
            if matches!(phase, LivePhase::Waiting) && !sub.changed().await {
                sub.release();
                return None;
            }
            if let Err(err) = feed.refresh().await {
                // keep streaming the stale snapshot, retry on the next change
                debug!(post_id = feed.post_id(), ?err, "live reply refresh failed");
            }
            Some((feed.tree(), (feed, sub, LivePhase::Waiting)))
        },
    )
}

/// SSE view of `live_reply_forests`. The subscription is released when the
/// stream ends or the client goes away.
async fn live_replies(
    State(state): State<Arc<CtxState>>,
    ctx: Ctx,
    Path(post_id): Path<String>,
) -> CtxResult<Sse<impl Stream<Item = Result<Event, Infallible>>>> {
    state
        .db
        .posts
        .must_exist(&post_id)
        .await
        .map_err(CtxError::from(&ctx))?;

    let feed = ReplyFeed::new(state.db.replies.clone(), post_id);
    let sub = state.db.replies.subscribe();

    let stream = live_reply_forests(feed, sub).map(|forest| {
        Ok(Event::default()
            .event("replies")
            .data(json!(forest).to_string()))
    });

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::{reply_at, FakeRepliesGateway};

    #[tokio::test]
    async fn live_stream_ends_when_the_change_channel_closes() {
        let notifier = FakeRepliesGateway::new(vec![]);
        let subscription = notifier.subscribe();
        let feed = ReplyFeed::new(FakeRepliesGateway::new(vec![reply_at("1", None, 1)]), "p1");
        let mut forests = Box::pin(live_reply_forests(feed, subscription));

        let first = forests.next().await.unwrap();
        assert_eq!(first.len(), 1);

        // all senders gone, the view tears down instead of idling forever
        drop(notifier);
        assert!(forests.next().await.is_none());
    }
}
