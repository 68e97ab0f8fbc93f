use std::convert::Infallible;
use std::sync::Arc;

use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::routing::get;
use axum::Router;
use futures::Stream;
use serde_json::json;
use tokio_stream::{wrappers::BroadcastStream, StreamExt};

use crate::middleware::mw_ctx::CtxState;

pub fn routes() -> Router<Arc<CtxState>> {
    Router::new().route("/api/events", get(get_events))
}

/// Process-wide event stream: every post or reply write, as JSON.
async fn get_events(
    State(state): State<Arc<CtxState>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = state.event_sender.subscribe();
    let stream = BroadcastStream::new(rx).filter_map(|msg| match msg {
        Err(_) => None,
        Ok(msg) => Some(Ok(Event::default().data(json!(msg).to_string()))),
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}
