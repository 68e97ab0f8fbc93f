use crate::database::client::Database;
use serde::Serialize;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;
use tokio::sync::broadcast;

#[derive(Debug, Clone, Serialize)]
pub enum AppEventType {
    PostAdded,
    ReplyAdded,
}

#[derive(Debug, Clone, Serialize)]
pub struct AppEvent {
    pub event: AppEventType,
    pub post_id: Option<String>,
}

pub struct CtxState {
    pub db: Database,
    pub event_sender: broadcast::Sender<AppEvent>,
}

impl Debug for CtxState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("CtxState")
    }
}

pub fn create_ctx_state(db: Database) -> Arc<CtxState> {
    let (event_sender, _) = broadcast::channel(100);
    Arc::new(CtxState { db, event_sender })
}
