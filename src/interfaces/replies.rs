use async_trait::async_trait;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;

use crate::entities::reply::Reply;
use crate::middleware::error::AppResult;

/// Payload for creating one reply. `id` and `created_at` are assigned by
/// the store.
#[derive(Debug, Clone)]
pub struct CreateReply {
    pub post_id: String,
    pub parent_id: Option<String>,
    pub content: String,
    pub author: String,
}

/// Storage seam for the reply table. The production implementation is
/// `RepliesRepository`; tests inject in-memory fakes.
#[async_trait]
pub trait RepliesGatewayInterface: Send + Sync {
    /// All replies of one post, ordered by `created_at` ascending. An empty
    /// post yields an empty list, not an error.
    async fn list_for_post(&self, post_id: &str) -> AppResult<Vec<Reply>>;

    /// One reply by its raw id, `EntityFailIdNotFound` when absent.
    async fn get(&self, reply_id: &str) -> AppResult<Reply>;

    async fn create(&self, input: CreateReply) -> AppResult<Reply>;

    /// Change channel scoped to the whole reply table. Fires on any write,
    /// with no payload; consumers refetch the post they display.
    fn subscribe(&self) -> ReplySubscription;
}

#[async_trait]
impl<T: RepliesGatewayInterface + ?Sized> RepliesGatewayInterface for std::sync::Arc<T> {
    async fn list_for_post(&self, post_id: &str) -> AppResult<Vec<Reply>> {
        (**self).list_for_post(post_id).await
    }

    async fn get(&self, reply_id: &str) -> AppResult<Reply> {
        (**self).get(reply_id).await
    }

    async fn create(&self, input: CreateReply) -> AppResult<Reply> {
        (**self).create(input).await
    }

    fn subscribe(&self) -> ReplySubscription {
        (**self).subscribe()
    }
}

/// A live handle on the reply-table change channel. Dropping it (or calling
/// `release`) unsubscribes, so a torn-down view can never receive another
/// notification.
#[derive(Debug)]
pub struct ReplySubscription {
    rx: broadcast::Receiver<()>,
}

impl ReplySubscription {
    pub fn new(rx: broadcast::Receiver<()>) -> Self {
        Self { rx }
    }

    /// Waits for the next change notification. Returns `false` once the
    /// channel is closed. A lagged receiver coalesces the missed
    /// notifications into a single `true`; the follow-up refetch covers
    /// them all.
    pub async fn changed(&mut self) -> bool {
        match self.rx.recv().await {
            Ok(()) => true,
            Err(RecvError::Lagged(_)) => true,
            Err(RecvError::Closed) => false,
        }
    }

    pub fn release(self) {}
}
