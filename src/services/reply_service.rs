use serde::Deserialize;
use tokio::sync::broadcast::Sender;
use validator::Validate;

use crate::database::repositories::post::PostsRepository;
use crate::entities::reply::Reply;
use crate::interfaces::replies::{CreateReply, RepliesGatewayInterface};
use crate::middleware::ctx::Ctx;
use crate::middleware::error::{AppError, AppResult, CtxError, CtxResult};
use crate::middleware::mw_ctx::{AppEvent, AppEventType};

pub const ANONYMOUS_AUTHOR: &str = "Anonymous";

#[derive(Debug, Deserialize, Validate)]
pub struct ReplyInput {
    #[validate(length(min = 1, message = "Reply cannot be empty"))]
    pub content: String,
    pub parent_id: Option<String>,
    pub author: Option<String>,
}

/// Server-side write path for replies: checks the post and the parent,
/// creates through the gateway and publishes the change on the app event
/// channel.
pub struct ReplyService<'a, G: RepliesGatewayInterface> {
    posts_repository: &'a PostsRepository,
    replies_gateway: &'a G,
    event_sender: &'a Sender<AppEvent>,
    ctx: &'a Ctx,
}

impl<'a, G: RepliesGatewayInterface> ReplyService<'a, G> {
    pub fn new(
        posts_repository: &'a PostsRepository,
        replies_gateway: &'a G,
        event_sender: &'a Sender<AppEvent>,
        ctx: &'a Ctx,
    ) -> Self {
        Self {
            posts_repository,
            replies_gateway,
            event_sender,
            ctx,
        }
    }

    pub async fn create(&self, post_id: &str, input: ReplyInput) -> CtxResult<Reply> {
        input.validate().map_err(CtxError::from(self.ctx))?;
        if input.content.trim().is_empty() {
            return Err(self.ctx.to_ctx_error(AppError::Generic {
                description: "Reply cannot be empty".to_string(),
            }));
        }

        let post_thing = self
            .posts_repository
            .must_exist(post_id)
            .await
            .map_err(CtxError::from(self.ctx))?;

        // a nested reply must stay under the same post
        if let Some(parent_id) = input.parent_id.as_deref() {
            let parent = match self.replies_gateway.get(parent_id).await {
                Ok(parent) => Some(parent),
                Err(AppError::EntityFailIdNotFound { .. }) => None,
                Err(err) => return Err(self.ctx.to_ctx_error(err)),
            };
            let same_post = parent.map(|p| p.belongs_to == post_thing).unwrap_or(false);
            if !same_post {
                return Err(self.ctx.to_ctx_error(AppError::Generic {
                    description: "Parent reply does not belong to this post".to_string(),
                }));
            }
        }

        let reply = self
            .replies_gateway
            .create(CreateReply {
                post_id: post_id.to_string(),
                parent_id: input.parent_id,
                content: input.content,
                author: input
                    .author
                    .filter(|a| !a.trim().is_empty())
                    .unwrap_or_else(|| ANONYMOUS_AUTHOR.to_string()),
            })
            .await
            .map_err(CtxError::from(self.ctx))?;

        let _ = self.event_sender.send(AppEvent {
            event: AppEventType::ReplyAdded,
            post_id: Some(post_thing.id.to_raw()),
        });

        Ok(reply)
    }
}

/// Outcome of one composer submit attempt.
#[derive(Debug, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The draft went through; the input was cleared.
    Created,
    /// Nothing was sent: blank draft or a submission already in flight.
    Ignored,
}

/// Draft state for one reply box (a post, or one reply being answered).
///
/// Blank drafts never reach the gateway. While a submission is in flight
/// re-entrant submits are rejected, so a slow network cannot double-post.
/// On failure the typed text is preserved for a retry.
#[derive(Debug)]
pub struct ReplyComposer {
    post_id: String,
    parent_id: Option<String>,
    author: String,
    draft: String,
    submitting: bool,
}

impl ReplyComposer {
    pub fn new(post_id: impl Into<String>, parent_id: Option<String>) -> Self {
        Self {
            post_id: post_id.into(),
            parent_id,
            author: ANONYMOUS_AUTHOR.to_string(),
            draft: String::new(),
            submitting: false,
        }
    }

    pub fn set_author(&mut self, author: impl Into<String>) {
        self.author = author.into();
    }

    pub fn set_draft(&mut self, draft: impl Into<String>) {
        self.draft = draft.into();
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// Starts a submission: `None` for a blank draft or while another
    /// submission is in flight, otherwise the payload to send.
    pub fn begin_submit(&mut self) -> Option<CreateReply> {
        if self.submitting || self.draft.trim().is_empty() {
            return None;
        }
        self.submitting = true;
        Some(CreateReply {
            post_id: self.post_id.clone(),
            parent_id: self.parent_id.clone(),
            content: self.draft.clone(),
            author: self.author.clone(),
        })
    }

    /// Ends a submission. Success clears the draft; failure keeps it.
    pub fn finish_submit(&mut self, result: &AppResult<Reply>) {
        self.submitting = false;
        if result.is_ok() {
            self.draft.clear();
        }
    }

    /// Full submit cycle against a gateway. The caller refreshes its feed
    /// afterwards (or relies on the live subscription) to see the write.
    pub async fn submit<G: RepliesGatewayInterface>(
        &mut self,
        gateway: &G,
    ) -> AppResult<SubmitOutcome> {
        let Some(payload) = self.begin_submit() else {
            return Ok(SubmitOutcome::Ignored);
        };
        let result = gateway.create(payload).await;
        self.finish_submit(&result);
        result.map(|_| SubmitOutcome::Created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::FakeRepliesGateway;
    use std::sync::atomic::Ordering;

    #[tokio::test]
    async fn blank_draft_is_a_local_no_op() {
        let gateway = FakeRepliesGateway::new(vec![]);
        let mut composer = ReplyComposer::new("p1", None);
        composer.set_draft("   ");

        let outcome = composer.submit(&gateway).await.unwrap();

        assert_eq!(outcome, SubmitOutcome::Ignored);
        assert_eq!(gateway.create_calls(), 0);
        // displayed text unchanged
        assert_eq!(composer.draft(), "   ");
    }

    #[tokio::test]
    async fn successful_submit_clears_the_draft() {
        let gateway = FakeRepliesGateway::new(vec![]);
        let mut composer = ReplyComposer::new("p1", None);
        composer.set_draft("hello there");

        let outcome = composer.submit(&gateway).await.unwrap();

        assert_eq!(outcome, SubmitOutcome::Created);
        assert_eq!(gateway.create_calls(), 1);
        assert_eq!(composer.draft(), "");
        assert!(!composer.is_submitting());
    }

    #[tokio::test]
    async fn failed_submit_preserves_the_draft() {
        let gateway = FakeRepliesGateway::new(vec![]);
        gateway.fail_creates.store(1, Ordering::SeqCst);
        let mut composer = ReplyComposer::new("p1", None);
        composer.set_draft("do not lose me");

        let err = composer.submit(&gateway).await.unwrap_err();

        assert!(matches!(err, AppError::Submission { .. }));
        assert_eq!(composer.draft(), "do not lose me");
        // ready for a retry
        assert!(!composer.is_submitting());
    }

    #[test]
    fn in_flight_submission_rejects_reentrant_submit() {
        let mut composer = ReplyComposer::new("p1", None);
        composer.set_draft("first click");

        let payload = composer.begin_submit();
        assert!(payload.is_some());
        // second click while the request is still out
        assert!(composer.begin_submit().is_none());
    }
}
