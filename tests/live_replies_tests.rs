mod helpers;

use crate::helpers::create_fake_post;
use futures::StreamExt;
use serde_json::json;
use serene_forum::interfaces::replies::{CreateReply, RepliesGatewayInterface};
use serene_forum::routes::replies::live_reply_forests;
use serene_forum::services::reply_feed::ReplyFeed;
use std::time::Duration;
use tokio::time::timeout;

// Gateway-level variant of the live view: subscribe, write, observe the
// notification, refetch.
test_with_server!(repository_write_notifies_subscribers, |server, ctx_state| {
    let post = create_fake_post(&server).await;
    let post_id = post.id.id.to_raw();

    let mut feed = ReplyFeed::new(ctx_state.db.replies.clone(), post_id.clone());
    let mut sub = ctx_state.db.replies.subscribe();

    feed.refresh().await.unwrap();
    assert!(feed.tree().is_empty());

    let created = ctx_state
        .db
        .replies
        .create(CreateReply {
            post_id: post_id.clone(),
            parent_id: None,
            content: "fresh from another writer".to_string(),
            author: "remote".to_string(),
        })
        .await
        .unwrap();

    assert!(sub.changed().await);
    feed.refresh().await.unwrap();

    let forest = feed.tree();
    assert_eq!(forest.len(), 1);
    assert_eq!(forest[0].reply.id, created.id);
    assert_eq!(forest[0].reply.author, "remote");

    sub.release();
});

test_with_server!(http_reply_write_reaches_live_subscription, |server, ctx_state| {
    let post = create_fake_post(&server).await;
    let post_id = post.id.id.to_raw();

    let mut sub = ctx_state.db.replies.subscribe();

    let response = server
        .post(&format!("/api/posts/{post_id}/replies"))
        .json(&json!({ "content": "over http" }))
        .await;
    response.assert_status_success();

    assert!(sub.changed().await);

    let mut feed = ReplyFeed::new(ctx_state.db.replies.clone(), post_id);
    feed.refresh().await.unwrap();
    assert_eq!(feed.records().len(), 1);
    assert_eq!(feed.records()[0].content, "over http");
});

// The stream behind GET /api/posts/:post_id/replies/live: one forest on
// connect, a fresh forest per posted reply.
test_with_server!(live_stream_snapshots_on_connect_and_on_write, |server, ctx_state| {
    let post = create_fake_post(&server).await;
    let post_id = post.id.id.to_raw();

    let feed = ReplyFeed::new(ctx_state.db.replies.clone(), post_id.clone());
    let subscription = ctx_state.db.replies.subscribe();
    let mut forests = Box::pin(live_reply_forests(feed, subscription));

    let on_connect = timeout(Duration::from_secs(1), forests.next())
        .await
        .expect("initial snapshot within timeout")
        .unwrap();
    assert!(on_connect.is_empty());

    server
        .post(&format!("/api/posts/{post_id}/replies"))
        .json(&json!({ "content": "pushed live" }))
        .await
        .assert_status_success();

    let after_write = timeout(Duration::from_secs(1), forests.next())
        .await
        .expect("snapshot after the write within timeout")
        .unwrap();
    assert_eq!(after_write.len(), 1);
    assert_eq!(after_write[0].reply.content, "pushed live");
});

test_with_server!(app_event_broadcast_carries_reply_added, |server, ctx_state| {
    let post = create_fake_post(&server).await;
    let post_id = post.id.id.to_raw();

    let mut rx = ctx_state.event_sender.subscribe();

    server
        .post(&format!("/api/posts/{post_id}/replies"))
        .json(&json!({ "content": "notify me" }))
        .await
        .assert_status_success();

    let event = rx.recv().await.unwrap();
    assert_eq!(event.post_id.as_deref(), Some(post_id.as_str()));
    assert!(matches!(
        event.event,
        serene_forum::middleware::mw_ctx::AppEventType::ReplyAdded
    ));
});
