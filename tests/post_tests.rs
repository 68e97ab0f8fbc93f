mod helpers;

use crate::helpers::create_fake_post;
use serde_json::json;
use serene_forum::routes::posts::GetPostsResponse;

test_with_server!(create_and_list_posts, |server, ctx_state| {
    let first = create_fake_post(&server).await;
    let second = create_fake_post(&server).await;

    let response = server.get("/api/posts").await;
    response.assert_status_success();
    let listed = response.json::<GetPostsResponse>();

    assert_eq!(listed.posts.len(), 2);
    // newest first
    assert_eq!(listed.posts[0].id, second.id);
    assert_eq!(listed.posts[1].id, first.id);
});

test_with_server!(blank_post_title_is_rejected, |server, ctx_state| {
    let response = server
        .post("/api/posts")
        .json(&json!({ "title": "   ", "content": "something" }))
        .await;
    response.assert_status_bad_request();

    let response = server.get("/api/posts").await;
    let listed = response.json::<GetPostsResponse>();
    assert!(listed.posts.is_empty());
});

test_with_server!(post_author_defaults_to_anonymous, |server, ctx_state| {
    let response = server
        .post("/api/posts")
        .json(&json!({ "title": "hello", "content": "world" }))
        .await;
    response.assert_status_success();

    let listed = server.get("/api/posts").await.json::<GetPostsResponse>();
    assert_eq!(listed.posts[0].author, "Anonymous");
});
