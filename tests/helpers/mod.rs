use std::sync::Arc;

use axum_test::{TestServer, TestServerConfig};
use fake::faker::lorem::en::Sentence;
use fake::Fake;
use serde_json::json;

use serene_forum::database::client::{Database, DbConfig};
use serene_forum::entities::post::Post;
use serene_forum::middleware::mw_ctx::{create_ctx_state, CtxState};

#[allow(dead_code)]
pub async fn create_test_server() -> (TestServer, Arc<CtxState>) {
    let db = Database::connect(DbConfig {
        url: "mem://",
        database: "database",
        namespace: "namespace",
        username: None,
        password: None,
    })
    .await;

    serene_forum::init::run_migrations(&db)
        .await
        .expect("migrations run");

    let ctx_state = create_ctx_state(db);
    let routes_all = serene_forum::init::main_router(&ctx_state);

    let server = TestServer::new_with_config(
        routes_all,
        TestServerConfig {
            expect_success_by_default: false,
            ..Default::default()
        },
    )
    .expect("Failed to create test server");

    (server, ctx_state)
}

#[allow(dead_code)]
pub async fn create_fake_post(server: &TestServer) -> Post {
    let title: String = Sentence(2..5).fake();
    let content: String = Sentence(4..9).fake();
    let response = server
        .post("/api/posts")
        .json(&json!({ "title": title, "content": content, "author": "tester" }))
        .await;
    response.assert_status_success();
    response.json::<Post>()
}

#[macro_export]
macro_rules! test_with_server {
    ($name:ident, |$server:ident, $ctx_state:ident| $body:block) => {
        #[tokio::test(flavor = "multi_thread")]
        #[serial_test::serial]
        async fn $name() {
            let ($server, $ctx_state) = $crate::helpers::create_test_server().await;
            let _ = &$ctx_state;
            $body
        }
    };
}
