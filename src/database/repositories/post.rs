use serde::Serialize;
use surrealdb::sql::Thing;

use crate::database::client::Db;
use crate::entities::post::{Post, TABLE_NAME};
use crate::middleware::error::{AppError, AppResult};
use crate::middleware::utils::db_utils::{Pagination, QryOrder};

#[derive(Debug, Clone)]
pub struct PostsRepository {
    client: Db,
}

#[derive(Debug, Serialize)]
struct CreatePostRecord {
    title: String,
    content: String,
    author: String,
}

impl PostsRepository {
    pub fn new(client: Db) -> Self {
        Self { client }
    }

    pub(crate) async fn mutate_db(&self) -> AppResult<()> {
        let sql = format!("
    DEFINE TABLE IF NOT EXISTS {TABLE_NAME} SCHEMAFULL;
    DEFINE FIELD IF NOT EXISTS title ON TABLE {TABLE_NAME} TYPE string ASSERT string::len(string::trim($value))>0;
    DEFINE FIELD IF NOT EXISTS content ON TABLE {TABLE_NAME} TYPE string ASSERT string::len(string::trim($value))>0;
    DEFINE FIELD IF NOT EXISTS author ON TABLE {TABLE_NAME} TYPE string;
    DEFINE FIELD IF NOT EXISTS created_at ON TABLE {TABLE_NAME} TYPE datetime DEFAULT time::now() VALUE $before OR time::now();
    DEFINE FIELD IF NOT EXISTS updated_at ON TABLE {TABLE_NAME} TYPE datetime DEFAULT time::now() VALUE time::now();
    ");
        let mutation = self.client.query(sql).await?;
        mutation.check()?;
        Ok(())
    }

    pub async fn create(&self, title: &str, content: &str, author: &str) -> AppResult<Post> {
        let record: Option<Post> = self
            .client
            .create(TABLE_NAME)
            .content(CreatePostRecord {
                title: title.to_string(),
                content: content.to_string(),
                author: author.to_string(),
            })
            .await?;

        record.ok_or(AppError::Generic {
            description: "Post was not created".to_string(),
        })
    }

    pub async fn list(&self, pagination: Pagination) -> AppResult<Vec<Post>> {
        let order_dir = pagination.order_dir.unwrap_or(QryOrder::DESC);
        let data = self
            .client
            .query(format!(
                "SELECT * FROM {TABLE_NAME} ORDER BY created_at {order_dir} LIMIT $limit START $start;"
            ))
            .bind(("limit", pagination.count))
            .bind(("start", pagination.start))
            .await?
            .take::<Vec<Post>>(0)?;

        Ok(data)
    }

    pub async fn get_by_id(&self, post_id: &str) -> AppResult<Post> {
        let data: Option<Post> = self.client.select((TABLE_NAME, post_id)).await?;
        data.ok_or(AppError::EntityFailIdNotFound {
            ident: post_id.to_string(),
        })
    }

    /// Existence check that keeps only the id around.
    pub async fn must_exist(&self, post_id: &str) -> AppResult<Thing> {
        self.get_by_id(post_id).await.map(|post| post.id)
    }
}
