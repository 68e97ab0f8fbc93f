use async_trait::async_trait;
use serde::Serialize;
use surrealdb::sql::Thing;
use tokio::sync::broadcast;

use crate::database::client::Db;
use crate::entities::post::TABLE_NAME as POST_TABLE_NAME;
use crate::entities::reply::{Reply, TABLE_NAME};
use crate::interfaces::replies::{CreateReply, RepliesGatewayInterface, ReplySubscription};
use crate::middleware::error::{AppError, AppResult};

const CHANGE_CHANNEL_CAPACITY: usize = 64;

/// SurrealDB-backed reply gateway. Owns the table-scoped change channel:
/// every successful insert notifies all live subscriptions.
#[derive(Debug, Clone)]
pub struct RepliesRepository {
    client: Db,
    change_tx: broadcast::Sender<()>,
}

#[derive(Debug, Serialize)]
struct CreateReplyRecord {
    belongs_to: Thing,
    #[serde(skip_serializing_if = "Option::is_none")]
    parent: Option<Thing>,
    content: String,
    author: String,
}

impl RepliesRepository {
    pub fn new(client: Db) -> Self {
        let (change_tx, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self { client, change_tx }
    }

    pub(crate) async fn mutate_db(&self) -> AppResult<()> {
        let sql = format!("
    DEFINE TABLE IF NOT EXISTS {TABLE_NAME} SCHEMAFULL;
    DEFINE FIELD IF NOT EXISTS belongs_to ON TABLE {TABLE_NAME} TYPE record<{POST_TABLE_NAME}>;
    DEFINE INDEX IF NOT EXISTS belongs_to_idx ON TABLE {TABLE_NAME} COLUMNS belongs_to;
    DEFINE FIELD IF NOT EXISTS parent ON TABLE {TABLE_NAME} TYPE option<record<{TABLE_NAME}>>;
    DEFINE FIELD IF NOT EXISTS content ON TABLE {TABLE_NAME} TYPE string ASSERT string::len(string::trim($value))>0;
    DEFINE FIELD IF NOT EXISTS author ON TABLE {TABLE_NAME} TYPE string;
    DEFINE FIELD IF NOT EXISTS created_at ON TABLE {TABLE_NAME} TYPE datetime DEFAULT time::now() VALUE $before OR time::now();
    ");
        let mutation = self.client.query(sql).await?;
        mutation.check()?;
        Ok(())
    }
}

#[async_trait]
impl RepliesGatewayInterface for RepliesRepository {
    async fn list_for_post(&self, post_id: &str) -> AppResult<Vec<Reply>> {
        let data = self
            .client
            .query(format!(
                "SELECT * FROM {TABLE_NAME} WHERE belongs_to=$post ORDER BY created_at ASC;"
            ))
            .bind(("post", Thing::from((POST_TABLE_NAME, post_id))))
            .await
            .map_err(|e| AppError::Fetch {
                source: e.to_string(),
            })?
            .take::<Vec<Reply>>(0)
            .map_err(|e| AppError::Fetch {
                source: e.to_string(),
            })?;

        Ok(data)
    }

    async fn get(&self, reply_id: &str) -> AppResult<Reply> {
        let data: Option<Reply> = self
            .client
            .select((TABLE_NAME, reply_id))
            .await
            .map_err(|e| AppError::Fetch {
                source: e.to_string(),
            })?;
        data.ok_or(AppError::EntityFailIdNotFound {
            ident: reply_id.to_string(),
        })
    }

    async fn create(&self, input: CreateReply) -> AppResult<Reply> {
        let record: Option<Reply> = self
            .client
            .create(TABLE_NAME)
            .content(CreateReplyRecord {
                belongs_to: Thing::from((POST_TABLE_NAME, input.post_id.as_str())),
                parent: input
                    .parent_id
                    .as_deref()
                    .map(|id| Thing::from((TABLE_NAME, id))),
                content: input.content,
                author: input.author,
            })
            .await
            .map_err(|e| AppError::Submission {
                description: e.to_string(),
            })?;

        let reply = record.ok_or(AppError::Submission {
            description: "Reply was not created".to_string(),
        })?;

        // Table-level notification, no payload. Receivers refetch.
        let _ = self.change_tx.send(());

        Ok(reply)
    }

    fn subscribe(&self) -> ReplySubscription {
        ReplySubscription::new(self.change_tx.subscribe())
    }
}
