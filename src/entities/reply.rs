use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use surrealdb::sql::Thing;

pub const TABLE_NAME: &str = "reply";

/// One reply under a post. `parent` is another reply of the same post,
/// or `None` for a top-level reply. Replies are never edited or deleted
/// here, only created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reply {
    pub id: Thing,
    pub belongs_to: Thing,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<Thing>,
    pub content: String,
    pub author: String,
    pub created_at: DateTime<Utc>,
}
