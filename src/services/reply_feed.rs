use tracing::debug;

use crate::entities::reply::Reply;
use crate::interfaces::replies::RepliesGatewayInterface;
use crate::middleware::error::AppResult;
use crate::services::reply_tree::{build_reply_tree, ReplyNode};

/// Authoritative local snapshot of one post's replies.
///
/// Fetches are bracketed by `begin_fetch` / `complete_fetch` with a
/// monotonically increasing sequence number, so when two fetches overlap
/// the later one wins and a stale response that resolves afterwards is
/// discarded. A failed fetch never touches the snapshot: the UI keeps
/// showing the last good data instead of flashing to empty.
#[derive(Debug, Default)]
pub struct ReplyStore {
    records: Vec<Reply>,
    next_seq: u64,
    applied_seq: u64,
}

impl ReplyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[Reply] {
        &self.records
    }

    pub fn begin_fetch(&mut self) -> u64 {
        self.next_seq += 1;
        self.next_seq
    }

    /// Applies a fetch result. Returns `false` when a newer fetch already
    /// completed and this response was dropped as stale.
    pub fn complete_fetch(&mut self, seq: u64, records: Vec<Reply>) -> bool {
        if seq <= self.applied_seq {
            debug!(seq, applied = self.applied_seq, "dropping stale reply fetch");
            return false;
        }
        self.applied_seq = seq;
        self.records = records;
        true
    }
}

/// Live view of one post's reply forest: a gateway handle, the flat
/// snapshot, and a rebuild on demand. The refetch-on-any-change loop is
/// driven from the outside (the SSE route): one `refresh` per subscription
/// notification, no diffing of change payloads.
#[derive(Debug)]
pub struct ReplyFeed<G: RepliesGatewayInterface> {
    gateway: G,
    post_id: String,
    store: ReplyStore,
}

impl<G: RepliesGatewayInterface> ReplyFeed<G> {
    pub fn new(gateway: G, post_id: impl Into<String>) -> Self {
        Self {
            gateway,
            post_id: post_id.into(),
            store: ReplyStore::new(),
        }
    }

    pub fn post_id(&self) -> &str {
        &self.post_id
    }

    pub fn records(&self) -> &[Reply] {
        self.store.records()
    }

    /// One seq-guarded fetch of the full snapshot. On error the previous
    /// snapshot stays in place and the error propagates to the caller.
    pub async fn refresh(&mut self) -> AppResult<()> {
        let seq = self.store.begin_fetch();
        let records = self.gateway.list_for_post(&self.post_id).await?;
        self.store.complete_fetch(seq, records);
        Ok(())
    }

    /// Rebuilds the forest from the latest snapshot. Pure function of the
    /// snapshot, so calling it twice yields identical output.
    pub fn tree(&self) -> Vec<ReplyNode> {
        build_reply_tree(self.store.records().to_vec())
    }
}
