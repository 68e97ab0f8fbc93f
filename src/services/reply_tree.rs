use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::warn;

use crate::entities::reply::Reply;

/// Nesting cap. Chains deeper than this (and cyclic data, which would
/// otherwise recurse forever) are cut off and their records promoted to
/// orphan roots.
pub const MAX_REPLY_DEPTH: usize = 50;

/// One node of the materialized reply forest. Rebuilt from scratch on every
/// fetch; consumers never mutate it in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplyNode {
    #[serde(flatten)]
    pub reply: Reply,
    pub children: Vec<ReplyNode>,
}

/// Builds the reply forest for one post out of its flat record list.
///
/// Records are grouped by parent id (one O(n) pass), siblings sorted
/// ascending by `created_at` with a stable sort, so equal timestamps keep
/// the gateway read order. Every input record ends up in exactly one node:
/// records whose ancestor chain cannot be resolved - a dangling parent, a
/// cycle, or a chain deeper than `MAX_REPLY_DEPTH` - become childless
/// orphan roots appended after the regular roots, and are logged rather
/// than dropped.
pub fn build_reply_tree(replies: Vec<Reply>) -> Vec<ReplyNode> {
    let mut by_parent: HashMap<Option<String>, Vec<Reply>> = HashMap::new();
    for reply in replies {
        let key = reply.parent.as_ref().map(|p| p.to_raw());
        by_parent.entry(key).or_default().push(reply);
    }
    for group in by_parent.values_mut() {
        group.sort_by_key(|r| r.created_at);
    }

    let roots = by_parent.remove(&None).unwrap_or_default();
    let mut forest: Vec<ReplyNode> = roots
        .into_iter()
        .map(|r| attach_children(r, &mut by_parent, 1))
        .collect();

    if !by_parent.is_empty() {
        let mut orphans: Vec<Reply> = by_parent.into_values().flatten().collect();
        orphans.sort_by_key(|r| r.created_at);
        warn!(
            orphaned = orphans.len(),
            "reply tree contains unreachable or over-deep records, promoting them to roots"
        );
        forest.extend(orphans.into_iter().map(|reply| ReplyNode {
            reply,
            children: Vec::new(),
        }));
    }

    forest
}

fn attach_children(
    reply: Reply,
    by_parent: &mut HashMap<Option<String>, Vec<Reply>>,
    depth: usize,
) -> ReplyNode {
    let children = if depth >= MAX_REPLY_DEPTH {
        Vec::new()
    } else {
        by_parent
            .remove(&Some(reply.id.to_raw()))
            .unwrap_or_default()
            .into_iter()
            .map(|child| attach_children(child, by_parent, depth + 1))
            .collect()
    };
    ReplyNode { reply, children }
}
