//! Forum posts and bounded reply trees.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// Forum post; root posts open a topic, the rest are replies
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ForumPost {
    pub id: i64,
    pub user_id: i64,
    pub author: String,
    pub title: String,
    pub content: String,
    pub parent_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ForumPost {
    pub fn is_topic(&self) -> bool {
        self.parent_id.is_none()
    }
}

/// New post or reply
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct ForumPostInput {
    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    #[schema(example = "Which oil for a 2012 Camry?")]
    pub title: String,
    #[validate(length(min = 1, message = "Content is required"))]
    pub content: String,
    /// Post being replied to
    pub parent_id: Option<i64>,
}

/// Post with its nested replies
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ForumThread {
    pub post: ForumPost,
    pub replies: Vec<ForumThread>,
    /// Replies exist below the depth limit and were not included
    pub truncated: bool,
}

impl ForumThread {
    /// Number of posts in this subtree, root included
    pub fn len(&self) -> usize {
        1 + self.replies.iter().map(ForumThread::len).sum::<usize>()
    }

    pub fn is_empty(&self) -> bool {
        false
    }
}

/// Assemble a reply tree under `root` from a flat list of descendants.
///
/// Replies are ordered oldest first. Levels deeper than `max_depth` are
/// dropped and flagged with `truncated` on their closest kept ancestor.
/// Posts whose parent is not reachable from `root` are ignored.
pub fn build_thread(root: ForumPost, descendants: Vec<ForumPost>, max_depth: usize) -> ForumThread {
    let mut children: HashMap<i64, Vec<ForumPost>> = HashMap::new();
    for post in descendants {
        if let Some(parent_id) = post.parent_id {
            children.entry(parent_id).or_default().push(post);
        }
    }
    for replies in children.values_mut() {
        replies.sort_by_key(|p| (p.created_at, p.id));
    }
    attach(root, &mut children, 0, max_depth)
}

fn attach(
    post: ForumPost,
    children: &mut HashMap<i64, Vec<ForumPost>>,
    depth: usize,
    max_depth: usize,
) -> ForumThread {
    let direct = children.remove(&post.id).unwrap_or_default();
    if depth >= max_depth {
        return ForumThread {
            post,
            truncated: !direct.is_empty(),
            replies: Vec::new(),
        };
    }
    let replies = direct
        .into_iter()
        .map(|reply| attach(reply, children, depth + 1, max_depth))
        .collect();
    ForumThread {
        post,
        replies,
        truncated: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn post(id: i64, parent_id: Option<i64>, minutes: i64) -> ForumPost {
        let at = Utc::now() + Duration::minutes(minutes);
        ForumPost {
            id,
            user_id: 1,
            author: "ivan".into(),
            title: format!("post {}", id),
            content: "text".into(),
            parent_id,
            created_at: at,
            updated_at: at,
        }
    }

    #[test]
    fn test_build_thread_nests_replies_in_order() {
        let root = post(1, None, 0);
        let thread = build_thread(
            root,
            vec![post(3, Some(1), 2), post(2, Some(1), 1), post(4, Some(2), 3)],
            10,
        );

        assert_eq!(thread.len(), 4);
        assert_eq!(thread.replies[0].post.id, 2);
        assert_eq!(thread.replies[1].post.id, 3);
        assert_eq!(thread.replies[0].replies[0].post.id, 4);
        assert!(!thread.truncated);
    }

    #[test]
    fn test_build_thread_respects_depth_limit() {
        let root = post(1, None, 0);
        let chain: Vec<ForumPost> = (2..=6).map(|id| post(id, Some(id - 1), id)).collect();
        let thread = build_thread(root, chain, 2);

        assert_eq!(thread.len(), 3);
        let deepest = &thread.replies[0].replies[0];
        assert_eq!(deepest.post.id, 3);
        assert!(deepest.truncated);
        assert!(deepest.replies.is_empty());
    }

    #[test]
    fn test_orphans_are_ignored() {
        let thread = build_thread(post(1, None, 0), vec![post(9, Some(99), 1)], 5);
        assert_eq!(thread.len(), 1);
    }
}
