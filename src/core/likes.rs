use std::collections::HashSet;
use crate::models::Like;

/// Likes touching one user, split by direction
///
/// Built from the raw like records of the document store. Mutual matches and
/// pending likes are derived by set membership instead of rescanning lists.
#[derive(Debug, Clone, Default)]
pub struct LikeGraph {
    user_id: String,
    liked: HashSet<String>,
    /// First-occurrence order of incoming likes
    liked_by: Vec<String>,
    liked_by_set: HashSet<String>,
}

impl LikeGraph {
    /// An empty graph for `user_id`
    pub fn empty(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            ..Default::default()
        }
    }

    /// Build the graph of `user_id` from like records
    ///
    /// Records that don't involve `user_id`, and self-likes, are ignored.
    pub fn from_likes(user_id: &str, likes: &[Like]) -> Self {
        let mut graph = Self::empty(user_id);

        for like in likes {
            if like.user_id == like.liked_user_id {
                continue;
            }

            if like.user_id == user_id {
                graph.liked.insert(like.liked_user_id.clone());
            } else if like.liked_user_id == user_id
                && graph.liked_by_set.insert(like.user_id.clone())
            {
                graph.liked_by.push(like.user_id.clone());
            }
        }

        graph
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Whether the owner liked `other`
    pub fn has_liked(&self, other: &str) -> bool {
        self.liked.contains(other)
    }

    /// Whether `other` liked the owner
    pub fn is_liked_by(&self, other: &str) -> bool {
        self.liked_by_set.contains(other)
    }

    /// Both users liked each other
    pub fn is_mutual(&self, other: &str) -> bool {
        self.has_liked(other) && self.is_liked_by(other)
    }

    /// Users forming a mutual like with the owner
    pub fn mutual_matches(&self) -> Vec<String> {
        self.liked_by
            .iter()
            .filter(|id| self.liked.contains(id.as_str()))
            .cloned()
            .collect()
    }

    /// Users who liked the owner and haven't been liked back
    pub fn pending_likes(&self) -> Vec<String> {
        self.liked_by
            .iter()
            .filter(|id| !self.liked.contains(id.as_str()))
            .cloned()
            .collect()
    }
}
