use crate::models::{Profile, MatchScore, ScoringWeights};
use crate::core::{likes::LikeGraph, scoring::calculate_compatibility};

/// Number of matches returned by [`Ranker::top_matches`] when callers have no preference
pub const DEFAULT_TOP_MATCHES: usize = 10;

/// Result of the discovery process
#[derive(Debug)]
pub struct RankResult {
    pub matches: Vec<MatchScore>,
    pub total_candidates: usize,
}

/// Discovery ranking - orders candidates by compatibility with a viewer
///
/// # Pipeline Stages
/// 1. Exclude the viewer (and, for discovery, existing mutual matches)
/// 2. Score every remaining candidate
/// 3. Stable sort by descending score
/// 4. Truncate
#[derive(Debug, Clone)]
pub struct Ranker {
    weights: ScoringWeights,
}

impl Ranker {
    pub fn new(weights: ScoringWeights) -> Self {
        Self { weights }
    }

    pub fn with_default_weights() -> Self {
        Self {
            weights: ScoringWeights::default(),
        }
    }

    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }

    /// Score a single candidate
    pub fn score(&self, viewer: &Profile, candidate: &Profile) -> MatchScore {
        calculate_compatibility(viewer, candidate, &self.weights)
    }

    /// Rank all candidates except the viewer, best first
    ///
    /// Candidates with equal scores keep their input order.
    pub fn rank(&self, viewer: &Profile, candidates: &[Profile]) -> Vec<MatchScore> {
        self.rank_filtered(viewer, candidates, |_| true)
    }

    /// The first `limit` entries of [`Ranker::rank`]
    pub fn top_matches(
        &self,
        viewer: &Profile,
        candidates: &[Profile],
        limit: usize,
    ) -> Vec<MatchScore> {
        let mut ranked = self.rank(viewer, candidates);
        ranked.truncate(limit);
        ranked
    }

    /// Rank candidates for the discovery feed
    ///
    /// Like [`Ranker::top_matches`], but also drops anyone already forming
    /// a mutual match with the viewer.
    ///
    /// # Arguments
    /// * `viewer` - The user browsing the feed
    /// * `candidates` - Profiles fetched from the store, in store order
    /// * `likes` - Like graph of the viewer
    /// * `limit` - Maximum number of matches to return
    pub fn discover(
        &self,
        viewer: &Profile,
        candidates: &[Profile],
        likes: &LikeGraph,
        limit: usize,
    ) -> RankResult {
        let total_candidates = candidates.len();

        let mut matches = self.rank_filtered(viewer, candidates, |candidate| {
            !likes.is_mutual(&candidate.uid)
        });
        matches.truncate(limit);

        tracing::debug!(
            "Ranked {} of {} candidates for {}",
            matches.len(),
            total_candidates,
            viewer.uid
        );

        RankResult {
            matches,
            total_candidates,
        }
    }

    fn rank_filtered<F>(&self, viewer: &Profile, candidates: &[Profile], keep: F) -> Vec<MatchScore>
    where
        F: Fn(&Profile) -> bool,
    {
        let mut scored: Vec<MatchScore> = candidates
            .iter()
            .filter(|candidate| candidate.uid != viewer.uid)
            .filter(|candidate| keep(*candidate))
            .map(|candidate| self.score(viewer, candidate))
            .collect();

        // sort_by is stable, ties keep input order
        scored.sort_by(|a, b| b.score.total_cmp(&a.score));

        scored
    }
}

impl Default for Ranker {
    fn default() -> Self {
        Self::with_default_weights()
    }
}
