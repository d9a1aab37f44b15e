use std::collections::HashSet;
use crate::models::{Profile, MatchScore, ScoringWeights};

/// Calculate the compatibility (0-100) of `candidate` from `viewer`'s point of view
///
/// Scoring formula (default weights):
/// score = min(
///     emotion_score +        # min(shared/max_len * 40 + 10, 40) if any shared
///     interest_score +       # 35 per shared + min(shared/max_len * 35, 35)
///     age_score +            # 15 / 10 / 5 / 0 by gap, 10 if either unknown
///     location_bonus +       # 10 on case-insensitive equality
///     completeness_bonus,    # 5 if candidate has bio and photo
///     100
/// )
///
/// Neither profile is modified and no state is kept between calls.
pub fn calculate_compatibility(
    viewer: &Profile,
    candidate: &Profile,
    weights: &ScoringWeights,
) -> MatchScore {
    let common_emotions = shared_labels(&viewer.emotions, &candidate.emotions);
    let common_interests = shared_labels(&viewer.interests, &candidate.interests);

    let total = emotion_score(
        common_emotions.len(),
        viewer.emotions.len(),
        candidate.emotions.len(),
        weights,
    ) + interest_score(
        common_interests.len(),
        viewer.interests.len(),
        candidate.interests.len(),
        weights,
    ) + age_score(viewer.known_age(), candidate.known_age(), weights)
        + location_score(viewer.known_location(), candidate.known_location(), weights)
        + completeness_score(candidate, weights);

    MatchScore {
        subject_id: candidate.uid.clone(),
        score: total.min(100.0).max(0.0),
        common_emotions,
        common_interests,
    }
}

/// Labels of `ours` that also appear in `theirs`
///
/// Keeps the first-occurrence order of `ours` and reports each label once.
pub fn shared_labels(ours: &[String], theirs: &[String]) -> Vec<String> {
    let theirs: HashSet<&str> = theirs.iter().map(String::as_str).collect();
    let mut seen: HashSet<&str> = HashSet::with_capacity(ours.len());
    let mut shared = Vec::new();

    for label in ours {
        if theirs.contains(label.as_str()) && seen.insert(label.as_str()) {
            shared.push(label.clone());
        }
    }

    shared
}

/// `weight` scaled by shared / max(ours, theirs)
#[inline]
fn overlap_points(shared: usize, ours: usize, theirs: usize, weight: f64) -> f64 {
    let denominator = ours.max(theirs);
    if denominator == 0 {
        return 0.0;
    }
    shared as f64 * weight / denominator as f64
}

/// Emotion component
///
/// The ratio term replaces any per-emotion credit, so a single shared
/// emotion is worth at least the floor and the total never exceeds the cap.
#[inline]
fn emotion_score(shared: usize, ours: usize, theirs: usize, weights: &ScoringWeights) -> f64 {
    if shared == 0 || ours == 0 || theirs == 0 {
        return 0.0;
    }

    (overlap_points(shared, ours, theirs, weights.emotions) + weights.emotion_floor)
        .min(weights.emotions)
}

/// Interest component
///
/// Every shared interest earns the full weight, and the capped ratio term
/// is added on top of that.
#[inline]
fn interest_score(shared: usize, ours: usize, theirs: usize, weights: &ScoringWeights) -> f64 {
    let per_match = shared as f64 * weights.interests;

    if shared == 0 || ours == 0 || theirs == 0 {
        return per_match;
    }

    per_match + overlap_points(shared, ours, theirs, weights.interests).min(weights.interests)
}

#[inline]
fn age_score(ours: Option<u32>, theirs: Option<u32>, weights: &ScoringWeights) -> f64 {
    match (ours, theirs) {
        (Some(a), Some(b)) => match a.abs_diff(b) {
            0..=5 => weights.age_within_5,
            6..=10 => weights.age_within_10,
            11..=15 => weights.age_within_15,
            _ => 0.0,
        },
        _ => weights.age_unknown,
    }
}

#[inline]
fn location_score(ours: Option<&str>, theirs: Option<&str>, weights: &ScoringWeights) -> f64 {
    match (ours, theirs) {
        (Some(a), Some(b)) if a.to_lowercase() == b.to_lowercase() => weights.location,
        _ => 0.0,
    }
}

#[inline]
fn completeness_score(candidate: &Profile, weights: &ScoringWeights) -> f64 {
    if candidate.is_complete() {
        weights.complete_profile
    } else {
        0.0
    }
}
