use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// User profile as stored in the `users` collection
///
/// Only the fields that take part in compatibility scoring are modelled;
/// anything else in the stored document is ignored on deserialization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(alias = "userId")]
    pub uid: String,
    #[serde(rename = "displayName", default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Most recent first
    #[serde(default)]
    pub emotions: Vec<String>,
    #[serde(default)]
    pub interests: Vec<String>,
    /// Stored values that aren't a usable age decode as unknown
    #[serde(default, deserialize_with = "lenient_age")]
    pub age: Option<u32>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(rename = "photoURL", default)]
    pub photo_url: Option<String>,
}

impl Profile {
    /// Age if known; zero counts as unknown
    pub fn known_age(&self) -> Option<u32> {
        self.age.filter(|age| *age > 0)
    }

    /// Location if present and non-empty
    pub fn known_location(&self) -> Option<&str> {
        non_empty(&self.location)
    }

    /// A profile is complete once it carries both a bio and a photo
    pub fn is_complete(&self) -> bool {
        non_empty(&self.bio).is_some() && non_empty(&self.photo_url).is_some()
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

fn lenient_age<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let age = match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(n)) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite() && *f >= 0.0).map(|f| f as u64)),
        Some(Value::String(s)) => s.trim().parse::<u64>().ok(),
        _ => None,
    };

    Ok(age.and_then(|a| u32::try_from(a).ok()))
}

/// Compatibility of a candidate as seen by a viewer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchScore {
    /// The candidate, never the viewer
    #[serde(rename = "userId", alias = "subjectId")]
    pub subject_id: String,
    pub score: f64,
    #[serde(rename = "commonEmotions")]
    pub common_emotions: Vec<String>,
    #[serde(rename = "commonInterests")]
    pub common_interests: Vec<String>,
}

/// Directed like record from the `likes` collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Like {
    #[serde(rename = "userId")]
    pub user_id: String,
    #[serde(rename = "likedUserId")]
    pub liked_user_id: String,
    #[serde(default)]
    pub timestamp: Option<chrono::DateTime<chrono::Utc>>,
}

impl Like {
    pub fn new(user_id: impl Into<String>, liked_user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            liked_user_id: liked_user_id.into(),
            timestamp: None,
        }
    }
}

/// Point values for each scoring component
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringWeights {
    /// Cap of the emotion component
    pub emotions: f64,
    /// Added to the emotion ratio whenever any emotion is shared
    pub emotion_floor: f64,
    /// Per shared interest, and cap of the interest ratio term
    pub interests: f64,
    pub age_within_5: f64,
    pub age_within_10: f64,
    pub age_within_15: f64,
    /// Used when either age is unknown
    pub age_unknown: f64,
    pub location: f64,
    pub complete_profile: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            emotions: 40.0,
            emotion_floor: 10.0,
            interests: 35.0,
            age_within_5: 15.0,
            age_within_10: 10.0,
            age_within_15: 5.0,
            age_unknown: 10.0,
            location: 10.0,
            complete_profile: 5.0,
        }
    }
}
