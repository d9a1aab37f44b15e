use serde::{Deserialize, Serialize};
use validator::Validate;
use crate::models::domain::Profile;

/// Request to score one candidate against a viewer
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ScoreRequest {
    #[validate(custom(function = "validate_profile_uid"))]
    pub viewer: Profile,
    #[validate(custom(function = "validate_profile_uid"))]
    pub candidate: Profile,
}

/// Request to rank a caller-supplied candidate list
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RankRequest {
    #[validate(custom(function = "validate_profile_uid"))]
    pub viewer: Profile,
    #[serde(default)]
    pub candidates: Vec<Profile>,
    #[validate(range(min = 1, max = 1000))]
    pub limit: Option<u16>,
}

/// Request to rank the stored user base for a viewer
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct DiscoverRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "user_id", rename = "userId")]
    pub user_id: String,
    #[validate(range(min = 1, max = 1000))]
    pub limit: Option<u16>,
}

/// Query string carrying a user id
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UserQuery {
    #[validate(length(min = 1))]
    #[serde(alias = "user_id", rename = "userId")]
    pub user_id: String,
}

fn validate_profile_uid(profile: &Profile) -> Result<(), validator::ValidationError> {
    if profile.uid.trim().is_empty() {
        return Err(validator::ValidationError::new("empty_uid"));
    }
    Ok(())
}
