use tracing::{info, warn};

use super::dto::{ProfileInput, ProfileResponse};
use super::repo_types::NewProfile;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

const INACTIVE_USER: &str = "User not found or not active.";
const DUPLICATE_PROFILE: &str = "User already has a profile.";

pub fn avatar_key(user_id: i64) -> String {
    format!("avatars/{}_avatar.jpg", user_id)
}

/// Authorizes `actor_id` against `user_id`, uploads and signs the avatar, then inserts the profile.
///
/// The early duplicate check only saves an upload; the insert itself is
/// conflict-aware, so two racing requests still produce a single row.
pub async fn create_profile(
    st: &AppState,
    actor_id: i64,
    user_id: i64,
    input: ProfileInput,
) -> ApiResult<ProfileResponse> {
    let actor = st
        .store
        .find_user(actor_id)
        .await
        .map_err(|e| ApiError::internal("An error occurred during profile creation.", e))?
        .filter(|u| u.is_active)
        .ok_or_else(|| {
            warn!(actor_id, "acting user missing or inactive");
            ApiError::Unauthorized(INACTIVE_USER.into())
        })?;

    if actor.id != user_id && !actor.is_admin() {
        warn!(actor_id, user_id, group = ?actor.group, "profile creation forbidden");
        return Err(ApiError::Forbidden(
            "You don't have permission to edit this profile.".into(),
        ));
    }

    st.store
        .find_user(user_id)
        .await
        .map_err(|e| ApiError::internal("An error occurred during profile creation.", e))?
        .filter(|u| u.is_active)
        .ok_or_else(|| {
            warn!(user_id, "target user missing or inactive");
            ApiError::Unauthorized(INACTIVE_USER.into())
        })?;

    let existing = st
        .store
        .find_profile_by_user(user_id)
        .await
        .map_err(|e| ApiError::internal("An error occurred during profile creation.", e))?;
    if existing.is_some() {
        warn!(user_id, "profile already exists");
        return Err(ApiError::Conflict(DUPLICATE_PROFILE.into()));
    }

    let (avatar, avatar_url) = match input.avatar {
        Some(upload) => {
            let key = avatar_key(user_id);
            st.storage
                .put_object(&key, upload.bytes, upload.content_type)
                .await
                .map_err(|e| {
                    ApiError::internal("Failed to upload avatar. Please try again later.", e)
                })?;
            info!(user_id, %key, "avatar uploaded");
            // signed before the insert so a failure leaves no row behind
            let url = st
                .storage
                .presign_get(&key, st.config.s3.presign_ttl_secs)
                .await
                .map_err(|e| ApiError::internal("Failed to generate avatar URL.", e))?;
            (Some(key), Some(url))
        }
        None => (None, None),
    };

    let new_profile = NewProfile {
        user_id,
        first_name: input.first_name,
        last_name: input.last_name,
        gender: input.gender,
        date_of_birth: input.date_of_birth,
        info: input.info,
        avatar,
    };

    let profile = st
        .store
        .insert_profile_if_absent(&new_profile)
        .await
        .map_err(|e| ApiError::internal("An error occurred during profile creation.", e))?
        .ok_or_else(|| {
            warn!(user_id, "profile inserted concurrently");
            ApiError::Conflict(DUPLICATE_PROFILE.into())
        })?;

    info!(user_id, profile_id = profile.id, actor_id, "profile created");
    Ok(ProfileResponse::from_profile(profile, avatar_url))
}
