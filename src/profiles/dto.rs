use bytes::Bytes;
use serde::Serialize;
use time::Date;

use super::repo_types::{Gender, UserProfile};

time::serde::format_description!(iso_date, Date, "[year]-[month]-[day]");

/// File part of the multipart request, as received.
#[derive(Debug, Clone)]
pub struct AvatarPart {
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

/// Raw multipart fields of `POST /users/:user_id/profile/`.
#[derive(Debug, Clone, Default)]
pub struct ProfileForm {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub gender: Option<String>,
    pub date_of_birth: Option<String>,
    pub info: Option<String>,
    pub avatar: Option<AvatarPart>,
}

#[derive(Debug, Clone)]
pub struct AvatarUpload {
    pub bytes: Bytes,
    pub content_type: &'static str,
}

/// Validated form, ready to persist.
#[derive(Debug, Clone)]
pub struct ProfileInput {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub gender: Option<Gender>,
    pub date_of_birth: Option<Date>,
    pub info: Option<String>,
    pub avatar: Option<AvatarUpload>,
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub id: i64,
    pub user_id: i64,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub gender: Option<Gender>,
    #[serde(with = "iso_date::option")]
    pub date_of_birth: Option<Date>,
    pub info: Option<String>,
    pub avatar: Option<String>, // presigned URL
}

impl ProfileResponse {
    pub fn from_profile(profile: UserProfile, avatar_url: Option<String>) -> Self {
        Self {
            id: profile.id,
            user_id: profile.user_id,
            first_name: profile.first_name,
            last_name: profile.last_name,
            gender: profile.gender,
            date_of_birth: profile.date_of_birth,
            info: profile.info,
            avatar: avatar_url,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn response_renders_plain_date_and_lowercase_gender() {
        let profile = UserProfile {
            id: 1,
            user_id: 5,
            first_name: Some("john".into()),
            last_name: None,
            gender: Some(Gender::Woman),
            date_of_birth: Some(date!(1990 - 01 - 15)),
            info: None,
            avatar: Some("avatars/5_avatar.jpg".into()),
        };
        let res = ProfileResponse::from_profile(profile, Some("https://cdn/x".into()));
        let json = serde_json::to_value(&res).unwrap();
        assert_eq!(json["date_of_birth"], "1990-01-15");
        assert_eq!(json["gender"], "woman");
        assert_eq!(json["avatar"], "https://cdn/x");
        assert!(json["last_name"].is_null());
    }
}
