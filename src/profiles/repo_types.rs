use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::Date;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "gender_enum", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Man,
    Woman,
}

impl Gender {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "man" => Some(Gender::Man),
            "woman" => Some(Gender::Woman),
            _ => None,
        }
    }
}

/// Row of `user_profiles`. `avatar` is the object key, never a URL.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct UserProfile {
    pub id: i64,
    pub user_id: i64,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub gender: Option<Gender>,
    pub date_of_birth: Option<Date>,
    pub info: Option<String>,
    pub avatar: Option<String>,
}

/// Insert payload; names are already lower-cased by validation.
#[derive(Debug, Clone)]
pub struct NewProfile {
    pub user_id: i64,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub gender: Option<Gender>,
    pub date_of_birth: Option<Date>,
    pub info: Option<String>,
    pub avatar: Option<String>,
}
