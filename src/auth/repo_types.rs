use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, sqlx::Type)]
#[sqlx(type_name = "user_group_enum", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UserGroup {
    User,
    Moderator,
    Admin,
}

/// User record joined with its group. Accounts are managed elsewhere; read-only here.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    pub id: i64,                      // unique user ID
    pub is_active: bool,              // false until the account is activated
    #[sqlx(rename = "group_name")]
    pub group: UserGroup,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.group == UserGroup::Admin
    }
}
