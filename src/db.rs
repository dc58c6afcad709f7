use anyhow::Context;
use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::auth::User;
use crate::profiles::{
    repo,
    repo_types::{NewProfile, UserProfile},
};

pub async fn connect(database_url: &str) -> anyhow::Result<PgPool> {
    PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await
        .context("connect to database")
}

/// Everything the profile endpoint reads from or writes to the database.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn find_user(&self, id: i64) -> anyhow::Result<Option<User>>;
    async fn find_profile_by_user(&self, user_id: i64) -> anyhow::Result<Option<UserProfile>>;
    /// Returns `Ok(None)` when a profile for `profile.user_id` already exists.
    async fn insert_profile_if_absent(
        &self,
        profile: &NewProfile,
    ) -> anyhow::Result<Option<UserProfile>>;
}

#[derive(Clone)]
pub struct PgProfileStore {
    db: PgPool,
}

impl PgProfileStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ProfileStore for PgProfileStore {
    async fn find_user(&self, id: i64) -> anyhow::Result<Option<User>> {
        User::find_by_id(&self.db, id).await
    }

    async fn find_profile_by_user(&self, user_id: i64) -> anyhow::Result<Option<UserProfile>> {
        repo::find_by_user(&self.db, user_id).await
    }

    async fn insert_profile_if_absent(
        &self,
        profile: &NewProfile,
    ) -> anyhow::Result<Option<UserProfile>> {
        repo::insert_if_absent(&self.db, profile).await
    }
}
