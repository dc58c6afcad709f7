use anyhow::Context;
use sqlx::PgPool;

use super::repo_types::{NewProfile, UserProfile};

pub async fn find_by_user(db: &PgPool, user_id: i64) -> anyhow::Result<Option<UserProfile>> {
    let row = sqlx::query_as::<_, UserProfile>(
        r#"
        SELECT id, user_id, first_name, last_name, gender, date_of_birth, info, avatar
          FROM user_profiles
         WHERE user_id = $1
        "#,
    )
    .bind(user_id)
    .fetch_optional(db)
    .await
    .context("select profile by user")?;
    Ok(row)
}

/// Inserts the profile unless the user already has one; `None` means the
/// unique constraint on `user_id` won.
pub async fn insert_if_absent(
    db: &PgPool,
    profile: &NewProfile,
) -> anyhow::Result<Option<UserProfile>> {
    let mut tx = db.begin().await.context("begin tx")?;

    let inserted = sqlx::query_as::<_, UserProfile>(
        r#"
        INSERT INTO user_profiles
            (user_id, first_name, last_name, gender, date_of_birth, info, avatar)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        ON CONFLICT (user_id) DO NOTHING
        RETURNING id, user_id, first_name, last_name, gender, date_of_birth, info, avatar
        "#,
    )
    .bind(profile.user_id)
    .bind(profile.first_name.as_deref())
    .bind(profile.last_name.as_deref())
    .bind(profile.gender)
    .bind(profile.date_of_birth)
    .bind(profile.info.as_deref())
    .bind(profile.avatar.as_deref())
    .fetch_optional(&mut *tx)
    .await;

    match inserted {
        Ok(row) => {
            tx.commit().await.context("commit tx")?;
            Ok(row)
        }
        Err(e) => {
            if let Err(rollback) = tx.rollback().await {
                tracing::warn!(error = %rollback, "rollback failed");
            }
            Err(anyhow::Error::new(e).context("insert profile"))
        }
    }
}
