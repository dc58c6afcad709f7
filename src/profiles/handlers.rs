use axum::{
    extract::{
        multipart::MultipartRejection, rejection::PathRejection, DefaultBodyLimit, Multipart,
        Path, State,
    },
    http::StatusCode,
    routing::post,
    Json, Router,
};
use time::OffsetDateTime;
use tracing::{instrument, warn};

use super::dto::{AvatarPart, ProfileForm, ProfileResponse};
use super::services;
use super::validation::{validate_form, ValidationError};
use crate::{auth::AuthUser, error::ApiError, state::AppState};

const BODY_LIMIT: usize = 10 * 1024 * 1024;

pub fn profile_routes() -> Router<AppState> {
    Router::new()
        .route("/users/:user_id/profile/", post(create_profile))
        .layer(DefaultBodyLimit::max(BODY_LIMIT))
}

/// POST /users/:user_id/profile/ (multipart)
/// Fields: first_name, last_name, gender, date_of_birth, info, avatar (file)
#[instrument(skip(state, multipart))]
pub async fn create_profile(
    State(state): State<AppState>,
    AuthUser(actor_id): AuthUser,
    path: Result<Path<i64>, PathRejection>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<ProfileResponse>), ApiError> {
    let Path(user_id) = path.map_err(|e| {
        warn!(error = %e, "bad user_id in path");
        ApiError::Validation(ValidationError {
            field: "user_id",
            message: "must be an integer".into(),
        })
    })?;
    let multipart = multipart.map_err(|e| {
        warn!(error = %e, "multipart rejected");
        invalid_body()
    })?;
    let form = read_form(multipart).await?;

    let today = OffsetDateTime::now_utc().date();
    let input = validate_form(form, today).map_err(|e| {
        warn!(field = e.field, reason = %e.message, "profile validation failed");
        e
    })?;

    let profile = services::create_profile(&state, actor_id, user_id, input).await?;
    Ok((StatusCode::CREATED, Json(profile)))
}

async fn read_form(mut multipart: Multipart) -> Result<ProfileForm, ApiError> {
    let mut form = ProfileForm::default();
    while let Some(field) = multipart.next_field().await.map_err(|e| {
        warn!(error = %e, "multipart read failed");
        invalid_body()
    })? {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };
        if name == "avatar" {
            let file_name = field.file_name().map(str::to_string);
            let content_type = field.content_type().map(str::to_string);
            let bytes = field.bytes().await.map_err(|_| invalid_body())?;
            // an unselected file input arrives as an empty, nameless part
            let empty = bytes.is_empty() && file_name.as_deref().unwrap_or("").is_empty();
            form.avatar = (!empty).then_some(AvatarPart {
                content_type,
                bytes,
            });
            continue;
        }
        let slot = match name.as_str() {
            "first_name" => &mut form.first_name,
            "last_name" => &mut form.last_name,
            "gender" => &mut form.gender,
            "date_of_birth" => &mut form.date_of_birth,
            "info" => &mut form.info,
            _ => continue,
        };
        *slot = Some(field.text().await.map_err(|_| invalid_body())?);
    }
    Ok(form)
}

fn invalid_body() -> ApiError {
    ApiError::Validation(ValidationError {
        field: "body",
        message: "Invalid multipart body".into(),
    })
}
