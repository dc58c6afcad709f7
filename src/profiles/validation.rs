use image::ImageFormat;
use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;
use time::{macros::format_description, Date};

use super::dto::{AvatarUpload, ProfileForm, ProfileInput};
use super::repo_types::Gender;

pub const MAX_NAME_LEN: usize = 100;
pub const MAX_AVATAR_BYTES: usize = 1024 * 1024;
pub const MIN_AGE_YEARS: i32 = 18;

/// First failing field of a profile form.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

pub fn validate_name(name: &str) -> Result<(), String> {
    lazy_static! {
        static ref NAME_RE: Regex = Regex::new(r"^[A-Za-z]+$").unwrap();
    }
    if name.is_empty() {
        return Err("must not be empty".into());
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(format!("must be at most {} characters", MAX_NAME_LEN));
    }
    if !NAME_RE.is_match(name) {
        return Err(format!("{} contains non-english letters", name));
    }
    Ok(())
}

pub fn validate_gender(value: &str) -> Result<Gender, String> {
    Gender::parse(value).ok_or_else(|| "Gender must be one of: man, woman".to_string())
}

pub fn validate_birth_date(value: &str, today: Date) -> Result<Date, String> {
    let format = format_description!("[year]-[month]-[day]");
    let date = Date::parse(value, format)
        .map_err(|_| format!("{} is not a valid date (expected YYYY-MM-DD)", value))?;

    if date.year() <= 1900 {
        return Err("Invalid birth date - year must be greater than 1900.".into());
    }
    if age_on(date, today) < MIN_AGE_YEARS {
        return Err(format!(
            "You must be at least {} years old to be considered a user.",
            MIN_AGE_YEARS
        ));
    }
    Ok(date)
}

fn age_on(born: Date, today: Date) -> i32 {
    let mut age = today.year() - born.year();
    if (today.month() as u8, today.day()) < (born.month() as u8, born.day()) {
        age -= 1;
    }
    age
}

pub fn validate_info(info: &str) -> Result<(), String> {
    if info.trim().is_empty() {
        return Err("Info field cannot be empty or contain only spaces.".into());
    }
    Ok(())
}

/// Checks size, declared type and magic bytes; returns the canonical content type.
pub fn validate_image(bytes: &[u8], declared: Option<&str>) -> Result<&'static str, String> {
    if bytes.len() > MAX_AVATAR_BYTES {
        return Err("Image size exceeds 1 MB".into());
    }
    if let Some(ct) = declared {
        if !matches!(ct, "image/jpeg" | "image/jpg" | "image/png") {
            return Err(format!(
                "Unsupported image format: {}. Use one of: JPG, JPEG, PNG.",
                ct
            ));
        }
    }
    match image::guess_format(bytes) {
        Ok(ImageFormat::Jpeg) => Ok("image/jpeg"),
        Ok(ImageFormat::Png) => Ok("image/png"),
        Ok(other) => Err(format!(
            "Unsupported image format: {:?}. Use one of: JPG, JPEG, PNG.",
            other
        )),
        Err(_) => Err("Invalid image file".into()),
    }
}

/// Validates every present field in form order and stops at the first failure.
pub fn validate_form(form: ProfileForm, today: Date) -> Result<ProfileInput, ValidationError> {
    if let Some(name) = &form.first_name {
        validate_name(name).map_err(|m| ValidationError::new("first_name", m))?;
    }
    if let Some(name) = &form.last_name {
        validate_name(name).map_err(|m| ValidationError::new("last_name", m))?;
    }
    let gender = form
        .gender
        .as_deref()
        .map(validate_gender)
        .transpose()
        .map_err(|m| ValidationError::new("gender", m))?;
    let date_of_birth = form
        .date_of_birth
        .as_deref()
        .map(|d| validate_birth_date(d, today))
        .transpose()
        .map_err(|m| ValidationError::new("date_of_birth", m))?;
    if let Some(info) = &form.info {
        validate_info(info).map_err(|m| ValidationError::new("info", m))?;
    }
    let avatar = match form.avatar {
        Some(part) => {
            let content_type = validate_image(&part.bytes, part.content_type.as_deref())
                .map_err(|m| ValidationError::new("avatar", m))?;
            Some(AvatarUpload {
                bytes: part.bytes,
                content_type,
            })
        }
        None => None,
    };

    Ok(ProfileInput {
        first_name: form.first_name.map(|n| n.to_lowercase()),
        last_name: form.last_name.map(|n| n.to_lowercase()),
        gender,
        date_of_birth,
        info: form.info,
        avatar,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profiles::dto::AvatarPart;
    use bytes::Bytes;
    use time::macros::date;

    const TODAY: Date = date!(2024 - 06 - 15);
    const JPEG_BYTES: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F', 0x00];
    const PNG_BYTES: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0x0D];

    fn form() -> ProfileForm {
        ProfileForm {
            first_name: Some("John".into()),
            last_name: Some("Doe".into()),
            gender: Some("man".into()),
            date_of_birth: Some("1990-01-15".into()),
            info: Some("Loves cinema".into()),
            avatar: None,
        }
    }

    #[test]
    fn names_must_be_english_letters() {
        assert!(validate_name("Anna").is_ok());
        assert!(validate_name("").is_err());
        assert_eq!(
            validate_name("Jöhn").unwrap_err(),
            "Jöhn contains non-english letters"
        );
        assert!(validate_name("John2").is_err());
        assert!(validate_name(&"a".repeat(MAX_NAME_LEN)).is_ok());
        assert!(validate_name(&"a".repeat(MAX_NAME_LEN + 1)).is_err());
    }

    #[test]
    fn gender_is_case_sensitive_enum() {
        assert_eq!(validate_gender("woman"), Ok(Gender::Woman));
        assert!(validate_gender("Man").is_err());
        assert!(validate_gender("other").is_err());
    }

    #[test]
    fn birth_date_rules() {
        assert_eq!(
            validate_birth_date("2006-06-15", TODAY),
            Ok(date!(2006 - 06 - 15))
        );
        // one day short of eighteen
        assert!(validate_birth_date("2006-06-16", TODAY).is_err());
        assert!(validate_birth_date("1900-12-31", TODAY).is_err());
        assert!(validate_birth_date("1901-01-01", TODAY).is_ok());
        assert!(validate_birth_date("2030-01-01", TODAY).is_err());
        assert!(validate_birth_date("15.01.1990", TODAY).is_err());
    }

    #[test]
    fn info_rejects_blank_text() {
        assert!(validate_info("hello").is_ok());
        assert!(validate_info("").is_err());
        assert!(validate_info(" \t\n").is_err());
    }

    #[test]
    fn image_checks_size_type_and_magic() {
        assert_eq!(validate_image(JPEG_BYTES, Some("image/jpeg")), Ok("image/jpeg"));
        assert_eq!(validate_image(PNG_BYTES, None), Ok("image/png"));
        assert!(validate_image(JPEG_BYTES, Some("image/gif")).is_err());
        assert!(validate_image(b"GIF89a......", None).is_err());
        assert!(validate_image(b"plain text", Some("image/png")).is_err());

        let mut big = JPEG_BYTES.to_vec();
        big.resize(MAX_AVATAR_BYTES + 1, 0);
        assert_eq!(
            validate_image(&big, Some("image/jpeg")).unwrap_err(),
            "Image size exceeds 1 MB"
        );
    }

    #[test]
    fn valid_form_is_normalised() {
        let input = validate_form(form(), TODAY).expect("valid");
        assert_eq!(input.first_name.as_deref(), Some("john"));
        assert_eq!(input.last_name.as_deref(), Some("doe"));
        assert_eq!(input.gender, Some(Gender::Man));
        assert_eq!(input.date_of_birth, Some(date!(1990 - 01 - 15)));
        assert_eq!(input.info.as_deref(), Some("Loves cinema"));
        assert!(input.avatar.is_none());
    }

    #[test]
    fn empty_form_is_valid() {
        let input = validate_form(ProfileForm::default(), TODAY).expect("valid");
        assert!(input.first_name.is_none());
        assert!(input.gender.is_none());
    }

    #[test]
    fn first_failure_wins() {
        let mut f = form();
        f.last_name = Some("D0e".into());
        f.gender = Some("robot".into());
        let err = validate_form(f, TODAY).unwrap_err();
        assert_eq!(err.field, "last_name");
        assert_eq!(err.to_string(), "last_name: D0e contains non-english letters");
    }

    #[test]
    fn avatar_content_type_comes_from_magic_bytes() {
        let mut f = form();
        f.avatar = Some(AvatarPart {
            content_type: Some("image/jpg".into()),
            bytes: Bytes::from_static(JPEG_BYTES),
        });
        let input = validate_form(f, TODAY).expect("valid");
        assert_eq!(input.avatar.expect("avatar").content_type, "image/jpeg");
    }
}
