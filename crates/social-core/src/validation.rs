//! Field validation shared by every write path.
//!
//! Text fields are trimmed before they are checked or stored. Failures are
//! collected per field so a single response can report all of them.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::error::DomainError;

/// Author used for posts submitted without a username.
pub const DEFAULT_POST_AUTHOR: &str = "admin";

/// Author used for comments submitted without a username.
pub const DEFAULT_COMMENT_AUTHOR: &str = "anonymous";

pub const MAX_USERNAME_LENGTH: usize = 150;

pub const REQUIRED: &str = "This field is required.";
pub const BLANK: &str = "This field may not be blank.";
pub const NOT_A_STRING: &str = "Not a valid string.";
pub const USERNAME_TOO_LONG: &str = "Ensure this field has no more than 150 characters.";
pub const INCORRECT_PK_TYPE: &str = "Incorrect type. Expected pk value.";
pub const INVALID_IMAGE: &str =
    "Upload a valid image. The file you uploaded was either not an image or a corrupted image.";
pub const EMPTY_FILE: &str = "The submitted file is empty.";
pub const FILE_TOO_LARGE: &str = "The submitted file is too large.";

pub fn missing_pk(id: i64) -> String {
    format!("Invalid pk \"{id}\" - object does not exist.")
}

/// Validation failures keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn into_inner(self) -> BTreeMap<String, Vec<String>> {
        self.0
    }

    /// `Ok(())` when nothing was recorded, otherwise a validation error.
    pub fn into_result(self) -> Result<(), DomainError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(DomainError::Validation(self))
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in &self.0 {
            for message in messages {
                if !first {
                    write!(f, "; ")?;
                }
                write!(f, "{field}: {message}")?;
                first = false;
            }
        }
        Ok(())
    }
}

/// Validate a required text field, returning the trimmed value.
pub fn required_text(errors: &mut FieldErrors, field: &str, value: Option<&str>) -> Option<String> {
    match value {
        None => {
            errors.add(field, REQUIRED);
            None
        }
        Some(raw) => present_text(errors, field, raw),
    }
}

/// Validate a text field that was supplied; blank values are rejected.
pub fn present_text(errors: &mut FieldErrors, field: &str, raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        errors.add(field, BLANK);
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Validate the optional `username` field, substituting `default` when absent.
pub fn username(errors: &mut FieldErrors, value: Option<&str>, default: &str) -> Option<String> {
    let name = present_text(errors, "username", value.unwrap_or(default))?;
    if name.chars().count() > MAX_USERNAME_LENGTH {
        errors.add("username", USERNAME_TOO_LONG);
        return None;
    }
    Some(name)
}

/// Validate a primary-key reference given as text.
pub fn primary_key(errors: &mut FieldErrors, field: &str, value: Option<&str>) -> Option<i64> {
    let raw = match value {
        None => {
            errors.add(field, REQUIRED);
            return None;
        }
        Some(raw) => raw.trim(),
    };
    if raw.is_empty() {
        errors.add(field, REQUIRED);
        return None;
    }
    match raw.parse::<i64>() {
        Ok(id) => Some(id),
        Err(_) => {
            errors.add(field, INCORRECT_PK_TYPE);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_text_trims() {
        let mut errors = FieldErrors::new();
        let value = required_text(&mut errors, "content", Some("  Hello \n"));
        assert_eq!(value.as_deref(), Some("Hello"));
        assert!(errors.is_empty());
    }

    #[test]
    fn required_text_reports_missing_and_blank() {
        let mut errors = FieldErrors::new();
        assert!(required_text(&mut errors, "content", None).is_none());
        assert!(required_text(&mut errors, "title", Some("   ")).is_none());
        assert_eq!(errors.get("content"), Some(&[REQUIRED.to_string()][..]));
        assert_eq!(errors.get("title"), Some(&[BLANK.to_string()][..]));
    }

    #[test]
    fn username_falls_back_to_default() {
        let mut errors = FieldErrors::new();
        let name = username(&mut errors, None, DEFAULT_POST_AUTHOR);
        assert_eq!(name.as_deref(), Some("admin"));
    }

    #[test]
    fn username_rejects_blank_and_long_names() {
        let mut errors = FieldErrors::new();
        assert!(username(&mut errors, Some(" "), DEFAULT_COMMENT_AUTHOR).is_none());
        assert_eq!(errors.get("username"), Some(&[BLANK.to_string()][..]));

        let mut errors = FieldErrors::new();
        let long = "x".repeat(MAX_USERNAME_LENGTH + 1);
        assert!(username(&mut errors, Some(&long), DEFAULT_COMMENT_AUTHOR).is_none());
        assert_eq!(errors.get("username"), Some(&[USERNAME_TOO_LONG.to_string()][..]));
    }

    #[test]
    fn primary_key_parses_or_reports_type() {
        let mut errors = FieldErrors::new();
        assert_eq!(primary_key(&mut errors, "post", Some(" 42 ")), Some(42));
        assert!(primary_key(&mut errors, "post", Some("abc")).is_none());
        assert_eq!(errors.get("post"), Some(&[INCORRECT_PK_TYPE.to_string()][..]));
    }

    #[test]
    fn display_joins_every_message() {
        let mut errors = FieldErrors::new();
        errors.add("content", BLANK);
        errors.add("post", missing_pk(9));
        assert_eq!(
            errors.to_string(),
            "content: This field may not be blank.; post: Invalid pk \"9\" - object does not exist."
        );
    }

    #[test]
    fn into_result_is_ok_when_empty() {
        assert!(FieldErrors::new().into_result().is_ok());
        let mut errors = FieldErrors::new();
        errors.add("content", REQUIRED);
        assert!(matches!(
            errors.into_result(),
            Err(DomainError::Validation(_))
        ));
    }
}
