//! Response envelopes shared by both API surfaces.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Success envelope carrying only a message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Error body: a single message, or messages keyed by field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ErrorResponse {
    Message { error: String },
    Fields { errors: BTreeMap<String, Vec<String>> },
}

impl ErrorResponse {
    pub fn message(error: impl Into<String>) -> Self {
        Self::Message {
            error: error.into(),
        }
    }

    pub fn fields(errors: BTreeMap<String, Vec<String>>) -> Self {
        Self::Fields { errors }
    }

    pub fn internal_error() -> Self {
        Self::message("Internal server error")
    }

    /// One line describing the error, for display.
    pub fn summary(&self) -> String {
        match self {
            Self::Message { error } => error.clone(),
            Self::Fields { errors } => errors
                .iter()
                .map(|(field, messages)| format!("{field}: {}", messages.join(" ")))
                .collect::<Vec<_>>()
                .join("; "),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_shapes() {
        let json = serde_json::to_string(&ErrorResponse::message("Post not found")).unwrap();
        assert_eq!(json, r#"{"error":"Post not found"}"#);

        let mut errors = BTreeMap::new();
        errors.insert("content".to_string(), vec!["This field is required.".to_string()]);
        let json = serde_json::to_string(&ErrorResponse::fields(errors)).unwrap();
        assert_eq!(json, r#"{"errors":{"content":["This field is required."]}}"#);
    }

    #[test]
    fn test_parse_either_shape() {
        let msg: ErrorResponse = serde_json::from_str(r#"{"error":"Content is required"}"#).unwrap();
        assert!(matches!(&msg, ErrorResponse::Message { error } if error == "Content is required"));
        assert_eq!(msg.summary(), "Content is required");

        let fields: ErrorResponse =
            serde_json::from_str(r#"{"errors":{"post":["Incorrect type. Expected pk value."]}}"#)
                .unwrap();
        assert!(matches!(fields, ErrorResponse::Fields { .. }));
        assert_eq!(fields.summary(), "post: Incorrect type. Expected pk value.");
    }
}
