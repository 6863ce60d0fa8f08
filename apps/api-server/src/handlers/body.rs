//! Request body decoding for the write endpoints.
//!
//! Posts and comments accept JSON, urlencoded forms and multipart forms.
//! All three decode into one [`FormData`] so handlers read fields the same
//! way regardless of encoding.

use std::collections::HashMap;

use actix_multipart::Multipart;
use actix_web::{HttpMessage, HttpRequest, web};
use futures::{StreamExt, TryStreamExt};
use social_core::ports::ImageUpload;
use social_core::validation::FieldErrors;

use crate::middleware::error::{AppError, AppResult};

/// Room for text fields on top of the upload limit.
pub const FORM_OVERHEAD_BYTES: usize = 64 * 1024;

/// A submitted scalar value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    /// An explicit JSON `null`.
    Null,
    /// A JSON array, object or boolean.
    Invalid,
}

/// Decoded request body: scalar fields plus uploaded files.
#[derive(Debug, Default)]
pub struct FormData {
    fields: HashMap<String, FieldValue>,
    files: HashMap<String, ImageUpload>,
}

impl FormData {
    /// Text value of a field, `None` if absent or null.
    pub fn text(&self, name: &str) -> Option<&str> {
        match self.fields.get(name) {
            Some(FieldValue::Text(value)) => Some(value.as_str()),
            _ => None,
        }
    }

    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    /// Fail with `message` for every listed field that holds a non-text value.
    pub fn expect_text(&self, fields: &[(&str, &str)]) -> AppResult<()> {
        let mut errors = FieldErrors::new();
        for &(name, message) in fields {
            if let Some(FieldValue::Invalid) = self.fields.get(name) {
                errors.add(name, message);
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(errors))
        }
    }

    pub fn take_file(&mut self, name: &str) -> Option<ImageUpload> {
        self.files.remove(name)
    }

    fn insert_text(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields
            .insert(name.into(), FieldValue::Text(value.into()));
    }
}

/// Decode the request body according to its content type.
pub async fn read_form(
    req: &HttpRequest,
    payload: web::Payload,
    limit: usize,
) -> AppResult<FormData> {
    let mime = req
        .mime_type()
        .map_err(|_| AppError::BadRequest("Malformed Content-Type header.".to_string()))?;

    let Some(mime) = mime else {
        let body = read_bytes(payload, limit).await?;
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(FormData::default());
        }
        return Err(unsupported(""));
    };

    match (mime.type_().as_str(), mime.subtype().as_str()) {
        ("application", "json") => parse_json(&read_bytes(payload, limit).await?),
        ("application", "x-www-form-urlencoded") => {
            Ok(parse_urlencoded(&read_bytes(payload, limit).await?))
        }
        ("multipart", "form-data") => read_multipart(req, payload, limit).await,
        _ => Err(unsupported(mime.essence_str())),
    }
}

fn unsupported(content_type: &str) -> AppError {
    AppError::UnsupportedMediaType(format!(
        "Unsupported media type \"{content_type}\" in request."
    ))
}

async fn read_bytes(mut payload: web::Payload, limit: usize) -> AppResult<Vec<u8>> {
    let mut body = Vec::new();
    while let Some(chunk) = payload.next().await {
        let chunk = chunk.map_err(|e| AppError::BadRequest(format!("Malformed request: {e}")))?;
        if body.len() + chunk.len() > limit {
            return Err(AppError::PayloadTooLarge);
        }
        body.extend_from_slice(&chunk);
    }
    Ok(body)
}

fn parse_json(body: &[u8]) -> AppResult<FormData> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(FormData::default());
    }

    let value: serde_json::Value = serde_json::from_slice(body)
        .map_err(|e| AppError::BadRequest(format!("JSON parse error - {e}")))?;
    let serde_json::Value::Object(object) = value else {
        return Err(AppError::BadRequest(
            "Invalid data. Expected a dictionary.".to_string(),
        ));
    };

    let mut form = FormData::default();
    for (name, value) in object {
        let value = match value {
            serde_json::Value::Null => FieldValue::Null,
            serde_json::Value::String(text) => FieldValue::Text(text),
            serde_json::Value::Number(number) => FieldValue::Text(number.to_string()),
            _ => FieldValue::Invalid,
        };
        form.fields.insert(name, value);
    }
    Ok(form)
}

fn parse_urlencoded(body: &[u8]) -> FormData {
    let mut form = FormData::default();
    for (name, value) in url::form_urlencoded::parse(body) {
        form.insert_text(name, value);
    }
    form
}

async fn read_multipart(
    req: &HttpRequest,
    payload: web::Payload,
    limit: usize,
) -> AppResult<FormData> {
    let mut multipart = Multipart::new(req.headers(), payload);
    let mut form = FormData::default();
    let mut total = 0usize;

    while let Some(mut field) = multipart.try_next().await.map_err(malformed_multipart)? {
        let Some(name) = field.name().map(str::to_owned) else {
            continue;
        };
        let filename = field
            .content_disposition()
            .and_then(|cd| cd.get_filename())
            .map(str::to_owned);

        let mut bytes = Vec::new();
        while let Some(chunk) = field.try_next().await.map_err(malformed_multipart)? {
            total += chunk.len();
            if total > limit {
                return Err(AppError::PayloadTooLarge);
            }
            bytes.extend_from_slice(&chunk);
        }

        match filename {
            // An empty file input: nothing was chosen.
            Some(filename) if filename.is_empty() && bytes.is_empty() => {}
            Some(filename) => {
                form.files
                    .insert(name, ImageUpload::new(Some(filename), bytes));
            }
            None => {
                let text = String::from_utf8(bytes).map_err(|_| {
                    AppError::BadRequest(format!("Field \"{name}\" is not valid UTF-8."))
                })?;
                form.insert_text(name, text);
            }
        }
    }

    Ok(form)
}

fn malformed_multipart(err: actix_multipart::MultipartError) -> AppError {
    AppError::BadRequest(format!("Multipart form parse error - {err}"))
}
