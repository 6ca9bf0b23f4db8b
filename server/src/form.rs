//! Submitted form fields as a multi-valued map.
//!
//! # Design
//! Field values come from two places, in this order:
//!
//! 1. the request body, for `POST`, `PUT` and `PATCH`, when it is
//!    `application/x-www-form-urlencoded` or `multipart/form-data`
//!    (text parts only, file uploads are skipped);
//! 2. the URL query string.
//!
//! Body values therefore come first when both carry the same name, and
//! [`FormData::get`] returns the body's value. Any other content type
//! contributes nothing from the body.

use std::collections::HashMap;

use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::{FromRequest, Multipart, Request};
use axum::http::{header, Method};
use thiserror::Error;
use url::form_urlencoded;

/// Upper bound on a form body.
pub const MAX_FORM_BYTES: usize = 10 << 20;

/// Failures while reading form fields from a request.
#[derive(Debug, Error)]
pub enum FormError {
    #[error("failed to read form body: {0}")]
    Body(#[from] axum::Error),

    #[error("invalid multipart body: {0}")]
    MultipartRejected(#[from] MultipartRejection),

    #[error("invalid multipart field: {0}")]
    Multipart(#[from] MultipartError),
}

/// Field name to every submitted value, in submission order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormData {
    fields: HashMap<String, Vec<String>>,
}

impl FormData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fields from a `application/x-www-form-urlencoded` payload.
    pub fn from_urlencoded(input: &[u8]) -> Self {
        let mut form = Self::new();
        form.extend_urlencoded(input);
        form
    }

    /// First value submitted under `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values(name).first().map(String::as_str)
    }

    /// All values submitted under `name`; empty when absent.
    pub fn values(&self, name: &str) -> &[String] {
        self.fields.get(name).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn append(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.entry(name.into()).or_default().push(value.into());
    }

    /// Number of distinct field names.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    fn extend_urlencoded(&mut self, input: &[u8]) {
        for (name, value) in form_urlencoded::parse(input) {
            self.append(name, value);
        }
    }
}

/// Read body and query fields from `request`, consuming it.
pub async fn parse_form(request: Request) -> Result<FormData, FormError> {
    let query = request.uri().query().map(str::to_owned);
    let mut form = FormData::new();

    if carries_form_body(request.method()) {
        match body_kind(&request) {
            Some(BodyKind::UrlEncoded) => {
                let body = axum::body::to_bytes(request.into_body(), MAX_FORM_BYTES).await?;
                form.extend_urlencoded(&body);
            }
            Some(BodyKind::Multipart) => {
                let mut multipart = Multipart::from_request(request, &()).await?;
                while let Some(field) = multipart.next_field().await? {
                    if field.file_name().is_some() {
                        continue;
                    }
                    let Some(name) = field.name().map(str::to_owned) else {
                        continue;
                    };
                    let value = field.text().await?;
                    form.append(name, value);
                }
            }
            None => {}
        }
    }

    if let Some(query) = query {
        form.extend_urlencoded(query.as_bytes());
    }
    Ok(form)
}

enum BodyKind {
    UrlEncoded,
    Multipart,
}

fn carries_form_body(method: &Method) -> bool {
    *method == Method::POST || *method == Method::PUT || *method == Method::PATCH
}

fn body_kind(request: &Request) -> Option<BodyKind> {
    let content_type = request.headers().get(header::CONTENT_TYPE)?.to_str().ok()?;
    let essence = content_type.split(';').next()?.trim();
    if essence.eq_ignore_ascii_case("application/x-www-form-urlencoded") {
        Some(BodyKind::UrlEncoded)
    } else if essence.eq_ignore_ascii_case("multipart/form-data") {
        Some(BodyKind::Multipart)
    } else {
        None
    }
}
