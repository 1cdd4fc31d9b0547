//! Request descriptors, form payloads, and raw responses.
//!
//! A [`RequestDescriptor`] holds plain data only, so the client can re-issue
//! the identical request after a token refresh without cloning any transport
//! state. Multipart bodies are modeled as [`FormPayload`] for the same
//! reason: a reqwest multipart form is consumed on send and cannot back a
//! retry.

use reqwest::header::HeaderMap;
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::api::errors::ApiError;

/// Description of one outbound API request.
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    /// HTTP method.
    pub method: Method,
    /// API path, starting with `/`, relative to the configured prefix.
    pub path: String,
    /// Extra headers beyond the ones the client manages.
    pub headers: Vec<(String, String)>,
    /// Optional body.
    pub body: Option<RequestBody>,
}

impl RequestDescriptor {
    /// Create a descriptor for an arbitrary method.
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self { method, path: path.into(), headers: Vec::new(), body: None }
    }

    /// GET descriptor.
    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    /// POST descriptor.
    #[must_use]
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    /// PUT descriptor.
    #[must_use]
    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    /// DELETE descriptor.
    #[must_use]
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Attach an extra header.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Attach a JSON body.
    #[must_use]
    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(RequestBody::Json(body));
        self
    }

    /// Attach a multipart form body.
    #[must_use]
    pub fn form(mut self, form: FormPayload) -> Self {
        self.body = Some(RequestBody::Form(form));
        self
    }
}

/// Body of an outbound request.
#[derive(Debug, Clone)]
pub enum RequestBody {
    /// JSON-encoded body.
    Json(Value),
    /// `multipart/form-data` body.
    Form(FormPayload),
}

/// One field of a multipart form.
#[derive(Debug, Clone)]
pub enum FormField {
    /// A plain text field.
    Text {
        /// Field name.
        name: String,
        /// Field value.
        value: String,
    },
    /// A file part.
    File {
        /// Field name.
        name: String,
        /// File name reported to the server.
        file_name: String,
        /// MIME type of the content.
        content_type: String,
        /// Raw file bytes.
        bytes: Vec<u8>,
    },
}

/// Ordered multipart form fields.
#[derive(Debug, Clone, Default)]
pub struct FormPayload {
    fields: Vec<FormField>,
}

impl FormPayload {
    /// Create an empty payload.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a text field.
    #[must_use]
    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push(FormField::Text { name: name.into(), value: value.into() });
        self
    }

    /// Append a file part.
    #[must_use]
    pub fn file(
        mut self,
        name: impl Into<String>,
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        self.fields.push(FormField::File {
            name: name.into(),
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes,
        });
        self
    }

    /// Convert a plain JSON object into form fields.
    ///
    /// Mirrors the upload contract: `null` fields are omitted, array values
    /// are appended once per element (skipping `null` elements), scalars are
    /// stringified, and nested objects are carried as JSON text.
    #[must_use]
    pub fn from_value(value: &Value) -> Self {
        let mut payload = Self::new();
        let Some(object) = value.as_object() else {
            return payload;
        };
        for (name, field) in object {
            match field {
                Value::Null => {}
                Value::Array(items) => {
                    for item in items {
                        if let Some(text) = scalar_to_string(item) {
                            payload = payload.text(name.clone(), text);
                        }
                    }
                }
                other => {
                    if let Some(text) = scalar_to_string(other) {
                        payload = payload.text(name.clone(), text);
                    }
                }
            }
        }
        payload
    }

    /// The fields in append order.
    #[must_use]
    pub fn fields(&self) -> &[FormField] {
        &self.fields
    }

    /// Build the reqwest multipart form. Consumes the payload; the client
    /// clones the descriptor first so retries can rebuild.
    pub(crate) fn into_multipart(self) -> Result<reqwest::multipart::Form, ApiError> {
        let mut form = reqwest::multipart::Form::new();
        for field in self.fields {
            form = match field {
                FormField::Text { name, value } => form.text(name, value),
                FormField::File { name, file_name, content_type, bytes } => {
                    let part = reqwest::multipart::Part::bytes(bytes)
                        .file_name(file_name)
                        .mime_str(&content_type)
                        .map_err(|e| ApiError::Config(format!("invalid content type: {e}")))?;
                    form.part(name, part)
                }
            };
        }
        Ok(form)
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        // A nested structure has no browser-faithful rendition; JSON text is
        // the lossless choice.
        Value::Array(_) | Value::Object(_) => Some(value.to_string()),
    }
}

/// A buffered HTTP response: status, headers, and body bytes.
///
/// Responses are returned for every status; callers classify success and
/// failure themselves (or use the typed helpers, which do).
#[derive(Debug)]
pub struct ApiResponse {
    /// HTTP status code.
    pub status: StatusCode,
    /// Response headers.
    pub headers: HeaderMap,
    body: Vec<u8>,
}

impl ApiResponse {
    pub(crate) async fn from_reqwest(response: reqwest::Response) -> Result<Self, ApiError> {
        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .bytes()
            .await
            .map_err(|err| ApiError::Network(format!("failed to read response body: {err}")))?
            .to_vec();
        Ok(Self { status, headers, body })
    }

    /// Whether the status is 2xx.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// The raw body bytes.
    #[must_use]
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// The body as (lossy) text.
    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Deserialize the body as JSON.
    ///
    /// # Errors
    /// Returns `ApiError::Client` if the body is not valid JSON for `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        serde_json::from_slice(&self.body)
            .map_err(|err| ApiError::Client(format!("failed to parse response: {err}")))
    }
}
