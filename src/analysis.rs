use std::time::Duration;

use reqwest::multipart::{Form, Part};
use reqwest::{Client, StatusCode};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, error, instrument};
use url::Url;

use crate::config::Config;
use crate::constants::{IMAGE_FIELD, PROMPT_PARAM, RESPONSE_FIELD};
use crate::input::ImageAttachment;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("invalid attachment MIME type '{mime}': {source}")]
    Attachment {
        mime: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("request to analysis endpoint failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("analysis endpoint returned {status}: {body}")]
    Status { status: StatusCode, body: String },
}

/// One outbound analysis call: the trimmed prompt plus an optional image.
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub prompt: String,
    pub image: Option<ImageAttachment>,
}

/// A successful response body. JSON bodies are kept structured, anything
/// else is carried as the raw text.
#[derive(Debug, Clone, PartialEq)]
pub enum ReplyBody {
    Structured(Value),
    PlainText(String),
}

impl ReplyBody {
    pub fn parse(body: String) -> Self {
        match serde_json::from_str::<Value>(&body) {
            Ok(value) => ReplyBody::Structured(value),
            Err(e) => {
                debug!(error = %e, "Response body is not JSON, using raw text");
                ReplyBody::PlainText(body)
            }
        }
    }

    /// Text shown as the assistant's message. Structured bodies use their
    /// `response` field when it is truthy, falling back to the compact JSON
    /// of the whole body when it is missing, null, false, zero or empty.
    pub fn into_text(self) -> String {
        match self {
            ReplyBody::Structured(value) => match value.get(RESPONSE_FIELD).and_then(field_text) {
                Some(text) => text,
                None => value.to_string(),
            },
            ReplyBody::PlainText(text) => text,
        }
    }
}

fn field_text(field: &Value) -> Option<String> {
    match field {
        Value::Null | Value::Bool(false) => None,
        Value::String(text) if text.is_empty() => None,
        Value::String(text) => Some(text.clone()),
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(true) => Some("true".to_string()),
        // Nested values are shown as their own compact JSON.
        other => Some(other.to_string()),
    }
}

#[derive(Debug, Clone)]
pub struct AnalysisClient {
    client: Client,
    endpoint: Url,
}

impl AnalysisClient {
    pub fn new(endpoint: Url, timeout: Duration) -> Result<Self, AnalysisError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(AnalysisError::Client)?;
        Ok(Self { client, endpoint })
    }

    pub fn from_config(config: &Config) -> Result<Self, AnalysisError> {
        Self::new(config.endpoint.clone(), config.timeout)
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    #[instrument(skip(self, request), fields(endpoint = %self.endpoint, has_image = request.image.is_some()))]
    pub async fn analyze(&self, request: AnalysisRequest) -> Result<ReplyBody, AnalysisError> {
        let form = build_form(request.image)?;

        debug!(prompt_len = request.prompt.len(), "Sending analysis request");

        let response = self
            .client
            .post(self.endpoint.clone())
            .query(&[(PROMPT_PARAM, request.prompt.as_str())])
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error body".to_string());
            error!(%status, %body, "Analysis request failed");
            return Err(AnalysisError::Status { status, body });
        }

        let body = response.text().await?;
        debug!(body_len = body.len(), "Received analysis response");
        Ok(ReplyBody::parse(body))
    }
}

fn build_form(image: Option<ImageAttachment>) -> Result<Form, AnalysisError> {
    let form = Form::new();
    let Some(image) = image else {
        return Ok(form);
    };

    let mime = image.mime_type;
    let part = Part::bytes(image.bytes)
        .file_name(image.file_name)
        .mime_str(&mime)
        .map_err(|source| AnalysisError::Attachment { mime, source })?;
    Ok(form.part(IMAGE_FIELD, part))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_structured_response_field() {
        let reply = ReplyBody::parse(r#"{"response": "A cat on a sofa"}"#.to_string());
        assert_eq!(reply, ReplyBody::Structured(json!({"response": "A cat on a sofa"})));
        assert_eq!(reply.into_text(), "A cat on a sofa");
    }

    #[test]
    fn test_plain_text_fallback() {
        let reply = ReplyBody::parse("not json at all".to_string());
        assert_eq!(reply, ReplyBody::PlainText("not json at all".to_string()));
        assert_eq!(reply.into_text(), "not json at all");
    }

    #[test]
    fn test_structured_without_response_field_uses_json() {
        let reply = ReplyBody::parse(r#"{"result": 42}"#.to_string());
        assert_eq!(reply.into_text(), r#"{"result":42}"#);
    }

    #[test]
    fn test_empty_response_field_uses_json() {
        let reply = ReplyBody::parse(r#"{"response": ""}"#.to_string());
        assert_eq!(reply.into_text(), r#"{"response":""}"#);
    }

    #[test]
    fn test_scalar_response_field_is_used_directly() {
        let reply = ReplyBody::parse(r#"{"response": 5}"#.to_string());
        assert_eq!(reply.into_text(), "5");
        let reply = ReplyBody::parse(r#"{"response": true}"#.to_string());
        assert_eq!(reply.into_text(), "true");
        let reply = ReplyBody::parse(r#"{"response": ["a", "b"]}"#.to_string());
        assert_eq!(reply.into_text(), r#"["a","b"]"#);
    }

    #[test]
    fn test_falsy_response_field_uses_json() {
        let reply = ReplyBody::parse(r#"{"response": 0}"#.to_string());
        assert_eq!(reply.into_text(), r#"{"response":0}"#);
        let reply = ReplyBody::parse(r#"{"response": null}"#.to_string());
        assert_eq!(reply.into_text(), r#"{"response":null}"#);
        let reply = ReplyBody::parse(r#"{"response": false}"#.to_string());
        assert_eq!(reply.into_text(), r#"{"response":false}"#);
    }

    #[test]
    fn test_empty_body_is_plain_text() {
        let reply = ReplyBody::parse(String::new());
        assert_eq!(reply.into_text(), "");
    }

    #[test]
    fn test_form_without_image_has_no_parts() {
        assert!(build_form(None).is_ok());
    }

    #[test]
    fn test_form_rejects_bad_mime() {
        let image = ImageAttachment {
            path: "x.png".into(),
            file_name: "x.png".to_string(),
            mime_type: "not a mime".to_string(),
            bytes: vec![1, 2, 3],
        };
        let err = build_form(Some(image)).unwrap_err();
        assert!(matches!(err, AnalysisError::Attachment { .. }));
    }
}
