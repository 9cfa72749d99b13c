use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use super::{Classifier, ClassifyError};

/// Classifier backed by the OpenAI Responses API (`POST {base_url}/responses`).
pub struct OpenAiClassifier {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl OpenAiClassifier {
    pub fn new(
        api_key: impl Into<String>,
        base_url: &str,
        timeout: Duration,
    ) -> Result<Self, ClassifyError> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(30))
            .timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }
}

impl Classifier for OpenAiClassifier {
    fn name(&self) -> &str {
        "OpenAI"
    }

    fn classify<'a>(
        &'a self,
        prompt: &'a str,
        model: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String, ClassifyError>> + Send + 'a>> {
        Box::pin(async move {
            let url = format!("{}/responses", self.base_url);
            let body = serde_json::json!({
                "model": model,
                "input": prompt,
            });

            tracing::debug!(model, url = %url, "sending classification request");
            let resp = self
                .client
                .post(&url)
                .bearer_auth(&self.api_key)
                .json(&body)
                .send()
                .await?;

            let status = resp.status();
            match status.as_u16() {
                401 | 403 => return Err(ClassifyError::Auth(status.as_u16())),
                429 => return Err(ClassifyError::RateLimited),
                _ if !status.is_success() => {
                    let body = resp.text().await.unwrap_or_default();
                    return Err(ClassifyError::Http {
                        status: status.as_u16(),
                        body: body.chars().take(200).collect(),
                    });
                }
                _ => {}
            }

            let data: serde_json::Value = resp.json().await?;
            output_text(&data).ok_or(ClassifyError::EmptyResponse)
        })
    }
}

/// Combined text output of a Responses API payload.
///
/// Uses the top-level `output_text` convenience field when present, else
/// concatenates every `output_text` content item of every output message.
pub fn output_text(data: &serde_json::Value) -> Option<String> {
    if let Some(text) = data["output_text"].as_str() {
        return Some(text.trim().to_string()).filter(|t| !t.is_empty());
    }

    let text: String = data["output"]
        .as_array()?
        .iter()
        .filter_map(|item| item["content"].as_array())
        .flatten()
        .filter(|part| part["type"].as_str() == Some("output_text"))
        .filter_map(|part| part["text"].as_str())
        .collect();

    let text = text.trim();
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}
