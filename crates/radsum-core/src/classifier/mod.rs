//! Classification collaborator: turns a prompt into raw model output.

pub mod mock;
pub mod openai;

use std::future::Future;
use std::pin::Pin;

use thiserror::Error;

pub use mock::{MockClassifier, MockResponse};
pub use openai::OpenAiClassifier;

#[derive(Error, Debug)]
pub enum ClassifyError {
    #[error("HTTP request error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("authentication rejected (HTTP {0})")]
    Auth(u16),
    #[error("rate limited (429)")]
    RateLimited,
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },
    #[error("response contained no output text")]
    EmptyResponse,
    #[error("{0}")]
    Other(String),
}

/// A text-generation service that classifies report sections.
///
/// Implementations return the model's raw text; interpreting it is the job
/// of [`crate::response::normalize_response`].
pub trait Classifier: Send + Sync {
    /// Short name for diagnostics (e.g. "OpenAI").
    fn name(&self) -> &str;

    fn classify<'a>(
        &'a self,
        prompt: &'a str,
        model: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String, ClassifyError>> + Send + 'a>>;
}
