//! Deterministic classifier for tests and offline runs.

use std::future::Future;
use std::pin::Pin;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use super::{Classifier, ClassifyError};

/// A configurable response for [`MockClassifier`].
#[derive(Clone, Debug)]
pub enum MockResponse {
    /// Return this raw text.
    Text(String),
    /// Fail the call with [`ClassifyError::Other`].
    Error(String),
}

/// A hand-rolled [`Classifier`] double.
///
/// Returns a fixed response, or a sequence of responses (one per call,
/// repeating the last). Records every prompt it receives.
pub struct MockClassifier {
    responses: Mutex<Vec<MockResponse>>,
    fallback: MockResponse,
    delay: Option<Duration>,
    prompts: Mutex<Vec<String>>,
    call_count: AtomicUsize,
}

impl MockClassifier {
    /// A mock that always returns `response`.
    pub fn new(response: MockResponse) -> Self {
        Self {
            responses: Mutex::new(Vec::new()),
            fallback: response,
            delay: None,
            prompts: Mutex::new(Vec::new()),
            call_count: AtomicUsize::new(0),
        }
    }

    /// A mock that always returns `text`.
    pub fn returning(text: impl Into<String>) -> Self {
        Self::new(MockResponse::Text(text.into()))
    }

    /// A mock that returns responses in order, repeating the last one.
    pub fn with_sequence(mut responses: Vec<MockResponse>) -> Self {
        assert!(
            !responses.is_empty(),
            "sequence must have at least one response"
        );
        // Reversed so pop() yields them in order.
        responses.reverse();
        let fallback = responses[0].clone();
        Self {
            responses: Mutex::new(responses),
            fallback,
            delay: None,
            prompts: Mutex::new(Vec::new()),
            call_count: AtomicUsize::new(0),
        }
    }

    /// Simulated latency per call.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Prompts received so far, in call order.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }

    fn next_response(&self) -> MockResponse {
        match self.responses.lock() {
            Ok(mut seq) => seq.pop().unwrap_or_else(|| self.fallback.clone()),
            Err(_) => self.fallback.clone(),
        }
    }
}

impl Classifier for MockClassifier {
    fn name(&self) -> &str {
        "mock"
    }

    fn classify<'a>(
        &'a self,
        prompt: &'a str,
        _model: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String, ClassifyError>> + Send + 'a>> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.to_string());
        }
        let response = self.next_response();
        let delay = self.delay;

        Box::pin(async move {
            if let Some(d) = delay {
                tokio::time::sleep(d).await;
            }
            match response {
                MockResponse::Text(text) => Ok(text),
                MockResponse::Error(msg) => Err(ClassifyError::Other(msg)),
            }
        })
    }
}
