//! Scripted `ModelClient` for tests. Records every prompt it receives.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::llm_client::{ModelClient, TransportError};

pub struct MockModelClient {
    response: Result<String, u16>,
    prompts: Mutex<Vec<String>>,
}

impl MockModelClient {
    /// Answers every call with `body`.
    pub fn replying(body: &str) -> Arc<Self> {
        Arc::new(Self {
            response: Ok(body.to_string()),
            prompts: Mutex::new(Vec::new()),
        })
    }

    /// Fails every call with an API error carrying `status`.
    pub fn failing(status: u16) -> Arc<Self> {
        Arc::new(Self {
            response: Err(status),
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl ModelClient for MockModelClient {
    async fn complete(&self, prompt: &str, _system: &str) -> Result<String, TransportError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        match &self.response {
            Ok(body) => Ok(body.clone()),
            Err(status) => Err(TransportError::Api {
                status: *status,
                message: "upstream unavailable".to_string(),
            }),
        }
    }
}

/// Valid generator output for a `["Python", "Go"]` stack.
pub const PYTHON_GO_QUESTIONS: &str = r#"{"questions": [
    {"topic": "Python", "questions": ["What is a generator?", "Explain the GIL.", "How do decorators work?"]},
    {"topic": "Go", "questions": ["What is a goroutine?", "How do channels block?", "Explain interfaces."]}
]}"#;
