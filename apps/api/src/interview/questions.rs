//! Question generator: asks the model for technical questions per declared
//! technology and normalizes the answer into a `TechQuestionSet`.

use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};

use crate::interview::models::{TechQuestionSet, TopicQuestions};
use crate::interview::prompts::{QUESTION_GEN_PROMPT_TEMPLATE, QUESTION_GEN_SYSTEM};
use crate::llm_client::{extract_json_object, ModelClient, TransportError};

pub const QUESTIONS_PER_TOPIC: usize = 3;

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("Model call failed: {0}")]
    Transport(#[from] TransportError),

    #[error("Malformed question set: {0}")]
    Malformed(String),
}

#[derive(Clone)]
pub struct QuestionGenerator {
    client: Arc<dyn ModelClient>,
}

impl QuestionGenerator {
    pub fn new(client: Arc<dyn ModelClient>) -> Self {
        Self { client }
    }

    /// One model call, no retry. An empty stack needs no call at all.
    pub async fn generate(&self, tech_stack: &[String]) -> Result<TechQuestionSet, GenerationError> {
        if tech_stack.is_empty() {
            return Ok(TechQuestionSet::default());
        }

        let prompt = build_prompt(tech_stack);
        let text = self.client.complete(&prompt, QUESTION_GEN_SYSTEM).await?;

        let set = parse_question_set(&text, tech_stack).map_err(|e| {
            warn!("Discarding model output for {} technologies: {e}", tech_stack.len());
            e
        })?;
        info!(
            "Generated {} questions across {} technologies",
            set.total_questions(),
            set.questions.len()
        );
        Ok(set)
    }
}

pub fn build_prompt(tech_stack: &[String]) -> String {
    // serde_json on a Vec<String> cannot fail
    let stack_json = serde_json::to_string(tech_stack).unwrap_or_else(|_| "[]".to_string());
    QUESTION_GEN_PROMPT_TEMPLATE.replace("{tech_stack}", &stack_json)
}

/// Parses model output and reshapes it to the requested stack: one entry per
/// technology in request order, exactly `QUESTIONS_PER_TOPIC` questions each.
pub fn parse_question_set(
    text: &str,
    tech_stack: &[String],
) -> Result<TechQuestionSet, GenerationError> {
    let raw: TechQuestionSet = serde_json::from_str(extract_json_object(text))
        .map_err(|e| GenerationError::Malformed(format!("invalid JSON: {e}")))?;

    let mut questions = Vec::with_capacity(tech_stack.len());
    for tech in tech_stack {
        let entry = raw
            .questions
            .iter()
            .find(|t| t.topic.trim().eq_ignore_ascii_case(tech))
            .ok_or_else(|| GenerationError::Malformed(format!("no questions for '{tech}'")))?;

        let picked: Vec<String> = entry
            .questions
            .iter()
            .map(|q| q.trim())
            .filter(|q| !q.is_empty())
            .take(QUESTIONS_PER_TOPIC)
            .map(String::from)
            .collect();

        if picked.len() < QUESTIONS_PER_TOPIC {
            return Err(GenerationError::Malformed(format!(
                "expected {QUESTIONS_PER_TOPIC} questions for '{tech}', got {}",
                picked.len()
            )));
        }

        questions.push(TopicQuestions {
            topic: tech.clone(),
            questions: picked,
        });
    }

    Ok(TechQuestionSet { questions })
}
