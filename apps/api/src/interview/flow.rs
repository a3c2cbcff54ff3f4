//! Conversation flow controller: drives one session through the fixed step
//! order, one candidate message at a time.
//!
//! Flow: Greeting → BasicInfo (name, email, phone) → Experience → Position →
//!       Location → TechStack → TechnicalQuestions → Conclusion.
//!
//! Invalid input never advances the step and never touches the profile.
//! Question generation happens once, on entering TechnicalQuestions, and its
//! failure only skips the questions. The only error that escapes `advance`
//! is a `StorageError` while saving the completed record.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::interview::models::{
    BasicInfoField, CandidateProfile, ConversationState, QuestionAnswer, Step, TechQuestionSet,
};
use crate::interview::prompts::{
    first_question, next_question, ANSWER_TRUNCATED, ASK_EMAIL, ASK_EXPERIENCE, ASK_FULL_NAME,
    ASK_LOCATION, ASK_PHONE, ASK_POSITION, ASK_TECH_STACK, CONCLUSION, CONCLUSION_EARLY,
    GENERATION_MALFORMED, GENERATION_UNAVAILABLE, GREETING, RECORD_NOT_SAVED_NO_CONSENT,
    RECORD_SAVED, SESSION_ENDED,
};
use crate::interview::questions::{GenerationError, QuestionGenerator};
use crate::interview::validation::{
    check_length, is_exit_command, parse_tech_stack, parse_years_experience, truncate_answer,
    validate_email, validate_name, validate_non_empty, validate_phone, ValidationError,
};
use crate::storage::{CandidateStore, StorageError};

pub struct FlowController {
    generator: QuestionGenerator,
    store: Arc<CandidateStore>,
}

impl FlowController {
    pub fn new(generator: QuestionGenerator, store: Arc<CandidateStore>) -> Self {
        Self { generator, store }
    }

    /// Opens a session: greets the candidate and asks the first question.
    pub fn start(&self, consent_to_store: bool) -> (ConversationState, String) {
        greet(ConversationState::new(consent_to_store))
    }

    /// Applies one candidate message and returns the new state plus the reply.
    pub async fn advance(
        &self,
        state: ConversationState,
        input: &str,
    ) -> Result<(ConversationState, String), StorageError> {
        match state.step {
            Step::Greeting => return Ok(greet(state)),
            Step::Conclusion => return Ok((state, SESSION_ENDED.to_string())),
            _ => {}
        }

        if is_exit_command(input) {
            info!("Session {} ended by candidate at {:?}", state.session_id, state.step);
            return self.conclude(state, CONCLUSION_EARLY);
        }

        if state.step == Step::TechnicalQuestions {
            return self.record_answer(state, input);
        }

        let profile = match apply_input(&state, input) {
            Ok(profile) => profile,
            Err(e) => {
                debug!("Session {} rejected input at {:?}: {e}", state.session_id, state.step);
                let reply = format!("{e} {}", prompt_for(&state));
                return Ok((state, reply));
            }
        };

        let mut state = ConversationState { profile, ..state };
        let basic_info_pending =
            state.step == Step::BasicInfo && state.profile.next_basic_field().is_some();
        if !basic_info_pending {
            state.step = state.step.next();
            debug!("Session {} moved to {:?}", state.session_id, state.step);
        }

        if state.step == Step::TechnicalQuestions {
            return self.enter_technical_questions(state).await;
        }

        let reply = prompt_for(&state);
        Ok((state, reply))
    }

    async fn enter_technical_questions(
        &self,
        mut state: ConversationState,
    ) -> Result<(ConversationState, String), StorageError> {
        let mut notice = None;
        if state.questions.is_none() {
            let set = match self.generator.generate(&state.profile.tech_stack).await {
                Ok(set) => set,
                Err(GenerationError::Transport(e)) => {
                    warn!("Question generation unavailable for session {}: {e}", state.session_id);
                    notice = Some(GENERATION_UNAVAILABLE);
                    TechQuestionSet::default()
                }
                Err(e @ GenerationError::Malformed(_)) => {
                    warn!("Question generation failed for session {}: {e}", state.session_id);
                    notice = Some(GENERATION_MALFORMED);
                    TechQuestionSet::default()
                }
            };
            if set.is_empty() {
                debug!("Session {} has no technical questions", state.session_id);
            }
            state.questions = Some(set);
        }

        let first = state
            .current_question()
            .map(|(topic, question)| first_question(topic, question));
        match first {
            Some(reply) => Ok((state, reply)),
            None => {
                let (state, reply) = self.conclude(state, CONCLUSION)?;
                let reply = match notice {
                    Some(notice) => format!("{notice} {reply}"),
                    None => reply,
                };
                Ok((state, reply))
            }
        }
    }

    fn record_answer(
        &self,
        mut state: ConversationState,
        input: &str,
    ) -> Result<(ConversationState, String), StorageError> {
        let (topic, question) = match state.current_question() {
            Some((topic, question)) => (topic.to_string(), question.to_string()),
            None => return self.conclude(state, CONCLUSION),
        };

        let (answer, truncated) = truncate_answer(input);
        if answer.is_empty() {
            let e = ValidationError::Empty { field: "answer" };
            let reply = format!("{e} {question}");
            return Ok((state, reply));
        }

        state.answers.push(QuestionAnswer {
            topic: topic.clone(),
            question,
            answer,
        });

        let next = state
            .current_question()
            .map(|(next_topic, next_q)| next_question(next_topic, next_q, next_topic != topic));
        let (state, reply) = match next {
            Some(reply) => (state, reply),
            None => self.conclude(state, CONCLUSION)?,
        };

        if truncated {
            Ok((state, format!("{ANSWER_TRUNCATED} {reply}")))
        } else {
            Ok((state, reply))
        }
    }

    /// Moves to Conclusion and flushes a complete profile to the store.
    fn conclude(
        &self,
        mut state: ConversationState,
        message: &str,
    ) -> Result<(ConversationState, String), StorageError> {
        let mut reply = message.to_string();

        if !state.profile.is_complete() {
            info!(
                "Session {} concluded with incomplete profile (missing: {}); nothing stored",
                state.session_id,
                state.profile.missing_fields().join(", ")
            );
        } else if !state.consent_to_store {
            info!("Session {} concluded without consent; nothing stored", state.session_id);
            reply = format!("{reply} {RECORD_NOT_SAVED_NO_CONSENT}");
        } else {
            let empty = TechQuestionSet::default();
            let questions = state.questions.as_ref().unwrap_or(&empty);
            let record_id = self.store.save(&state.profile, questions, &state.answers)?;
            info!("Session {} stored as record {record_id}", state.session_id);
            state.record_id = Some(record_id);
            reply = format!("{reply} {RECORD_SAVED}");
        }

        state.step = Step::Conclusion;
        Ok((state, reply))
    }
}

fn greet(mut state: ConversationState) -> (ConversationState, String) {
    state.step = Step::Greeting.next();
    let reply = format!("{GREETING}\n\n{}", prompt_for(&state));
    (state, reply)
}

/// Validates `input` for the current step and returns the updated profile.
/// The state itself is left untouched.
fn apply_input(state: &ConversationState, input: &str) -> Result<CandidateProfile, ValidationError> {
    check_length(input)?;

    let mut profile = state.profile.clone();
    match state.step {
        Step::BasicInfo => match profile.next_basic_field() {
            Some(BasicInfoField::FullName) => profile.full_name = Some(validate_name(input)?),
            Some(BasicInfoField::Email) => profile.email = Some(validate_email(input)?),
            Some(BasicInfoField::Phone) => profile.phone = Some(validate_phone(input)?),
            None => {}
        },
        Step::Experience => profile.years_experience = Some(parse_years_experience(input)?),
        Step::Position => {
            profile.desired_position = Some(validate_non_empty("desired position", input)?)
        }
        Step::Location => profile.location = Some(validate_non_empty("location", input)?),
        Step::TechStack => profile.tech_stack = parse_tech_stack(input)?,
        Step::Greeting | Step::TechnicalQuestions | Step::Conclusion => {}
    }
    Ok(profile)
}

/// What the candidate is currently being asked.
pub fn prompt_for(state: &ConversationState) -> String {
    match state.step {
        Step::Greeting => GREETING.to_string(),
        Step::BasicInfo => match state.profile.next_basic_field() {
            Some(BasicInfoField::FullName) => ASK_FULL_NAME.to_string(),
            Some(BasicInfoField::Email) => ASK_EMAIL.to_string(),
            Some(BasicInfoField::Phone) => ASK_PHONE.to_string(),
            None => ASK_EXPERIENCE.to_string(),
        },
        Step::Experience => ASK_EXPERIENCE.to_string(),
        Step::Position => ASK_POSITION.to_string(),
        Step::Location => ASK_LOCATION.to_string(),
        Step::TechStack => ASK_TECH_STACK.to_string(),
        Step::TechnicalQuestions => match state.current_question() {
            Some((topic, question)) => format!("{topic}: {question}"),
            None => CONCLUSION.to_string(),
        },
        Step::Conclusion => SESSION_ENDED.to_string(),
    }
}
