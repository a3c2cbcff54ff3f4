use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A step of the screening conversation. The order is fixed by `Step::ORDER`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    Greeting,
    BasicInfo,
    Experience,
    Position,
    Location,
    TechStack,
    TechnicalQuestions,
    Conclusion,
}

impl Step {
    pub const ORDER: [Step; 8] = [
        Step::Greeting,
        Step::BasicInfo,
        Step::Experience,
        Step::Position,
        Step::Location,
        Step::TechStack,
        Step::TechnicalQuestions,
        Step::Conclusion,
    ];

    /// The step that follows this one. Conclusion is terminal.
    pub fn next(self) -> Step {
        Self::ORDER
            .iter()
            .position(|s| *s == self)
            .and_then(|i| Self::ORDER.get(i + 1))
            .copied()
            .unwrap_or(Step::Conclusion)
    }

    /// Percentage of the screening completed on reaching this step.
    pub fn progress(self) -> u8 {
        match self {
            Step::Greeting => 0,
            Step::BasicInfo => 10,
            Step::Experience => 25,
            Step::Position => 40,
            Step::Location => 55,
            Step::TechStack => 70,
            Step::TechnicalQuestions => 85,
            Step::Conclusion => 100,
        }
    }

    pub fn is_terminal(self) -> bool {
        self == Step::Conclusion
    }
}

/// The three fields collected during `Step::BasicInfo`, in asking order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BasicInfoField {
    FullName,
    Email,
    Phone,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CandidateProfile {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub years_experience: Option<u32>,
    pub desired_position: Option<String>,
    pub location: Option<String>,
    /// Declared technologies, in the order the candidate listed them.
    pub tech_stack: Vec<String>,
}

impl CandidateProfile {
    /// The next basic-info field still empty, if any.
    pub fn next_basic_field(&self) -> Option<BasicInfoField> {
        if is_blank(&self.full_name) {
            Some(BasicInfoField::FullName)
        } else if is_blank(&self.email) {
            Some(BasicInfoField::Email)
        } else if is_blank(&self.phone) {
            Some(BasicInfoField::Phone)
        } else {
            None
        }
    }

    /// Names of the required fields that are still empty.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if is_blank(&self.full_name) {
            missing.push("full_name");
        }
        if is_blank(&self.email) {
            missing.push("email");
        }
        if is_blank(&self.phone) {
            missing.push("phone");
        }
        if self.years_experience.is_none() {
            missing.push("years_experience");
        }
        if is_blank(&self.desired_position) {
            missing.push("desired_position");
        }
        if is_blank(&self.location) {
            missing.push("location");
        }
        if self.tech_stack.is_empty() {
            missing.push("tech_stack");
        }
        missing
    }

    pub fn is_complete(&self) -> bool {
        self.missing_fields().is_empty()
    }

    /// Candidate identity used to key stored records: the lowercased email.
    pub fn identity(&self) -> Option<String> {
        self.email
            .as_deref()
            .map(|e| e.trim().to_lowercase())
            .filter(|e| !e.is_empty())
    }

    /// Copy safe to write to logs: name reduced to first name plus mask,
    /// email and phone masked.
    pub fn redacted(&self) -> CandidateProfile {
        CandidateProfile {
            full_name: self.full_name.as_deref().map(redact_name),
            email: self.email.as_ref().map(|_| "***@***".to_string()),
            phone: self.phone.as_deref().map(redact_phone),
            ..self.clone()
        }
    }
}

fn is_blank(field: &Option<String>) -> bool {
    field.as_deref().map_or(true, |v| v.trim().is_empty())
}

fn redact_name(name: &str) -> String {
    let parts: Vec<&str> = name.split_whitespace().collect();
    match parts.as_slice() {
        [first, .., last] => format!("{first} {}", "*".repeat(last.chars().count())),
        _ => "***".to_string(),
    }
}

fn redact_phone(phone: &str) -> String {
    let digits: String = phone.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() >= 10 {
        format!("***-***-{}", &digits[digits.len() - 4..])
    } else {
        "***".to_string()
    }
}

/// Generated questions for one technology.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicQuestions {
    pub topic: String,
    pub questions: Vec<String>,
}

/// Technical questions for the declared stack, one entry per technology.
/// Serializes as `{"questions": [{"topic": ..., "questions": [...]}]}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TechQuestionSet {
    #[serde(default)]
    pub questions: Vec<TopicQuestions>,
}

impl TechQuestionSet {
    pub fn is_empty(&self) -> bool {
        self.total_questions() == 0
    }

    pub fn total_questions(&self) -> usize {
        self.questions.iter().map(|t| t.questions.len()).sum()
    }

    /// The `index`-th question across all topics, with its topic.
    pub fn question_at(&self, index: usize) -> Option<(&str, &str)> {
        self.questions
            .iter()
            .flat_map(|t| t.questions.iter().map(move |q| (t.topic.as_str(), q.as_str())))
            .nth(index)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionAnswer {
    pub topic: String,
    pub question: String,
    pub answer: String,
}

/// Everything one session knows. Owned by exactly one session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationState {
    pub session_id: Uuid,
    pub step: Step,
    pub profile: CandidateProfile,
    /// `None` until generation has been attempted; empty when it failed.
    pub questions: Option<TechQuestionSet>,
    pub answers: Vec<QuestionAnswer>,
    pub consent_to_store: bool,
    /// Set once the completed profile has been written.
    pub record_id: Option<Uuid>,
    pub started_at: DateTime<Utc>,
}

impl ConversationState {
    pub fn new(consent_to_store: bool) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            step: Step::Greeting,
            profile: CandidateProfile::default(),
            questions: None,
            answers: Vec::new(),
            consent_to_store,
            record_id: None,
            started_at: Utc::now(),
        }
    }

    /// The question awaiting an answer, with its topic.
    pub fn current_question(&self) -> Option<(&str, &str)> {
        self.questions
            .as_ref()
            .and_then(|q| q.question_at(self.answers.len()))
    }
}
