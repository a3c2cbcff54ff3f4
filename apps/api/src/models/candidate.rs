use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::interview::models::{CandidateProfile, QuestionAnswer, TopicQuestions};

/// A completed screening as persisted on disk, one file per candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateRecord {
    pub record_id: Uuid,
    #[serde(flatten)]
    pub profile: CandidateProfile,
    #[serde(default)]
    pub questions: Vec<TopicQuestions>,
    #[serde(default)]
    pub answers: Vec<QuestionAnswer>,
    pub generated_at: DateTime<Utc>,
    /// `generated_at` plus the configured retention period.
    pub expires_at: DateTime<Utc>,
}

impl CandidateRecord {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}
