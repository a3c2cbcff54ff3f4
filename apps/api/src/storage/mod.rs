//! Candidate record store: one JSON file per candidate under the data directory.
//!
//! Files are named `<record_id>.json`, where the record id is derived from
//! the candidate's email. A repeat screening of the same candidate replaces
//! the earlier file; distinct candidates never share one.
//! Writes go through a temp file in the same directory and are renamed into
//! place, so readers never see a half-written record.

pub mod handlers;

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::interview::models::{CandidateProfile, QuestionAnswer, TechQuestionSet};
use crate::models::candidate::CandidateRecord;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Refusing to store incomplete profile (missing: {})", .0.join(", "))]
    Incomplete(Vec<&'static str>),
}

#[derive(Debug, Clone)]
pub struct CandidateStore {
    dir: PathBuf,
    retention: Duration,
}

impl CandidateStore {
    pub fn new(dir: impl Into<PathBuf>, retention_days: i64) -> Self {
        Self {
            dir: dir.into(),
            retention: Duration::days(retention_days),
        }
    }

    /// Creates the data directory if needed.
    pub fn init(&self) -> Result<(), StorageError> {
        fs::create_dir_all(&self.dir)?;
        info!("Candidate store ready at {}", self.dir().display());
        Ok(())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Record id for a candidate identity (lowercased email).
    pub fn record_id_for(identity: &str) -> Uuid {
        Uuid::new_v5(&Uuid::NAMESPACE_URL, format!("mailto:{identity}").as_bytes())
    }

    pub fn save(
        &self,
        profile: &CandidateProfile,
        questions: &TechQuestionSet,
        answers: &[QuestionAnswer],
    ) -> Result<Uuid, StorageError> {
        self.save_at(profile, questions, answers, Utc::now())
    }

    /// Writes a completed profile. Expired records are purged first.
    pub fn save_at(
        &self,
        profile: &CandidateProfile,
        questions: &TechQuestionSet,
        answers: &[QuestionAnswer],
        now: DateTime<Utc>,
    ) -> Result<Uuid, StorageError> {
        let missing = profile.missing_fields();
        if !missing.is_empty() {
            return Err(StorageError::Incomplete(missing));
        }
        let identity = profile
            .identity()
            .ok_or_else(|| StorageError::Incomplete(vec!["email"]))?;

        if let Err(e) = self.purge_expired(now) {
            warn!("Failed to purge expired candidate records: {e}");
        }

        let record = CandidateRecord {
            record_id: Self::record_id_for(&identity),
            profile: profile.clone(),
            questions: questions.questions.clone(),
            answers: answers.to_vec(),
            generated_at: now,
            expires_at: now + self.retention,
        };

        fs::create_dir_all(&self.dir)?;
        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        serde_json::to_writer_pretty(&mut tmp, &record)?;
        tmp.write_all(b"\n")?;
        tmp.as_file().sync_all()?;
        tmp.persist(self.path_for(record.record_id))
            .map_err(|e| e.error)?;

        info!(
            "Stored candidate record {}: {:?}",
            record.record_id,
            profile.redacted()
        );
        Ok(record.record_id)
    }

    /// All readable records, oldest first. Unreadable files are skipped.
    pub fn list(&self) -> Result<Vec<CandidateRecord>, StorageError> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut records = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            match read_record(&path) {
                Ok(record) => records.push(record),
                Err(e) => warn!("Skipping unreadable record {}: {e}", path.display()),
            }
        }

        records.sort_by_key(|r| r.generated_at);
        Ok(records)
    }

    pub fn load(&self, record_id: Uuid) -> Result<Option<CandidateRecord>, StorageError> {
        match read_record(&self.path_for(record_id)) {
            Ok(record) => Ok(Some(record)),
            Err(StorageError::Io(e)) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Deletes records whose retention period has passed. Returns how many.
    pub fn purge_expired(&self, now: DateTime<Utc>) -> Result<usize, StorageError> {
        let mut removed = 0;
        for record in self.list()? {
            if record.is_expired(now) {
                fs::remove_file(self.path_for(record.record_id))?;
                debug!("Removed expired candidate record {}", record.record_id);
                removed += 1;
            }
        }
        if removed > 0 {
            info!("Purged {removed} expired candidate records");
        }
        Ok(removed)
    }

    fn path_for(&self, record_id: Uuid) -> PathBuf {
        self.dir.join(format!("{record_id}.json"))
    }
}

fn read_record(path: &Path) -> Result<CandidateRecord, StorageError> {
    let raw = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;
    use crate::interview::models::TopicQuestions;

    fn profile(name: &str, email: &str) -> CandidateProfile {
        CandidateProfile {
            full_name: Some(name.to_string()),
            email: Some(email.to_string()),
            phone: Some("555-0100".to_string()),
            years_experience: Some(3),
            desired_position: Some("Backend Engineer".to_string()),
            location: Some("Berlin".to_string()),
            tech_stack: vec!["Python".to_string(), "Go".to_string()],
        }
    }

    fn questions() -> TechQuestionSet {
        TechQuestionSet {
            questions: vec![TopicQuestions {
                topic: "Python".to_string(),
                questions: vec!["a".to_string(), "b".to_string(), "c".to_string()],
            }],
        }
    }

    fn store() -> (TempDir, CandidateStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = CandidateStore::new(dir.path().join("data"), 90);
        store.init().unwrap();
        (dir, store)
    }

    #[test]
    fn test_two_candidates_two_records_round_trip() {
        let (_dir, store) = store();
        let alice = profile("Alice", "alice@x.com");
        let bob = profile("Bob", "bob@y.org");
        let answers = vec![QuestionAnswer {
            topic: "Python".to_string(),
            question: "a".to_string(),
            answer: "generators yield lazily".to_string(),
        }];

        let alice_id = store.save(&alice, &questions(), &answers).unwrap();
        let bob_id = store.save(&bob, &TechQuestionSet::default(), &[]).unwrap();
        assert_ne!(alice_id, bob_id);

        let records = store.list().unwrap();
        assert_eq!(records.len(), 2);

        let loaded = store.load(alice_id).unwrap().unwrap();
        assert_eq!(loaded.profile, alice);
        assert_eq!(loaded.questions, questions().questions);
        assert_eq!(loaded.answers, answers);
        assert_eq!(store.load(bob_id).unwrap().unwrap().profile, bob);
    }

    #[test]
    fn test_same_candidate_last_write_wins() {
        let (_dir, store) = store();
        let first = profile("Alice", "alice@x.com");
        let second = CandidateProfile {
            location: Some("Munich".to_string()),
            ..profile("Alice", "ALICE@x.com")
        };

        let id1 = store.save(&first, &TechQuestionSet::default(), &[]).unwrap();
        let id2 = store.save(&second, &TechQuestionSet::default(), &[]).unwrap();

        assert_eq!(id1, id2);
        let records = store.list().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].profile.location.as_deref(), Some("Munich"));
    }

    #[test]
    fn test_incomplete_profile_is_never_written() {
        let (_dir, store) = store();
        let complete = profile("Alice", "alice@x.com");
        let id = store.save(&complete, &TechQuestionSet::default(), &[]).unwrap();

        let partial = CandidateProfile {
            tech_stack: Vec::new(),
            ..complete.clone()
        };
        let err = store
            .save(&partial, &TechQuestionSet::default(), &[])
            .unwrap_err();

        assert!(matches!(err, StorageError::Incomplete(ref m) if m == &vec!["tech_stack"]));
        assert_eq!(store.load(id).unwrap().unwrap().profile, complete);
    }

    #[test]
    fn test_record_carries_retention_expiry() {
        let (_dir, store) = store();
        let now = Utc::now();
        let id = store
            .save_at(&profile("Alice", "alice@x.com"), &TechQuestionSet::default(), &[], now)
            .unwrap();

        let record = store.load(id).unwrap().unwrap();
        assert_eq!(record.expires_at - record.generated_at, Duration::days(90));
    }

    #[test]
    fn test_expired_records_are_purged_on_save() {
        let (_dir, store) = store();
        let long_ago = Utc::now() - Duration::days(120);
        let old_id = store
            .save_at(&profile("Old", "old@x.com"), &TechQuestionSet::default(), &[], long_ago)
            .unwrap();

        let new_id = store
            .save(&profile("New", "new@x.com"), &TechQuestionSet::default(), &[])
            .unwrap();

        assert!(store.load(old_id).unwrap().is_none());
        assert!(store.load(new_id).unwrap().is_some());
    }

    #[test]
    fn test_list_skips_malformed_files() {
        let (_dir, store) = store();
        store
            .save(&profile("Alice", "alice@x.com"), &TechQuestionSet::default(), &[])
            .unwrap();
        fs::write(store.dir().join("garbage.json"), "{not json").unwrap();
        fs::write(store.dir().join("notes.txt"), "ignored").unwrap();

        assert_eq!(store.list().unwrap().len(), 1);
    }

    #[test]
    fn test_missing_directory_lists_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = CandidateStore::new(dir.path().join("absent"), 90);
        assert!(store.list().unwrap().is_empty());
        assert!(store.load(Uuid::new_v4()).unwrap().is_none());
    }

    #[test]
    fn test_record_id_is_stable_per_identity() {
        assert_eq!(
            CandidateStore::record_id_for("alice@x.com"),
            CandidateStore::record_id_for("alice@x.com")
        );
        assert_ne!(
            CandidateStore::record_id_for("alice@x.com"),
            CandidateStore::record_id_for("bob@x.com")
        );
    }
}
