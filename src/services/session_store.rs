use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};
use uuid::Uuid;
use validator::Validate;

use crate::core::time::{format_primitive, primitive_now_utc};
use crate::domain::answer_key::AnswerMap;
use crate::domain::models::{ExamSession, TestDefinition};
use crate::domain::types::SessionStatus;
use crate::schemas::breakdown::GradingRecord;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("test {0} not found")]
    TestNotFound(String),
    #[error("session {0} not found")]
    SessionNotFound(String),
    #[error("session {0} is no longer accepting answers")]
    SessionClosed(String),
    #[error("invalid test definition: {0}")]
    InvalidDefinition(String),
}

/// Submit lock for one session. Held across the whole grading run so a
/// concurrent sync cannot write between the orchestrator's read and its
/// upsert.
pub struct SessionLock {
    _guard: OwnedMutexGuard<()>,
}

/// Seam to the excluded persistence layer. Implementations must make each
/// method atomic with respect to the others for the same session.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn load_test(&self, test_id: &str) -> Result<TestDefinition, StoreError>;

    async fn load_session(&self, session_id: &str) -> Result<ExamSession, StoreError>;

    /// Takes the session's submit lock; released when the returned guard
    /// drops.
    async fn lock_session(&self, session_id: &str) -> Result<SessionLock, StoreError>;

    /// Key-wise merge of a partial update into the stored answers, returning
    /// the post-merge map. Unlike `sync` entry points this is not gated on
    /// session status; the submit path calls it under the submit lock.
    async fn merge_answers(&self, session_id: &str, patch: AnswerMap)
        -> Result<AnswerMap, StoreError>;

    /// Replaces any previously stored record for the session (update or
    /// create, never append) and marks the session graded.
    async fn upsert_result(
        &self,
        session_id: &str,
        record: &GradingRecord,
    ) -> Result<(), StoreError>;
}

#[derive(Debug, Clone)]
struct StoredResult {
    record: GradingRecord,
    graded_at: String,
}

/// Reference store used by tests and by embedding services that keep
/// sessions in process memory.
#[derive(Default)]
pub struct InMemorySessionStore {
    tests: RwLock<HashMap<String, TestDefinition>>,
    sessions: RwLock<HashMap<String, ExamSession>>,
    results: RwLock<HashMap<String, StoredResult>>,
    submit_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a test definition, validating the tree first. This is the
    /// activation gate: an invalid definition never becomes available for
    /// sessions.
    pub async fn insert_test(&self, test: TestDefinition) -> Result<(), StoreError> {
        test.validate().map_err(|err| StoreError::InvalidDefinition(err.to_string()))?;
        self.tests.write().await.insert(test.id.clone(), test);
        Ok(())
    }

    pub async fn create_session(
        &self,
        test_id: &str,
        student_id: &str,
    ) -> Result<ExamSession, StoreError> {
        if !self.tests.read().await.contains_key(test_id) {
            return Err(StoreError::TestNotFound(test_id.to_string()));
        }
        let session = ExamSession {
            id: Uuid::new_v4().to_string(),
            test_id: test_id.to_string(),
            student_id: student_id.to_string(),
            status: SessionStatus::Active,
            answers: AnswerMap::new(),
        };
        self.sessions.write().await.insert(session.id.clone(), session.clone());
        Ok(session)
    }

    /// Periodic sync entry used while the student is still working. Gated
    /// on the session being active; late syncs after submit are conflicts.
    /// Takes the submit lock so a sync can never land between the submit
    /// path's grading read and its upsert.
    pub async fn sync_answers(
        &self,
        session_id: &str,
        patch: AnswerMap,
    ) -> Result<AnswerMap, StoreError> {
        let lock = self.submit_lock_for(session_id).await;
        let _guard = lock.lock().await;

        let mut sessions = self.sessions.write().await;
        let session = sessions
            .get_mut(session_id)
            .ok_or_else(|| StoreError::SessionNotFound(session_id.to_string()))?;
        if session.status != SessionStatus::Active {
            return Err(StoreError::SessionClosed(session_id.to_string()));
        }
        session.answers.merge(patch);
        Ok(session.answers.clone())
    }

    async fn submit_lock_for(&self, session_id: &str) -> Arc<Mutex<()>> {
        let mut locks = self.submit_locks.lock().await;
        locks.entry(session_id.to_string()).or_insert_with(|| Arc::new(Mutex::new(()))).clone()
    }

    pub async fn load_result(&self, session_id: &str) -> Option<GradingRecord> {
        self.results.read().await.get(session_id).map(|stored| stored.record.clone())
    }

    pub async fn graded_at(&self, session_id: &str) -> Option<String> {
        self.results.read().await.get(session_id).map(|stored| stored.graded_at.clone())
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn load_test(&self, test_id: &str) -> Result<TestDefinition, StoreError> {
        self.tests
            .read()
            .await
            .get(test_id)
            .cloned()
            .ok_or_else(|| StoreError::TestNotFound(test_id.to_string()))
    }

    async fn load_session(&self, session_id: &str) -> Result<ExamSession, StoreError> {
        self.sessions
            .read()
            .await
            .get(session_id)
            .cloned()
            .ok_or_else(|| StoreError::SessionNotFound(session_id.to_string()))
    }

    async fn lock_session(&self, session_id: &str) -> Result<SessionLock, StoreError> {
        if !self.sessions.read().await.contains_key(session_id) {
            return Err(StoreError::SessionNotFound(session_id.to_string()));
        }
        let lock = self.submit_lock_for(session_id).await;
        Ok(SessionLock { _guard: lock.lock_owned().await })
    }

    async fn merge_answers(
        &self,
        session_id: &str,
        patch: AnswerMap,
    ) -> Result<AnswerMap, StoreError> {
        let mut sessions = self.sessions.write().await;
        let session = sessions
            .get_mut(session_id)
            .ok_or_else(|| StoreError::SessionNotFound(session_id.to_string()))?;
        session.answers.merge(patch);
        Ok(session.answers.clone())
    }

    async fn upsert_result(
        &self,
        session_id: &str,
        record: &GradingRecord,
    ) -> Result<(), StoreError> {
        let mut sessions = self.sessions.write().await;
        let session = sessions
            .get_mut(session_id)
            .ok_or_else(|| StoreError::SessionNotFound(session_id.to_string()))?;
        session.status = SessionStatus::Graded;
        drop(sessions);

        self.results.write().await.insert(
            session_id.to_string(),
            StoredResult {
                record: record.clone(),
                graded_at: format_primitive(primitive_now_utc()),
            },
        );
        Ok(())
    }
}
