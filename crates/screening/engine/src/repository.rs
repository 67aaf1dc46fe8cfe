//! Repository abstractions owned by the persistence layer and injected
//! into the orchestrator.
//!
//! The core never reaches into a store directly; these traits are its
//! only seam. `upsert_answer` is the one operation that must be atomic in
//! the backend: a concurrent duplicate submission must never produce two
//! rows for the same `(session, node)` pair.

use async_trait::async_trait;
use screening_types::{
    AnswerRecord, CompiledTree, DiseaseId, NodeId, ScreeningResult, Session, SessionId,
    SessionSnapshot,
};

/// Effect of an idempotent answer upsert
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AnswerUpsert {
    /// First answer for this node in this session
    Inserted,
    /// The node was answered before with the other boolean; updated in place
    Updated,
    /// Same node, same boolean; nothing changed
    Unchanged,
}

/// Read access to compiled trees
#[async_trait]
pub trait TreeRepository: Send + Sync {
    /// Currently-active trees for the given diseases; an empty id set
    /// means all active trees (broad screening)
    async fn find_active(&self, disease_ids: &[DiseaseId]) -> ScreeningResult<Vec<CompiledTree>>;

    /// A tree by disease and exact version, active or not — locked-session
    /// lookups must keep resolving versions that were since superseded
    async fn find_version(
        &self,
        disease_id: &DiseaseId,
        version: u32,
    ) -> ScreeningResult<Option<CompiledTree>>;
}

/// Session, answer-log and snapshot persistence
#[async_trait]
pub trait SessionRepository: Send + Sync {
    async fn create_session(&self, session: Session) -> ScreeningResult<()>;

    async fn find_session(&self, id: &SessionId) -> ScreeningResult<Option<Session>>;

    async fn update_session(&self, session: Session) -> ScreeningResult<()>;

    /// Create-or-update the answer for `(session, node)` as one atomic
    /// operation
    async fn upsert_answer(
        &self,
        session_id: &SessionId,
        node_id: &NodeId,
        answer: bool,
    ) -> ScreeningResult<AnswerUpsert>;

    /// All answers recorded for a session, in insertion order
    async fn answers_for(&self, session_id: &SessionId) -> ScreeningResult<Vec<AnswerRecord>>;

    /// Persist the immutable node-list snapshot taken at session start
    async fn save_snapshot(&self, snapshot: SessionSnapshot) -> ScreeningResult<()>;

    /// The snapshot taken at session start, for audit
    async fn find_snapshot(
        &self,
        session_id: &SessionId,
    ) -> ScreeningResult<Option<SessionSnapshot>>;
}
