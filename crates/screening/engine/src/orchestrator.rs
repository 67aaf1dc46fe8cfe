//! Session orchestrator: the stateful coordinator on top of the pure
//! runtime.
//!
//! The orchestrator owns session lifecycle — version locking at start,
//! integrity verification and idempotent answer intake on every
//! submission, multi-disease ranking and conflict resolution, timeout and
//! hard-stop enforcement, and post-hoc replay. It never executes clinical
//! logic itself: outcomes come from the runtime, storage from the two
//! injected repositories.
//!
//! Concurrency model: no shared mutable state across sessions; within one
//! session, submissions are serialized by a per-session lock held across
//! the whole read-modify-write.

use crate::repository::{SessionRepository, TreeRepository};
use crate::runtime::{find_next_question, resolve_outcome};
use chrono::{Duration, Utc};
use screening_compiler::hash_spec;
use screening_types::{
    CompiledTree, DiseaseId, NodeId, Outcome, ScreeningError, ScreeningResult, Session,
    SessionId, SessionSnapshot, SessionStatus, TreeNode,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex};
use tokio::sync::Mutex as AsyncMutex;

/// Sessions idle in the pending state longer than this are expired and
/// must be restarted by the caller
const DEFAULT_IDLE_TIMEOUT_MINUTES: i64 = 30;

/// Result of starting a session
#[derive(Clone, Debug)]
pub struct SessionStart {
    pub session_id: SessionId,
    /// Exact compiled version locked per disease
    pub locked_versions: HashMap<DiseaseId, u32>,
    /// Each disease's entry-gate question, ordered by disease id
    pub initial_questions: Vec<TreeNode>,
}

/// Result of one answer submission
#[derive(Clone, Debug, PartialEq)]
pub enum SubmitOutcome {
    /// The ranked outcome was terminal; the session is closed
    Closed { outcome: Outcome },
    /// The next unanswered question of the highest-ranked pending disease
    Next { question: TreeNode },
    /// No disease has a next question, none reached a terminal outcome
    Pending,
}

/// Read-only projection of session state
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SessionStatusReport {
    pub status: SessionStatus,
    pub outcome: Outcome,
}

/// Outcome of replaying a session's answer log against its locked trees
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ReplayReport {
    pub matches: bool,
    pub stored_outcome: Outcome,
    pub replayed_outcome: Outcome,
}

/// The screening session orchestrator
pub struct ScreeningOrchestrator {
    trees: Arc<dyn TreeRepository>,
    sessions: Arc<dyn SessionRepository>,
    idle_timeout: Duration,
    /// One lock per live session; serializes submissions within a session
    session_locks: StdMutex<HashMap<SessionId, Arc<AsyncMutex<()>>>>,
}

impl ScreeningOrchestrator {
    pub fn new(trees: Arc<dyn TreeRepository>, sessions: Arc<dyn SessionRepository>) -> Self {
        Self {
            trees,
            sessions,
            idle_timeout: Duration::minutes(DEFAULT_IDLE_TIMEOUT_MINUTES),
            session_locks: StdMutex::new(HashMap::new()),
        }
    }

    pub fn with_idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = timeout;
        self
    }

    /// Start a screening session.
    ///
    /// Loads the currently-active tree of every requested disease (all
    /// active trees when `disease_ids` is empty, to screen broadly), locks
    /// the session to those exact versions, persists an immutable node
    /// snapshot for audit, and returns each disease's entry-gate question.
    pub async fn start_session(
        &self,
        subject_id: impl Into<String>,
        context_id: impl Into<String>,
        disease_ids: &[DiseaseId],
    ) -> ScreeningResult<SessionStart> {
        let mut active = self.trees.find_active(disease_ids).await?;
        if active.is_empty() {
            return Err(ScreeningError::NoActiveTree);
        }
        active.sort_by(|a, b| a.disease_id.cmp(&b.disease_id));

        let mut session = Session::new(subject_id, context_id);
        let mut initial_questions = Vec::with_capacity(active.len());
        let mut snapshot_trees = HashMap::with_capacity(active.len());
        for tree in &active {
            session.lock_version(tree.disease_id.clone(), tree.version);
            if let Some(gate) = tree.entry_gate().or_else(|| tree.nodes.first()) {
                initial_questions.push(gate.clone());
            }
            snapshot_trees.insert(tree.disease_id.clone(), tree.nodes.clone());
        }

        let session_id = session.id.clone();
        let locked_versions = session.locked_versions.clone();
        self.sessions.create_session(session).await?;
        self.sessions
            .save_snapshot(SessionSnapshot::new(session_id.clone(), snapshot_trees))
            .await?;

        tracing::info!(
            session_id = %session_id,
            diseases = active.len(),
            "screening session started"
        );

        Ok(SessionStart {
            session_id,
            locked_versions,
            initial_questions,
        })
    }

    /// Submit one answer and advance the session.
    ///
    /// The whole read-modify-write — terminal and timeout guards, locked
    /// tree verification, idempotent answer upsert, outcome recomputation
    /// and persistence — runs under the session's lock, so concurrent
    /// duplicate submissions cannot race.
    pub async fn submit_answer(
        &self,
        session_id: &SessionId,
        node_id: &NodeId,
        answer: bool,
    ) -> ScreeningResult<SubmitOutcome> {
        let lock = self.lock_for(session_id)?;
        let _guard = lock.lock().await;

        let mut session = self
            .sessions
            .find_session(session_id)
            .await?
            .ok_or_else(|| ScreeningError::SessionNotFound(session_id.clone()))?;

        // Hard stop: no further mutation once terminal
        if session.is_terminal() {
            return Err(ScreeningError::SessionClosed(session_id.clone()));
        }

        // Idle timeout: the caller must restart
        if session.idle_longer_than(self.idle_timeout, Utc::now()) {
            session.expire();
            self.sessions.update_session(session).await?;
            self.drop_lock(session_id);
            tracing::warn!(session_id = %session_id, "session expired after idle timeout");
            return Err(ScreeningError::SessionExpired(session_id.clone()));
        }

        // The node id carries its owning disease; resolve the locked tree
        // and verify it is still the row recorded at session start
        let disease = &node_id.disease;
        let locked_version = session
            .locked_version(disease)
            .ok_or_else(|| ScreeningError::UnknownNode(node_id.clone()))?;
        let tree = self
            .trees
            .find_version(disease, locked_version)
            .await?
            .ok_or_else(|| ScreeningError::VersionMismatch {
                disease: disease.clone(),
                version: locked_version,
            })?;
        self.verify_integrity(&tree)?;

        if !tree.contains(node_id) {
            return Err(ScreeningError::UnknownNode(node_id.clone()));
        }

        let upsert = self
            .sessions
            .upsert_answer(session_id, node_id, answer)
            .await?;
        tracing::debug!(
            session_id = %session_id,
            node_id = %node_id,
            answer,
            effect = ?upsert,
            "answer recorded"
        );

        // Recompute every disease with at least one recorded answer
        // against its locked tree
        let answers = self.sessions.answers_for(session_id).await?;
        let mut by_disease: HashMap<DiseaseId, HashMap<NodeId, bool>> = HashMap::new();
        for record in &answers {
            by_disease
                .entry(record.node_id.disease.clone())
                .or_default()
                .insert(record.node_id.clone(), record.answer);
        }

        let mut loaded: HashMap<DiseaseId, CompiledTree> = HashMap::new();
        loaded.insert(tree.disease_id.clone(), tree);
        let mut per_disease: Vec<(DiseaseId, Outcome)> = Vec::with_capacity(by_disease.len());
        for (disease, answer_map) in &by_disease {
            let tree = self.locked_tree(&session, disease, &mut loaded).await?;
            per_disease.push((disease.clone(), resolve_outcome(answer_map, &tree.nodes)));
        }

        let ranked = rank_outcomes(per_disease);
        let emergencies = ranked
            .iter()
            .filter(|(_, o)| *o == Outcome::Emergency)
            .count();
        if emergencies > 1 {
            // Several diseases fired independently; a single emergency
            // result is surfaced
            tracing::warn!(session_id = %session_id, emergencies, "collapsing to one emergency");
        }

        let top = ranked
            .first()
            .map(|(_, outcome)| *outcome)
            .unwrap_or(Outcome::Pending);

        if top.is_terminal() {
            session.close(top);
            self.sessions.update_session(session).await?;
            self.drop_lock(session_id);
            tracing::info!(session_id = %session_id, outcome = %top, "session closed");
            return Ok(SubmitOutcome::Closed { outcome: top });
        }

        session.touch();
        self.sessions.update_session(session.clone()).await?;

        for (disease, outcome) in &ranked {
            if *outcome != Outcome::Pending {
                continue;
            }
            let tree = self.locked_tree(&session, disease, &mut loaded).await?;
            let answer_map = by_disease.get(disease).cloned().unwrap_or_default();
            if let Some(question) = find_next_question(&answer_map, &tree.nodes)? {
                return Ok(SubmitOutcome::Next {
                    question: question.clone(),
                });
            }
        }

        Ok(SubmitOutcome::Pending)
    }

    /// Read-only projection of current session state
    pub async fn session_status(
        &self,
        session_id: &SessionId,
    ) -> ScreeningResult<SessionStatusReport> {
        let session = self
            .sessions
            .find_session(session_id)
            .await?
            .ok_or_else(|| ScreeningError::SessionNotFound(session_id.clone()))?;
        Ok(SessionStatusReport {
            status: session.status,
            outcome: session.outcome,
        })
    }

    /// Explicitly cancel a non-terminal session
    pub async fn cancel_session(&self, session_id: &SessionId) -> ScreeningResult<()> {
        let lock = self.lock_for(session_id)?;
        let _guard = lock.lock().await;

        let mut session = self
            .sessions
            .find_session(session_id)
            .await?
            .ok_or_else(|| ScreeningError::SessionNotFound(session_id.clone()))?;
        if session.is_terminal() {
            return Err(ScreeningError::SessionClosed(session_id.clone()));
        }
        session.cancel();
        self.sessions.update_session(session).await?;
        self.drop_lock(session_id);
        tracing::info!(session_id = %session_id, "session canceled");
        Ok(())
    }

    /// Rebuild the answer map from the persisted log, recompute outcomes
    /// against the locked trees, and report whether the result matches the
    /// outcome stored at close time. Runnable at any time after a session
    /// closes; this is the audit mechanism.
    pub async fn replay_session(&self, session_id: &SessionId) -> ScreeningResult<ReplayReport> {
        let session = self
            .sessions
            .find_session(session_id)
            .await?
            .ok_or_else(|| ScreeningError::SessionNotFound(session_id.clone()))?;

        let answers = self.sessions.answers_for(session_id).await?;
        let mut by_disease: HashMap<DiseaseId, HashMap<NodeId, bool>> = HashMap::new();
        for record in &answers {
            by_disease
                .entry(record.node_id.disease.clone())
                .or_default()
                .insert(record.node_id.clone(), record.answer);
        }

        let mut loaded = HashMap::new();
        let mut per_disease = Vec::with_capacity(by_disease.len());
        for (disease, answer_map) in &by_disease {
            let tree = self.locked_tree(&session, disease, &mut loaded).await?;
            per_disease.push((disease.clone(), resolve_outcome(answer_map, &tree.nodes)));
        }

        let replayed_outcome = rank_outcomes(per_disease)
            .first()
            .map(|(_, outcome)| *outcome)
            .unwrap_or(Outcome::Pending);
        let report = ReplayReport {
            matches: replayed_outcome == session.outcome,
            stored_outcome: session.outcome,
            replayed_outcome,
        };

        if !report.matches {
            tracing::warn!(
                session_id = %session_id,
                stored = %report.stored_outcome,
                replayed = %report.replayed_outcome,
                "replay diverged from stored outcome"
            );
        }

        Ok(report)
    }

    /// Resolve a disease's locked tree, memoizing rows already fetched
    /// during this call
    async fn locked_tree<'a>(
        &self,
        session: &Session,
        disease: &DiseaseId,
        loaded: &'a mut HashMap<DiseaseId, CompiledTree>,
    ) -> ScreeningResult<&'a CompiledTree> {
        if !loaded.contains_key(disease) {
            let version = session.locked_version(disease).ok_or_else(|| {
                ScreeningError::Internal(format!(
                    "answers recorded for unlocked disease '{}'",
                    disease
                ))
            })?;
            let tree = self
                .trees
                .find_version(disease, version)
                .await?
                .ok_or_else(|| ScreeningError::VersionMismatch {
                    disease: disease.clone(),
                    version,
                })?;
            loaded.insert(disease.clone(), tree);
        }
        Ok(&loaded[disease])
    }

    /// Reject a tree whose stored spec no longer hashes to the digest
    /// recorded at compile time — it was mutated out of band
    fn verify_integrity(&self, tree: &CompiledTree) -> ScreeningResult<()> {
        let recomputed =
            hash_spec(&tree.spec).map_err(|e| ScreeningError::Internal(e.to_string()))?;
        if recomputed != tree.content_hash {
            tracing::error!(
                disease = %tree.disease_id,
                version = tree.version,
                stored_hash = %tree.content_hash,
                recomputed_hash = %recomputed,
                "stored spec fails its compile-time content hash"
            );
            return Err(ScreeningError::IntegrityViolation {
                disease: tree.disease_id.clone(),
                version: tree.version,
            });
        }
        Ok(())
    }

    fn lock_for(&self, session_id: &SessionId) -> ScreeningResult<Arc<AsyncMutex<()>>> {
        let mut guard = self
            .session_locks
            .lock()
            .map_err(|_| ScreeningError::Repository("session lock registry poisoned".into()))?;
        Ok(guard.entry(session_id.clone()).or_default().clone())
    }

    fn drop_lock(&self, session_id: &SessionId) {
        if let Ok(mut guard) = self.session_locks.lock() {
            guard.remove(session_id);
        }
    }
}

/// Order per-disease outcomes most severe first, disease id as the
/// tie-break so ranking is stable
fn rank_outcomes(mut per_disease: Vec<(DiseaseId, Outcome)>) -> Vec<(DiseaseId, Outcome)> {
    per_disease.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    per_disease
}
