//! In-memory reference implementations of the repository traits.
//!
//! Deterministic and test-friendly. Production deployments back these
//! traits with a transactional store; the in-memory adapters serve tests
//! and reference wiring.

use crate::repository::{AnswerUpsert, SessionRepository, TreeRepository};
use async_trait::async_trait;
use chrono::Utc;
use screening_types::{
    AnswerRecord, CompiledTree, DiseaseId, NodeId, ScreeningError, ScreeningResult, Session,
    SessionId, SessionSnapshot,
};
use std::collections::HashMap;
use std::sync::RwLock;

/// In-memory compiled-tree store
#[derive(Default)]
pub struct InMemoryTreeRepository {
    trees: RwLock<Vec<CompiledTree>>,
}

impl InMemoryTreeRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a compiled tree row
    pub fn insert(&self, tree: CompiledTree) -> ScreeningResult<()> {
        let mut guard = self
            .trees
            .write()
            .map_err(|_| ScreeningError::Repository("trees lock poisoned".into()))?;
        guard.push(tree);
        Ok(())
    }

    /// Replace a stored row in place. Test hook for simulating
    /// out-of-band mutation; real tree rows are immutable.
    pub fn overwrite(
        &self,
        disease_id: &DiseaseId,
        version: u32,
        tree: CompiledTree,
    ) -> ScreeningResult<()> {
        let mut guard = self
            .trees
            .write()
            .map_err(|_| ScreeningError::Repository("trees lock poisoned".into()))?;
        if let Some(row) = guard
            .iter_mut()
            .find(|t| &t.disease_id == disease_id && t.version == version)
        {
            *row = tree;
        }
        Ok(())
    }
}

#[async_trait]
impl TreeRepository for InMemoryTreeRepository {
    async fn find_active(&self, disease_ids: &[DiseaseId]) -> ScreeningResult<Vec<CompiledTree>> {
        let guard = self
            .trees
            .read()
            .map_err(|_| ScreeningError::Repository("trees lock poisoned".into()))?;

        let mut best: HashMap<DiseaseId, CompiledTree> = HashMap::new();
        for tree in guard.iter() {
            if !tree.is_active {
                continue;
            }
            if !disease_ids.is_empty() && !disease_ids.contains(&tree.disease_id) {
                continue;
            }
            match best.get(&tree.disease_id) {
                Some(existing) if existing.version >= tree.version => {}
                _ => {
                    best.insert(tree.disease_id.clone(), tree.clone());
                }
            }
        }

        let mut active: Vec<CompiledTree> = best.into_values().collect();
        active.sort_by(|a, b| a.disease_id.cmp(&b.disease_id));
        Ok(active)
    }

    async fn find_version(
        &self,
        disease_id: &DiseaseId,
        version: u32,
    ) -> ScreeningResult<Option<CompiledTree>> {
        let guard = self
            .trees
            .read()
            .map_err(|_| ScreeningError::Repository("trees lock poisoned".into()))?;
        Ok(guard
            .iter()
            .find(|t| &t.disease_id == disease_id && t.version == version)
            .cloned())
    }
}

/// In-memory session, answer-log and snapshot store
#[derive(Default)]
pub struct InMemorySessionRepository {
    sessions: RwLock<HashMap<SessionId, Session>>,
    answers: RwLock<HashMap<SessionId, Vec<AnswerRecord>>>,
    snapshots: RwLock<HashMap<SessionId, SessionSnapshot>>,
}

impl InMemorySessionRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionRepository for InMemorySessionRepository {
    async fn create_session(&self, session: Session) -> ScreeningResult<()> {
        let mut guard = self
            .sessions
            .write()
            .map_err(|_| ScreeningError::Repository("sessions lock poisoned".into()))?;
        guard.insert(session.id.clone(), session);
        Ok(())
    }

    async fn find_session(&self, id: &SessionId) -> ScreeningResult<Option<Session>> {
        let guard = self
            .sessions
            .read()
            .map_err(|_| ScreeningError::Repository("sessions lock poisoned".into()))?;
        Ok(guard.get(id).cloned())
    }

    async fn update_session(&self, session: Session) -> ScreeningResult<()> {
        let mut guard = self
            .sessions
            .write()
            .map_err(|_| ScreeningError::Repository("sessions lock poisoned".into()))?;
        if !guard.contains_key(&session.id) {
            return Err(ScreeningError::SessionNotFound(session.id));
        }
        guard.insert(session.id.clone(), session);
        Ok(())
    }

    async fn upsert_answer(
        &self,
        session_id: &SessionId,
        node_id: &NodeId,
        answer: bool,
    ) -> ScreeningResult<AnswerUpsert> {
        // One write guard covers find-or-create; concurrent duplicates
        // cannot interleave
        let mut guard = self
            .answers
            .write()
            .map_err(|_| ScreeningError::Repository("answers lock poisoned".into()))?;
        let log = guard.entry(session_id.clone()).or_default();

        match log.iter_mut().find(|r| &r.node_id == node_id) {
            Some(record) if record.answer == answer => Ok(AnswerUpsert::Unchanged),
            Some(record) => {
                record.answer = answer;
                record.recorded_at = Utc::now();
                Ok(AnswerUpsert::Updated)
            }
            None => {
                let order = log.len() as u32;
                log.push(AnswerRecord {
                    session_id: session_id.clone(),
                    node_id: node_id.clone(),
                    answer,
                    order,
                    recorded_at: Utc::now(),
                });
                Ok(AnswerUpsert::Inserted)
            }
        }
    }

    async fn answers_for(&self, session_id: &SessionId) -> ScreeningResult<Vec<AnswerRecord>> {
        let guard = self
            .answers
            .read()
            .map_err(|_| ScreeningError::Repository("answers lock poisoned".into()))?;
        Ok(guard.get(session_id).cloned().unwrap_or_default())
    }

    async fn save_snapshot(&self, snapshot: SessionSnapshot) -> ScreeningResult<()> {
        let mut guard = self
            .snapshots
            .write()
            .map_err(|_| ScreeningError::Repository("snapshots lock poisoned".into()))?;
        guard.insert(snapshot.session_id.clone(), snapshot);
        Ok(())
    }

    async fn find_snapshot(
        &self,
        session_id: &SessionId,
    ) -> ScreeningResult<Option<SessionSnapshot>> {
        let guard = self
            .snapshots
            .read()
            .map_err(|_| ScreeningError::Repository("snapshots lock poisoned".into()))?;
        Ok(guard.get(session_id).cloned())
    }
}
