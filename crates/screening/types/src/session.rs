//! Screening sessions: one caregiver interview across one or more
//! compiled trees.
//!
//! A session locks the exact compiled version of every disease it screens
//! at creation time and keeps those versions for its whole lifetime, even
//! if newer versions become active later.

use crate::{DiseaseId, NodeId, Outcome, SessionId, TreeNode};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Lifecycle status of a session
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// Accepting answers
    Active,
    /// Closed with a terminal outcome
    Closed,
    /// Explicitly canceled by the caller
    Canceled,
    /// Idle past the timeout; caller must start a new session
    Expired,
}

/// One screening session
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: SessionId,
    /// The child or patient being screened
    pub subject_id: String,
    /// The care context (village, clinic, campaign)
    pub context_id: String,
    /// Exact compiled version locked per disease for the session's lifetime
    pub locked_versions: HashMap<DiseaseId, u32>,
    pub status: SessionStatus,
    pub outcome: Outcome,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Session {
    pub fn new(subject_id: impl Into<String>, context_id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: SessionId::generate(),
            subject_id: subject_id.into(),
            context_id: context_id.into(),
            locked_versions: HashMap::new(),
            status: SessionStatus::Active,
            outcome: Outcome::Pending,
            created_at: now,
            updated_at: now,
        }
    }

    /// Pin a disease to the compiled version loaded at session start
    pub fn lock_version(&mut self, disease: DiseaseId, version: u32) {
        self.locked_versions.insert(disease, version);
    }

    /// The locked version for a disease, if this session screens it
    pub fn locked_version(&self, disease: &DiseaseId) -> Option<u32> {
        self.locked_versions.get(disease).copied()
    }

    /// No further mutation is permitted once a session is terminal
    pub fn is_terminal(&self) -> bool {
        self.status != SessionStatus::Active || self.outcome.is_terminal()
    }

    /// Whether the session has sat idle in the pending state too long
    pub fn idle_longer_than(&self, timeout: chrono::Duration, now: DateTime<Utc>) -> bool {
        now - self.updated_at > timeout
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Close with a terminal outcome
    pub fn close(&mut self, outcome: Outcome) {
        self.status = SessionStatus::Closed;
        self.outcome = outcome;
        self.updated_at = Utc::now();
    }

    pub fn cancel(&mut self) {
        self.status = SessionStatus::Canceled;
        self.outcome = Outcome::Canceled;
        self.updated_at = Utc::now();
    }

    pub fn expire(&mut self) {
        self.status = SessionStatus::Expired;
        self.updated_at = Utc::now();
    }
}

/// One answer to one node, at most one per distinct node per session.
///
/// Resubmitting the same node with the same boolean leaves the record
/// untouched; a different boolean updates it in place.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnswerRecord {
    pub session_id: SessionId,
    pub node_id: NodeId,
    pub answer: bool,
    /// Position in the session's answer log, assigned at first insert
    pub order: u32,
    pub recorded_at: DateTime<Utc>,
}

/// Immutable copy of every node list loaded at session start.
///
/// Audit artifact for replay and operator review; outcome computation
/// always goes through the locked, hash-verified tree rows instead.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub session_id: SessionId,
    pub trees: HashMap<DiseaseId, Vec<TreeNode>>,
    pub taken_at: DateTime<Utc>,
}

impl SessionSnapshot {
    pub fn new(session_id: SessionId, trees: HashMap<DiseaseId, Vec<TreeNode>>) -> Self {
        Self {
            session_id,
            trees,
            taken_at: Utc::now(),
        }
    }
}
