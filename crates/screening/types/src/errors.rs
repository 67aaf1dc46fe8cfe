//! Shared error taxonomy for the screening core.
//!
//! Four caller-facing families: not-found, forbidden, conflict and
//! bad-request. Nothing here is retried internally — every error surfaces
//! synchronously to the caller, which decides whether to start over.

use crate::{DiseaseId, NodeId, SessionId};
use thiserror::Error;

/// Result type for screening operations
pub type ScreeningResult<T> = Result<T, ScreeningError>;

/// Errors surfaced by the screening core
#[derive(Debug, Error)]
pub enum ScreeningError {
    // ── Not found ────────────────────────────────────────────────────
    #[error("no active screening tree for the requested diseases")]
    NoActiveTree,

    #[error("session '{0}' not found")]
    SessionNotFound(SessionId),

    // ── Forbidden ────────────────────────────────────────────────────
    /// The node id is not part of any tree locked by the session —
    /// client tampering or a stale client-side tree
    #[error("node '{0}' is not part of this session's locked trees")]
    UnknownNode(NodeId),

    // ── Conflict (fatal to the session) ──────────────────────────────
    #[error("locked tree version {version} for disease '{disease}' is no longer resolvable")]
    VersionMismatch { disease: DiseaseId, version: u32 },

    /// The stored spec no longer hashes to the digest recorded at compile
    /// time — the tree row was mutated out of band
    #[error("content hash mismatch for disease '{disease}' version {version}")]
    IntegrityViolation { disease: DiseaseId, version: u32 },

    // ── Bad request (user-recoverable) ───────────────────────────────
    #[error("session '{0}' is already closed")]
    SessionClosed(SessionId),

    #[error("session '{0}' expired after sitting idle past the timeout")]
    SessionExpired(SessionId),

    // ── Internal consistency (compiler defects, never user-facing) ───
    /// Traversal reached a successor id absent from the node list
    #[error("node '{from}' points at missing node '{missing}'")]
    DanglingNode { from: NodeId, missing: NodeId },

    /// A non-terminal node with no successor for the recorded answer
    #[error("node '{0}' has no successor for the recorded answer")]
    MissingSuccessor(NodeId),

    #[error("internal error: {0}")]
    Internal(String),

    #[error("repository error: {0}")]
    Repository(String),
}
