//! Compiled trees: one disease spec, one version, one flat node list.

use crate::{DiseaseId, DiseaseSpec, NodeId, NodeKind, TreeNode};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Minimum-symptom threshold applied when the entry gate carries none
pub const DEFAULT_SYMPTOM_THRESHOLD: u32 = 2;

/// The compiled form of one disease spec version.
///
/// Immutable once created — a new spec version is a new `CompiledTree`,
/// never a mutation of an existing one. `content_hash` is the canonical
/// digest of `spec`, recomputed on demand to detect out-of-band drift.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CompiledTree {
    pub disease_id: DiseaseId,
    pub version: u32,
    pub nodes: Vec<TreeNode>,
    /// The source spec this tree was compiled from; integrity checks
    /// re-hash this stored copy
    pub spec: DiseaseSpec,
    /// Canonical content hash of `spec`, recorded at compile time
    pub content_hash: String,
    pub is_active: bool,
    pub compiled_at: DateTime<Utc>,
}

impl CompiledTree {
    pub fn new(
        spec: DiseaseSpec,
        version: u32,
        nodes: Vec<TreeNode>,
        content_hash: impl Into<String>,
    ) -> Self {
        Self {
            disease_id: spec.disease_id.clone(),
            version,
            nodes,
            spec,
            content_hash: content_hash.into(),
            is_active: false,
            compiled_at: Utc::now(),
        }
    }

    pub fn activate(mut self) -> Self {
        self.is_active = true;
        self
    }

    /// Get a node by id
    pub fn node(&self, id: &NodeId) -> Option<&TreeNode> {
        self.nodes.iter().find(|n| &n.id == id)
    }

    /// Whether this tree contains the node
    pub fn contains(&self, id: &NodeId) -> bool {
        self.node(id).is_some()
    }

    /// The entry-gate node, if the tree has one
    pub fn entry_gate(&self) -> Option<&TreeNode> {
        self.nodes.iter().find(|n| n.kind == NodeKind::EntryGate)
    }

    /// The minimum-symptom threshold recorded on the entry gate
    pub fn symptom_threshold(&self) -> u32 {
        self.entry_gate()
            .and_then(|gate| gate.meta.symptom_threshold)
            .unwrap_or(DEFAULT_SYMPTOM_THRESHOLD)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }
}
