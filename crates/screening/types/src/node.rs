//! Compiled tree nodes: the unit the runtime traverses.

use crate::{DiseaseId, GateKind, Outcome, SymptomWeight};
use serde::{Deserialize, Serialize};

/// Identifier of a node inside one disease's compiled tree.
///
/// The owning disease is an explicit structured field — routing an answer
/// back to its tree never parses a string convention. `Display` and
/// `FromStr` keep the `<disease>__<key>` wire form for callers that
/// transport node ids as plain strings.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId {
    /// The disease whose compiled tree owns this node
    pub disease: DiseaseId,
    /// Key unique within that tree, e.g. `entry_gate` or `symptom__3`
    pub key: String,
}

impl NodeId {
    pub fn new(disease: DiseaseId, key: impl Into<String>) -> Self {
        Self {
            disease,
            key: key.into(),
        }
    }

    /// The single entry-gate node of a disease's tree
    pub fn entry_gate(disease: DiseaseId) -> Self {
        Self::new(disease, "entry_gate")
    }

    /// An indexed node within a category block, e.g. `symptom__0`
    pub fn indexed(disease: DiseaseId, category: &str, index: usize) -> Self {
        Self::new(disease, format!("{}__{}", category, index))
    }

    /// A terminal outcome node, e.g. `outcome__emergency`
    pub fn outcome(disease: DiseaseId, outcome: Outcome) -> Self {
        Self::new(disease, format!("outcome__{}", outcome))
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}__{}", self.disease, self.key)
    }
}

impl std::str::FromStr for NodeId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once("__") {
            Some((disease, key)) if !disease.is_empty() && !key.is_empty() => {
                Ok(Self::new(DiseaseId::new(disease), key))
            }
            _ => Err(format!("malformed node id '{}'", s)),
        }
    }
}

/// The kind of a compiled tree node
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    EntryGate,
    Epidemiology,
    RiskFactor,
    SevereCriteria,
    Symptom,
    WarningSign,
    LabTrigger,
    Outcome,
}

/// Metadata carried from the source spec onto a compiled node
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeMeta {
    /// Which spec field this node was compiled from
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Underlying clinical item id
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<SymptomWeight>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub counts_toward_minimum: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gate: Option<GateKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub override_to: Option<Outcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_care_available: Option<bool>,
    /// Present on exactly one entry-gate node per tree
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symptom_threshold: Option<u32>,
}

/// One yes/no question or terminal outcome in a compiled tree
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TreeNode {
    pub id: NodeId,
    pub kind: NodeKind,
    /// Question text; empty on outcome terminals
    pub question: String,
    /// Successor on "yes"; `None` only on outcome terminals
    #[serde(skip_serializing_if = "Option::is_none")]
    pub yes_target: Option<NodeId>,
    /// Successor on "no"; `None` only on outcome terminals
    #[serde(skip_serializing_if = "Option::is_none")]
    pub no_target: Option<NodeId>,
    /// Optional severity label (e.g. `severe`, `warning`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity: Option<String>,
    /// Terminal outcome value; present only on `NodeKind::Outcome`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<Outcome>,
    #[serde(default)]
    pub meta: NodeMeta,
}

impl TreeNode {
    /// Create a question node; targets are wired by the compiler
    pub fn question(id: NodeId, kind: NodeKind, question: impl Into<String>) -> Self {
        Self {
            id,
            kind,
            question: question.into(),
            yes_target: None,
            no_target: None,
            severity: None,
            outcome: None,
            meta: NodeMeta::default(),
        }
    }

    /// Create a terminal outcome node
    pub fn terminal(disease: DiseaseId, outcome: Outcome) -> Self {
        Self {
            id: NodeId::outcome(disease, outcome),
            kind: NodeKind::Outcome,
            question: String::new(),
            yes_target: None,
            no_target: None,
            severity: None,
            outcome: Some(outcome),
            meta: NodeMeta::default(),
        }
    }

    pub fn with_targets(mut self, yes: NodeId, no: NodeId) -> Self {
        self.yes_target = Some(yes);
        self.no_target = Some(no);
        self
    }

    pub fn with_severity(mut self, severity: impl Into<String>) -> Self {
        self.severity = Some(severity.into());
        self
    }

    pub fn with_meta(mut self, meta: NodeMeta) -> Self {
        self.meta = meta;
        self
    }

    pub fn is_outcome(&self) -> bool {
        self.kind == NodeKind::Outcome
    }

    /// The successor to follow for a recorded answer
    pub fn target_for(&self, answer: bool) -> Option<&NodeId> {
        if answer {
            self.yes_target.as_ref()
        } else {
            self.no_target.as_ref()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_node_id_wire_form() {
        let id = NodeId::indexed(DiseaseId::new("dengue"), "symptom", 3);
        assert_eq!(format!("{}", id), "dengue__symptom__3");

        let parsed = NodeId::from_str("dengue__symptom__3").unwrap();
        assert_eq!(parsed.disease, DiseaseId::new("dengue"));
        assert_eq!(parsed.key, "symptom__3");
        assert_eq!(parsed, id);
    }

    #[test]
    fn test_node_id_entry_gate_wire_form() {
        let id = NodeId::entry_gate(DiseaseId::new("zika"));
        assert_eq!(format!("{}", id), "zika__entry_gate");
        assert_eq!(NodeId::from_str("zika__entry_gate").unwrap(), id);
    }

    #[test]
    fn test_malformed_node_id() {
        assert!(NodeId::from_str("no-separator").is_err());
        assert!(NodeId::from_str("__key").is_err());
        assert!(NodeId::from_str("disease__").is_err());
    }

    #[test]
    fn test_target_for() {
        let disease = DiseaseId::new("dengue");
        let node = TreeNode::question(
            NodeId::entry_gate(disease.clone()),
            NodeKind::EntryGate,
            "Fever?",
        )
        .with_targets(
            NodeId::indexed(disease.clone(), "symptom", 0),
            NodeId::outcome(disease.clone(), Outcome::Excluded),
        );

        assert_eq!(
            node.target_for(true),
            Some(&NodeId::indexed(disease.clone(), "symptom", 0))
        );
        assert_eq!(
            node.target_for(false),
            Some(&NodeId::outcome(disease, Outcome::Excluded))
        );
    }

    #[test]
    fn test_terminal_node_has_no_targets() {
        let node = TreeNode::terminal(DiseaseId::new("dengue"), Outcome::Emergency);
        assert!(node.is_outcome());
        assert_eq!(node.outcome, Some(Outcome::Emergency));
        assert!(node.target_for(true).is_none());
        assert!(node.target_for(false).is_none());
    }
}
