//! Pure tree runtime: outcome aggregation and next-question traversal.

use screening_types::{
    NodeId, NodeKind, Outcome, ScreeningError, ScreeningResult, TreeNode,
    DEFAULT_SYMPTOM_THRESHOLD,
};
use std::collections::HashMap;

/// Resolve the clinical outcome for one disease from the entire answer set.
///
/// Aggregation is independent of traversal order. Precedence, first match
/// wins:
/// 1. any severe criterion answered true → `Emergency`
/// 2. any warning sign answered true → its declared override, the most
///    severe one when several fired
/// 3. counts-toward-minimum symptoms answered true reaching the entry
///    gate's threshold → `Diagnosed`
/// 4. otherwise `Pending`
///
/// Consults only the compiled nodes and the answer map, never the spec.
pub fn resolve_outcome(answers: &HashMap<NodeId, bool>, nodes: &[TreeNode]) -> Outcome {
    let answered_true = |node: &TreeNode| answers.get(&node.id) == Some(&true);

    if nodes
        .iter()
        .filter(|n| n.kind == NodeKind::SevereCriteria)
        .any(answered_true)
    {
        return Outcome::Emergency;
    }

    let override_outcome = nodes
        .iter()
        .filter(|n| n.kind == NodeKind::WarningSign)
        .filter(|n| answered_true(n))
        .filter_map(|n| n.meta.override_to)
        .max();
    if let Some(outcome) = override_outcome {
        return outcome;
    }

    let threshold = nodes
        .iter()
        .find(|n| n.kind == NodeKind::EntryGate)
        .and_then(|gate| gate.meta.symptom_threshold)
        .unwrap_or(DEFAULT_SYMPTOM_THRESHOLD);
    let count = nodes
        .iter()
        .filter(|n| n.kind == NodeKind::Symptom)
        .filter(|n| n.meta.counts_toward_minimum == Some(true))
        .filter(|n| answered_true(n))
        .count() as u32;
    if count >= threshold {
        return Outcome::Diagnosed;
    }

    Outcome::Pending
}

/// Walk the tree from the entry gate following recorded answers and return
/// the first unanswered question, or `None` once an outcome node is
/// reached.
///
/// A successor id absent from the node list is a compiler defect and fails
/// loudly — callers must treat it as an internal-consistency violation,
/// never a user-facing error.
pub fn find_next_question<'a>(
    answers: &HashMap<NodeId, bool>,
    nodes: &'a [TreeNode],
) -> ScreeningResult<Option<&'a TreeNode>> {
    let mut current = match nodes
        .iter()
        .find(|n| n.kind == NodeKind::EntryGate)
        .or_else(|| nodes.first())
    {
        Some(node) => node,
        None => return Ok(None),
    };

    // Bounded by the node count: compiled trees only point forward, so a
    // longer walk means a cycle, which is equally a compiler defect.
    for _ in 0..=nodes.len() {
        if current.is_outcome() {
            return Ok(None);
        }
        let answer = match answers.get(&current.id) {
            Some(answer) => *answer,
            None => return Ok(Some(current)),
        };
        let target = current
            .target_for(answer)
            .ok_or_else(|| ScreeningError::MissingSuccessor(current.id.clone()))?;
        current = nodes
            .iter()
            .find(|n| &n.id == target)
            .ok_or_else(|| ScreeningError::DanglingNode {
                from: current.id.clone(),
                missing: target.clone(),
            })?;
    }

    Err(ScreeningError::Internal(format!(
        "traversal did not terminate after {} steps",
        nodes.len() + 1
    )))
}
