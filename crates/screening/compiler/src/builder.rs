//! The tree builder: spec in, flat ordered node list out.
//!
//! Block order is fixed, not configurable: entry gate → epidemiology →
//! hard-gate risk factors → severe criteria → primary symptoms → warning
//! signs → secondary symptoms → primary-care lab triggers → soft-weight
//! risk factors → outcome terminals. Severe and emergency signs are always
//! checked before routine symptom collection, and eligibility gates are
//! resolved before any clinical content is shown.
//!
//! Each block's last node points forward into the next non-empty block;
//! empty blocks are skipped entirely. `compile` is total and deterministic:
//! identical specs yield byte-identical node lists.

use crate::{hash_spec, validate_spec, SpecResult};
use screening_types::{
    CompiledTree, DiseaseSpec, GateKind, NodeId, NodeKind, NodeMeta, Outcome, SymptomWeight,
    TreeNode, DEFAULT_SYMPTOM_THRESHOLD,
};

/// Where a branch goes before final wiring
#[derive(Clone, Copy, PartialEq)]
enum Route {
    /// The next question node in block order, or Pending at the end
    Forward,
    /// A terminal outcome node
    Terminal(Outcome),
}

struct Slot {
    node: TreeNode,
    yes: Route,
    no: Route,
}

impl Slot {
    fn branching(node: TreeNode, yes: Route, no: Route) -> Self {
        Self { node, yes, no }
    }

    /// Symptom nodes are pure data collection: both branches share one
    /// forward route, so identical successors are guaranteed by
    /// construction rather than by generated data.
    fn pass_through(node: TreeNode) -> Self {
        Self {
            node,
            yes: Route::Forward,
            no: Route::Forward,
        }
    }
}

/// Compile a disease spec into its flat, ordered node list.
///
/// Total and deterministic; malformed specs must be rejected by
/// [`validate_spec`] before this is called.
pub fn compile(spec: &DiseaseSpec) -> Vec<TreeNode> {
    let disease = &spec.disease_id;
    let mut slots: Vec<Slot> = Vec::new();

    // Entry gate
    let threshold = spec
        .entry
        .min_symptom_count
        .unwrap_or(DEFAULT_SYMPTOM_THRESHOLD);
    slots.push(Slot::branching(
        TreeNode::question(
            NodeId::entry_gate(disease.clone()),
            NodeKind::EntryGate,
            spec.entry.question.clone(),
        )
        .with_meta(NodeMeta {
            source: Some("entry".into()),
            symptom_threshold: Some(threshold),
            ..NodeMeta::default()
        }),
        Route::Forward,
        Route::Terminal(Outcome::Excluded),
    ));

    // Epidemiological prerequisites
    for (i, check) in spec.entry.epidemiology.iter().enumerate() {
        slots.push(Slot::branching(
            TreeNode::question(
                NodeId::indexed(disease.clone(), "epidemiology", i),
                NodeKind::Epidemiology,
                check.question.clone(),
            )
            .with_meta(NodeMeta {
                source: Some("entry.epidemiology".into()),
                item_id: Some(check.item_id.clone()),
                ..NodeMeta::default()
            }),
            Route::Forward,
            Route::Forward,
        ));
    }

    // Hard-gate risk factors; indexes are positions in the spec's
    // risk_factors list so ids stay stable across the two blocks
    for (i, risk) in spec.risk_factors.iter().enumerate() {
        if risk.gate != GateKind::HardGate {
            continue;
        }
        slots.push(Slot::branching(
            risk_factor_node(disease.clone(), i, risk),
            Route::Forward,
            Route::Terminal(Outcome::Excluded),
        ));
    }

    // Severe criteria
    for (i, criterion) in spec.severe_criteria.iter().enumerate() {
        slots.push(Slot::branching(
            TreeNode::question(
                NodeId::indexed(disease.clone(), "severe_criteria", i),
                NodeKind::SevereCriteria,
                criterion.question.clone(),
            )
            .with_severity("severe")
            .with_meta(NodeMeta {
                source: Some("severe_criteria".into()),
                item_id: Some(criterion.item_id.clone()),
                ..NodeMeta::default()
            }),
            Route::Terminal(Outcome::Emergency),
            Route::Forward,
        ));
    }

    // Primary symptoms
    for (i, symptom) in spec.symptoms.iter().enumerate() {
        if symptom.weight == SymptomWeight::Primary {
            slots.push(Slot::pass_through(symptom_node(disease.clone(), i, symptom)));
        }
    }

    // Warning signs
    for (i, sign) in spec.warning_signs.iter().enumerate() {
        slots.push(Slot::branching(
            TreeNode::question(
                NodeId::indexed(disease.clone(), "warning_sign", i),
                NodeKind::WarningSign,
                sign.question.clone(),
            )
            .with_severity("warning")
            .with_meta(NodeMeta {
                source: Some("warning_signs".into()),
                item_id: Some(sign.item_id.clone()),
                override_to: Some(sign.override_to),
                ..NodeMeta::default()
            }),
            Route::Terminal(sign.override_to),
            Route::Forward,
        ));
    }

    // Secondary symptoms
    for (i, symptom) in spec.symptoms.iter().enumerate() {
        if symptom.weight == SymptomWeight::Secondary {
            slots.push(Slot::pass_through(symptom_node(disease.clone(), i, symptom)));
        }
    }

    // Lab triggers available at primary care; the block is omitted
    // entirely when none are available. A positive on the last lab node
    // routes to Diagnosed.
    let available: Vec<usize> = spec
        .lab_triggers
        .iter()
        .enumerate()
        .filter(|(_, t)| t.primary_care_available)
        .map(|(i, _)| i)
        .collect();
    for (pos, &i) in available.iter().enumerate() {
        let trigger = &spec.lab_triggers[i];
        let yes = if pos + 1 == available.len() {
            Route::Terminal(Outcome::Diagnosed)
        } else {
            Route::Forward
        };
        slots.push(Slot::branching(
            TreeNode::question(
                NodeId::indexed(disease.clone(), "lab_trigger", i),
                NodeKind::LabTrigger,
                trigger.question.clone(),
            )
            .with_meta(NodeMeta {
                source: Some("lab_triggers".into()),
                item_id: Some(trigger.item_id.clone()),
                primary_care_available: Some(true),
                ..NodeMeta::default()
            }),
            yes,
            Route::Forward,
        ));
    }

    // Soft-weight risk factors: recorded, never outcome-changing
    for (i, risk) in spec.risk_factors.iter().enumerate() {
        if risk.gate != GateKind::SoftWeight {
            continue;
        }
        slots.push(Slot::branching(
            risk_factor_node(disease.clone(), i, risk),
            Route::Forward,
            Route::Forward,
        ));
    }

    // Wire branches: Forward goes to the next slot's node, falling off
    // the end lands on Pending
    let pending = NodeId::outcome(disease.clone(), Outcome::Pending);
    let mut referenced = vec![Outcome::Excluded, Outcome::Pending];
    let mut nodes: Vec<TreeNode> = Vec::with_capacity(slots.len() + 5);
    for i in 0..slots.len() {
        let forward = slots
            .get(i + 1)
            .map(|next| next.node.id.clone())
            .unwrap_or_else(|| pending.clone());
        let resolve = |route: Route, referenced: &mut Vec<Outcome>| match route {
            Route::Forward => forward.clone(),
            Route::Terminal(outcome) => {
                if !referenced.contains(&outcome) {
                    referenced.push(outcome);
                }
                NodeId::outcome(disease.clone(), outcome)
            }
        };
        let yes = resolve(slots[i].yes, &mut referenced);
        let no = resolve(slots[i].no, &mut referenced);
        nodes.push(slots[i].node.clone().with_targets(yes, no));
    }

    // Outcome terminals, fixed emission order for determinism
    for outcome in [
        Outcome::Excluded,
        Outcome::Emergency,
        Outcome::ReferImmediately,
        Outcome::Diagnosed,
        Outcome::Pending,
    ] {
        if referenced.contains(&outcome) {
            nodes.push(TreeNode::terminal(disease.clone(), outcome));
        }
    }

    nodes
}

/// Validate, hash and compile a spec into a versioned tree in one step
pub fn compile_tree(spec: &DiseaseSpec, version: u32) -> SpecResult<CompiledTree> {
    validate_spec(spec)?;
    let content_hash = hash_spec(spec)?;
    let nodes = compile(spec);
    Ok(CompiledTree::new(spec.clone(), version, nodes, content_hash))
}

fn risk_factor_node(
    disease: screening_types::DiseaseId,
    index: usize,
    risk: &screening_types::RiskFactor,
) -> TreeNode {
    TreeNode::question(
        NodeId::indexed(disease, "risk_factor", index),
        NodeKind::RiskFactor,
        risk.question.clone(),
    )
    .with_meta(NodeMeta {
        source: Some("risk_factors".into()),
        item_id: Some(risk.item_id.clone()),
        gate: Some(risk.gate),
        ..NodeMeta::default()
    })
}

fn symptom_node(
    disease: screening_types::DiseaseId,
    index: usize,
    symptom: &screening_types::CoreSymptom,
) -> TreeNode {
    TreeNode::question(
        NodeId::indexed(disease, "symptom", index),
        NodeKind::Symptom,
        symptom.question.clone(),
    )
    .with_meta(NodeMeta {
        source: Some("symptoms".into()),
        item_id: Some(symptom.item_id.clone()),
        weight: Some(symptom.weight),
        counts_toward_minimum: Some(symptom.counts_toward_minimum),
        ..NodeMeta::default()
    })
}
