//! Spec validation: malformed specs are rejected here, before compilation.
//!
//! The compiler itself is total — it never raises domain errors — so this
//! pass is the only place a bad spec can be stopped.

use crate::{SpecError, SpecResult};
use screening_types::{DiseaseSpec, Outcome, SymptomWeight};
use std::collections::HashSet;

/// Validate a disease spec for structural correctness
pub fn validate_spec(spec: &DiseaseSpec) -> SpecResult<()> {
    if spec.disease_id.as_str().is_empty() {
        return Err(SpecError::MissingField("disease_id".into()));
    }
    // "__" separates disease from key in the node-id wire form
    if spec.disease_id.as_str().contains("__") {
        return Err(SpecError::InvalidValue {
            field: "disease_id".into(),
            message: "must not contain '__'".into(),
        });
    }
    if spec.name.trim().is_empty() {
        return Err(SpecError::MissingField("name".into()));
    }
    if spec.entry.question.trim().is_empty() {
        return Err(SpecError::MissingField("entry.question".into()));
    }

    if let Some(count) = spec.entry.min_symptom_count {
        if count == 0 {
            return Err(SpecError::InvalidValue {
                field: "entry.min_symptom_count".into(),
                message: "threshold must be at least 1".into(),
            });
        }
    }

    if !spec
        .symptoms
        .iter()
        .any(|s| s.weight == SymptomWeight::Primary)
    {
        return Err(SpecError::InvalidValue {
            field: "symptoms".into(),
            message: "at least one primary symptom is required".into(),
        });
    }

    let mut seen = HashSet::new();
    let mut check_item = |item_id: &str, question: &str, field: &str| -> SpecResult<()> {
        if item_id.trim().is_empty() {
            return Err(SpecError::MissingField(format!("{}.item_id", field)));
        }
        if question.trim().is_empty() {
            return Err(SpecError::MissingField(format!("{}.question", field)));
        }
        if !seen.insert(item_id.to_string()) {
            return Err(SpecError::DuplicateItemId(item_id.to_string()));
        }
        Ok(())
    };

    for check in &spec.entry.epidemiology {
        check_item(&check.item_id, &check.question, "entry.epidemiology")?;
    }
    for symptom in &spec.symptoms {
        check_item(&symptom.item_id, &symptom.question, "symptoms")?;
    }
    for risk in &spec.risk_factors {
        check_item(&risk.item_id, &risk.question, "risk_factors")?;
    }
    for criterion in &spec.severe_criteria {
        check_item(&criterion.item_id, &criterion.question, "severe_criteria")?;
    }
    for sign in &spec.warning_signs {
        check_item(&sign.item_id, &sign.question, "warning_signs")?;
        if !matches!(sign.override_to, Outcome::ReferImmediately | Outcome::Emergency) {
            return Err(SpecError::InvalidOverride {
                item_id: sign.item_id.clone(),
                outcome: sign.override_to.to_string(),
            });
        }
    }
    for trigger in &spec.lab_triggers {
        check_item(&trigger.item_id, &trigger.question, "lab_triggers")?;
    }

    Ok(())
}
