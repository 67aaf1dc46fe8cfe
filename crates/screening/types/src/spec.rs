//! Disease specs: the declarative source description of one disease's
//! diagnostic criteria.
//!
//! A spec is authored (or seeded) once per version, validated, compiled
//! into a flat question tree, and never mutated afterwards. The compiled
//! tree's content hash is taken over the canonical serialization of the
//! spec, so every field here is hash-relevant.

use crate::{DiseaseId, Outcome};
use serde::{Deserialize, Serialize};

/// The declarative description of one disease's diagnostic criteria
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DiseaseSpec {
    /// The disease this spec describes
    pub disease_id: DiseaseId,
    /// Human-readable disease name
    pub name: String,
    /// Entry criteria: the gate every session must pass before any
    /// clinical content is shown
    pub entry: EntryCriteria,
    /// Core symptoms, asked after severe criteria
    pub symptoms: Vec<CoreSymptom>,
    /// Risk factors, split at compile time into hard gates and soft weights
    pub risk_factors: Vec<RiskFactor>,
    /// Warning signs, each with a declared override outcome
    pub warning_signs: Vec<WarningSign>,
    /// Criteria whose positive answer forces an emergency outcome
    pub severe_criteria: Vec<SevereCriterion>,
    /// Lab triggers; only those available at primary care are compiled in
    pub lab_triggers: Vec<LabTrigger>,
    /// Named disease-stage spectrum. Informational only — the runtime
    /// never consumes it.
    pub stages: Vec<DiseaseStage>,
}

impl DiseaseSpec {
    pub fn new(disease_id: DiseaseId, name: impl Into<String>, entry: EntryCriteria) -> Self {
        Self {
            disease_id,
            name: name.into(),
            entry,
            symptoms: Vec::new(),
            risk_factors: Vec::new(),
            warning_signs: Vec::new(),
            severe_criteria: Vec::new(),
            lab_triggers: Vec::new(),
            stages: Vec::new(),
        }
    }

    pub fn with_symptom(mut self, symptom: CoreSymptom) -> Self {
        self.symptoms.push(symptom);
        self
    }

    pub fn with_risk_factor(mut self, risk_factor: RiskFactor) -> Self {
        self.risk_factors.push(risk_factor);
        self
    }

    pub fn with_warning_sign(mut self, sign: WarningSign) -> Self {
        self.warning_signs.push(sign);
        self
    }

    pub fn with_severe_criterion(mut self, criterion: SevereCriterion) -> Self {
        self.severe_criteria.push(criterion);
        self
    }

    pub fn with_lab_trigger(mut self, trigger: LabTrigger) -> Self {
        self.lab_triggers.push(trigger);
        self
    }

    pub fn with_stage(mut self, stage: DiseaseStage) -> Self {
        self.stages.push(stage);
        self
    }
}

/// Entry criteria: required primary-symptom question, optional
/// epidemiological prerequisites, and the minimum-additional-symptom
/// threshold carried onto the entry-gate node
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EntryCriteria {
    /// The entry-gate question; a negative answer excludes the disease
    pub question: String,
    /// Epidemiological prerequisites asked right after the gate
    #[serde(default)]
    pub epidemiology: Vec<EpidemiologyCheck>,
    /// Minimum count of counts-toward-minimum symptoms for a diagnosis.
    /// Defaults to 2 when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_symptom_count: Option<u32>,
}

impl EntryCriteria {
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            epidemiology: Vec::new(),
            min_symptom_count: None,
        }
    }

    pub fn with_epidemiology(mut self, check: EpidemiologyCheck) -> Self {
        self.epidemiology.push(check);
        self
    }

    pub fn with_min_symptom_count(mut self, count: u32) -> Self {
        self.min_symptom_count = Some(count);
        self
    }
}

/// An epidemiological prerequisite (exposure, travel, season, outbreak)
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EpidemiologyCheck {
    /// Underlying clinical item id
    pub item_id: String,
    /// The yes/no question put to the caregiver
    pub question: String,
}

impl EpidemiologyCheck {
    pub fn new(item_id: impl Into<String>, question: impl Into<String>) -> Self {
        Self {
            item_id: item_id.into(),
            question: question.into(),
        }
    }
}

/// Clinical weight of a core symptom
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymptomWeight {
    Primary,
    Secondary,
}

/// One core symptom question
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CoreSymptom {
    /// Underlying clinical item id
    pub item_id: String,
    /// The yes/no question put to the caregiver
    pub question: String,
    /// Primary symptoms are asked before warning signs, secondary after
    pub weight: SymptomWeight,
    /// Whether a positive answer counts toward the diagnosis threshold
    pub counts_toward_minimum: bool,
}

impl CoreSymptom {
    pub fn primary(item_id: impl Into<String>, question: impl Into<String>) -> Self {
        Self {
            item_id: item_id.into(),
            question: question.into(),
            weight: SymptomWeight::Primary,
            counts_toward_minimum: true,
        }
    }

    pub fn secondary(item_id: impl Into<String>, question: impl Into<String>) -> Self {
        Self {
            item_id: item_id.into(),
            question: question.into(),
            weight: SymptomWeight::Secondary,
            counts_toward_minimum: true,
        }
    }

    /// Mark this symptom as recorded-only: it never counts toward the
    /// diagnosis threshold
    pub fn recorded_only(mut self) -> Self {
        self.counts_toward_minimum = false;
        self
    }
}

/// How a risk factor participates in the tree
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GateKind {
    /// Failing the question excludes the disease entirely
    HardGate,
    /// Recorded but never changes the outcome on its own
    SoftWeight,
}

/// One risk-factor question
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RiskFactor {
    pub item_id: String,
    pub question: String,
    pub gate: GateKind,
}

impl RiskFactor {
    pub fn hard_gate(item_id: impl Into<String>, question: impl Into<String>) -> Self {
        Self {
            item_id: item_id.into(),
            question: question.into(),
            gate: GateKind::HardGate,
        }
    }

    pub fn soft_weight(item_id: impl Into<String>, question: impl Into<String>) -> Self {
        Self {
            item_id: item_id.into(),
            question: question.into(),
            gate: GateKind::SoftWeight,
        }
    }
}

/// A warning sign: a positive answer forces the declared override outcome
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WarningSign {
    pub item_id: String,
    pub question: String,
    /// Must be `ReferImmediately` or `Emergency`; validation rejects the rest
    pub override_to: Outcome,
}

impl WarningSign {
    pub fn new(
        item_id: impl Into<String>,
        question: impl Into<String>,
        override_to: Outcome,
    ) -> Self {
        Self {
            item_id: item_id.into(),
            question: question.into(),
            override_to,
        }
    }
}

/// A severe criterion: a positive answer forces `Emergency`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SevereCriterion {
    pub item_id: String,
    pub question: String,
}

impl SevereCriterion {
    pub fn new(item_id: impl Into<String>, question: impl Into<String>) -> Self {
        Self {
            item_id: item_id.into(),
            question: question.into(),
        }
    }
}

/// A lab trigger; only compiled into the tree when the test is actually
/// available at the primary-care level
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LabTrigger {
    pub item_id: String,
    pub question: String,
    pub primary_care_available: bool,
}

impl LabTrigger {
    pub fn new(
        item_id: impl Into<String>,
        question: impl Into<String>,
        primary_care_available: bool,
    ) -> Self {
        Self {
            item_id: item_id.into(),
            question: question.into(),
            primary_care_available,
        }
    }
}

/// A named point on the disease-stage spectrum (informational only)
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DiseaseStage {
    pub name: String,
    pub description: String,
}

impl DiseaseStage {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }
}
