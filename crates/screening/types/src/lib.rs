//! Screening domain types: disease specs, compiled question trees,
//! sessions, answers, and clinical outcomes.
//!
//! A [`DiseaseSpec`] is the declarative source description of one disease's
//! diagnostic criteria. The compiler turns it into a [`CompiledTree`] — a
//! flat, ordered list of yes/no [`TreeNode`]s pinned to a version and a
//! content hash. A [`Session`] drives one caregiver through one or more
//! compiled trees and ends in an [`Outcome`].
//!
//! Compiled trees are immutable once created. To change a disease's
//! criteria, compile a new version.

#![deny(unsafe_code)]
#![warn(rust_2018_idioms)]

mod errors;
mod ids;
mod node;
mod outcome;
mod session;
mod spec;
mod tree;

pub use errors::{ScreeningError, ScreeningResult};
pub use ids::{DiseaseId, SessionId};
pub use node::{NodeId, NodeKind, NodeMeta, TreeNode};
pub use outcome::Outcome;
pub use session::{AnswerRecord, Session, SessionSnapshot, SessionStatus};
pub use spec::{
    CoreSymptom, DiseaseSpec, DiseaseStage, EntryCriteria, EpidemiologyCheck, GateKind,
    LabTrigger, RiskFactor, SevereCriterion, SymptomWeight, WarningSign,
};
pub use tree::{CompiledTree, DEFAULT_SYMPTOM_THRESHOLD};
