//! Screening engine: pure tree runtime plus the stateful session
//! orchestrator.
//!
//! The runtime functions ([`resolve_outcome`], [`find_next_question`])
//! operate on `(answers, nodes)` alone — no I/O, no spec knowledge — so
//! they can be fuzz-tested and replayed without any disease semantics.
//! The [`ScreeningOrchestrator`] owns session lifecycle on top of two
//! injected repositories: version locking, integrity verification,
//! idempotent answer intake, multi-disease ranking, timeout and hard-stop
//! enforcement, and post-hoc replay.

#![deny(unsafe_code)]
#![warn(rust_2018_idioms)]

pub mod memory;
mod orchestrator;
mod repository;
mod runtime;

pub use orchestrator::{
    ReplayReport, ScreeningOrchestrator, SessionStart, SessionStatusReport, SubmitOutcome,
};
pub use repository::{AnswerUpsert, SessionRepository, TreeRepository};
pub use runtime::{find_next_question, resolve_outcome};
