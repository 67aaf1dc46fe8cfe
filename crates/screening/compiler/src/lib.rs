//! Disease-spec compiler: declarative diagnostic criteria in, flat ordered
//! question tree out.
//!
//! The pipeline is validate → hash → build. [`validate_spec`] rejects
//! malformed specs before compilation ever starts; [`compile`] itself is
//! total and deterministic — identical input always yields byte-identical
//! output, which is what makes [`hash_spec`]'s content digest meaningful.

#![deny(unsafe_code)]
#![warn(rust_2018_idioms)]

mod builder;
mod errors;
mod hash;
mod validate;

pub use builder::{compile, compile_tree};
pub use errors::{SpecError, SpecResult};
pub use hash::hash_spec;
pub use validate::validate_spec;
