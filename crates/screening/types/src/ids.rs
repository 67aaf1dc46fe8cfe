//! Identifier newtypes shared across the screening core.

use serde::{Deserialize, Serialize};

/// Unique identifier for a disease (e.g. `"dengue"`)
///
/// Disease ids must not contain `"__"` — that separator is reserved for the
/// wire form of node identifiers. Spec validation rejects offenders.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DiseaseId(pub String);

impl DiseaseId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for DiseaseId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a screening session
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn short(&self) -> &str {
        &self.0[..8.min(self.0.len())]
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_id_generate() {
        let id = SessionId::generate();
        assert!(!id.0.is_empty());
        assert!(id.short().len() <= 8);
        assert_ne!(id, SessionId::generate());
    }

    #[test]
    fn test_disease_id_display() {
        let id = DiseaseId::new("dengue");
        assert_eq!(format!("{}", id), "dengue");
    }
}
