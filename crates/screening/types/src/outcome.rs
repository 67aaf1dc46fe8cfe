//! Terminal clinical outcomes, totally ordered by severity.

use serde::{Deserialize, Serialize};

/// The terminal clinical classification of a screening session.
///
/// The derived `Ord` is the severity ranking used everywhere outcomes are
/// compared: variants are declared in ascending severity, so ranking a set
/// of per-disease outcomes is `max()` and reordering the set is a
/// compile-time-checked change.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// Disease ruled out by an entry gate or a failed hard-gate risk factor
    Excluded,
    /// Session explicitly canceled by the caller
    Canceled,
    /// Not enough evidence either way; more answers needed
    Pending,
    /// Minimum-symptom threshold met
    Diagnosed,
    /// A warning sign demands referral to a higher level of care
    ReferImmediately,
    /// A severe criterion fired; immediate emergency care
    Emergency,
}

impl Outcome {
    /// Terminal outcomes close the session; everything else keeps it open
    /// (Excluded and Canceled are terminal too, but only ever set when the
    /// session as a whole is closed, never from a single disease's ranking).
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Outcome::Emergency | Outcome::ReferImmediately | Outcome::Diagnosed
        )
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Outcome::Excluded => "excluded",
            Outcome::Canceled => "canceled",
            Outcome::Pending => "pending",
            Outcome::Diagnosed => "diagnosed",
            Outcome::ReferImmediately => "refer_immediately",
            Outcome::Emergency => "emergency",
        };
        write!(f, "{}", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_order() {
        assert!(Outcome::Emergency > Outcome::ReferImmediately);
        assert!(Outcome::ReferImmediately > Outcome::Diagnosed);
        assert!(Outcome::Diagnosed > Outcome::Pending);
        assert!(Outcome::Pending > Outcome::Canceled);
        assert!(Outcome::Pending > Outcome::Excluded);
    }

    #[test]
    fn test_max_is_ranking() {
        let outcomes = [Outcome::Diagnosed, Outcome::Emergency, Outcome::Pending];
        assert_eq!(outcomes.iter().max(), Some(&Outcome::Emergency));
    }

    #[test]
    fn test_terminal() {
        assert!(Outcome::Emergency.is_terminal());
        assert!(Outcome::ReferImmediately.is_terminal());
        assert!(Outcome::Diagnosed.is_terminal());
        assert!(!Outcome::Pending.is_terminal());
        assert!(!Outcome::Excluded.is_terminal());
        assert!(!Outcome::Canceled.is_terminal());
    }
}
