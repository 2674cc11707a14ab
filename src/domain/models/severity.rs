//! Severity tier assigned to a candidate answer.

use serde::{Deserialize, Serialize};

/// Coarse risk classification of a text answer based on keyword presence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// No trigger term matched. The default tier.
    Low,
    /// At least one medium-tier term matched and no high-tier term did.
    Medium,
    /// At least one high-tier term matched. Always wins over medium.
    High,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Low => write!(f, "low"),
            Severity::Medium => write!(f, "medium"),
            Severity::High => write!(f, "high"),
        }
    }
}
