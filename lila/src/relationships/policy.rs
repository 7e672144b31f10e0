//! What a store does when a mutation targets a pair with no relationship.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Behavior of metric updates and interaction recording when the two
/// personas have no relationship yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingRelationshipPolicy {
    /// Fail with `RelationshipNotFound`. Default for the graph store.
    Reject,
    /// Create a default relationship (all metrics 5.0), then apply the
    /// mutation. Default for the in-memory store.
    CreateDefault,
}

impl fmt::Display for MissingRelationshipPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reject => write!(f, "reject"),
            Self::CreateDefault => write!(f, "create_default"),
        }
    }
}

impl FromStr for MissingRelationshipPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "reject" | "fail" => Ok(Self::Reject),
            "create_default" | "create" => Ok(Self::CreateDefault),
            other => Err(format!("Unknown missing-relationship policy: {other}")),
        }
    }
}
