//! Attachment-style compatibility.
//!
//! Two independent facilities live here and are deliberately not unified:
//! the categorical table used for compatibility analysis, and the fixed
//! per-dimension scores reported by the numeric scoring tool.

use serde::Serialize;
use std::fmt;

use crate::models::AttachmentStyle;

/// Categorical compatibility label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum CompatibilityLevel {
    High,
    Good,
    Moderate,
    Challenging,
    Difficult,
    Low,
    Unknown,
}

impl CompatibilityLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "High",
            Self::Good => "Good",
            Self::Moderate => "Moderate",
            Self::Challenging => "Challenging",
            Self::Difficult => "Difficult",
            Self::Low => "Low",
            Self::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for CompatibilityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A level and its fixed rationale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Compatibility {
    pub level: CompatibilityLevel,
    pub rationale: &'static str,
}

pub const UNRECOGNIZED_RATIONALE: &str = "Attachment style combination not recognized";

const TABLE: [(AttachmentStyle, AttachmentStyle, CompatibilityLevel, &str); 6] = [
    (
        AttachmentStyle::Secure,
        AttachmentStyle::Secure,
        CompatibilityLevel::High,
        "Both partners provide stability and emotional availability",
    ),
    (
        AttachmentStyle::Secure,
        AttachmentStyle::Anxious,
        CompatibilityLevel::Good,
        "Secure partner can provide reassurance to anxious partner",
    ),
    (
        AttachmentStyle::Secure,
        AttachmentStyle::Avoidant,
        CompatibilityLevel::Moderate,
        "Secure partner may help avoidant partner open up gradually",
    ),
    (
        AttachmentStyle::Anxious,
        AttachmentStyle::Anxious,
        CompatibilityLevel::Challenging,
        "Both partners may escalate emotional intensity",
    ),
    (
        AttachmentStyle::Anxious,
        AttachmentStyle::Avoidant,
        CompatibilityLevel::Difficult,
        "Classic pursue-withdraw dynamic may develop",
    ),
    (
        AttachmentStyle::Avoidant,
        AttachmentStyle::Avoidant,
        CompatibilityLevel::Low,
        "Both partners may avoid emotional intimacy",
    ),
];

/// Recommendations attached to every categorical analysis.
pub const RECOMMENDATIONS: [&str; 3] = [
    "Focus on understanding each other's attachment needs",
    "Practice clear, consistent communication",
    "Respect differences in emotional expression and intimacy pace",
];

fn lookup(a: AttachmentStyle, b: AttachmentStyle) -> Option<Compatibility> {
    TABLE
        .iter()
        .find(|(x, y, _, _)| *x == a && *y == b)
        .map(|&(_, _, level, rationale)| Compatibility { level, rationale })
}

/// Look up the unordered pair `{a, b}`, trying `(a, b)` then `(b, a)`.
pub fn compatibility(a: AttachmentStyle, b: AttachmentStyle) -> Compatibility {
    lookup(a, b)
        .or_else(|| lookup(b, a))
        .unwrap_or(Compatibility {
            level: CompatibilityLevel::Unknown,
            rationale: UNRECOGNIZED_RATIONALE,
        })
}

/// [`compatibility`] over free-text style names.
pub fn compatibility_of(a: &str, b: &str) -> Compatibility {
    compatibility(
        AttachmentStyle::parse_lenient(a),
        AttachmentStyle::parse_lenient(b),
    )
}

/// Fixed per-dimension scores of the numeric scoring tool.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SyntheticScores {
    pub overall_score: f64,
    pub attachment_compatibility: f64,
    pub personality_compatibility: f64,
    pub goal_alignment: f64,
    pub communication_style: f64,
    pub recommendations: Vec<&'static str>,
    pub challenges: Vec<&'static str>,
    pub strengths: Vec<&'static str>,
}

/// Illustrative scores; they do not depend on the personas compared.
pub fn synthetic_compatibility_scores() -> SyntheticScores {
    SyntheticScores {
        overall_score: 0.75,
        attachment_compatibility: 0.82,
        personality_compatibility: 0.73,
        goal_alignment: 0.68,
        communication_style: 0.79,
        recommendations: vec![
            "Focus on consistent reassurance for anxious partner",
            "Leverage secure partner's stability",
            "Practice open emotional communication",
        ],
        challenges: vec![
            "Different emotional processing speeds",
            "Reassurance needs vs independence balance",
        ],
        strengths: vec![
            "High mutual respect and understanding",
            "Complementary personality traits",
            "Shared values around growth",
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use AttachmentStyle::*;

    #[test]
    fn lookup_is_symmetric() {
        assert_eq!(
            compatibility_of("anxious", "secure"),
            compatibility_of("secure", "anxious")
        );
        for a in [Secure, Anxious, Avoidant, Exploratory, Unknown] {
            for b in [Secure, Anxious, Avoidant, Exploratory, Unknown] {
                assert_eq!(compatibility(a, b), compatibility(b, a));
            }
        }
    }

    #[test]
    fn table_entries() {
        assert_eq!(compatibility(Secure, Secure).level, CompatibilityLevel::High);
        assert_eq!(compatibility(Anxious, Secure).level, CompatibilityLevel::Good);
        assert_eq!(
            compatibility(Avoidant, Secure).level,
            CompatibilityLevel::Moderate
        );
        assert_eq!(
            compatibility(Anxious, Anxious).level,
            CompatibilityLevel::Challenging
        );
        assert_eq!(
            compatibility(Avoidant, Anxious).rationale,
            "Classic pursue-withdraw dynamic may develop"
        );
        assert_eq!(compatibility(Avoidant, Avoidant).level, CompatibilityLevel::Low);
    }

    #[test]
    fn unrecognized_pair_falls_back() {
        let result = compatibility_of("exploratory", "exploratory");
        assert_eq!(result.level, CompatibilityLevel::Unknown);
        assert_eq!(result.level.to_string(), "Unknown");
        assert_eq!(result.rationale, UNRECOGNIZED_RATIONALE);
        assert_eq!(
            compatibility_of("secure", "disorganized").level,
            CompatibilityLevel::Unknown
        );
    }

    #[test]
    fn synthetic_scores_are_fixed() {
        let scores = synthetic_compatibility_scores();
        assert_eq!(scores.overall_score, 0.75);
        assert_eq!(scores.goal_alignment, 0.68);
        assert_eq!(scores.strengths.len(), 3);
    }
}
