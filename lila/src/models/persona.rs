//! Persona records and their psychological profile.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::{ValidationError, clamp_unit, neutral_trait, normalize_id};

/// Attachment style of a persona.
///
/// Parsing is lenient: only the first word of the input is considered and
/// case is ignored, so `"Secure attachment"` parses as [`AttachmentStyle::Secure`].
/// Anything unrecognized becomes [`AttachmentStyle::Unknown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum AttachmentStyle {
    Secure,
    Anxious,
    Avoidant,
    Exploratory,
    #[default]
    Unknown,
}

impl AttachmentStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Secure => "secure",
            Self::Anxious => "anxious",
            Self::Avoidant => "avoidant",
            Self::Exploratory => "exploratory",
            Self::Unknown => "unknown",
        }
    }

    pub fn parse_lenient(raw: &str) -> Self {
        let first = raw.split_whitespace().next().unwrap_or_default();
        match first.to_lowercase().as_str() {
            "secure" => Self::Secure,
            "anxious" => Self::Anxious,
            "avoidant" => Self::Avoidant,
            "exploratory" => Self::Exploratory,
            _ => Self::Unknown,
        }
    }
}

impl fmt::Display for AttachmentStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AttachmentStyle {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse_lenient(s))
    }
}

impl From<String> for AttachmentStyle {
    fn from(value: String) -> Self {
        Self::parse_lenient(&value)
    }
}

impl From<&str> for AttachmentStyle {
    fn from(value: &str) -> Self {
        Self::parse_lenient(value)
    }
}

/// Big-Five personality scalars, each in `[0.0, 1.0]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PersonalityProfile {
    #[serde(default = "neutral_trait")]
    pub openness: f64,
    #[serde(default = "neutral_trait")]
    pub conscientiousness: f64,
    #[serde(default = "neutral_trait")]
    pub extraversion: f64,
    #[serde(default = "neutral_trait")]
    pub agreeableness: f64,
    #[serde(default = "neutral_trait")]
    pub neuroticism: f64,
}

impl PersonalityProfile {
    pub fn new(
        openness: f64,
        conscientiousness: f64,
        extraversion: f64,
        agreeableness: f64,
        neuroticism: f64,
    ) -> Self {
        Self {
            openness,
            conscientiousness,
            extraversion,
            agreeableness,
            neuroticism,
        }
        .clamped()
    }

    /// Build a profile from optional scalars, defaulting missing ones to 0.5.
    pub fn from_optional(
        openness: Option<f64>,
        conscientiousness: Option<f64>,
        extraversion: Option<f64>,
        agreeableness: Option<f64>,
        neuroticism: Option<f64>,
    ) -> Self {
        Self::new(
            openness.unwrap_or_else(neutral_trait),
            conscientiousness.unwrap_or_else(neutral_trait),
            extraversion.unwrap_or_else(neutral_trait),
            agreeableness.unwrap_or_else(neutral_trait),
            neuroticism.unwrap_or_else(neutral_trait),
        )
    }

    pub fn clamped(self) -> Self {
        Self {
            openness: clamp_unit(self.openness),
            conscientiousness: clamp_unit(self.conscientiousness),
            extraversion: clamp_unit(self.extraversion),
            agreeableness: clamp_unit(self.agreeableness),
            neuroticism: clamp_unit(self.neuroticism),
        }
    }
}

impl Default for PersonalityProfile {
    fn default() -> Self {
        Self::new(
            neutral_trait(),
            neutral_trait(),
            neutral_trait(),
            neutral_trait(),
            neutral_trait(),
        )
    }
}

/// A modeled individual with a psychological profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Persona {
    pub persona_id: String,
    pub name: String,
    #[serde(default)]
    pub age: Option<u32>,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub attachment_style: AttachmentStyle,
    #[serde(default)]
    pub personality: PersonalityProfile,
    /// Baseline disposition to trust, independent of any relationship.
    #[serde(default = "neutral_trait")]
    pub trust_level: f64,
    #[serde(default)]
    pub communication_style: Option<String>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl Persona {
    /// Start building a persona. The id is derived from the lowercased name
    /// unless [`PersonaBuilder::id`] overrides it.
    pub fn builder(name: impl Into<String>) -> PersonaBuilder {
        PersonaBuilder::new(name)
    }

    /// Normalize the record for writing: lowercase id, trimmed name and
    /// every scalar clamped into range.
    pub fn normalized(mut self) -> Result<Self, ValidationError> {
        self.persona_id = normalize_id(&self.persona_id, "persona_id")?;
        self.name = self.name.trim().to_string();
        if self.name.is_empty() {
            return Err(ValidationError::new("name is required"));
        }
        self.personality = self.personality.clamped();
        self.trust_level = clamp_unit(self.trust_level);
        Ok(self)
    }
}

/// Fluent constructor for [`Persona`].
#[derive(Debug, Clone)]
pub struct PersonaBuilder {
    id: Option<String>,
    name: String,
    age: Option<u32>,
    role: String,
    description: String,
    attachment_style: AttachmentStyle,
    personality: PersonalityProfile,
    trust_level: f64,
    communication_style: Option<String>,
}

impl PersonaBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            age: None,
            role: String::new(),
            description: String::new(),
            attachment_style: AttachmentStyle::Unknown,
            personality: PersonalityProfile::default(),
            trust_level: neutral_trait(),
            communication_style: None,
        }
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn age(mut self, age: u32) -> Self {
        self.age = Some(age);
        self
    }

    pub fn role(mut self, role: impl Into<String>) -> Self {
        self.role = role.into();
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn attachment_style(mut self, style: impl Into<AttachmentStyle>) -> Self {
        self.attachment_style = style.into();
        self
    }

    pub fn personality(mut self, personality: PersonalityProfile) -> Self {
        self.personality = personality;
        self
    }

    pub fn trust_level(mut self, trust_level: f64) -> Self {
        self.trust_level = trust_level;
        self
    }

    pub fn communication_style(mut self, style: impl Into<String>) -> Self {
        self.communication_style = Some(style.into());
        self
    }

    pub fn build(self) -> Result<Persona, ValidationError> {
        let now = Utc::now();
        let persona_id = self.id.unwrap_or_else(|| self.name.clone());
        Persona {
            persona_id,
            name: self.name,
            age: self.age,
            role: self.role,
            description: self.description,
            attachment_style: self.attachment_style,
            personality: self.personality,
            trust_level: self.trust_level,
            communication_style: self.communication_style,
            created_at: now,
            updated_at: now,
        }
        .normalized()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attachment_style_parses_first_word_case_insensitively() {
        assert_eq!(
            AttachmentStyle::parse_lenient("Secure attachment"),
            AttachmentStyle::Secure
        );
        assert_eq!(AttachmentStyle::parse_lenient("ANXIOUS"), AttachmentStyle::Anxious);
        assert_eq!(
            AttachmentStyle::parse_lenient("disorganized"),
            AttachmentStyle::Unknown
        );
        assert_eq!(AttachmentStyle::parse_lenient(""), AttachmentStyle::Unknown);
    }

    #[test]
    fn attachment_style_deserializes_leniently() {
        let style: AttachmentStyle = serde_json::from_str("\"Avoidant style\"").unwrap();
        assert_eq!(style, AttachmentStyle::Avoidant);
        assert_eq!(serde_json::to_string(&style).unwrap(), "\"avoidant\"");
    }

    #[test]
    fn builder_derives_lowercase_id_from_name() {
        let persona = Persona::builder("Lila")
            .attachment_style("secure")
            .build()
            .unwrap();
        assert_eq!(persona.persona_id, "lila");
        assert_eq!(persona.name, "Lila");
    }

    #[test]
    fn builder_clamps_scalars() {
        let persona = Persona::builder("Don")
            .personality(PersonalityProfile {
                openness: 1.4,
                conscientiousness: -0.2,
                extraversion: 0.4,
                agreeableness: 0.7,
                neuroticism: f64::NAN,
            })
            .trust_level(3.0)
            .build()
            .unwrap();
        assert_eq!(persona.personality.openness, 1.0);
        assert_eq!(persona.personality.conscientiousness, 0.0);
        assert_eq!(persona.personality.neuroticism, 0.5);
        assert_eq!(persona.trust_level, 1.0);
    }

    #[test]
    fn builder_rejects_missing_name() {
        assert!(Persona::builder("  ").build().is_err());
    }

    #[test]
    fn missing_scalars_default_to_neutral() {
        let persona: Persona = serde_json::from_value(serde_json::json!({
            "persona_id": "nova",
            "name": "Nova",
            "personality": { "openness": 0.9 }
        }))
        .unwrap();
        assert_eq!(persona.personality.openness, 0.9);
        assert_eq!(persona.personality.agreeableness, 0.5);
        assert_eq!(persona.trust_level, 0.5);
        assert_eq!(persona.attachment_style, AttachmentStyle::Unknown);
    }
}
