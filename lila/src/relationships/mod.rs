//! Relationship metric algebra.
//!
//! Bounded deltas on trust, intimacy and strength, valence blending on
//! interaction, and the policy for mutations that target a pair without a
//! relationship.

pub mod metrics;
pub mod policy;

pub use metrics::{
    MetricDelta, apply_delta, apply_relationship_delta, blend_valence, record_interaction,
};
pub use policy::MissingRelationshipPolicy;
