//! Mixtape sequencing engine
//!
//! Single pass per request: Segment Resolver → Timeline Planner → Render
//! Invoker. No feedback loops, no shared mutable state between requests.

pub mod plan;
pub mod render;
pub mod segment;

pub use plan::{MixPlan, MixPlanEntry, PlanError};
pub use render::{Artifact, EncodeSettings, MediaProcessor, MixJob, RenderError, Renderer, SegmentSpec};
pub use segment::{FadeDefaults, Segment, SegmentRequest, SourceAudio, ValidationError};
