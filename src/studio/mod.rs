//! Five-stage ad studio: product, model, script, scenes, finishing.
//!
//! [`wizard::Studio`] holds the session artifacts and gates stage transitions;
//! [`pipeline::StudioPipeline`] fills them in through a gateway.

/// Caption parsing and rendering.
pub mod caption;
/// Manual prompts when video generation runs out of quota.
pub mod fallback;
/// Gateway-driven generation steps.
pub mod pipeline;
/// Prompt construction.
pub mod prompts;
/// Stages, artifacts and transitions.
pub mod wizard;
