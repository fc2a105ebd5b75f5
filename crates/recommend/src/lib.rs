//! Recommendation pipeline.
//!
//! profile snapshot → dispatch → extraction → classification →
//! resolution → membership annotation.
//!
//! - [`TextGenerator`] / [`MessagesClient`] — the text-generation
//!   collaborator and its HTTP implementation.
//! - [`prompt`] — fixed system instruction and user-message builder.
//! - [`RecommendationPipeline`] — runs one request end to end up to
//!   resolution.
//! - [`annotate`] — read-time library membership for picks and catalog
//!   items.

pub mod annotate;
pub mod generator;
pub mod pipeline;
pub mod prompt;

pub use annotate::{annotate, annotate_items, AnnotatedItem, AnnotatedPick, Membership};
pub use generator::{GenerationError, GeneratorConfig, MessagesClient, TextGenerator};
pub use pipeline::{PipelineError, PipelineOutcome, RecommendationPipeline, ResolvedPick};
