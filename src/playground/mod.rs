//! The playground: AI-generated posts on a rotating schedule.
//!
//! [`Rotation`] decides what to post, [`prompts`] turns GlyphBots data into
//! model prompts, and [`PlaygroundScheduler`] drives the timer and delivery.

pub mod prompts;
mod rotation;
mod scheduler;

pub use rotation::{ContentKind, Rotation};
pub use scheduler::{compose, PlaygroundContent, PlaygroundScheduler, PlaygroundStatus};
