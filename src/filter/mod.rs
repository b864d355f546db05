//! Preset model and listing visibility evaluation.

pub mod category;
pub mod decision;
pub mod error;
pub mod evaluate;
pub mod jobs;
pub mod preset;

pub use decision::{Decision, FilterDecision, HideReason};
pub use error::PresetError;
pub use evaluate::{ActiveFilter, EvalContext, ListingFilter, evaluate, evaluate_with};
pub use preset::{Preset, PresetId, TermKind};
