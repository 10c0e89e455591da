//! Prompt templates for turn generation and the end-of-session handoff.

pub mod fusion;
pub mod persona;
pub mod summary;

pub use fusion::{build_fusion_prompt, FUSION_DIRECTIVES};
pub use persona::THERAPIST_PERSONA;
pub use summary::{build_summary_prompt, SUMMARY_INSTRUCTION};
