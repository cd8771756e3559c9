// src/analysis/mod.rs
// =============================================================================
// Asking a language model about the repository.
//
// Submodules:
// - model: the GenerativeModel seam and its Gemini implementation
// - analyzer: prompt building and the fixed no-data / failure outcomes
// - markdown: rendering the answer for a terminal or as HTML
// =============================================================================

mod analyzer;
mod markdown;
mod model;

pub use analyzer::{AnalysisOutcome, Analyzer};
pub use markdown::{render_html, render_terminal};
pub use model::GeminiClient;

#[cfg(test)]
pub use model::{GenerativeModel, ModelFuture};
