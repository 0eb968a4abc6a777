// Production-quality lints
#![warn(
    clippy::todo,
    clippy::unimplemented,
    clippy::dbg_macro,
    clippy::print_stdout,
    clippy::print_stderr
)]
// Deny truly dangerous patterns
#![deny(clippy::mem_forget)]
// Allow common patterns in library code
#![allow(clippy::missing_errors_doc, clippy::missing_panics_doc)]

//! # Ghostwriter — context-aware code generation
//!
//! Ghostwriter turns a target language/framework plus structured
//! requirements into a code artifact: it selects a reusable **thinking
//! process** (a named generation strategy), synthesizes a draft,
//! analyzes it along five quality axes, and applies analysis-driven
//! optimizations before returning the artifact with improvement
//! suggestions.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use ghostwriter::{Engine, EngineConfig, GenerationRequest, PatternLibrary, ProcessRegistry};
//!
//! let engine = Engine::bootstrap(
//!     "ghostwriter.yaml".as_ref(),
//!     "patterns/code_patterns.json".as_ref(),
//!     "thinking".as_ref(),
//! );
//!
//! let request: GenerationRequest = serde_norway::from_str(r#"
//!   language: typescript
//!   framework: next.js
//!   requirements:
//!     component: signup-form
//!     features: [responsive, dark-mode]
//!     fields:
//!       - name: email
//!         type: string
//!         required: true
//! "#)?;
//!
//! let generation = engine.generate(&request)?;
//! println!("{}", generation.artifact.content);
//! for suggestion in &generation.suggestions {
//!     println!("- {}", suggestion);
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                                                                │
//! │  REQUEST (language, framework, requirements, history)          │
//! │      │                                                         │
//! │      ├──► build_context(request, library) ──► GenerationContext│
//! │      │                                                         │
//! │      ├──► select(context, registry) ──► ThinkingProcess        │
//! │      │                                                         │
//! │      ├──► synthesize(process, context) ──► CodeArtifact        │
//! │      │                                                         │
//! │      ├──► analyze(artifact, library) ──► CodeAnalysis          │
//! │      │                                                         │
//! │      ├──► optimize(artifact, analysis) ──► CodeArtifact        │
//! │      │         (re-analyzes, never regresses quality)          │
//! │      │                                                         │
//! │      └──► suggest(analysis) ──► Vec<String>                    │
//! │                                                                │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The two knowledge bases — the [`PatternLibrary`] and the
//! [`ProcessRegistry`] — are loaded once at startup and read-only
//! afterwards. Everything per-request ([`GenerationContext`],
//! [`CodeArtifact`], [`CodeAnalysis`]) is built fresh, threaded as a
//! parameter through the stages, and discarded with the response, so
//! independent requests can run concurrently without synchronization.
//!
//! Startup loads fail softly: a missing or malformed config or pattern
//! file yields documented defaults, and a thinking-process resource
//! that does not parse is logged and skipped without aborting the
//! batch. A failed *request*, by contrast, is always an explicit
//! [`PipelineFailure`] naming the stage — an empty artifact is a valid
//! success, never a failure signal.

// Core data model
pub mod artifact;
pub mod config;
pub mod context;
pub mod error;
pub mod patterns;
pub mod process;

// Pipeline stages
pub mod analyze;
pub mod optimize;
pub mod pipeline;
pub mod select;
pub mod suggest;
pub mod synthesize;

// Rendering support
pub mod templates;

// Re-exports
pub use analyze::{analyze, Analyzer, CodeAnalysis};
pub use artifact::{write_artifact, ArtifactMeta, CodeArtifact};
pub use config::EngineConfig;
pub use context::{
    build_context, FieldSpec, GenerationContext, GenerationRequest, Requirements, Role, Turn,
};
pub use error::{Error, Result};
pub use optimize::{OptimizationOutcome, Optimizer};
pub use patterns::{PatternLibrary, DEFAULT_LANGUAGES};
pub use pipeline::{Engine, Generation, PipelineFailure, Stage};
pub use process::{ProcessMeta, ProcessRegistry, ThinkingProcess};
pub use select::select;
pub use suggest::SuggestionEngine;
pub use synthesize::{synthesize, StepKind};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
