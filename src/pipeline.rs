//! The generation pipeline — request in, artifact plus advice out
//!
//! One request moves through ContextBuilt, ProcessSelected,
//! Synthesized, Analyzed, Optimized, SuggestionsReady. A failure at any
//! stage ends the request with a [`PipelineFailure`] naming the stage
//! and the error — never an empty artifact posing as success. The
//! engine's knowledge bases are read-only after construction, so
//! independent requests can run concurrently; every per-request value
//! is threaded as a parameter, never stored on the engine.

use crate::analyze::{Analyzer, CodeAnalysis};
use crate::artifact::CodeArtifact;
use crate::config::EngineConfig;
use crate::context::{build_context, GenerationRequest};
use crate::error::Error;
use crate::optimize::Optimizer;
use crate::patterns::PatternLibrary;
use crate::process::ProcessRegistry;
use crate::select::select;
use crate::suggest::SuggestionEngine;
use crate::synthesize::synthesize;
use std::path::Path;

/// Pipeline stages, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    ContextBuilt,
    ProcessSelected,
    Synthesized,
    Analyzed,
    Optimized,
    SuggestionsReady,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Stage::ContextBuilt => "context-built",
            Stage::ProcessSelected => "process-selected",
            Stage::Synthesized => "synthesized",
            Stage::Analyzed => "analyzed",
            Stage::Optimized => "optimized",
            Stage::SuggestionsReady => "suggestions-ready",
        };
        write!(f, "{}", name)
    }
}

/// Terminal failure for one request, carrying the originating stage
#[derive(Debug)]
pub struct PipelineFailure {
    pub stage: Stage,
    pub error: Error,
}

impl std::fmt::Display for PipelineFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "pipeline failed at {}: {}", self.stage, self.error)
    }
}

impl std::error::Error for PipelineFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

/// Successful pipeline output
#[derive(Debug, Clone)]
pub struct Generation {
    /// The optimized artifact
    pub artifact: CodeArtifact,

    /// Analysis of the returned artifact
    pub analysis: CodeAnalysis,

    /// Improvement suggestions for the returned artifact
    pub suggestions: Vec<String>,

    /// Which thinking process drove synthesis
    pub process_id: String,

    /// Optimizer rounds evaluated
    pub optimizer_rounds: usize,
}

/// The engine: configuration plus the two knowledge bases
#[derive(Debug, Clone)]
pub struct Engine {
    config: EngineConfig,
    library: PatternLibrary,
    registry: ProcessRegistry,
    analyzer: Analyzer,
    optimizer: Optimizer,
    suggester: SuggestionEngine,
}

impl Engine {
    /// Build an engine from already-loaded parts
    pub fn new(config: EngineConfig, library: PatternLibrary, registry: ProcessRegistry) -> Self {
        let analyzer = Analyzer::from_config(&config);
        let optimizer = Optimizer::from_config(&config);
        let suggester = SuggestionEngine::from_config(&config);
        Self {
            config,
            library,
            registry,
            analyzer,
            optimizer,
            suggester,
        }
    }

    /// Load everything from disk. Config and pattern failures fall back
    /// to defaults; process parse failures skip the resource. Nothing
    /// here aborts startup.
    pub fn bootstrap(config_path: &Path, patterns_path: &Path, processes_dir: &Path) -> Self {
        let config = EngineConfig::load(config_path);
        let library = PatternLibrary::load(patterns_path);
        let registry = ProcessRegistry::load_all(processes_dir);
        Self::new(config, library, registry)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn library(&self) -> &PatternLibrary {
        &self.library
    }

    pub fn registry(&self) -> &ProcessRegistry {
        &self.registry
    }

    /// Run the full pipeline for one request.
    pub fn generate(&self, request: &GenerationRequest) -> Result<Generation, PipelineFailure> {
        let fail = |stage: Stage| move |error: Error| PipelineFailure { stage, error };

        let context = build_context(request, &self.library).map_err(fail(Stage::ContextBuilt))?;
        tracing::debug!(language = %context.language, patterns = context.patterns.len(), "context built");

        let process = select(&context, &self.registry).map_err(fail(Stage::ProcessSelected))?;
        tracing::debug!(process = %process.id, "process selected");

        let draft = synthesize(process, &context).map_err(fail(Stage::Synthesized))?;

        let draft_analysis = self.analyzer.analyze(&draft, &self.library);
        tracing::debug!(
            quality = draft_analysis.quality_score,
            complexity = draft_analysis.complexity,
            "draft analyzed"
        );

        let outcome = self
            .optimizer
            .optimize(&draft, &draft_analysis, &self.analyzer, &self.library);

        let suggestions = self.suggester.suggest(&outcome.analysis);

        Ok(Generation {
            artifact: outcome.artifact,
            analysis: outcome.analysis,
            suggestions,
            process_id: process.id.clone(),
            optimizer_rounds: outcome.rounds,
        })
    }

    /// Analyze an arbitrary artifact with the engine's thresholds
    pub fn analyze(&self, artifact: &CodeArtifact) -> CodeAnalysis {
        self.analyzer.analyze(artifact, &self.library)
    }

    /// Suggestions for an existing analysis
    pub fn suggest(&self, analysis: &CodeAnalysis) -> Vec<String> {
        self.suggester.suggest(analysis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{FieldSpec, Requirements};
    use crate::process::ThinkingProcess;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn engine() -> Engine {
        let mut map = HashMap::new();
        map.insert(
            "typescript".to_string(),
            vec![
                "tailwind.layout.grid".to_string(),
                "tailwind.layout.flex".to_string(),
                "tailwind.components.card".to_string(),
            ],
        );
        let library = PatternLibrary::new(map);

        let mut registry = ProcessRegistry::new();
        registry.register(
            ThinkingProcess::parse(
                "ui-feature",
                "language: typescript\nframework: next.js\n\nDefine the component structure and props\nDefine the form fields and state\nApply layout and styling patterns\nWrite a smoke test",
            )
            .unwrap(),
        );
        registry.register(
            ThinkingProcess::parse("generic", "Outline the solution\nWrite the code").unwrap(),
        );

        Engine::new(EngineConfig::default(), library, registry)
    }

    fn form_request() -> GenerationRequest {
        GenerationRequest {
            language: "typescript".to_string(),
            framework: "next.js".to_string(),
            requirements: Requirements {
                component: "signup-form".to_string(),
                features: vec!["responsive".to_string()],
                fields: vec![FieldSpec {
                    name: "email".to_string(),
                    kind: "string".to_string(),
                    required: true,
                }],
                ..Default::default()
            },
            history: Vec::new(),
        }
    }

    #[test]
    fn test_happy_path_produces_artifact_and_advice() {
        let generation = engine().generate(&form_request()).unwrap();

        assert_eq!(generation.process_id, "ui-feature");
        assert!(!generation.artifact.is_empty());
        assert_eq!(generation.artifact.language, "typescript");
        // The styles step embeds library pattern ids, so analysis finds them
        assert!(generation
            .analysis
            .patterns
            .contains(&"tailwind.layout.grid".to_string()));
    }

    #[test]
    fn test_empty_registry_fails_at_selection() {
        let engine = Engine::new(
            EngineConfig::default(),
            PatternLibrary::default_library(),
            ProcessRegistry::new(),
        );

        let failure = engine.generate(&form_request()).unwrap_err();
        assert_eq!(failure.stage, Stage::ProcessSelected);
        assert!(matches!(failure.error, Error::NoProcessAvailable));
    }

    #[test]
    fn test_invalid_requirements_fail_at_context() {
        let mut request = form_request();
        request.requirements.component = String::new();

        let failure = engine().generate(&request).unwrap_err();
        assert_eq!(failure.stage, Stage::ContextBuilt);
    }

    #[test]
    fn test_missing_requirement_fails_at_synthesis() {
        let mut request = form_request();
        request.requirements.fields.clear();

        let failure = engine().generate(&request).unwrap_err();
        assert_eq!(failure.stage, Stage::Synthesized);
        assert!(matches!(failure.error, Error::Synthesis(_)));
    }

    #[test]
    fn test_failure_is_explicit_not_empty_artifact() {
        let mut request = form_request();
        request.requirements.fields.clear();

        // The failed request yields Err, never Ok with an empty payload.
        assert!(engine().generate(&request).is_err());
    }

    #[test]
    fn test_generation_is_deterministic() {
        let engine = engine();
        let request = form_request();

        let first = engine.generate(&request).unwrap();
        let second = engine.generate(&request).unwrap();
        assert_eq!(first.artifact, second.artifact);
        assert_eq!(first.suggestions, second.suggestions);
    }

    #[test]
    fn test_optimized_quality_not_below_draft() {
        let generation = engine().generate(&form_request()).unwrap();

        // Re-measure the returned artifact: its score must match the
        // reported analysis and stay within bounds.
        let remeasured = engine().analyze(&generation.artifact);
        assert_eq!(remeasured.quality_score, generation.analysis.quality_score);
        assert!((0.0..=1.0).contains(&generation.analysis.quality_score));
    }
}
