//! Synthesis — turn a thinking process plus a context into a draft
//! artifact
//!
//! Walks `process.steps` in order. Each step is classified into a step
//! kind, checked against the context's requirements, and rendered as a
//! fragment through the step kind's template. Fragments are joined per
//! the process output format. Any failing step aborts the whole
//! synthesis; partial output is never returned.

use crate::artifact::CodeArtifact;
use crate::context::{FieldSpec, GenerationContext};
use crate::error::{Error, Result};
use crate::process::ThinkingProcess;
use crate::templates;
use serde::Serialize;

/// What a step contributes to the artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepKind {
    Imports,
    Fields,
    Features,
    Styles,
    Tests,
    Scaffold,
    Note,
}

impl StepKind {
    /// Classify a step by its wording. Checks run in a fixed precedence
    /// order so a step mentioning several concerns lands deterministically.
    pub fn classify(step: &str) -> Self {
        let step = step.to_lowercase();
        let mentions = |keywords: &[&str]| keywords.iter().any(|k| step.contains(k));

        if mentions(&["import", "dependenc"]) {
            StepKind::Imports
        } else if mentions(&["field", "state", "schema", "data model"]) {
            StepKind::Fields
        } else if mentions(&["feature", "accessib", "responsive", "theme", "dark"]) {
            StepKind::Features
        } else if mentions(&["style", "styling", "layout", "css", "pattern"]) {
            StepKind::Styles
        } else if mentions(&["test", "verif"]) {
            StepKind::Tests
        } else if mentions(&["structure", "component", "scaffold", "props", "skeleton"]) {
            StepKind::Scaffold
        } else {
            StepKind::Note
        }
    }

    fn template(self) -> &'static str {
        match self {
            StepKind::Imports => "fragments/imports.jinja",
            StepKind::Fields => "fragments/fields.jinja",
            StepKind::Features => "fragments/features.jinja",
            StepKind::Styles => "fragments/styles.jinja",
            StepKind::Tests => "fragments/tests.jinja",
            StepKind::Scaffold => "fragments/scaffold.jinja",
            StepKind::Note => "fragments/note.jinja",
        }
    }

    /// The requirement a step kind demands from the context, if any
    fn missing_requirement(self, context: &GenerationContext) -> Option<&'static str> {
        match self {
            StepKind::Imports if context.framework.trim().is_empty() => Some("framework"),
            StepKind::Fields if context.requirements.fields.is_empty() => Some("fields"),
            StepKind::Features if context.requirements.features.is_empty() => Some("features"),
            _ => None,
        }
    }
}

#[derive(Serialize)]
struct FragmentContext<'a> {
    language: &'a str,
    framework: &'a str,
    component: &'a str,
    features: &'a [String],
    fields: &'a [FieldSpec],
    patterns: &'a [String],
    step: &'a str,
}

/// Synthesize a draft artifact from a process and a context.
///
/// Fails with [`Error::Synthesis`] when a step demands a requirement
/// the context does not carry.
pub fn synthesize(process: &ThinkingProcess, context: &GenerationContext) -> Result<CodeArtifact> {
    let mut fragments = Vec::with_capacity(process.steps.len());

    for step in &process.steps {
        let kind = StepKind::classify(step);

        if let Some(key) = kind.missing_requirement(context) {
            return Err(Error::Synthesis(format!(
                "step '{}' requires requirement '{}'",
                step, key
            )));
        }

        let fragment_ctx = FragmentContext {
            language: &context.language,
            framework: &context.framework,
            component: &context.requirements.component,
            features: &context.requirements.features,
            fields: &context.requirements.fields,
            patterns: &context.patterns,
            step,
        };

        let fragment = templates::render_fragment(kind.template(), &fragment_ctx)
            .map_err(|e| Error::Synthesis(format!("step '{}': {}", step, e)))?;
        fragments.push(fragment.trim_end().to_string());
    }

    let body = fragments.join("\n\n") + "\n";
    let content = match process.output_kind() {
        "markdown" => format!("```{}\n{}```\n", context.language, body),
        _ => body,
    };

    tracing::debug!(
        process = %process.id,
        steps = process.steps.len(),
        bytes = content.len(),
        "synthesis complete"
    );
    Ok(CodeArtifact::new(context.language.clone(), content))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{build_context, GenerationRequest, Requirements};
    use crate::patterns::PatternLibrary;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use std::collections::HashMap;

    fn ui_context() -> GenerationContext {
        let mut map = HashMap::new();
        map.insert(
            "typescript".to_string(),
            vec![
                "tailwind.layout.grid".to_string(),
                "tailwind.components.card".to_string(),
            ],
        );
        let library = PatternLibrary::new(map);

        let request = GenerationRequest {
            language: "typescript".to_string(),
            framework: "next.js".to_string(),
            requirements: Requirements {
                component: "signup-form".to_string(),
                features: vec!["responsive".to_string(), "dark-mode".to_string()],
                fields: vec![
                    FieldSpec {
                        name: "email".to_string(),
                        kind: "string".to_string(),
                        required: true,
                    },
                    FieldSpec {
                        name: "remember_me".to_string(),
                        kind: "boolean".to_string(),
                        required: false,
                    },
                ],
                ..Default::default()
            },
            history: Vec::new(),
        };
        build_context(&request, &library).unwrap()
    }

    #[rstest]
    #[case("Add imports for framework modules", StepKind::Imports)]
    #[case("Define the form fields and state", StepKind::Fields)]
    #[case("Wire up responsive and dark-mode features", StepKind::Features)]
    #[case("Apply layout and styling patterns", StepKind::Styles)]
    #[case("Write a smoke test", StepKind::Tests)]
    #[case("Define the component structure and props", StepKind::Scaffold)]
    #[case("Review with the team", StepKind::Note)]
    fn test_classify(#[case] step: &str, #[case] expected: StepKind) {
        assert_eq!(StepKind::classify(step), expected);
    }

    #[test]
    fn test_synthesize_walks_steps_in_order() {
        let process = ThinkingProcess::parse(
            "ui-feature",
            "Define the component structure and props\nApply layout and styling patterns",
        )
        .unwrap();
        let ctx = ui_context();

        let artifact = synthesize(&process, &ctx).unwrap();

        assert_eq!(artifact.language, "typescript");
        let scaffold_pos = artifact.content.find("SignupForm").unwrap();
        let styles_pos = artifact.content.find("signupFormClasses").unwrap();
        assert!(scaffold_pos < styles_pos);
    }

    #[test]
    fn test_synthesize_embeds_pattern_ids() {
        let process = ThinkingProcess::parse("styles", "Apply layout and styling patterns").unwrap();
        let artifact = synthesize(&process, &ui_context()).unwrap();

        assert!(artifact.content.contains("tailwind.layout.grid"));
        assert!(artifact.content.contains("tailwind.components.card"));
    }

    #[test]
    fn test_missing_fields_requirement_fails() {
        let process = ThinkingProcess::parse("data", "Define the form fields and state").unwrap();
        let mut ctx = ui_context();
        ctx.requirements.fields.clear();

        let err = synthesize(&process, &ctx).unwrap_err();
        assert!(matches!(err, Error::Synthesis(_)));
        assert!(err.to_string().contains("fields"));
    }

    #[test]
    fn test_missing_framework_requirement_fails() {
        let process = ThinkingProcess::parse("deps", "Add imports for framework modules").unwrap();
        let mut ctx = ui_context();
        ctx.framework = String::new();

        assert!(synthesize(&process, &ctx).is_err());
    }

    #[test]
    fn test_markdown_output_format_wraps_in_fences() {
        let process =
            ThinkingProcess::parse("doc", "output: markdown\n\nDescribe the component structure")
                .unwrap();
        let artifact = synthesize(&process, &ui_context()).unwrap();

        assert!(artifact.content.starts_with("```typescript\n"));
        assert!(artifact.content.trim_end().ends_with("```"));
    }

    #[test]
    fn test_synthesis_is_deterministic() {
        let process = ThinkingProcess::parse(
            "ui",
            "Define the component structure\nApply styling patterns\nWrite a smoke test",
        )
        .unwrap();
        let ctx = ui_context();

        let first = synthesize(&process, &ctx).unwrap();
        let second = synthesize(&process, &ctx).unwrap();
        assert_eq!(first, second);
    }
}
