//! Per-request generation context
//!
//! A [`GenerationContext`] is built fresh for every request and never
//! shared or mutated afterwards: each pipeline stage receives it by
//! reference. Requirements are typed — named fields plus an extension
//! map for framework-specific options — and validated at build time.

use crate::error::{Error, Result};
use crate::patterns::PatternLibrary;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Speaker of a prior conversation turn
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

/// One prior (role, text) turn threaded back in by the caller
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

/// A field the generated component should expose
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct FieldSpec {
    /// Field name
    pub name: String,

    /// Field type, in the target language's vocabulary
    #[serde(rename = "type", default = "default_field_kind")]
    pub kind: String,

    /// Whether the field is mandatory
    #[serde(default)]
    pub required: bool,
}

fn default_field_kind() -> String {
    "string".to_string()
}

/// Structured requirements for one generation request
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct Requirements {
    /// Component kind to produce, e.g. `form`, `ui`, `page`
    #[serde(alias = "type")]
    pub component: String,

    /// Feature flags, e.g. `responsive`, `dark-mode`, `accessible`
    #[serde(default)]
    pub features: Vec<String>,

    /// Field specifications for data-bearing components
    #[serde(default)]
    pub fields: Vec<FieldSpec>,

    /// Framework-specific options not covered by the named fields
    #[serde(default)]
    pub extensions: HashMap<String, serde_json::Value>,
}

impl Requirements {
    /// Check the schema constraints enforced at context-build time
    fn validate(&self) -> Result<()> {
        if self.component.trim().is_empty() {
            return Err(Error::InvalidRequirements(
                "component kind must not be empty".to_string(),
            ));
        }
        if self.features.iter().any(|f| f.trim().is_empty()) {
            return Err(Error::InvalidRequirements(
                "feature flags must not be empty strings".to_string(),
            ));
        }
        if let Some(field) = self.fields.iter().find(|f| f.name.trim().is_empty()) {
            return Err(Error::InvalidRequirements(format!(
                "field of type '{}' is missing a name",
                field.kind
            )));
        }
        Ok(())
    }
}

/// One generation request as submitted by the caller
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct GenerationRequest {
    /// Target language id, e.g. `typescript`
    pub language: String,

    /// Target framework id, e.g. `next.js`
    #[serde(default)]
    pub framework: String,

    /// Structured requirements
    pub requirements: Requirements,

    /// Prior turns, oldest first
    #[serde(default)]
    pub history: Vec<Turn>,
}

/// Immutable per-request bundle parameterizing every pipeline stage
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationContext {
    pub language: String,
    pub framework: String,
    /// Applicable pattern ids, library order preserved
    pub patterns: Vec<String>,
    pub requirements: Requirements,
    pub history: Vec<Turn>,
}

/// Merge a request with the pattern library into a context.
///
/// Applicable patterns are the library entries for the language followed
/// by those for the framework, de-duplicated preserving first
/// occurrence. Requirements are validated here so later stages can rely
/// on them.
pub fn build_context(
    request: &GenerationRequest,
    library: &PatternLibrary,
) -> Result<GenerationContext> {
    if request.language.trim().is_empty() {
        return Err(Error::InvalidRequirements(
            "language must not be empty".to_string(),
        ));
    }
    request.requirements.validate()?;

    let mut patterns = Vec::new();
    for id in library
        .patterns_for(&request.language)
        .iter()
        .chain(library.patterns_for(&request.framework))
    {
        if !patterns.contains(id) {
            patterns.push(id.clone());
        }
    }

    Ok(GenerationContext {
        language: request.language.clone(),
        framework: request.framework.clone(),
        patterns,
        requirements: request.requirements.clone(),
        history: request.history.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn tailwind_library() -> PatternLibrary {
        let mut map = HashMap::new();
        map.insert(
            "typescript".to_string(),
            vec![
                "tailwind.layout.grid".to_string(),
                "tailwind.layout.flex".to_string(),
            ],
        );
        map.insert(
            "next.js".to_string(),
            vec![
                "tailwind.components.card".to_string(),
                "tailwind.layout.grid".to_string(),
            ],
        );
        PatternLibrary::new(map)
    }

    fn form_request() -> GenerationRequest {
        GenerationRequest {
            language: "typescript".to_string(),
            framework: "next.js".to_string(),
            requirements: Requirements {
                component: "form".to_string(),
                features: vec!["responsive".to_string(), "dark-mode".to_string()],
                ..Default::default()
            },
            history: Vec::new(),
        }
    }

    #[test]
    fn test_build_merges_language_and_framework_patterns() {
        let ctx = build_context(&form_request(), &tailwind_library()).unwrap();

        assert!(ctx.patterns.contains(&"tailwind.layout.grid".to_string()));
        assert!(ctx.patterns.contains(&"tailwind.layout.flex".to_string()));
        assert!(ctx.patterns.contains(&"tailwind.components.card".to_string()));
        // Duplicate grid entry from the framework list is dropped
        assert_eq!(ctx.patterns.len(), 3);
    }

    #[test]
    fn test_build_preserves_library_order() {
        let ctx = build_context(&form_request(), &tailwind_library()).unwrap();
        assert_eq!(ctx.patterns[0], "tailwind.layout.grid");
        assert_eq!(ctx.patterns[1], "tailwind.layout.flex");
        assert_eq!(ctx.patterns[2], "tailwind.components.card");
    }

    #[test]
    fn test_empty_component_rejected() {
        let mut request = form_request();
        request.requirements.component = "  ".to_string();

        let err = build_context(&request, &tailwind_library()).unwrap_err();
        assert!(matches!(err, Error::InvalidRequirements(_)));
    }

    #[test]
    fn test_empty_language_rejected() {
        let mut request = form_request();
        request.language = String::new();

        let err = build_context(&request, &tailwind_library()).unwrap_err();
        assert!(matches!(err, Error::InvalidRequirements(_)));
    }

    #[test]
    fn test_unknown_language_builds_with_no_patterns() {
        let mut request = form_request();
        request.language = "cobol".to_string();
        request.framework = "cics".to_string();

        let ctx = build_context(&request, &tailwind_library()).unwrap();
        assert!(ctx.patterns.is_empty());
    }

    #[test]
    fn test_requirements_type_alias() {
        let yaml = "language: typescript\nrequirements:\n  type: form\n  features: [responsive]\n";
        let request: GenerationRequest = serde_norway::from_str(yaml).unwrap();
        assert_eq!(request.requirements.component, "form");
    }
}
