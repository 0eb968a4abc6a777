//! Template-based fragment rendering
//!
//! Uses MiniJinja with embedded templates, one per synthesis step kind.
//! Undefined behavior is strict: a template touching a context value
//! that is absent fails the render instead of emitting an empty string,
//! which is how missing requirements surface as synthesis failures.

use minijinja::{Environment, UndefinedBehavior};
use serde::Serialize;
use std::sync::OnceLock;

use crate::error::Error;

// Embedded templates (compiled into the binary)
mod embedded {
    pub const SCAFFOLD: &str = include_str!("../templates/fragments/scaffold.jinja");
    pub const IMPORTS: &str = include_str!("../templates/fragments/imports.jinja");
    pub const FIELDS: &str = include_str!("../templates/fragments/fields.jinja");
    pub const FEATURES: &str = include_str!("../templates/fragments/features.jinja");
    pub const STYLES: &str = include_str!("../templates/fragments/styles.jinja");
    pub const TESTS: &str = include_str!("../templates/fragments/tests.jinja");
    pub const NOTE: &str = include_str!("../templates/fragments/note.jinja");
}

/// Template engine singleton
static ENGINE: OnceLock<Environment<'static>> = OnceLock::new();

fn init_engine() -> Environment<'static> {
    let mut env = Environment::new();
    env.set_undefined_behavior(UndefinedBehavior::Strict);

    env.add_filter("pascal_case", pascal_case);
    env.add_filter("camel_case", camel_case);
    env.add_filter("indent", indent);

    for (name, source) in [
        ("fragments/scaffold.jinja", embedded::SCAFFOLD),
        ("fragments/imports.jinja", embedded::IMPORTS),
        ("fragments/fields.jinja", embedded::FIELDS),
        ("fragments/features.jinja", embedded::FEATURES),
        ("fragments/styles.jinja", embedded::STYLES),
        ("fragments/tests.jinja", embedded::TESTS),
        ("fragments/note.jinja", embedded::NOTE),
    ] {
        env.add_template(name, source)
            .unwrap_or_else(|e| panic!("Failed to load embedded template {}: {}", name, e));
    }

    env
}

/// Get the global template engine
pub fn engine() -> &'static Environment<'static> {
    ENGINE.get_or_init(init_engine)
}

/// Render one fragment template with the given context
pub fn render_fragment<S: Serialize>(name: &str, ctx: &S) -> Result<String, Error> {
    let template = engine()
        .get_template(name)
        .map_err(|e| Error::Template(format!("template not found: {}", e)))?;
    template
        .render(ctx)
        .map_err(|e| Error::Template(format!("render of {} failed: {}", name, e)))
}

/// Convert an identifier to PascalCase, splitting on `_`, `-`, `.` and
/// spaces
pub fn pascal_case(value: &str) -> String {
    value
        .split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(c) => c.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}

/// Convert an identifier to camelCase
pub fn camel_case(value: &str) -> String {
    let pascal = pascal_case(value);
    let mut chars = pascal.chars();
    match chars.next() {
        Some(c) => c.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Add indentation to each non-empty line
fn indent(value: &str, spaces: usize) -> String {
    let indent_str = " ".repeat(spaces);
    value
        .lines()
        .map(|line| {
            if line.is_empty() {
                line.to_string()
            } else {
                format!("{}{}", indent_str, line)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[test]
    fn test_engine_has_all_fragments() {
        let env = engine();
        for name in [
            "fragments/scaffold.jinja",
            "fragments/imports.jinja",
            "fragments/fields.jinja",
            "fragments/features.jinja",
            "fragments/styles.jinja",
            "fragments/tests.jinja",
            "fragments/note.jinja",
        ] {
            assert!(env.get_template(name).is_ok(), "missing {}", name);
        }
    }

    #[rstest]
    #[case("form", "Form")]
    #[case("user-profile", "UserProfile")]
    #[case("nav_bar", "NavBar")]
    #[case("tailwind.layout.grid", "TailwindLayoutGrid")]
    fn test_pascal_case(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(pascal_case(input), expected);
    }

    #[rstest]
    #[case("form", "form")]
    #[case("user-profile", "userProfile")]
    #[case("NavBar", "navBar")]
    fn test_camel_case(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(camel_case(input), expected);
    }

    #[test]
    fn test_strict_undefined_fails_render() {
        #[derive(serde::Serialize)]
        struct Empty {}

        let result = render_fragment("fragments/note.jinja", &Empty {});
        assert!(result.is_err());
    }
}
