//! Optimization — analysis-driven rewrites with a no-regress guarantee
//!
//! Each round applies every rewrite rule whose trigger matches the
//! current analysis, then re-analyzes. A round that fails to improve
//! the quality score is discarded and iteration stops (no-progress
//! termination). The returned artifact never scores below the input.

use crate::analyze::{Analyzer, CodeAnalysis};
use crate::artifact::CodeArtifact;
use crate::config::EngineConfig;
use crate::patterns::PatternLibrary;
use regex::Regex;
use std::sync::OnceLock;

/// Result of an optimization run
#[derive(Debug, Clone)]
pub struct OptimizationOutcome {
    /// Best artifact seen (the input when no round improved it)
    pub artifact: CodeArtifact,

    /// Analysis of the returned artifact
    pub analysis: CodeAnalysis,

    /// Rewrite rounds actually evaluated
    pub rounds: usize,

    /// Whether any round improved the quality score
    pub improved: bool,
}

/// What kind of finding arms a rewrite rule
enum Trigger {
    /// A security issue containing this fragment
    Security(&'static str),
    /// A performance tip containing this fragment
    Performance(&'static str),
    /// Quality score below the configured threshold
    QualityBelow,
}

struct RewriteRule {
    name: &'static str,
    trigger: Trigger,
    apply: fn(&str) -> String,
}

/// Rewrite rules, applied in fixed order within a round
const RULES: &[RewriteRule] = &[
    RewriteRule {
        name: "redact-secrets",
        trigger: Trigger::Security("hard-coded-secret"),
        apply: redact_secrets,
    },
    RewriteRule {
        name: "safe-markup",
        trigger: Trigger::Security("raw-html"),
        apply: |text| text.replace("innerHTML", "textContent"),
    },
    RewriteRule {
        name: "drop-debug-logging",
        trigger: Trigger::Performance("debug logging"),
        apply: drop_debug_logging,
    },
    RewriteRule {
        name: "structured-clone",
        trigger: Trigger::Performance("deep clone"),
        apply: structured_clone,
    },
    RewriteRule {
        name: "block-scope-vars",
        trigger: Trigger::Performance("var"),
        apply: block_scope_vars,
    },
    RewriteRule {
        name: "doc-banner",
        trigger: Trigger::QualityBelow,
        apply: add_doc_banner,
    },
];

fn redact_secrets(text: &str) -> String {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    let re = RE.get_or_init(|| {
        Regex::new(
            r#"(?i)\b(api_key|apikey|password|passwd|secret|token)\b(\s*[:=]\s*)["'][^"']{4,}["']"#,
        )
        .ok()
    });
    match re {
        Some(re) => re.replace_all(text, "$1${2}process.env.SECRET").into_owned(),
        None => text.to_string(),
    }
}

fn drop_debug_logging(text: &str) -> String {
    let ends_with_newline = text.ends_with('\n');
    let mut out = text
        .lines()
        .filter(|line| !line.contains("console.log(") && !line.contains("console.debug("))
        .collect::<Vec<_>>()
        .join("\n");
    if ends_with_newline {
        out.push('\n');
    }
    out
}

fn structured_clone(text: &str) -> String {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    let re = RE.get_or_init(|| {
        Regex::new(r"JSON\.parse\s*\(\s*JSON\.stringify\s*\(([^()]*)\)\s*\)").ok()
    });
    match re {
        Some(re) => re.replace_all(text, "structuredClone($1)").into_owned(),
        None => text.to_string(),
    }
}

fn block_scope_vars(text: &str) -> String {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"\bvar\s+").ok());
    match re {
        Some(re) => re.replace_all(text, "let ").into_owned(),
        None => text.to_string(),
    }
}

fn add_doc_banner(text: &str) -> String {
    let trimmed = text.trim_start();
    if trimmed.starts_with("/*") || trimmed.starts_with("//") || trimmed.starts_with('#') {
        return text.to_string();
    }
    format!("/**\n * Generated module. Review before shipping.\n */\n{}", text)
}

/// Applies analysis-driven rewrites, bounded by `max_iterations`
#[derive(Debug, Clone)]
pub struct Optimizer {
    max_iterations: usize,
    quality_threshold: f64,
}

impl Optimizer {
    pub fn new(max_iterations: usize) -> Self {
        Self {
            max_iterations,
            quality_threshold: 0.7,
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            max_iterations: config.max_iterations,
            quality_threshold: config.quality_threshold,
        }
    }

    /// Optimize an artifact given its analysis.
    ///
    /// Returns the best artifact seen together with its analysis; the
    /// quality score of the result is never below the input's.
    pub fn optimize(
        &self,
        artifact: &CodeArtifact,
        analysis: &CodeAnalysis,
        analyzer: &Analyzer,
        library: &PatternLibrary,
    ) -> OptimizationOutcome {
        let mut best_artifact = artifact.clone();
        let mut best_analysis = analysis.clone();
        let mut rounds = 0;
        let mut improved = false;

        for _ in 0..self.max_iterations {
            let Some(rewritten) = self.apply_round(&best_artifact.content, &best_analysis) else {
                break;
            };
            if rewritten == best_artifact.content {
                break;
            }

            rounds += 1;
            let candidate = CodeArtifact::new(best_artifact.language.clone(), rewritten);
            let candidate_analysis = analyzer.analyze(&candidate, library);

            if candidate_analysis.quality_score > best_analysis.quality_score {
                tracing::debug!(
                    round = rounds,
                    from = best_analysis.quality_score,
                    to = candidate_analysis.quality_score,
                    "optimization round accepted"
                );
                best_artifact = candidate;
                best_analysis = candidate_analysis;
                improved = true;
            } else {
                // No progress: the round's output is discarded.
                tracing::debug!(round = rounds, "optimization round made no progress");
                break;
            }
        }

        OptimizationOutcome {
            artifact: best_artifact,
            analysis: best_analysis,
            rounds,
            improved,
        }
    }

    /// Run every armed rule over the text. `None` when nothing triggered.
    fn apply_round(&self, text: &str, analysis: &CodeAnalysis) -> Option<String> {
        let mut current = text.to_string();
        let mut any_armed = false;

        for rule in RULES {
            let armed = match &rule.trigger {
                Trigger::Security(fragment) => analysis
                    .security_issues
                    .iter()
                    .any(|issue| issue.contains(fragment)),
                Trigger::Performance(fragment) => analysis
                    .performance_tips
                    .iter()
                    .any(|tip| tip.contains(fragment)),
                Trigger::QualityBelow => analysis.quality_score < self.quality_threshold,
            };

            if armed {
                any_armed = true;
                tracing::debug!(rule = rule.name, "rewrite rule armed");
                current = (rule.apply)(&current);
            }
        }

        any_armed.then_some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyze::Analyzer;
    use pretty_assertions::assert_eq;

    fn run(content: &str, max_iterations: usize) -> OptimizationOutcome {
        let library = PatternLibrary::default_library();
        let analyzer = Analyzer::new();
        let artifact = CodeArtifact::new("typescript", content);
        let analysis = analyzer.analyze(&artifact, &library);
        Optimizer::new(max_iterations).optimize(&artifact, &analysis, &analyzer, &library)
    }

    #[test]
    fn test_debug_logging_is_dropped() {
        let outcome = run(
            "const total: number = 1;\nconsole.log(total);\nvar x = 2;\n",
            2,
        );

        assert!(outcome.improved);
        assert!(!outcome.artifact.content.contains("console.log"));
        assert!(!outcome.artifact.content.contains("var "));
    }

    #[test]
    fn test_secrets_are_redacted() {
        let outcome = run("const api_key = \"sk-123456789\";\n", 1);
        assert!(!outcome.artifact.content.contains("sk-123456789"));
        assert!(outcome.artifact.content.contains("process.env.SECRET"));
    }

    #[test]
    fn test_deep_clone_rewritten() {
        let outcome = run("const copy = JSON.parse(JSON.stringify(state));\n", 1);
        assert!(outcome.artifact.content.contains("structuredClone(state)"));
    }

    #[test]
    fn test_never_regresses_quality() {
        let outcome = run("eval(input);\nconsole.log(input);\nvar y = 1;\n", 3);

        let library = PatternLibrary::default_library();
        let analyzer = Analyzer::new();
        let input = CodeArtifact::new("typescript", "eval(input);\nconsole.log(input);\nvar y = 1;\n");
        let input_analysis = analyzer.analyze(&input, &library);

        assert!(outcome.analysis.quality_score >= input_analysis.quality_score);
    }

    #[test]
    fn test_clean_artifact_is_untouched() {
        let content = "/**\n * Fine as-is.\n */\nexport const total: number = 1;\n";
        let outcome = run(content, 2);

        assert_eq!(outcome.rounds, 0);
        assert!(!outcome.improved);
        assert_eq!(outcome.artifact.content, content);
    }

    #[test]
    fn test_zero_iterations_does_nothing() {
        let outcome = run("console.log(1);\nvar a = 1;\n", 0);
        assert_eq!(outcome.rounds, 0);
        assert_eq!(outcome.artifact.content, "console.log(1);\nvar a = 1;\n");
    }

    #[test]
    fn test_rounds_bounded_by_max_iterations() {
        let outcome = run("console.log(1);\nvar a = 1;\neval(b);\n", 2);
        assert!(outcome.rounds <= 2);
    }
}
