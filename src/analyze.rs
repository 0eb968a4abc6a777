//! Artifact analysis — five independent heuristics, one verdict
//!
//! `analyze` never fails: each heuristic is isolated, and a rule that
//! cannot be applied (e.g. a security pattern that fails to compile)
//! degrades only its own field to the empty default and is logged. The
//! resulting [`CodeAnalysis`] always carries every field, empty or not.

use crate::artifact::CodeArtifact;
use crate::patterns::PatternLibrary;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Analysis record for one artifact
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CodeAnalysis {
    /// Library patterns found in the artifact, library order
    #[serde(default)]
    pub patterns: Vec<String>,

    /// Improvement suggestions derived from the other fields
    #[serde(default)]
    pub suggestions: Vec<String>,

    /// Non-negative structural complexity estimate
    #[serde(default)]
    pub complexity: f64,

    /// Quality heuristic in [0, 1]
    #[serde(default)]
    pub quality_score: f64,

    /// Security rule violations, rule order
    #[serde(default)]
    pub security_issues: Vec<String>,

    /// Performance tips, rule order
    #[serde(default)]
    pub performance_tips: Vec<String>,
}

impl CodeAnalysis {
    /// Human-readable summary
    pub fn to_report(&self) -> String {
        let mut out = String::new();

        out.push_str("ANALYSIS REPORT\n");
        out.push_str("===============\n\n");
        out.push_str(&format!("Complexity:    {:.1}\n", self.complexity));
        out.push_str(&format!("Quality score: {:.2}\n", self.quality_score));

        if !self.patterns.is_empty() {
            out.push_str("\nPatterns:\n");
            for p in &self.patterns {
                out.push_str(&format!("  {}\n", p));
            }
        }
        if !self.security_issues.is_empty() {
            out.push_str("\nSecurity issues:\n");
            for issue in &self.security_issues {
                out.push_str(&format!("  [SEC] {}\n", issue));
            }
        }
        if !self.performance_tips.is_empty() {
            out.push_str("\nPerformance tips:\n");
            for tip in &self.performance_tips {
                out.push_str(&format!("  [PERF] {}\n", tip));
            }
        }
        if !self.suggestions.is_empty() {
            out.push_str("\nSuggestions:\n");
            for s in &self.suggestions {
                out.push_str(&format!("  - {}\n", s));
            }
        }

        out
    }
}

/// Analyze an artifact with default thresholds
pub fn analyze(artifact: &CodeArtifact, library: &PatternLibrary) -> CodeAnalysis {
    Analyzer::new().analyze(artifact, library)
}

/// Artifact analyzer
#[derive(Debug, Clone)]
pub struct Analyzer {
    complexity_threshold: f64,
    quality_threshold: f64,
}

impl Analyzer {
    pub fn new() -> Self {
        Self {
            complexity_threshold: 10.0,
            quality_threshold: 0.7,
        }
    }

    pub fn from_config(config: &crate::config::EngineConfig) -> Self {
        Self {
            complexity_threshold: config.complexity_threshold,
            quality_threshold: config.quality_threshold,
        }
    }

    /// Run all five heuristics over an artifact. Never fails.
    pub fn analyze(&self, artifact: &CodeArtifact, library: &PatternLibrary) -> CodeAnalysis {
        let text = &artifact.content;

        let patterns = extract_patterns(text, library.patterns_for(&artifact.language));
        let complexity = complexity(text);
        let security_issues = security_issues(text);
        let performance_tips = performance_tips(text);
        let quality_score = quality(
            text,
            security_issues.len() + performance_tips.len(),
        );

        let mut analysis = CodeAnalysis {
            patterns,
            suggestions: Vec::new(),
            complexity,
            quality_score,
            security_issues,
            performance_tips,
        };
        analysis.suggestions = crate::suggest::SuggestionEngine::new(
            self.complexity_threshold,
            self.quality_threshold,
        )
        .suggest(&analysis);

        analysis
    }
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new()
    }
}

/// Match library pattern ids against the artifact text.
///
/// A pattern counts as present when its full id occurs, or when its
/// final segment occurs as a standalone word.
fn extract_patterns(text: &str, known: &[String]) -> Vec<String> {
    let mut found = Vec::new();
    for id in known {
        if text.contains(id.as_str()) {
            found.push(id.clone());
            continue;
        }
        let segment = id.rsplit('.').next().unwrap_or(id);
        match Regex::new(&format!(r"\b{}\b", regex::escape(segment))) {
            Ok(re) => {
                if re.is_match(text) {
                    found.push(id.clone());
                }
            }
            Err(e) => {
                tracing::warn!(pattern = %id, error = %e, "pattern match degraded, skipping");
            }
        }
    }
    found
}

/// Structural complexity: branch keywords plus boolean operators plus
/// nesting depth, all weighted additively so the score never decreases
/// as control-flow density grows.
fn complexity(text: &str) -> f64 {
    static BRANCHES: OnceLock<Option<Regex>> = OnceLock::new();
    let branches = BRANCHES.get_or_init(|| {
        compile_or_warn(
            "complexity-branches",
            r"\b(if|else|elif|for|while|match|switch|case|catch|loop)\b",
        )
    });

    let branch_count = branches
        .as_ref()
        .map(|re| re.find_iter(text).count())
        .unwrap_or(0);
    let op_count = text.matches("&&").count() + text.matches("||").count();
    let max_depth = max_brace_depth(text);

    branch_count as f64 + 0.5 * op_count as f64 + 0.3 * max_depth as f64
}

fn max_brace_depth(text: &str) -> usize {
    let mut depth: usize = 0;
    let mut max = 0;
    for c in text.chars() {
        match c {
            '{' => {
                depth += 1;
                max = max.max(depth);
            }
            '}' => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    max
}

/// Quality in [0, 1]: documentation density, naming consistency, and
/// type-annotation presence, discounted by the number of findings so it
/// never increases as issues accumulate.
fn quality(text: &str, finding_count: usize) -> f64 {
    if text.trim().is_empty() {
        return 0.0;
    }

    let lines: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
    let total = lines.len().max(1);

    let comment_lines = lines
        .iter()
        .filter(|l| {
            let t = l.trim_start();
            t.starts_with("//") || t.starts_with("/*") || t.starts_with('*') || t.starts_with('#')
        })
        .count();
    let docs_score = (comment_lines as f64 / total as f64 * 4.0).min(1.0);

    let naming_score = naming_consistency(text);

    static ANNOTATIONS: OnceLock<Option<Regex>> = OnceLock::new();
    let annotations = ANNOTATIONS.get_or_init(|| {
        compile_or_warn(
            "quality-annotations",
            r":\s*(string|number|boolean|unknown|any|void|int|float|str|bool|[A-Z][A-Za-z0-9_]*)",
        )
    });
    let annotation_count = annotations
        .as_ref()
        .map(|re| re.find_iter(text).count())
        .unwrap_or(0);
    let types_score = (annotation_count as f64 / total as f64 * 5.0).min(1.0);

    let base = 0.4 * docs_score + 0.3 * naming_score + 0.3 * types_score;
    let discounted = base / (1.0 + 0.15 * finding_count as f64);
    discounted.clamp(0.0, 1.0)
}

fn naming_consistency(text: &str) -> f64 {
    static DECLARATIONS: OnceLock<Option<Regex>> = OnceLock::new();
    let declarations = DECLARATIONS.get_or_init(|| {
        compile_or_warn(
            "quality-declarations",
            r"\b(?:let|const|var|fn|def|function|interface|class)\s+([A-Za-z_][A-Za-z0-9_]*)",
        )
    });

    let Some(re) = declarations.as_ref() else {
        return 1.0;
    };

    let names: Vec<&str> = re
        .captures_iter(text)
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str())
        .collect();
    if names.is_empty() {
        return 1.0;
    }

    let descriptive = names.iter().filter(|n| n.len() > 1).count();
    descriptive as f64 / names.len() as f64
}

struct TextRule {
    pattern: &'static str,
    message: &'static str,
}

/// Fixed security rule set, evaluated in order
const SECURITY_RULES: &[TextRule] = &[
    TextRule {
        pattern: r"\beval\s*\(",
        message: "eval-use: dynamic code execution on strings",
    },
    TextRule {
        pattern: r"\bexec\s*\(",
        message: "exec-use: dynamic command execution",
    },
    TextRule {
        pattern: r"innerHTML\s*=|dangerouslySetInnerHTML",
        message: "raw-html: unescaped markup assignment risks XSS",
    },
    TextRule {
        pattern: r"document\.write\s*\(",
        message: "document-write: injects markup into the live document",
    },
    TextRule {
        pattern: r#"(?i)\b(api_key|apikey|password|passwd|secret|token)\b\s*[:=]\s*["'][^"']{4,}["']"#,
        message: "hard-coded-secret: credential literal in source",
    },
    TextRule {
        pattern: r#"(?i)\b(select|insert|update|delete)\b[^\n]*(\+\s*[A-Za-z_]|\$\{)"#,
        message: "sql-interpolation: query built from string concatenation",
    },
];

/// Fixed performance rule set, evaluated in order
const PERFORMANCE_RULES: &[TextRule] = &[
    TextRule {
        pattern: r"=\{\s*\(\)\s*=>",
        message: "avoid re-creating closures per render",
    },
    TextRule {
        pattern: r"JSON\.parse\s*\(\s*JSON\.stringify",
        message: "deep clone via JSON round-trip is expensive",
    },
    TextRule {
        pattern: r"console\.(log|debug)\s*\(",
        message: "remove debug logging from hot paths",
    },
    TextRule {
        pattern: r"(?s)\bfor\b[^{]*\{[^{}]*\bfor\b",
        message: "nested loops detected; consider restructuring",
    },
    TextRule {
        pattern: r"\bvar\s+[A-Za-z_]",
        message: "prefer const or let over var",
    },
];

fn security_issues(text: &str) -> Vec<String> {
    static COMPILED: OnceLock<Vec<(Option<Regex>, &'static str)>> = OnceLock::new();
    apply_rules(text, COMPILED.get_or_init(|| compile_rules(SECURITY_RULES)))
}

fn performance_tips(text: &str) -> Vec<String> {
    static COMPILED: OnceLock<Vec<(Option<Regex>, &'static str)>> = OnceLock::new();
    apply_rules(text, COMPILED.get_or_init(|| compile_rules(PERFORMANCE_RULES)))
}

fn compile_rules(rules: &'static [TextRule]) -> Vec<(Option<Regex>, &'static str)> {
    rules
        .iter()
        .map(|rule| (compile_or_warn(rule.message, rule.pattern), rule.message))
        .collect()
}

fn compile_or_warn(name: &str, pattern: &str) -> Option<Regex> {
    match Regex::new(pattern) {
        Ok(re) => Some(re),
        Err(e) => {
            // A malformed rule degrades only its own heuristic.
            tracing::warn!(rule = name, error = %e, "analysis rule disabled");
            None
        }
    }
}

fn apply_rules(text: &str, compiled: &[(Option<Regex>, &'static str)]) -> Vec<String> {
    compiled
        .iter()
        .filter_map(|(re, message)| {
            re.as_ref()
                .filter(|re| re.is_match(text))
                .map(|_| (*message).to_string())
        })
        .collect()
}
