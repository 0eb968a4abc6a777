//! Suggestion engine — deterministic improvement advice
//!
//! A fixed rule list evaluated in a fixed order, so identical analyses
//! always produce the same suggestions in the same order.

use crate::analyze::CodeAnalysis;
use crate::config::EngineConfig;

/// Derives human-readable suggestions from an analysis record
#[derive(Debug, Clone)]
pub struct SuggestionEngine {
    complexity_threshold: f64,
    quality_threshold: f64,
}

impl SuggestionEngine {
    pub fn new(complexity_threshold: f64, quality_threshold: f64) -> Self {
        Self {
            complexity_threshold,
            quality_threshold,
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.complexity_threshold, config.quality_threshold)
    }

    /// Rule order: complexity, quality, security issues verbatim,
    /// performance tips verbatim.
    pub fn suggest(&self, analysis: &CodeAnalysis) -> Vec<String> {
        let mut suggestions = Vec::new();

        if analysis.complexity > self.complexity_threshold {
            suggestions.push("Consider breaking down complex functions".to_string());
        }

        if analysis.quality_score < self.quality_threshold {
            suggestions.push("Add more documentation and type hints".to_string());
        }

        suggestions.extend(analysis.security_issues.iter().cloned());
        suggestions.extend(analysis.performance_tips.iter().cloned());

        suggestions
    }
}

impl Default for SuggestionEngine {
    fn default() -> Self {
        Self::new(10.0, 0.7)
    }
}
