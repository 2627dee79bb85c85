pub mod detect;
pub mod heading;
pub mod roman;
pub mod router;
pub mod split;
pub mod tree;

pub use heading::{HeadingCandidate, HeadingKind, classify_line, classify_lines};
pub use router::recover_structure;
pub use tree::{OutlineForest, OutlineNode};
// Re-export domain types from core (canonical definitions live there)
pub use skimmer_core::{
    Diagnostics, DocumentStructure, OutlineConfig, OutlineConfigBuilder, OutlineScheme,
    SchemeDecision, SectionMap, TocEntry,
};

/// A configurable structure-recovery pipeline.
///
/// Holds an [`OutlineConfig`] and exposes each pipeline step as a method.
/// The default constructor uses built-in defaults; use
/// [`OutlineParser::with_config`] to supply custom thresholds and patterns.
pub struct OutlineParser {
    config: OutlineConfig,
}

impl Default for OutlineParser {
    fn default() -> Self {
        Self::new()
    }
}

impl OutlineParser {
    /// Create a parser with default configuration.
    pub fn new() -> Self {
        Self {
            config: OutlineConfig::default(),
        }
    }

    /// Create a parser with a custom configuration.
    pub fn with_config(config: OutlineConfig) -> Self {
        Self { config }
    }

    /// Get a reference to the current config.
    pub fn config(&self) -> &OutlineConfig {
        &self.config
    }

    /// Classify every line as a heading candidate (step 1).
    pub fn classify(&self, text: &str) -> Vec<HeadingCandidate> {
        classify_lines(text)
    }

    /// Build the heading node forest (step 2).
    pub fn forest(&self, text: &str) -> OutlineForest {
        OutlineForest::build(text, &classify_lines(text))
    }

    /// Run scheme detection over the heading candidates (step 3).
    pub fn detect(&self, candidates: &[HeadingCandidate]) -> (SchemeDecision, SchemeDecision) {
        (
            detect::detect_numeric(candidates, &self.config),
            detect::detect_roman(candidates, &self.config),
        )
    }

    /// Run the full chain: classify, build, detect, route, split (steps 1–4).
    pub fn parse(&self, text: &str) -> DocumentStructure {
        router::recover_structure(text, &self.config)
    }
}

/// Recover document structure with default configuration.
pub fn parse_structure(text: &str) -> DocumentStructure {
    OutlineParser::new().parse(text)
}
