use regex::Regex;
use thiserror::Error;

/// Error building an [`OutlineConfig`].
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid regex override: {0}")]
    InvalidPattern(#[from] regex::Error),
    #[error("invalid token budget: min_tokens ({min}) > max_tokens ({max})")]
    InvalidBudget { min: usize, max: usize },
    #[error("min_middle_sections must be 1 or 2, got {0}")]
    InvalidMiddleSections(usize),
}

/// Configuration for the structure-recovery pipeline.
///
/// All regex fields are `Option<Regex>` — `None` means "use the built-in
/// default". Use [`OutlineConfigBuilder`] to construct with string patterns.
#[derive(Debug, Clone)]
pub struct OutlineConfig {
    // ── detectors ──
    min_run: usize,
    roman_min_run: usize,
    max_numeric_value: u32,
    max_roman_value: u32,
    // Tie-break heuristics carried over from the source corpus; tunable,
    // not ground truth.
    weak_sequence_score: f64,
    late_start_index: usize,

    // ── router fallbacks ──
    /// Regex for the raw-text numeric anchor fallback.
    numeric_anchor_re: Option<Regex>,
    /// Regex for the last-resort `# N.` line-scan hint.
    line_hint_re: Option<Regex>,

    // ── digest ──
    min_tokens: usize,
    max_tokens: usize,
    min_middle_sections: usize,
    min_legit_words: usize,
}

impl Default for OutlineConfig {
    fn default() -> Self {
        Self {
            min_run: 4,
            roman_min_run: 3,
            max_numeric_value: 50,
            max_roman_value: 30,
            weak_sequence_score: 0.50,
            late_start_index: 3,
            numeric_anchor_re: None,
            line_hint_re: None,
            min_tokens: 5000,
            max_tokens: 10000,
            min_middle_sections: 2,
            min_legit_words: 50,
        }
    }
}

impl OutlineConfig {
    pub fn min_run(&self) -> usize {
        self.min_run
    }

    pub fn roman_min_run(&self) -> usize {
        self.roman_min_run
    }

    pub fn max_numeric_value(&self) -> u32 {
        self.max_numeric_value
    }

    pub fn max_roman_value(&self) -> u32 {
        self.max_roman_value
    }

    pub fn weak_sequence_score(&self) -> f64 {
        self.weak_sequence_score
    }

    pub fn late_start_index(&self) -> usize {
        self.late_start_index
    }

    pub fn numeric_anchor_re(&self) -> Option<&Regex> {
        self.numeric_anchor_re.as_ref()
    }

    pub fn line_hint_re(&self) -> Option<&Regex> {
        self.line_hint_re.as_ref()
    }

    pub fn min_tokens(&self) -> usize {
        self.min_tokens
    }

    pub fn max_tokens(&self) -> usize {
        self.max_tokens
    }

    pub fn min_middle_sections(&self) -> usize {
        self.min_middle_sections
    }

    pub fn min_legit_words(&self) -> usize {
        self.min_legit_words
    }
}

/// Builder for [`OutlineConfig`].
///
/// Accepts string patterns that are compiled to `Regex` in
/// [`build()`](Self::build). Fails fast if any pattern is invalid or a
/// scalar combination makes no sense.
#[derive(Debug, Clone, Default)]
pub struct OutlineConfigBuilder {
    min_run: Option<usize>,
    roman_min_run: Option<usize>,
    max_numeric_value: Option<u32>,
    max_roman_value: Option<u32>,
    weak_sequence_score: Option<f64>,
    late_start_index: Option<usize>,
    numeric_anchor_re: Option<String>,
    line_hint_re: Option<String>,
    min_tokens: Option<usize>,
    max_tokens: Option<usize>,
    min_middle_sections: Option<usize>,
    min_legit_words: Option<usize>,
}

impl OutlineConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Detection ──

    pub fn min_run(mut self, n: usize) -> Self {
        self.min_run = Some(n);
        self
    }

    pub fn roman_min_run(mut self, n: usize) -> Self {
        self.roman_min_run = Some(n);
        self
    }

    pub fn max_numeric_value(mut self, n: u32) -> Self {
        self.max_numeric_value = Some(n);
        self
    }

    pub fn max_roman_value(mut self, n: u32) -> Self {
        self.max_roman_value = Some(n);
        self
    }

    pub fn weak_sequence_score(mut self, score: f64) -> Self {
        self.weak_sequence_score = Some(score);
        self
    }

    pub fn late_start_index(mut self, index: usize) -> Self {
        self.late_start_index = Some(index);
        self
    }

    // ── Fallback patterns ──

    pub fn numeric_anchor_regex(mut self, pattern: &str) -> Self {
        self.numeric_anchor_re = Some(pattern.to_string());
        self
    }

    pub fn line_hint_regex(mut self, pattern: &str) -> Self {
        self.line_hint_re = Some(pattern.to_string());
        self
    }

    // ── Digest budget ──

    pub fn min_tokens(mut self, n: usize) -> Self {
        self.min_tokens = Some(n);
        self
    }

    pub fn max_tokens(mut self, n: usize) -> Self {
        self.max_tokens = Some(n);
        self
    }

    pub fn min_middle_sections(mut self, n: usize) -> Self {
        self.min_middle_sections = Some(n);
        self
    }

    pub fn min_legit_words(mut self, n: usize) -> Self {
        self.min_legit_words = Some(n);
        self
    }

    /// Compile patterns, validate scalars, and produce an [`OutlineConfig`].
    pub fn build(self) -> Result<OutlineConfig, ConfigError> {
        let compile = |opt: Option<String>| -> Result<Option<Regex>, regex::Error> {
            opt.map(|p| Regex::new(&p)).transpose()
        };

        let defaults = OutlineConfig::default();
        let min_tokens = self.min_tokens.unwrap_or(defaults.min_tokens);
        let max_tokens = self.max_tokens.unwrap_or(defaults.max_tokens);
        if min_tokens > max_tokens {
            return Err(ConfigError::InvalidBudget {
                min: min_tokens,
                max: max_tokens,
            });
        }

        let min_middle_sections = self
            .min_middle_sections
            .unwrap_or(defaults.min_middle_sections);
        if !(1..=2).contains(&min_middle_sections) {
            return Err(ConfigError::InvalidMiddleSections(min_middle_sections));
        }

        Ok(OutlineConfig {
            min_run: self.min_run.unwrap_or(defaults.min_run),
            roman_min_run: self.roman_min_run.unwrap_or(defaults.roman_min_run),
            max_numeric_value: self.max_numeric_value.unwrap_or(defaults.max_numeric_value),
            max_roman_value: self.max_roman_value.unwrap_or(defaults.max_roman_value),
            weak_sequence_score: self
                .weak_sequence_score
                .unwrap_or(defaults.weak_sequence_score),
            late_start_index: self.late_start_index.unwrap_or(defaults.late_start_index),
            numeric_anchor_re: compile(self.numeric_anchor_re)?,
            line_hint_re: compile(self.line_hint_re)?,
            min_tokens,
            max_tokens,
            min_middle_sections,
            min_legit_words: self.min_legit_words.unwrap_or(defaults.min_legit_words),
        })
    }
}
