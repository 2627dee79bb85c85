use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::config::{ConfigError, OutlineConfig, OutlineConfigBuilder};

/// On-disk TOML configuration structure.
/// All fields are optional so partial configs work (merge with defaults).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    pub detection: Option<DetectionConfig>,
    pub digest: Option<DigestConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DetectionConfig {
    pub min_run: Option<usize>,
    pub roman_min_run: Option<usize>,
    pub max_numeric_value: Option<u32>,
    pub max_roman_value: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DigestConfig {
    pub min_tokens: Option<usize>,
    pub max_tokens: Option<usize>,
    pub min_middle_sections: Option<usize>,
    pub min_legit_words: Option<usize>,
}

/// Platform config directory path: `<config_dir>/skimmer/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("skimmer").join("config.toml"))
}

/// Load config by cascading CWD `.skimmer.toml` over platform config.
/// CWD values override platform values.
pub fn load_config() -> ConfigFile {
    let platform = config_path().and_then(|p| load_from_path(&p));
    let cwd = load_from_path(&PathBuf::from(".skimmer.toml"));

    match (platform, cwd) {
        (None, None) => ConfigFile::default(),
        (Some(p), None) => p,
        (None, Some(c)) => c,
        (Some(p), Some(c)) => merge(p, c),
    }
}

/// Load a config from a specific path. Returns `None` if the file doesn't
/// exist or can't be parsed.
pub fn load_from_path(path: &PathBuf) -> Option<ConfigFile> {
    let content = std::fs::read_to_string(path).ok()?;
    match toml::from_str(&content) {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring unparseable config file");
            None
        }
    }
}

/// Merge two configs: `overlay` values take precedence over `base`.
pub fn merge(base: ConfigFile, overlay: ConfigFile) -> ConfigFile {
    let d_base = base.detection.unwrap_or_default();
    let d_over = overlay.detection.unwrap_or_default();
    let g_base = base.digest.unwrap_or_default();
    let g_over = overlay.digest.unwrap_or_default();

    ConfigFile {
        detection: Some(DetectionConfig {
            min_run: d_over.min_run.or(d_base.min_run),
            roman_min_run: d_over.roman_min_run.or(d_base.roman_min_run),
            max_numeric_value: d_over.max_numeric_value.or(d_base.max_numeric_value),
            max_roman_value: d_over.max_roman_value.or(d_base.max_roman_value),
        }),
        digest: Some(DigestConfig {
            min_tokens: g_over.min_tokens.or(g_base.min_tokens),
            max_tokens: g_over.max_tokens.or(g_base.max_tokens),
            min_middle_sections: g_over.min_middle_sections.or(g_base.min_middle_sections),
            min_legit_words: g_over.min_legit_words.or(g_base.min_legit_words),
        }),
    }
}

impl ConfigFile {
    /// Apply the file's values on top of a builder, leaving unset fields to
    /// the builder's defaults.
    pub fn apply(&self, mut builder: OutlineConfigBuilder) -> OutlineConfigBuilder {
        if let Some(d) = &self.detection {
            if let Some(n) = d.min_run {
                builder = builder.min_run(n);
            }
            if let Some(n) = d.roman_min_run {
                builder = builder.roman_min_run(n);
            }
            if let Some(n) = d.max_numeric_value {
                builder = builder.max_numeric_value(n);
            }
            if let Some(n) = d.max_roman_value {
                builder = builder.max_roman_value(n);
            }
        }
        if let Some(g) = &self.digest {
            if let Some(n) = g.min_tokens {
                builder = builder.min_tokens(n);
            }
            if let Some(n) = g.max_tokens {
                builder = builder.max_tokens(n);
            }
            if let Some(n) = g.min_middle_sections {
                builder = builder.min_middle_sections(n);
            }
            if let Some(n) = g.min_legit_words {
                builder = builder.min_legit_words(n);
            }
        }
        builder
    }

    /// Resolve this file straight to an [`OutlineConfig`].
    pub fn to_config(&self) -> Result<OutlineConfig, ConfigError> {
        self.apply(OutlineConfigBuilder::new()).build()
    }
}
