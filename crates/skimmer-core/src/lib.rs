pub mod config;
pub mod config_file;
pub mod token;
pub mod types;

pub use config::{ConfigError, OutlineConfig, OutlineConfigBuilder};
pub use token::{TokenCounter, WhitespaceCounter};
pub use types::{
    BODY_KEY, Diagnostics, DigestPayload, DigestStatus, DocumentStructure, OutlineScheme,
    POSTSCRIPT_KEY, PREAMBLE_KEY, SchemeDecision, SectionMap, TocEntry,
};
