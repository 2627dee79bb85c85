pub mod alias;
pub mod digest;

pub use alias::{SectionCategory, alias_sections, canonicalize_title, normalize_title};
pub use digest::{DigestBuilder, build_digest};
// Re-export domain types from core (canonical definitions live there)
pub use skimmer_core::{
    DigestPayload, DigestStatus, OutlineConfig, OutlineConfigBuilder, SectionMap, TokenCounter,
    WhitespaceCounter,
};
