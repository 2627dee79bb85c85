use skimmer_core::types::BODY_KEY;
use skimmer_core::{
    Diagnostics, DocumentStructure, OutlineConfig, OutlineScheme, SchemeDecision, SectionMap,
};

use crate::detect::{detect_numeric, detect_roman, prefer_roman};
use crate::heading::classify_lines;
use crate::split::{
    split_markdown, split_numeric_hint, split_numeric_text, split_numeric_tree, split_roman,
};
use crate::tree::OutlineForest;

/// Router states. Every path terminates in `Done` with a non-empty map.
enum State {
    Start,
    TryNumeric,
    TryRoman,
    TryNumericFallback,
    TryLineScanHint,
    Markdown,
    Done(SectionMap, OutlineScheme),
}

/// Sections that count toward the "at least 2 usable sections" guarantee:
/// everything except the reserved preamble/postscript carriers.
fn usable_sections(map: &SectionMap) -> usize {
    map.keys().filter(|k| !k.starts_with("__")).count()
}

/// Recover the document structure: detect the outline scheme, split into
/// sections with a fallback chain, and derive the table of contents.
///
/// Never fails on data quality: empty input yields an empty map, a document
/// without detectable headings yields a single `Body` section.
pub fn recover_structure(text: &str, config: &OutlineConfig) -> DocumentStructure {
    if text.trim().is_empty() {
        let sections = SectionMap::new();
        return DocumentStructure {
            toc: sections.toc(),
            sections,
            diagnostics: Diagnostics {
                scheme: OutlineScheme::Markdown,
                numeric_check: SchemeDecision::rejected(),
                roman_check: SchemeDecision::rejected(),
                section_count: 0,
            },
        };
    }

    let candidates = classify_lines(text);
    let forest = OutlineForest::build(text, &candidates);
    let numeric_check = detect_numeric(&candidates, config);
    let roman_check = detect_roman(&candidates, config);
    let roman_preferred = prefer_roman(&numeric_check, &roman_check, config);

    // A roman verdict that stood but whose split collapsed is reported as
    // RomanWeakSplit when markdown ends up doing the cutting.
    let mut roman_verdict_stood = false;

    let mut state = State::Start;
    let (mut sections, scheme) = loop {
        state = match state {
            State::Start => {
                if numeric_check.accepted && !roman_preferred {
                    State::TryNumeric
                } else if roman_check.accepted {
                    State::TryRoman
                } else {
                    State::TryNumericFallback
                }
            }
            State::TryNumeric => {
                let map = split_numeric_tree(&forest, config);
                if usable_sections(&map) >= 2 {
                    State::Done(map, OutlineScheme::Numeric)
                } else if roman_check.accepted {
                    tracing::debug!("numeric split too sparse, deferring to roman verdict");
                    State::TryRoman
                } else {
                    tracing::debug!("numeric split too sparse, falling back to markdown");
                    State::Markdown
                }
            }
            State::TryRoman => {
                let map = split_roman(text, config);
                if usable_sections(&map) >= 2 {
                    State::Done(map, OutlineScheme::Roman)
                } else {
                    tracing::debug!("roman split too sparse, falling back to markdown");
                    roman_verdict_stood = true;
                    State::Markdown
                }
            }
            State::TryNumericFallback => {
                let map = split_numeric_text(text, config);
                if usable_sections(&map) >= 2 {
                    State::Done(map, OutlineScheme::NumericFallback)
                } else {
                    State::TryLineScanHint
                }
            }
            State::TryLineScanHint => {
                let map = split_numeric_hint(text, config);
                if usable_sections(&map) >= 2 {
                    State::Done(map, OutlineScheme::NumericHint)
                } else {
                    State::Markdown
                }
            }
            State::Markdown => {
                let map = split_markdown(text);
                let scheme = if roman_verdict_stood {
                    OutlineScheme::RomanWeakSplit
                } else {
                    OutlineScheme::Markdown
                };
                State::Done(map, scheme)
            }
            State::Done(map, scheme) => break (map, scheme),
        };
    };

    // Worst case: one Body section containing everything.
    if sections.is_empty() {
        sections.insert(BODY_KEY, text.trim());
    }

    let toc = sections.toc();
    let diagnostics = Diagnostics {
        scheme,
        numeric_check,
        roman_check,
        section_count: sections.len(),
    };
    tracing::debug!(
        scheme = ?diagnostics.scheme,
        sections = diagnostics.section_count,
        "structure recovery complete"
    );

    DocumentStructure {
        toc,
        sections,
        diagnostics,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> OutlineConfig {
        OutlineConfig::default()
    }

    fn parse(text: &str) -> DocumentStructure {
        recover_structure(text, &config())
    }

    #[test]
    fn test_empty_input_yields_empty_map() {
        let result = parse("");
        assert!(result.sections.is_empty());
        assert!(result.toc.is_empty());
        assert_eq!(result.diagnostics.section_count, 0);

        let result = parse("   \n\n  ");
        assert!(result.sections.is_empty());
    }

    #[test]
    fn test_no_headings_yields_body_section() {
        let result = parse("Just a paragraph of prose.\nAnd another line.\n");
        assert_eq!(result.sections.len(), 1);
        assert!(result.sections.get(BODY_KEY).unwrap().contains("prose"));
        assert_eq!(result.toc.len(), 1);
    }

    #[test]
    fn test_numeric_document_routed_to_numeric() {
        let text = "# 1. Intro\na\n# 2. Methods\nb\n# 3. Results\nc\n# 4. Conclusion\nd\n";
        let result = parse(text);
        assert_eq!(result.diagnostics.scheme, OutlineScheme::Numeric);
        assert!(result.diagnostics.numeric_check.accepted);
        assert_eq!(result.sections.len(), 4);
    }

    #[test]
    fn test_roman_document_routed_to_roman() {
        let text = "# I. Introduction\nintro\n# II. Background\nback\n# III. Conclusion\nend\n";
        let result = parse(text);
        assert_eq!(result.diagnostics.scheme, OutlineScheme::Roman);
        assert!(result.diagnostics.roman_check.accepted);
        assert!(!result.diagnostics.numeric_check.accepted);
        assert_eq!(result.toc.len(), 3);
    }

    #[test]
    fn test_markdown_document_routed_to_markdown() {
        let text = "# Alpha\na\n# Beta\nb\n# Gamma\nc\n# Delta\nd\n";
        let result = parse(text);
        assert_eq!(result.diagnostics.scheme, OutlineScheme::Markdown);
        assert_eq!(result.sections.len(), 4);
    }

    #[test]
    fn test_numeric_fallback_on_short_run() {
        // Three anchors are below min_run for detection, but the raw-text
        // retry still splits them.
        let text = "1. Alpha\nalpha body\n2. Beta\nbeta body\n3. Gamma\ngamma body\n";
        let result = parse(text);
        assert_eq!(result.diagnostics.scheme, OutlineScheme::NumericFallback);
        assert_eq!(result.sections.len(), 3);
    }

    #[test]
    fn test_toc_matches_section_keys() {
        let text = "# 1. Intro\na\n# 2. Methods\nb\n# 3. Results\nc\n# 4. End\nd\n";
        let result = parse(text);
        let toc_titles: Vec<_> = result.toc.iter().map(|e| e.title.as_str()).collect();
        let keys: Vec<_> = result.sections.keys().collect();
        assert_eq!(toc_titles, keys);
    }
}
