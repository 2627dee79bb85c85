use once_cell::sync::Lazy;
use regex::Regex;

use skimmer_core::{OutlineConfig, SectionMap};

use crate::detect::best_run;
use crate::heading::{HeadingKind, classify_line};
use crate::roman::roman_to_u32;
use crate::split::{Anchor, lines_with_offsets, slice_sections};

// Unnumbered Introduction/Conclusion are taken into the outline only as
// genuine hash-markdown headings, never inferred from prose mentions.
static INTRO_TITLE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^introduction\s*:?\s*$").unwrap());
static CONCLUSION_TITLE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^conclusions?\s*:?\s*$").unwrap());

/// Split along the roman outline by raw byte offsets, preserving the exact
/// formatting between anchors.
///
/// Builds the full anchor list, selects the best contiguous run (preferring
/// the one starting at I), and slices the text between anchors. Requires a
/// run of at least 2; returns an empty map otherwise.
pub fn split_roman(text: &str, config: &OutlineConfig) -> SectionMap {
    let mut roman_anchors: Vec<Anchor> = Vec::new();
    let mut intro_anchors: Vec<Anchor> = Vec::new();
    let mut conclusion_anchors: Vec<Anchor> = Vec::new();

    for (i, (start, end, line)) in lines_with_offsets(text).enumerate() {
        let Some(candidate) = classify_line(i, line) else {
            continue;
        };
        match candidate.kind {
            HeadingKind::Roman => {
                let value = candidate
                    .tag
                    .as_deref()
                    .and_then(roman_to_u32)
                    .filter(|&v| v <= config.max_roman_value());
                if let Some(value) = value {
                    roman_anchors.push(Anchor {
                        start,
                        end,
                        value: Some(value),
                        title: candidate.title,
                    });
                }
            }
            HeadingKind::Markdown => {
                if INTRO_TITLE_RE.is_match(&candidate.title) {
                    intro_anchors.push(Anchor {
                        start,
                        end,
                        value: None,
                        title: candidate.title,
                    });
                } else if CONCLUSION_TITLE_RE.is_match(&candidate.title) {
                    conclusion_anchors.push(Anchor {
                        start,
                        end,
                        value: None,
                        title: candidate.title,
                    });
                }
            }
            _ => {}
        }
    }

    let values: Vec<u32> = roman_anchors.iter().filter_map(|a| a.value).collect();
    let Some(best) = best_run(&values, 2) else {
        return SectionMap::new();
    };
    if best.len() < 2 {
        return SectionMap::new();
    }

    let run: Vec<Anchor> = best
        .indices
        .iter()
        .map(|&i| roman_anchors[i].clone())
        .collect();
    let cut = roman_anchors.get(best.last() + 1).map(|a| a.start);

    let mut boundaries: Vec<Anchor> = Vec::with_capacity(run.len() + 2);

    // Closest markdown Introduction before the run start.
    if let Some(intro) = intro_anchors
        .iter()
        .filter(|a| a.start < run[0].start)
        .next_back()
    {
        boundaries.push(intro.clone());
    }

    boundaries.extend(run.iter().cloned());

    // First markdown Conclusion after the run, unless a stray roman anchor
    // cuts the text off before it.
    let last_start = run.last().expect("non-empty run").start;
    if let Some(conclusion) = conclusion_anchors
        .iter()
        .find(|a| a.start > last_start && cut.is_none_or(|c| a.start < c))
    {
        boundaries.push(conclusion.clone());
    }

    slice_sections(text, &boundaries, cut)
}
