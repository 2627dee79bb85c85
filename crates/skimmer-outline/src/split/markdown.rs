use once_cell::sync::Lazy;
use regex::Regex;

use skimmer_core::SectionMap;

use crate::heading::classify_line;
use crate::split::{Anchor, lines_with_offsets, slice_sections};

static HASH_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[ \t]*(#{1,6})[ \t]+(\S.*)$").unwrap());

/// How many split headings a level must show before it is trusted.
const MIN_LEVEL_COUNT: usize = 4;

/// Generic markdown splitting for documents without a numbered outline.
///
/// Split level priority: H1 if at least 4 are present, else H2 if at least
/// 4, else H1∪H2 if their sum reaches 4, else any hash heading present.
/// Leading unsectioned text is preserved as `__preamble__`; the map is
/// empty when the document has no usable hash headings at all.
pub fn split_markdown(text: &str) -> SectionMap {
    let mut anchors: Vec<(u8, Anchor)> = Vec::new();
    for (i, (start, end, line)) in lines_with_offsets(text).enumerate() {
        let Some(caps) = HASH_RE.captures(line) else {
            continue;
        };
        // The classifier's rejection filters (captions, leader dots,
        // citation leads) apply to hash lines too.
        if classify_line(i, line).is_none() {
            continue;
        }
        let level = caps.get(1).expect("hash group").as_str().len() as u8;
        let title = caps.get(2).expect("title group").as_str().trim().to_string();
        anchors.push((
            level,
            Anchor {
                start,
                end,
                value: None,
                title,
            },
        ));
    }

    if anchors.is_empty() {
        return SectionMap::new();
    }

    let h1 = anchors.iter().filter(|(l, _)| *l == 1).count();
    let h2 = anchors.iter().filter(|(l, _)| *l == 2).count();

    let selected: Vec<Anchor> = if h1 >= MIN_LEVEL_COUNT {
        take_levels(&anchors, |l| l == 1)
    } else if h2 >= MIN_LEVEL_COUNT {
        take_levels(&anchors, |l| l == 2)
    } else if h1 + h2 >= MIN_LEVEL_COUNT {
        take_levels(&anchors, |l| l <= 2)
    } else {
        take_levels(&anchors, |_| true)
    };

    slice_sections(text, &selected, None)
}

fn take_levels(anchors: &[(u8, Anchor)], keep: impl Fn(u8) -> bool) -> Vec<Anchor> {
    anchors
        .iter()
        .filter(|(l, _)| keep(*l))
        .map(|(_, a)| a.clone())
        .collect()
}
