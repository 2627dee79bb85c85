//! Section splitting strategies.
//!
//! Three alternative algorithms cut a document into named top-level
//! sections: tree-based numeric splitting, offset-based roman splitting,
//! and generic markdown splitting. The router picks among them.

mod markdown;
mod numeric;
mod roman;

pub use markdown::split_markdown;
pub use numeric::{split_numeric_hint, split_numeric_text, split_numeric_tree};
pub use roman::split_roman;

use skimmer_core::types::{POSTSCRIPT_KEY, PREAMBLE_KEY};
use skimmer_core::SectionMap;

/// A heading occurrence located by byte offset in the raw text.
#[derive(Debug, Clone)]
pub(crate) struct Anchor {
    /// Byte offset of the heading line's start.
    pub start: usize,
    /// Byte offset just past the heading line (including its newline).
    pub end: usize,
    /// Outline position for run-based schemes; `None` for unnumbered anchors.
    pub value: Option<u32>,
    pub title: String,
}

/// Iterate lines with their byte offsets, newline included in `end`.
pub(crate) fn lines_with_offsets(text: &str) -> impl Iterator<Item = (usize, usize, &str)> {
    let mut offset = 0;
    text.split_inclusive('\n').map(move |chunk| {
        let start = offset;
        offset += chunk.len();
        (start, offset, chunk.trim_end_matches(['\n', '\r']))
    })
}

/// Slice the raw text between boundary anchors into a [`SectionMap`],
/// preserving the text between anchors verbatim (modulo edge trimming).
///
/// Text before the first anchor becomes `__preamble__`; text from `cut`
/// onward (when given) becomes `__postscript__` so nothing is dropped.
pub(crate) fn slice_sections(text: &str, boundaries: &[Anchor], cut: Option<usize>) -> SectionMap {
    let mut map = SectionMap::new();
    let Some(first) = boundaries.first() else {
        return map;
    };

    let preamble = text[..first.start].trim();
    if !preamble.is_empty() {
        map.insert(PREAMBLE_KEY, preamble);
    }

    let tail = cut.unwrap_or(text.len());
    for (i, anchor) in boundaries.iter().enumerate() {
        let end = boundaries
            .get(i + 1)
            .map(|next| next.start)
            .unwrap_or(tail);
        let body = text[anchor.end..end].trim();
        map.insert(anchor.title.clone(), body);
    }

    if let Some(cut) = cut {
        let postscript = text[cut..].trim();
        if !postscript.is_empty() {
            map.insert(POSTSCRIPT_KEY, postscript);
        }
    }

    map
}
