use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::roman::roman_to_u32;

/// Numbering convention a heading candidate was recognized under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HeadingKind {
    Numeric,
    Roman,
    Letter,
    Markdown,
    Bold,
}

/// A line tentatively recognized as a section heading.
///
/// Transient: candidates live only long enough to build the node forest and
/// feed the scheme detectors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadingCandidate {
    pub line_index: usize,
    /// 1–6. Decimal headings take their component count (`2.3` → 2),
    /// roman headings are 1, lettered run-ins 2, markdown its hash count,
    /// bold run-ins 3.
    pub level: u8,
    pub kind: HeadingKind,
    /// The extracted numeral/letter token (`"2.3"`, `"IV"`, `"A"`), when the
    /// convention carries one.
    pub tag: Option<String>,
    pub title: String,
}

// Recognizers, in priority order. Decimal wins over markdown so that
// `# 1. Introduction` is classified as a numbered heading, not a plain H1.
static NUMERIC_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(?:#{1,6}\s+)?(\d{1,2}(?:\.\d{1,2})*)[.)\s\-]\s*(.+)$").unwrap()
});
static ROMAN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(?:#{1,6}\s+)?([IVXLCDM]+)(?:[.)\-]|\s)\s*(.+)$").unwrap());
static LETTER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(?:#{1,6}\s+)?([A-Z])[.)]\s+(.+)$").unwrap());
static MARKDOWN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*(#{1,6})\s+(.+)$").unwrap());
static BOLD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*\*\*([^*]+)\*\*\s*$").unwrap());

// Rejection filters. Citation-lead titles are cross-reference prose, not
// headings; figure/table captions and leader-dot lines are layout artifacts
// from PDF extraction.
static CITATION_LEAD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(?:see|ibid|cf|supra)\b\.?").unwrap());
static CAPTION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(?:figure|fig\.?|table|tab\.)\s*\d").unwrap());
static LEADER_DOT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\.{3,}\s*\d+\s*$").unwrap());
static WORD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\w").unwrap());

/// Classify one line as a heading candidate, or `None`.
///
/// Stateless and pure; patterns are checked in priority order
/// (decimal, roman, lettered, markdown, bold).
pub fn classify_line(line_index: usize, line: &str) -> Option<HeadingCandidate> {
    if LEADER_DOT_RE.is_match(line) {
        return None;
    }

    if let Some(caps) = NUMERIC_RE.captures(line) {
        let tag = caps.get(1).expect("numeric tag group").as_str();
        let title = caps.get(2).expect("numeric title group").as_str().trim();
        if acceptable_title(title) {
            let level = tag.split('.').count().min(6) as u8;
            return Some(HeadingCandidate {
                line_index,
                level,
                kind: HeadingKind::Numeric,
                tag: Some(tag.to_string()),
                title: title.to_string(),
            });
        }
    }

    if let Some(caps) = ROMAN_RE.captures(line) {
        let tag = caps.get(1).expect("roman tag group").as_str();
        let title = caps.get(2).expect("roman title group").as_str().trim();
        if roman_to_u32(tag).is_some() && acceptable_title(title) {
            return Some(HeadingCandidate {
                line_index,
                level: 1,
                kind: HeadingKind::Roman,
                tag: Some(tag.to_string()),
                title: title.to_string(),
            });
        }
    }

    if let Some(caps) = LETTER_RE.captures(line) {
        let tag = caps.get(1).expect("letter tag group").as_str();
        let title = caps.get(2).expect("letter title group").as_str().trim();
        if acceptable_title(title) {
            return Some(HeadingCandidate {
                line_index,
                level: 2,
                kind: HeadingKind::Letter,
                tag: Some(tag.to_string()),
                title: title.to_string(),
            });
        }
    }

    if let Some(caps) = MARKDOWN_RE.captures(line) {
        let hashes = caps.get(1).expect("hash group").as_str();
        let title = caps.get(2).expect("markdown title group").as_str().trim();
        if acceptable_title(title) {
            return Some(HeadingCandidate {
                line_index,
                level: hashes.len() as u8,
                kind: HeadingKind::Markdown,
                tag: None,
                title: title.to_string(),
            });
        }
    }

    if let Some(caps) = BOLD_RE.captures(line) {
        let title = caps.get(1).expect("bold title group").as_str().trim();
        if acceptable_title(title) {
            return Some(HeadingCandidate {
                line_index,
                level: 3,
                kind: HeadingKind::Bold,
                tag: None,
                title: title.to_string(),
            });
        }
    }

    None
}

/// Classify every line of a document.
pub fn classify_lines(text: &str) -> Vec<HeadingCandidate> {
    text.lines()
        .enumerate()
        .filter_map(|(i, line)| classify_line(i, line))
        .collect()
}

pub(crate) fn acceptable_title(title: &str) -> bool {
    WORD_RE.is_match(title)
        && !CITATION_LEAD_RE.is_match(title)
        && !CAPTION_RE.is_match(title)
        && !LEADER_DOT_RE.is_match(title)
}
