use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// Key under which leading unsectioned text is preserved.
pub const PREAMBLE_KEY: &str = "__preamble__";
/// Key under which trailing unsectioned text is preserved.
pub const POSTSCRIPT_KEY: &str = "__postscript__";
/// Key used when no headings are detected and the whole text becomes one section.
pub const BODY_KEY: &str = "Body";

/// One entry of the table of contents.
///
/// The depth is currently always 1; the field exists so deeper outlines can be
/// surfaced later without a format change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TocEntry {
    pub depth: u8,
    pub title: String,
}

/// Ordered mapping of section key to section body.
///
/// Keys are unique and insertion order is document order. A colliding insert
/// never overwrites: the new entry is stored under a composite `"A + B"` key
/// instead (see [`SectionMap::insert_with_alt`]).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SectionMap {
    entries: Vec<(String, String)>,
}

impl SectionMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Insert a section, using the key itself as the composite suffix on
    /// collision: a second `"Background"` lands as `"Background + Background"`.
    pub fn insert(&mut self, key: impl Into<String>, body: impl Into<String>) {
        let key = key.into();
        let alt = key.clone();
        self.insert_with_alt(key, &alt, body.into());
    }

    /// Insert a section, resolving a key collision by appending `" + {alt}"`
    /// until the key is unique. Returns the key actually used.
    ///
    /// The caller chooses the suffix: splitters pass the raw title, the
    /// aliasing pass passes the pre-canonicalization title so that e.g.
    /// `Methods` and `Methodology` collide into `"methodology + Methods"`.
    pub fn insert_with_alt(&mut self, key: String, alt: &str, body: String) -> &str {
        let mut candidate = key;
        while self.contains_key(&candidate) {
            candidate = format!("{candidate} + {alt}");
        }
        self.entries.push((candidate, body));
        &self.entries.last().expect("just pushed").0
    }

    /// Append more text to the most recently inserted section.
    pub fn append_to_last(&mut self, text: &str) {
        if let Some((_, body)) = self.entries.last_mut() {
            if !body.is_empty() && !text.is_empty() {
                body.push_str("\n\n");
            }
            body.push_str(text);
        }
    }

    /// Derive the table of contents. Always agrees with [`SectionMap::keys`].
    pub fn toc(&self) -> Vec<TocEntry> {
        self.keys()
            .map(|k| TocEntry {
                depth: 1,
                title: k.to_string(),
            })
            .collect()
    }
}

impl Serialize for SectionMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

impl FromIterator<(String, String)> for SectionMap {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        let mut map = SectionMap::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

/// Outline scheme selected by the router, for diagnostics only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutlineScheme {
    Numeric,
    Roman,
    Markdown,
    NumericFallback,
    NumericHint,
    RomanWeakSplit,
}

/// Verdict of one scheme detector over the document's heading candidates.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SchemeDecision {
    pub accepted: bool,
    /// Candidate index where the best run starts.
    pub first_index: Option<usize>,
    /// Length of the best strictly-increasing-by-1 run.
    pub run_length: usize,
    /// `run_length / total_candidates`, 0.0 when there are no candidates.
    pub sequence_score: f64,
    /// A few example headings from the best run, for debugging.
    pub examples: Vec<String>,
}

impl SchemeDecision {
    pub fn rejected() -> Self {
        Self::default()
    }
}

/// Observability record for one parse call.
#[derive(Debug, Clone, Serialize)]
pub struct Diagnostics {
    pub scheme: OutlineScheme,
    pub numeric_check: SchemeDecision,
    pub roman_check: SchemeDecision,
    pub section_count: usize,
}

/// Everything the structure-recovery pass produces for one document.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentStructure {
    pub toc: Vec<TocEntry>,
    pub sections: SectionMap,
    pub diagnostics: Diagnostics,
}

/// Which digest anchors were found, and whether the body had to be cut.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DigestStatus {
    Success,
    PartialBody,
    MissingConclusion,
    MissingIntroduction,
    NoCoreSections,
}

/// The assembled token-bounded digest. Immutable once returned.
#[derive(Debug, Clone, Serialize)]
pub struct DigestPayload {
    pub payload: String,
    pub token_count: usize,
    pub status: DigestStatus,
    /// Last body section removed by the over-budget drop loop, if any.
    pub dropped_section: Option<String>,
    /// Section added by the under-budget pad step, if any.
    pub added_section: Option<String>,
}
