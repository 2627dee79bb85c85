use once_cell::sync::Lazy;
use regex::Regex;

use skimmer_core::types::PREAMBLE_KEY;
use skimmer_core::{OutlineConfig, SectionMap};

use crate::detect::{DecimalScheme, NumberingScheme, best_run};
use crate::heading::acceptable_title;
use crate::split::{Anchor, slice_sections};
use crate::tree::OutlineForest;

/// Split along the decimal outline using the node forest.
///
/// A new top-level section is accepted only when its number equals the
/// expected next index (current `k` or `k+1`); anything else is a stray
/// number misread as a heading and folds into the open section. Subsections
/// `k.x` are already children in the forest and fold into parent `k` with
/// their headings preserved.
pub fn split_numeric_tree(forest: &OutlineForest, config: &OutlineConfig) -> SectionMap {
    let scheme = DecimalScheme;
    let mut map = SectionMap::new();

    let preamble = forest.preamble().trim();
    if !preamble.is_empty() {
        map.insert(PREAMBLE_KEY, preamble);
    }

    let values: Vec<Option<u32>> = forest
        .roots()
        .iter()
        .map(|&root| {
            let candidate = &forest.node(root).candidate;
            if scheme.matches(candidate, config) {
                scheme.tag_value(candidate.tag.as_deref().unwrap_or_default(), config)
            } else {
                None
            }
        })
        .collect();

    // Start the run at 1 when a 1 exists anywhere; otherwise at the first
    // numbered root (decimal outlines may begin mid-document).
    let start_value = values
        .iter()
        .flatten()
        .find(|&&v| v == 1)
        .or_else(|| values.iter().flatten().next())
        .copied();

    let mut expected: Option<u32> = None;
    for (pos, &root) in forest.roots().iter().enumerate() {
        let node = forest.node(root);
        match values[pos] {
            // Unnumbered roots (Abstract, References, ...) are their own sections.
            None => {
                map.insert(node.candidate.title.clone(), forest.render_subtree(root));
            }
            Some(value) => {
                let accept = match expected {
                    None => Some(value) == start_value,
                    Some(k) => value == k || value == k + 1,
                };
                if accept {
                    expected = Some(value);
                    map.insert(node.candidate.title.clone(), forest.render_subtree(root));
                } else {
                    let rendered = forest.render_with_heading(root);
                    if map.is_empty() {
                        map.insert(PREAMBLE_KEY, rendered);
                    } else {
                        map.append_to_last(&rendered);
                    }
                }
            }
        }
    }

    map
}

static NUMERIC_ANCHOR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^[ \t]*(?:#{1,6}[ \t]+)?(\d{1,2})[.)][ \t]+(\S.*)$").unwrap()
});

/// Retry numeric splitting directly on raw text offsets.
///
/// Used when detection over heading tuples failed: some extractions mangle
/// heading lines enough that the classifier misses them, but the numbered
/// anchors are still there. Requires a +1 run of at least 2 anchors;
/// returns an empty map otherwise.
pub fn split_numeric_text(text: &str, config: &OutlineConfig) -> SectionMap {
    let re = config.numeric_anchor_re().unwrap_or(&NUMERIC_ANCHOR_RE);
    let anchors = collect_anchors(text, re, config.max_numeric_value());

    let values: Vec<u32> = anchors.iter().filter_map(|a| a.value).collect();
    let Some(best) = best_run(&values, 2) else {
        return SectionMap::new();
    };
    if best.len() < 2 {
        return SectionMap::new();
    }

    // Strays between run members stay inside the preceding slice; a stray
    // after the run cuts the tail off into the postscript.
    let boundaries: Vec<Anchor> = best.indices.iter().map(|&i| anchors[i].clone()).collect();
    let cut = anchors.get(best.last() + 1).map(|a| a.start);
    slice_sections(text, &boundaries, cut)
}

static LINE_HINT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^[ \t]*#[ \t]*(\d{1,2})[.)]?[ \t]+(\S.*)$").unwrap());

/// Last-hint splitting: any `# N.` lines, no run requirement.
///
/// Requires at least 2 hint anchors; returns an empty map otherwise.
pub fn split_numeric_hint(text: &str, config: &OutlineConfig) -> SectionMap {
    let re = config.line_hint_re().unwrap_or(&LINE_HINT_RE);
    let anchors = collect_anchors(text, re, config.max_numeric_value());
    if anchors.len() < 2 {
        return SectionMap::new();
    }
    slice_sections(text, &anchors, None)
}

/// Collect numbered anchors from a multiline regex with groups
/// (1) number, (2) title.
fn collect_anchors(text: &str, re: &Regex, ceiling: u32) -> Vec<Anchor> {
    let mut anchors = Vec::new();
    for caps in re.captures_iter(text) {
        let whole = caps.get(0).expect("match");
        let Some(value) = caps.get(1).and_then(|m| m.as_str().parse::<u32>().ok()) else {
            continue;
        };
        if value == 0 || value > ceiling {
            continue;
        }
        let title = caps
            .get(2)
            .map(|m| m.as_str().trim())
            .unwrap_or_default();
        if !acceptable_title(title) {
            continue;
        }
        let mut end = whole.end();
        if text[end..].starts_with('\n') {
            end += 1;
        }
        anchors.push(Anchor {
            start: whole.start(),
            end,
            value: Some(value),
            title: title.to_string(),
        });
    }
    anchors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heading::classify_lines;
    use skimmer_core::types::POSTSCRIPT_KEY;

    fn config() -> OutlineConfig {
        OutlineConfig::default()
    }

    fn forest(text: &str) -> OutlineForest {
        OutlineForest::build(text, &classify_lines(text))
    }

    #[test]
    fn test_tree_split_sequential() {
        let text = "paper title\n# 1. Intro\nintro body\n# 2. Methods\nmethods body\n# 3. Results\nresults body\n";
        let map = split_numeric_tree(&forest(text), &config());
        let keys: Vec<_> = map.keys().collect();
        assert_eq!(
            keys,
            vec![PREAMBLE_KEY, "Intro", "Methods", "Results"]
        );
        assert_eq!(map.get("Methods"), Some("methods body"));
    }

    #[test]
    fn test_tree_split_folds_stray_number() {
        // "7" does not follow 2, so it folds into the open section
        let text = "# 1. Intro\nintro body\n# 7. Stray\nstray body\n# 2. Methods\nmethods body\n";
        let map = split_numeric_tree(&forest(text), &config());
        let keys: Vec<_> = map.keys().collect();
        assert_eq!(keys, vec!["Intro", "Methods"]);
        let intro = map.get("Intro").unwrap();
        assert!(intro.contains("intro body"));
        assert!(intro.contains("7. Stray"));
        assert!(intro.contains("stray body"));
    }

    #[test]
    fn test_tree_split_subsections_fold_into_parent() {
        let text = "# 1. Intro\nbody\n# 2. Methods\noverview\n## 2.1 Sampling\nsampling\n## 2.2 Analysis\nanalysis\n# 3. Results\nresults\n";
        let map = split_numeric_tree(&forest(text), &config());
        assert_eq!(map.len(), 3);
        let methods = map.get("Methods").unwrap();
        assert!(methods.contains("sampling"));
        assert!(methods.contains("## 2.2 Analysis"));
    }

    #[test]
    fn test_tree_split_keeps_unnumbered_roots() {
        let text = "# Abstract\nabstract body\n# 1. Intro\nintro\n# 2. Methods\nmethods\n# References\nrefs\n";
        let map = split_numeric_tree(&forest(text), &config());
        let keys: Vec<_> = map.keys().collect();
        assert_eq!(keys, vec!["Abstract", "Intro", "Methods", "References"]);
    }

    #[test]
    fn test_tree_split_prefers_start_at_one() {
        // A stray early "3" must not hijack the run start
        let text = "3 of 12 participants dropped out\nmore front matter\n# 1. Intro\nintro\n# 2. Methods\nmethods\n";
        let map = split_numeric_tree(&forest(text), &config());
        let keys: Vec<_> = map.keys().collect();
        assert_eq!(keys[keys.len() - 2..], ["Intro", "Methods"]);
    }

    #[test]
    fn test_tree_split_duplicate_number_composites() {
        let text = "# 1. Intro\nintro\n# 2. Methods\nfirst half\n# 2. Methods\nsecond half\n# 3. Results\nresults\n";
        let map = split_numeric_tree(&forest(text), &config());
        assert_eq!(map.len(), 4);
        assert!(map.contains_key("Methods + Methods"));
    }

    #[test]
    fn test_text_split_basic_run() {
        let text = "front\n1. Alpha\nalpha body\n2. Beta\nbeta body\n3. Gamma\ngamma body\n";
        let map = split_numeric_text(text, &config());
        assert_eq!(map.get("Alpha"), Some("alpha body"));
        assert_eq!(map.get("Beta"), Some("beta body"));
        assert_eq!(map.get("Gamma"), Some("gamma body"));
        assert_eq!(map.get(PREAMBLE_KEY), Some("front"));
    }

    #[test]
    fn test_text_split_postscript_after_broken_run() {
        let text = "1. Alpha\nalpha\n2. Beta\nbeta\n9. Stray\ntail text\n";
        let map = split_numeric_text(text, &config());
        assert_eq!(map.get("Beta"), Some("beta"));
        let postscript = map.get(POSTSCRIPT_KEY).unwrap();
        assert!(postscript.contains("9. Stray"));
        assert!(postscript.contains("tail text"));
    }

    #[test]
    fn test_text_split_no_run_returns_empty() {
        let map = split_numeric_text("just prose\nwith no numbered anchors\n", &config());
        assert!(map.is_empty());
    }

    #[test]
    fn test_hint_split() {
        let text = "# 1. Alpha\nalpha\n# 5. Misnumbered\nbeta\n";
        let map = split_numeric_hint(text, &config());
        assert_eq!(map.len(), 2);
        assert_eq!(map.get("Alpha"), Some("alpha"));
        assert_eq!(map.get("Misnumbered"), Some("beta"));
    }

    #[test]
    fn test_hint_split_single_anchor_fails() {
        let map = split_numeric_hint("# 1. Only\nbody\n", &config());
        assert!(map.is_empty());
    }
}
