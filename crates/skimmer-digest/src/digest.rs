use skimmer_core::types::PREAMBLE_KEY;
use skimmer_core::{DigestPayload, DigestStatus, OutlineConfig, SectionMap, TokenCounter};

use crate::alias::{SectionCategory, alias_sections, key_category};

/// Body categories eligible for the key-sections block.
const BODY_CATEGORIES: [SectionCategory; 8] = [
    SectionCategory::Methodology,
    SectionCategory::Methods,
    SectionCategory::Literature,
    SectionCategory::Results,
    SectionCategory::Discussion,
    SectionCategory::Limitations,
    SectionCategory::Implications,
    SectionCategory::Recommendations,
];

/// Categories that never belong in a digest body.
const EXCLUDED_CATEGORIES: [SectionCategory; 4] = [
    SectionCategory::References,
    SectionCategory::Acknowledgments,
    SectionCategory::Appendix,
    SectionCategory::Notes,
];

/// Assembles the token-bounded digest from a section map.
///
/// Block order is fixed: header text, header-group sections
/// (abstract/keywords), Introduction, key body sections, Conclusion.
/// The token budget is enforced by iteratively dropping the smallest
/// droppable body section and padding when under the floor.
pub struct DigestBuilder<'a> {
    config: &'a OutlineConfig,
    counter: &'a dyn TokenCounter,
}

#[derive(Debug, Clone)]
struct Section {
    key: String,
    body: String,
}

impl<'a> DigestBuilder<'a> {
    pub fn new(config: &'a OutlineConfig, counter: &'a dyn TokenCounter) -> Self {
        Self { config, counter }
    }

    /// Build the digest. Section keys are canonicalized first, so the input
    /// map may come straight from structure recovery.
    pub fn build(&self, sections: &SectionMap) -> DigestPayload {
        let aliased = alias_sections(sections);

        let header = aliased.get(PREAMBLE_KEY).map(|s| s.to_string());

        let mut used: Vec<String> = Vec::new();
        let mut head_group: Vec<Section> = Vec::new();
        for category in [SectionCategory::Abstract, SectionCategory::Keywords] {
            if let Some(section) = find_category(&aliased, category, &used) {
                used.push(section.key.clone());
                head_group.push(section);
            }
        }

        // Introduction and Conclusion anchors; fall back to the first/last
        // legit body section when the genuine anchor is missing.
        let intro_genuine = find_category(&aliased, SectionCategory::Introduction, &used);
        let intro_found = intro_genuine.is_some();
        let introduction = intro_genuine.or_else(|| {
            // The fallback must not swallow a genuine Conclusion anchor.
            self.legit_candidates(&aliased, &used)
                .into_iter()
                .find(|s| key_category(&s.key) != Some(SectionCategory::Conclusion))
        });
        if let Some(s) = &introduction {
            used.push(s.key.clone());
        }

        let conclusion_genuine = find_category(&aliased, SectionCategory::Conclusion, &used);
        let conclusion_found = conclusion_genuine.is_some();
        let conclusion = conclusion_genuine.or_else(|| {
            self.legit_candidates(&aliased, &used).into_iter().next_back()
        });
        if let Some(s) = &conclusion {
            used.push(s.key.clone());
        }

        // Key-sections block: predefined body categories, padded from the
        // remaining legit sections when short.
        let mut middles: Vec<Section> = Vec::new();
        for category in BODY_CATEGORIES {
            if let Some(section) = find_category(&aliased, category, &used) {
                used.push(section.key.clone());
                middles.push(section);
            }
        }
        if middles.len() < self.config.min_middle_sections() {
            for section in self.legit_candidates(&aliased, &used) {
                if middles.len() >= self.config.min_middle_sections() {
                    break;
                }
                used.push(section.key.clone());
                middles.push(section);
            }
        }
        // Restore document order after padding.
        sort_by_document_order(&mut middles, &aliased);

        // Budget loop: drop the single smallest droppable body section until
        // the payload fits, never going below the minimum body count.
        let mut dropped_section: Option<String> = None;
        let mut payload = self.assemble(&header, &head_group, &introduction, &middles, &conclusion);
        let mut tokens = self.counter.count(&payload);
        let mut dropped_any = false;

        while tokens > self.config.max_tokens()
            && middles.len() > self.config.min_middle_sections()
        {
            let smallest = middles
                .iter()
                .enumerate()
                .min_by_key(|(_, s)| self.counter.count(&s.body))
                .map(|(i, _)| i)
                .expect("loop guard ensures non-empty");
            let removed = middles.remove(smallest);
            tracing::debug!(section = %removed.key, "dropping section to meet token budget");
            dropped_section = Some(removed.key);
            dropped_any = true;
            payload = self.assemble(&header, &head_group, &introduction, &middles, &conclusion);
            tokens = self.counter.count(&payload);
        }

        // Pad loop: when under the floor, add the smallest unused legit
        // section; revert a pad that would overshoot the ceiling.
        let mut added_section: Option<String> = None;
        while tokens < self.config.min_tokens() {
            let mut candidates = self.legit_candidates(&aliased, &used);
            candidates.sort_by_key(|s| self.counter.count(&s.body));
            let Some(section) = candidates.into_iter().next() else {
                break;
            };
            used.push(section.key.clone());
            middles.push(section.clone());
            sort_by_document_order(&mut middles, &aliased);
            let padded = self.assemble(&header, &head_group, &introduction, &middles, &conclusion);
            let padded_tokens = self.counter.count(&padded);
            if padded_tokens > self.config.max_tokens() {
                middles.retain(|s| s.key != section.key);
                break;
            }
            payload = padded;
            tokens = padded_tokens;
            added_section = Some(section.key);
        }

        let status = if !intro_found && !conclusion_found {
            DigestStatus::NoCoreSections
        } else if !intro_found {
            DigestStatus::MissingIntroduction
        } else if !conclusion_found {
            DigestStatus::MissingConclusion
        } else if dropped_any || tokens > self.config.max_tokens() {
            DigestStatus::PartialBody
        } else {
            DigestStatus::Success
        };

        DigestPayload {
            payload,
            token_count: tokens,
            status,
            dropped_section,
            added_section,
        }
    }

    /// Sections with real prose: at least `min_legit_words` words, or a bold
    /// sub-heading marker. Captions and stub sections fail this test.
    fn is_legit(&self, body: &str) -> bool {
        body.split_whitespace().count() >= self.config.min_legit_words() || body.contains("**")
    }

    /// Unused, non-reserved, non-excluded sections with legit prose, in
    /// document order.
    fn legit_candidates(&self, sections: &SectionMap, used: &[String]) -> Vec<Section> {
        sections
            .iter()
            .filter(|(key, _)| !key.starts_with("__"))
            .filter(|(key, _)| !used.iter().any(|u| u == key))
            .filter(|(key, _)| {
                !key_category(key).is_some_and(|c| EXCLUDED_CATEGORIES.contains(&c))
            })
            .filter(|(_, body)| self.is_legit(body))
            .map(|(key, body)| Section {
                key: key.to_string(),
                body: body.to_string(),
            })
            .collect()
    }

    fn assemble(
        &self,
        header: &Option<String>,
        head_group: &[Section],
        introduction: &Option<Section>,
        middles: &[Section],
        conclusion: &Option<Section>,
    ) -> String {
        let mut blocks: Vec<String> = Vec::new();
        if let Some(header) = header {
            if !header.trim().is_empty() {
                blocks.push(header.trim().to_string());
            }
        }
        for section in head_group {
            blocks.push(render_section(section));
        }
        if let Some(section) = introduction {
            blocks.push(render_section(section));
        }
        for section in middles {
            blocks.push(render_section(section));
        }
        if let Some(section) = conclusion {
            blocks.push(render_section(section));
        }
        blocks.join("\n\n")
    }
}

/// Convenience wrapper: alias and digest in one call.
pub fn build_digest(
    sections: &SectionMap,
    config: &OutlineConfig,
    counter: &dyn TokenCounter,
) -> DigestPayload {
    DigestBuilder::new(config, counter).build(sections)
}

fn find_category(map: &SectionMap, category: SectionCategory, used: &[String]) -> Option<Section> {
    map.iter()
        .find(|(key, _)| {
            key_category(key) == Some(category) && !used.iter().any(|u| u == *key)
        })
        .map(|(key, body)| Section {
            key: key.to_string(),
            body: body.to_string(),
        })
}

fn sort_by_document_order(middles: &mut [Section], map: &SectionMap) {
    let order: Vec<&str> = map.keys().collect();
    middles.sort_by_key(|s| order.iter().position(|k| *k == s.key).unwrap_or(usize::MAX));
}

fn render_section(section: &Section) -> String {
    format!("## {}\n\n{}", display_key(&section.key), section.body)
}

/// Canonical keys are lowercase; give headings an initial capital.
fn display_key(key: &str) -> String {
    let mut chars = key.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skimmer_core::WhitespaceCounter;

    fn words(n: usize) -> String {
        (0..n).map(|i| format!("w{i}")).collect::<Vec<_>>().join(" ")
    }

    fn small_budget() -> OutlineConfig {
        skimmer_core::OutlineConfigBuilder::new()
            .min_tokens(10)
            .max_tokens(500)
            .build()
            .unwrap()
    }

    #[test]
    fn test_success_with_intro_and_conclusion() {
        let mut map = SectionMap::new();
        map.insert("Introduction", words(60));
        map.insert("Methods", words(60));
        map.insert("Results", words(60));
        map.insert("Conclusion", words(40));

        let config = small_budget();
        let digest = build_digest(&map, &config, &WhitespaceCounter);
        assert_eq!(digest.status, DigestStatus::Success);
        assert!(digest.payload.contains("## Introduction"));
        assert!(digest.payload.contains("## Methods"));
        assert!(digest.payload.contains("## Conclusion"));
        assert!(digest.dropped_section.is_none());
    }

    #[test]
    fn test_block_order_fixed() {
        let mut map = SectionMap::new();
        map.insert("__preamble__", "Paper Title and authors");
        map.insert("Conclusion", words(40));
        map.insert("Abstract", words(20));
        map.insert("Introduction", words(60));
        map.insert("Results", words(60));

        let config = small_budget();
        let digest = build_digest(&map, &config, &WhitespaceCounter);
        let title_pos = digest.payload.find("Paper Title").unwrap();
        let abstract_pos = digest.payload.find("## Abstract").unwrap();
        let intro_pos = digest.payload.find("## Introduction").unwrap();
        let results_pos = digest.payload.find("## Results").unwrap();
        let conclusion_pos = digest.payload.find("## Conclusion").unwrap();
        assert!(title_pos < abstract_pos);
        assert!(abstract_pos < intro_pos);
        assert!(intro_pos < results_pos);
        assert!(results_pos < conclusion_pos);
    }

    #[test]
    fn test_drop_loop_enforces_ceiling() {
        let mut map = SectionMap::new();
        map.insert("Introduction", words(80));
        map.insert("Methodology", words(400));
        map.insert("Literature Review", words(400));
        map.insert("Results", words(400));
        map.insert("Discussion", words(400));
        map.insert("Limitations", words(400));
        map.insert("Conclusion", words(80));

        let config = skimmer_core::OutlineConfigBuilder::new()
            .min_tokens(100)
            .max_tokens(1500)
            .build()
            .unwrap();
        let digest = build_digest(&map, &config, &WhitespaceCounter);
        assert!(
            digest.token_count <= 1500,
            "budget exceeded: {}",
            digest.token_count
        );
        assert_eq!(digest.status, DigestStatus::PartialBody);
        assert!(digest.dropped_section.is_some());
        // Introduction and Conclusion are never dropped
        assert!(digest.payload.contains("## Introduction"));
        assert!(digest.payload.contains("## Conclusion"));
    }

    #[test]
    fn test_many_sections_padded_within_budget() {
        // 50 legit sections of ~300 tokens, default-sized budget: the pad
        // loop fills toward the floor and never overshoots the ceiling.
        let mut map = SectionMap::new();
        map.insert("Introduction", words(80));
        for i in 0..50 {
            map.insert(format!("Topic {i}"), words(300));
        }
        map.insert("Conclusion", words(80));

        let config = OutlineConfig::default();
        let digest = build_digest(&map, &config, &WhitespaceCounter);
        assert!(
            digest.token_count <= config.max_tokens(),
            "budget exceeded: {}",
            digest.token_count
        );
        assert!(digest.token_count >= config.min_tokens());
        assert_eq!(digest.status, DigestStatus::Success);
        assert!(digest.added_section.is_some());
    }

    #[test]
    fn test_unsatisfiable_budget_returns_payload() {
        // One oversized Introduction: nothing is droppable
        let mut map = SectionMap::new();
        map.insert("Introduction", words(5000));
        map.insert("Conclusion", words(40));

        let config = skimmer_core::OutlineConfigBuilder::new()
            .min_tokens(10)
            .max_tokens(100)
            .build()
            .unwrap();
        let digest = build_digest(&map, &config, &WhitespaceCounter);
        assert!(digest.token_count > 100);
        assert_eq!(digest.status, DigestStatus::PartialBody);
        assert!(digest.payload.contains("## Introduction"));
    }

    #[test]
    fn test_missing_conclusion_status() {
        let mut map = SectionMap::new();
        map.insert("Introduction", words(60));
        map.insert("Methods", words(60));

        let config = small_budget();
        let digest = build_digest(&map, &config, &WhitespaceCounter);
        assert_eq!(digest.status, DigestStatus::MissingConclusion);
    }

    #[test]
    fn test_missing_introduction_status() {
        let mut map = SectionMap::new();
        map.insert("Methods", words(60));
        map.insert("Conclusion", words(60));

        let config = small_budget();
        let digest = build_digest(&map, &config, &WhitespaceCounter);
        assert_eq!(digest.status, DigestStatus::MissingIntroduction);
    }

    #[test]
    fn test_no_core_sections_status() {
        let mut map = SectionMap::new();
        map.insert("Body", words(60));

        let config = small_budget();
        let digest = build_digest(&map, &config, &WhitespaceCounter);
        assert_eq!(digest.status, DigestStatus::NoCoreSections);
        // Fallbacks still produce a usable payload
        assert!(!digest.payload.is_empty());
    }

    #[test]
    fn test_intro_fallback_uses_first_legit_section() {
        let mut map = SectionMap::new();
        map.insert("Stub", "too short");
        map.insert("Opening Remarks", words(60));
        map.insert("Conclusion", words(40));

        let config = small_budget();
        let digest = build_digest(&map, &config, &WhitespaceCounter);
        assert_eq!(digest.status, DigestStatus::MissingIntroduction);
        assert!(digest.payload.contains("## Opening Remarks"));
        assert!(!digest.payload.contains("too short"));
    }

    #[test]
    fn test_bold_marker_makes_short_section_legit() {
        let mut map = SectionMap::new();
        map.insert("Vignette", "**Key finding** in brief.");
        map.insert("Conclusion", words(40));

        let config = small_budget();
        let digest = build_digest(&map, &config, &WhitespaceCounter);
        // The bold-marked section is legit, so it serves as the intro fallback
        assert!(digest.payload.contains("## Vignette"));
    }

    #[test]
    fn test_pad_loop_adds_smallest_unused() {
        let mut map = SectionMap::new();
        map.insert("Introduction", words(60));
        map.insert("Methods", words(60));
        map.insert("Results", words(60));
        map.insert("Extra One", words(120));
        map.insert("Extra Two", words(55));
        map.insert("Conclusion", words(40));

        let config = skimmer_core::OutlineConfigBuilder::new()
            .min_tokens(300)
            .max_tokens(1000)
            .build()
            .unwrap();
        let digest = build_digest(&map, &config, &WhitespaceCounter);
        // Both extras fit; the smaller one is added first
        assert_eq!(digest.status, DigestStatus::Success);
        assert!(digest.payload.contains("## Extra Two"));
        assert!(digest.added_section.is_some());
    }

    #[test]
    fn test_excluded_categories_never_padded() {
        let mut map = SectionMap::new();
        map.insert("Introduction", words(60));
        map.insert("References", words(500));
        map.insert("Conclusion", words(40));

        let config = skimmer_core::OutlineConfigBuilder::new()
            .min_tokens(400)
            .max_tokens(1000)
            .build()
            .unwrap();
        let digest = build_digest(&map, &config, &WhitespaceCounter);
        assert!(!digest.payload.contains("## References"));
    }

    #[test]
    fn test_aliased_keys_in_payload() {
        let mut map = SectionMap::new();
        map.insert("1. Einleitung", words(60));
        map.insert("2. Methoden", words(60));
        map.insert("3. Fazit", words(40));

        let config = small_budget();
        let digest = build_digest(&map, &config, &WhitespaceCounter);
        assert_eq!(digest.status, DigestStatus::Success);
        assert!(digest.payload.contains("## Introduction"));
        assert!(digest.payload.contains("## Methods"));
        assert!(digest.payload.contains("## Conclusion"));
    }
}
