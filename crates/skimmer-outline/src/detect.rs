use skimmer_core::{OutlineConfig, SchemeDecision};

use crate::heading::{HeadingCandidate, HeadingKind};
use crate::roman::roman_to_u32;

/// A numbering convention the generic run detector can scan for.
///
/// The two implementations differ only in the tag→integer mapping and in the
/// acceptance policy: a decimal outline may legitimately begin mid-document,
/// a roman outline is only trusted when complete from I.
pub trait NumberingScheme {
    fn name(&self) -> &'static str;
    /// Does this candidate belong to the scheme at the top outline level?
    fn matches(&self, candidate: &HeadingCandidate, config: &OutlineConfig) -> bool;
    /// Map the candidate's tag to its outline position.
    fn tag_value(&self, tag: &str, config: &OutlineConfig) -> Option<u32>;
    /// Whether the accepted run must start at position 1.
    fn requires_initial(&self) -> bool;
    fn min_run(&self, config: &OutlineConfig) -> usize;
}

/// Decimal outlines: `1.`, `2.`, `3.`, ...
pub struct DecimalScheme;

impl NumberingScheme for DecimalScheme {
    fn name(&self) -> &'static str {
        "numeric"
    }

    fn matches(&self, candidate: &HeadingCandidate, config: &OutlineConfig) -> bool {
        candidate.kind == HeadingKind::Numeric
            && candidate.level == 1
            && candidate
                .tag
                .as_deref()
                .and_then(|t| self.tag_value(t, config))
                .is_some()
    }

    fn tag_value(&self, tag: &str, config: &OutlineConfig) -> Option<u32> {
        if tag.len() > 2 {
            return None;
        }
        let value: u32 = tag.parse().ok()?;
        (value > 0 && value <= config.max_numeric_value()).then_some(value)
    }

    fn requires_initial(&self) -> bool {
        false
    }

    fn min_run(&self, config: &OutlineConfig) -> usize {
        config.min_run()
    }
}

/// Roman outlines: `I.`, `II.`, `III.`, ...
pub struct RomanScheme;

impl NumberingScheme for RomanScheme {
    fn name(&self) -> &'static str {
        "roman"
    }

    fn matches(&self, candidate: &HeadingCandidate, config: &OutlineConfig) -> bool {
        candidate.kind == HeadingKind::Roman
            && candidate
                .tag
                .as_deref()
                .and_then(|t| self.tag_value(t, config))
                .is_some()
    }

    fn tag_value(&self, tag: &str, config: &OutlineConfig) -> Option<u32> {
        let value = roman_to_u32(tag)?;
        (value <= config.max_roman_value()).then_some(value)
    }

    fn requires_initial(&self) -> bool {
        true
    }

    fn min_run(&self, config: &OutlineConfig) -> usize {
        config.roman_min_run()
    }
}

/// A strictly-increasing-by-1 run within a value sequence.
///
/// Values that do not continue the run are skipped rather than breaking it:
/// a stray `12` between `2` and `3` is a misread heading, not the end of the
/// outline. A genuine gap still ends the chain (after `1`, a `3` never
/// continues it).
#[derive(Debug, Clone)]
pub(crate) struct Run {
    /// Indices (into the scanned sequence) of the run members, in order.
    pub indices: Vec<usize>,
    pub start_value: u32,
}

impl Run {
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn first(&self) -> usize {
        self.indices[0]
    }

    pub fn last(&self) -> usize {
        *self.indices.last().expect("runs are non-empty")
    }
}

/// Scan the document's heading candidates for the scheme's best
/// strictly-increasing-by-1 run and decide whether the document follows it.
pub fn detect<S: NumberingScheme>(
    scheme: &S,
    candidates: &[HeadingCandidate],
    config: &OutlineConfig,
) -> SchemeDecision {
    let matched: Vec<(&HeadingCandidate, u32)> = candidates
        .iter()
        .filter(|c| scheme.matches(c, config))
        .map(|c| {
            let value = scheme
                .tag_value(c.tag.as_deref().unwrap_or_default(), config)
                .expect("matches() implies a value");
            (c, value)
        })
        .collect();

    if matched.is_empty() {
        return SchemeDecision::rejected();
    }

    let values: Vec<u32> = matched.iter().map(|(_, v)| *v).collect();
    let Some(best) = best_run(&values, scheme.min_run(config)) else {
        return SchemeDecision::rejected();
    };

    let accepted = best.len() >= scheme.min_run(config)
        && (!scheme.requires_initial() || best.start_value == 1);
    let sequence_score = best.len() as f64 / matched.len() as f64;
    let examples = best
        .indices
        .iter()
        .take(3)
        .map(|&i| {
            let (c, _) = matched[i];
            format!("{} {}", c.tag.as_deref().unwrap_or_default(), c.title)
        })
        .collect();

    let decision = SchemeDecision {
        accepted,
        first_index: Some(best.first()),
        run_length: best.len(),
        sequence_score,
        examples,
    };
    tracing::debug!(
        scheme = scheme.name(),
        accepted = decision.accepted,
        run_length = decision.run_length,
        sequence_score = decision.sequence_score,
        "outline scheme detection"
    );
    decision
}

/// Best +1 run over a value sequence, shared by the detectors and the
/// offset-based splitters.
///
/// A run starting at 1 is preferred whenever it reaches `min_initial_len`;
/// otherwise the longest run wins, earlier start breaking ties.
pub(crate) fn best_run(values: &[u32], min_initial_len: usize) -> Option<Run> {
    if values.is_empty() {
        return None;
    }

    let chain_from = |start: usize| -> Run {
        let mut indices = vec![start];
        let mut expected = values[start] + 1;
        for (j, &v) in values.iter().enumerate().skip(start + 1) {
            if v == expected {
                indices.push(j);
                expected += 1;
            }
        }
        Run {
            indices,
            start_value: values[start],
        }
    };

    let qualifies = |run: &Run| run.start_value == 1 && run.len() >= min_initial_len;

    let mut best: Option<Run> = None;
    for start in 0..values.len() {
        let challenger = chain_from(start);
        best = Some(match best {
            None => challenger,
            Some(current) => match (qualifies(&current), qualifies(&challenger)) {
                (true, false) => current,
                (false, true) => challenger,
                _ if challenger.len() > current.len() => challenger,
                _ => current,
            },
        });
    }
    best
}

pub fn detect_numeric(candidates: &[HeadingCandidate], config: &OutlineConfig) -> SchemeDecision {
    detect(&DecimalScheme, candidates, config)
}

pub fn detect_roman(candidates: &[HeadingCandidate], config: &OutlineConfig) -> SchemeDecision {
    detect(&RomanScheme, candidates, config)
}

/// Tie-break between the two verdicts: prefer numeric unless the roman run
/// is strong and the numeric one is weak (low sequence score or a late
/// start). Thresholds are carried-over heuristics, configurable but not
/// recalibrated.
pub fn prefer_roman(
    numeric: &SchemeDecision,
    roman: &SchemeDecision,
    config: &OutlineConfig,
) -> bool {
    if !roman.accepted {
        return false;
    }
    if !numeric.accepted {
        return true;
    }
    let numeric_weak = numeric.sequence_score < config.weak_sequence_score()
        || numeric
            .first_index
            .is_some_and(|i| i > config.late_start_index());
    roman.run_length >= config.roman_min_run() && numeric_weak
}
