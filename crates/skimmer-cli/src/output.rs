use std::io::Write;

use owo_colors::OwoColorize;
use skimmer_core::{DigestPayload, DigestStatus, DocumentStructure};

/// Whether to use colored output.
#[derive(Debug, Clone, Copy)]
pub struct ColorMode(pub bool);

impl ColorMode {
    pub fn enabled(&self) -> bool {
        self.0
    }
}

/// Print the recovered outline: scheme, TOC, and per-section word counts.
pub fn print_structure(
    w: &mut dyn Write,
    structure: &DocumentStructure,
    color: ColorMode,
) -> std::io::Result<()> {
    let scheme = format!("{:?}", structure.diagnostics.scheme).to_lowercase();
    if color.enabled() {
        writeln!(w, "Scheme: {}", scheme.cyan())?;
    } else {
        writeln!(w, "Scheme: {}", scheme)?;
    }
    writeln!(
        w,
        "Sections: {} (numeric run {}, roman run {})",
        structure.diagnostics.section_count,
        structure.diagnostics.numeric_check.run_length,
        structure.diagnostics.roman_check.run_length,
    )?;
    writeln!(w)?;

    for entry in &structure.toc {
        let words = structure
            .sections
            .get(&entry.title)
            .map(|body| body.split_whitespace().count())
            .unwrap_or(0);
        let indent = "  ".repeat(entry.depth.saturating_sub(1) as usize);
        if color.enabled() && entry.title.starts_with("__") {
            writeln!(w, "{}{} ({} words)", indent, entry.title.dimmed(), words)?;
        } else {
            writeln!(w, "{}{} ({} words)", indent, entry.title, words)?;
        }
    }
    Ok(())
}

/// Print the digest status line and payload.
pub fn print_digest(
    w: &mut dyn Write,
    digest: &DigestPayload,
    color: ColorMode,
) -> std::io::Result<()> {
    let label = match digest.status {
        DigestStatus::Success => "SUCCESS",
        DigestStatus::PartialBody => "PARTIAL BODY",
        DigestStatus::MissingConclusion => "MISSING CONCLUSION",
        DigestStatus::MissingIntroduction => "MISSING INTRODUCTION",
        DigestStatus::NoCoreSections => "NO CORE SECTIONS",
    };
    if color.enabled() {
        match digest.status {
            DigestStatus::Success => writeln!(w, "Status: {}", label.green())?,
            DigestStatus::NoCoreSections => writeln!(w, "Status: {}", label.red())?,
            _ => writeln!(w, "Status: {}", label.yellow())?,
        }
    } else {
        writeln!(w, "Status: {}", label)?;
    }
    writeln!(w, "Tokens: {}", digest.token_count)?;
    if let Some(dropped) = &digest.dropped_section {
        writeln!(w, "Dropped: {}", dropped)?;
    }
    if let Some(added) = &digest.added_section {
        writeln!(w, "Added: {}", added)?;
    }
    writeln!(w)?;
    writeln!(w, "{}", digest.payload)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use skimmer_core::{Diagnostics, OutlineScheme, SchemeDecision, SectionMap};

    #[test]
    fn test_print_structure_plain() {
        let mut sections = SectionMap::new();
        sections.insert("Introduction", "one two three");
        let structure = DocumentStructure {
            toc: sections.toc(),
            sections,
            diagnostics: Diagnostics {
                scheme: OutlineScheme::Markdown,
                numeric_check: SchemeDecision::rejected(),
                roman_check: SchemeDecision::rejected(),
                section_count: 1,
            },
        };
        let mut out = Vec::new();
        print_structure(&mut out, &structure, ColorMode(false)).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Scheme: markdown"));
        assert!(text.contains("Introduction (3 words)"));
    }

    #[test]
    fn test_print_digest_plain() {
        let digest = DigestPayload {
            payload: "## Introduction\n\nbody".to_string(),
            token_count: 3,
            status: DigestStatus::MissingConclusion,
            dropped_section: None,
            added_section: Some("extra".to_string()),
        };
        let mut out = Vec::new();
        print_digest(&mut out, &digest, ColorMode(false)).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Status: MISSING CONCLUSION"));
        assert!(text.contains("Added: extra"));
        assert!(text.contains("## Introduction"));
    }
}
