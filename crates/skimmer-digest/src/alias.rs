use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use skimmer_core::SectionMap;

/// Canonical section categories, in match priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionCategory {
    Abstract,
    Keywords,
    Introduction,
    Methodology,
    Methods,
    Literature,
    Results,
    Discussion,
    Limitations,
    Implications,
    Conclusion,
    Recommendations,
    Acknowledgments,
    References,
    Appendix,
    Notes,
}

impl SectionCategory {
    pub const ALL: [SectionCategory; 16] = [
        SectionCategory::Abstract,
        SectionCategory::Keywords,
        SectionCategory::Introduction,
        SectionCategory::Methodology,
        SectionCategory::Methods,
        SectionCategory::Literature,
        SectionCategory::Results,
        SectionCategory::Discussion,
        SectionCategory::Limitations,
        SectionCategory::Implications,
        SectionCategory::Conclusion,
        SectionCategory::Recommendations,
        SectionCategory::Acknowledgments,
        SectionCategory::References,
        SectionCategory::Appendix,
        SectionCategory::Notes,
    ];

    /// The canonical section key this category maps titles onto.
    pub fn key(&self) -> &'static str {
        match self {
            SectionCategory::Abstract => "abstract",
            SectionCategory::Keywords => "keywords",
            SectionCategory::Introduction => "introduction",
            SectionCategory::Methodology => "methodology",
            SectionCategory::Methods => "methods",
            SectionCategory::Literature => "literature",
            SectionCategory::Results => "results",
            SectionCategory::Discussion => "discussion",
            SectionCategory::Limitations => "limitations",
            SectionCategory::Implications => "implications",
            SectionCategory::Conclusion => "conclusion",
            SectionCategory::Recommendations => "recommendations",
            SectionCategory::Acknowledgments => "acknowledgments",
            SectionCategory::References => "references",
            SectionCategory::Appendix => "appendix",
            SectionCategory::Notes => "notes",
        }
    }

    fn aliases(&self) -> &'static [&'static str] {
        match self {
            SectionCategory::Abstract => &[
                "abstract",
                "summary",
                "synopsis",
                "zusammenfassung",
                "abstrakt",
                "resumen",
                "résumé",
                "resume",
                "resumo",
                "sommario",
                "riassunto",
                "samenvatting",
            ],
            SectionCategory::Keywords => &[
                "keywords",
                "key words",
                "index terms",
                "schlüsselwörter",
                "schlagwörter",
                "palabras clave",
                "mots-clés",
                "mots clés",
                "palavras-chave",
                "parole chiave",
            ],
            SectionCategory::Introduction => &[
                "introduction",
                "einleitung",
                "einführung",
                "introducción",
                "introduccion",
                "introdução",
                "introducao",
                "introduzione",
                "inleiding",
            ],
            SectionCategory::Methodology => &[
                "methodology",
                "research methodology",
                "research design",
                "methodologie",
                "metodología",
                "metodologia",
                "méthodologie",
            ],
            SectionCategory::Methods => &[
                "methods",
                "method",
                "materials and methods",
                "methoden",
                "méthodes",
                "métodos",
                "metodos",
                "metodi",
            ],
            SectionCategory::Literature => &[
                "literature",
                "literature review",
                "related work",
                "related works",
                "background",
                "theoretical framework",
                "state of the art",
                "literaturübersicht",
                "forschungsstand",
                "estado del arte",
                "revisión de la literatura",
            ],
            SectionCategory::Results => &[
                "results",
                "findings",
                "results and findings",
                "ergebnisse",
                "resultados",
                "résultats",
                "resultats",
                "risultati",
            ],
            SectionCategory::Discussion => &[
                "discussion",
                "diskussion",
                "discusión",
                "discusion",
                "discussão",
                "discussao",
                "discussione",
            ],
            SectionCategory::Limitations => &[
                "limitations",
                "study limitations",
                "limitationen",
                "limitaciones",
                "limitações",
                "limitacoes",
                "limites",
                "limitazioni",
            ],
            SectionCategory::Implications => &[
                "implications",
                "practical implications",
                "theoretical implications",
                "implikationen",
                "implicaciones",
                "implicações",
                "implicacoes",
                "implicazioni",
            ],
            SectionCategory::Conclusion => &[
                "conclusion",
                "conclusions",
                "concluding remarks",
                "final remarks",
                "fazit",
                "schlussfolgerung",
                "schlussfolgerungen",
                "schlussbetrachtung",
                "conclusión",
                "conclusiones",
                "conclusão",
                "conclusao",
                "conclusões",
                "conclusioni",
            ],
            SectionCategory::Recommendations => &[
                "recommendations",
                "recommendation",
                "empfehlungen",
                "handlungsempfehlungen",
                "recomendaciones",
                "recomendações",
                "recomendacoes",
                "raccomandazioni",
            ],
            SectionCategory::Acknowledgments => &[
                "acknowledgments",
                "acknowledgements",
                "funding",
                "danksagung",
                "agradecimientos",
                "agradecimentos",
                "remerciements",
                "ringraziamenti",
            ],
            SectionCategory::References => &[
                "references",
                "bibliography",
                "works cited",
                "literatur",
                "literaturverzeichnis",
                "quellenverzeichnis",
                "bibliographie",
                "bibliografía",
                "bibliografia",
                "referencias",
                "referências",
                "riferimenti bibliografici",
            ],
            SectionCategory::Appendix => &[
                "appendix",
                "appendices",
                "anhang",
                "anexo",
                "anexos",
                "apéndice",
                "apendice",
                "annexe",
                "appendice",
                "supplementary material",
                "supplementary materials",
            ],
            SectionCategory::Notes => &[
                "notes",
                "endnotes",
                "footnotes",
                "anmerkungen",
                "notas",
                "note",
            ],
        }
    }
}

// Leading numbering forms stripped before lookup: hash markers, decimal or
// roman or single-letter tokens with a delimiter, bare numbers with space.
static LEADING_NUMBERING_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:#{1,6}\s+)?(?:(?:\d{1,2}(?:\.\d{1,2})*|[IVXLCDM]+|[A-Z])\s*[.)\-:]\s*|\d{1,2}(?:\.\d{1,2})*\s+)?")
        .unwrap()
});

/// Normalize a section title for alias lookup: strip leading numbering,
/// trim punctuation, lowercase.
pub fn normalize_title(title: &str) -> String {
    let stripped = LEADING_NUMBERING_RE.replace(title.trim(), "");
    stripped
        .trim()
        .trim_end_matches([':', '.', ';'])
        .trim()
        .to_lowercase()
}

/// Map a title onto its canonical category via set membership.
/// First matching category wins; no fuzzy matching.
pub fn canonicalize_title(title: &str) -> Option<SectionCategory> {
    let normalized = normalize_title(title);
    if normalized.is_empty() {
        return None;
    }
    SectionCategory::ALL
        .iter()
        .find(|cat| cat.aliases().contains(&normalized.as_str()))
        .copied()
}

/// Which category a (possibly composite) section key belongs to.
pub fn key_category(key: &str) -> Option<SectionCategory> {
    SectionCategory::ALL
        .iter()
        .find(|cat| key == cat.key() || key.starts_with(&format!("{} + ", cat.key())))
        .copied()
}

/// Rewrite a section map's keys onto canonical categories.
///
/// Reserved keys (`__preamble__`, `__postscript__`) pass through; unmatched
/// titles keep their original key; collisions compose with the original
/// title (`"methodology + Methods"`).
pub fn alias_sections(sections: &SectionMap) -> SectionMap {
    let mut out = SectionMap::new();
    for (key, body) in sections.iter() {
        if key.starts_with("__") {
            out.insert(key, body);
            continue;
        }
        match canonicalize_title(key) {
            Some(category) => {
                out.insert_with_alt(category.key().to_string(), key, body.to_string());
            }
            None => {
                out.insert(key, body);
            }
        }
    }
    out
}
