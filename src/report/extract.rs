use std::sync::LazyLock;

use regex::Regex;

use super::Report;

/// One or two `#`, then optional whitespace.
const HEADING_MARKER: &str = r"##?\s*";

struct SectionPattern {
    opening: Regex,
    closings: Vec<Regex>,
}

impl SectionPattern {
    fn new(opening: &str, closings: &[&str]) -> Self {
        Self {
            opening: heading(opening),
            closings: closings.iter().map(|keyword| heading(keyword)).collect(),
        }
    }

    /// Leftmost opening heading through the first closing heading that
    /// starts at or after the opening's end, or end of text.
    fn capture<'t>(&self, text: &'t str) -> Option<&'t str> {
        let opening = self.opening.find(text)?;
        let end = self
            .closings
            .iter()
            .filter_map(|closing| closing.find_at(text, opening.end()))
            .map(|m| m.start())
            .min()
            .unwrap_or(text.len());
        Some(text[opening.start()..end].trim())
    }
}

fn heading(keyword: &str) -> Regex {
    Regex::new(&format!("(?i){HEADING_MARKER}{keyword}"))
        .unwrap_or_else(|e| panic!("invalid section heading pattern {keyword:?}: {e}"))
}

struct SectionPatterns {
    overview: SectionPattern,
    competitors: SectionPattern,
    pain_points: SectionPattern,
    recommendations: SectionPattern,
    pitch_outline: SectionPattern,
}

static PATTERNS: LazyLock<SectionPatterns> = LazyLock::new(|| SectionPatterns {
    overview: SectionPattern::new(r"Market\s+Overview", &["Competitor", "Customer"]),
    competitors: SectionPattern::new("Competitor", &["Customer", "Strategic"]),
    pain_points: SectionPattern::new(r"Customer\s+Pain", &["Strategic", "Pitch"]),
    recommendations: SectionPattern::new("Strategic", &["Pitch"]),
    pitch_outline: SectionPattern::new("Pitch", &[]),
});

/// Splits a research answer into its five report sections.
///
/// Each section is located independently by scanning the whole text, so
/// headings that appear out of order can yield overlapping sections. A
/// section whose heading is missing is left empty; this never fails.
#[tracing::instrument(
    name = "report.extract",
    skip(raw_text),
    fields(report.raw_chars = raw_text.len(), report.sections_present)
)]
pub fn extract(raw_text: &str) -> Report {
    let patterns = &*PATTERNS;
    let grab = |pattern: &SectionPattern| pattern.capture(raw_text).map(str::to_string);

    let report = Report {
        overview: grab(&patterns.overview),
        competitors: grab(&patterns.competitors),
        pain_points: grab(&patterns.pain_points),
        recommendations: grab(&patterns.recommendations),
        pitch_outline: grab(&patterns.pitch_outline),
        raw_text: raw_text.to_string(),
    };

    tracing::Span::current().record("report.sections_present", report.sections_present());

    report
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL_REPORT: &str = "# Research for VoltWise\n\n\
        ## Market Overview\nSME energy spend in India is rising.\n\n\
        ## Competitor Analysis\n| Company | Pricing |\n|---|---|\n| Zenatix | Custom |\n\n\
        ## Customer Pain Points\n- Bills are opaque\n- Meters are manual\n\n\
        ## Strategic Recommendations\n1. Start with textile clusters\n\n\
        ## Pitch Deck Outline\n### Slide 1: Problem\n- Energy waste\n";

    #[test]
    fn test_extract_empty() {
        let report = extract("");
        assert_eq!(report.overview, None);
        assert_eq!(report.competitors, None);
        assert_eq!(report.pain_points, None);
        assert_eq!(report.recommendations, None);
        assert_eq!(report.pitch_outline, None);
        assert_eq!(report.raw_text, "");
    }

    #[test]
    fn test_extract_only_overview() {
        let report = extract("## Market Overview\nFoo");
        assert_eq!(report.overview.as_deref(), Some("## Market Overview\nFoo"));
        assert_eq!(report.competitors, None);
        assert_eq!(report.pain_points, None);
        assert_eq!(report.recommendations, None);
        assert_eq!(report.pitch_outline, None);
    }

    #[test]
    fn test_raw_text_is_input_verbatim() {
        for text in ["", "  padded  ", "no headings at all", FULL_REPORT, "## Pitch\n\n"] {
            assert_eq!(extract(text).raw_text, text);
        }
    }

    #[test]
    fn test_ordered_sections_are_contiguous() {
        let report = extract(FULL_REPORT);

        assert_eq!(
            report.overview.as_deref(),
            Some("## Market Overview\nSME energy spend in India is rising.")
        );
        assert_eq!(
            report.competitors.as_deref(),
            Some("## Competitor Analysis\n| Company | Pricing |\n|---|---|\n| Zenatix | Custom |")
        );
        assert_eq!(
            report.pain_points.as_deref(),
            Some("## Customer Pain Points\n- Bills are opaque\n- Meters are manual")
        );
        assert_eq!(
            report.recommendations.as_deref(),
            Some("## Strategic Recommendations\n1. Start with textile clusters")
        );
        assert_eq!(
            report.pitch_outline.as_deref(),
            Some("## Pitch Deck Outline\n### Slide 1: Problem\n- Energy waste")
        );
    }

    #[test]
    fn test_ordered_sections_reconstruct_text() {
        let report = extract(FULL_REPORT);
        let sections = [
            report.overview.unwrap(),
            report.competitors.unwrap(),
            report.pain_points.unwrap(),
            report.recommendations.unwrap(),
            report.pitch_outline.unwrap(),
        ];

        let mut cursor = FULL_REPORT.find("## Market Overview").unwrap();
        let mut rebuilt = String::new();
        for section in &sections {
            let at = cursor + FULL_REPORT[cursor..].find(section.as_str()).unwrap();
            assert!(FULL_REPORT[cursor..at].trim().is_empty(), "gap before {section:?}");
            rebuilt.push_str(&FULL_REPORT[cursor..at]);
            rebuilt.push_str(section);
            cursor = at + section.len();
        }
        rebuilt.push_str(&FULL_REPORT[cursor..]);

        let start = FULL_REPORT.find("## Market Overview").unwrap();
        assert_eq!(rebuilt, FULL_REPORT[start..]);
        assert!(FULL_REPORT[cursor..].trim().is_empty());
    }

    #[test]
    fn test_case_insensitive_and_single_hash() {
        let report = extract("# market   overview\nText\n#COMPETITORS\nList");
        assert_eq!(report.overview.as_deref(), Some("# market   overview\nText"));
        assert_eq!(report.competitors.as_deref(), Some("#COMPETITORS\nList"));
    }

    #[test]
    fn test_triple_hash_heading_starts_at_second_marker() {
        let report = extract("### Market Overview\nBody");
        assert_eq!(report.overview.as_deref(), Some("## Market Overview\nBody"));
    }

    #[test]
    fn test_heading_requires_marker() {
        let report = extract("Market Overview without a heading\nCompetitor list");
        assert_eq!(report.overview, None);
        assert_eq!(report.competitors, None);
    }

    #[test]
    fn test_out_of_order_sections_overlap() {
        let text = "## Pitch Deck\nSlides\n## Market Overview\nBig\n## Strategic Moves\nGo";
        let report = extract(text);

        assert_eq!(
            report.pitch_outline.as_deref(),
            Some(text),
            "pitch runs from its heading to end of text"
        );
        assert_eq!(
            report.overview.as_deref(),
            Some("## Market Overview\nBig\n## Strategic Moves\nGo")
        );
        assert_eq!(report.recommendations.as_deref(), Some("## Strategic Moves\nGo"));
    }

    #[test]
    fn test_closing_anchor_must_follow_opening() {
        let text = "## Customer Pain\nEarly\n## Competitor Table\nRows";
        let report = extract(text);
        assert_eq!(report.competitors.as_deref(), Some("## Competitor Table\nRows"));
        assert_eq!(report.pain_points.as_deref(), Some(text));
    }

    #[test]
    fn test_first_closing_anchor_wins() {
        let text = "## Market Overview\nA\n## Customer Pain\nB\n## Competitor\nC";
        let report = extract(text);
        assert_eq!(report.overview.as_deref(), Some("## Market Overview\nA"));
    }

    #[test]
    fn test_whitespace_is_trimmed() {
        let report = extract("\n\n   ## Strategic Plan   \n\n  Expand.  \n\n");
        assert_eq!(report.recommendations.as_deref(), Some("## Strategic Plan   \n\n  Expand."));
    }
}
