pub mod document;
pub mod extract;

use serde::Serialize;

pub use document::ReportDocument;
pub use extract::extract;

/// A research answer split into its named sections. `raw_text` always
/// holds the full answer, even when no section heading was found.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub overview: Option<String>,
    pub competitors: Option<String>,
    pub pain_points: Option<String>,
    pub recommendations: Option<String>,
    pub pitch_outline: Option<String>,
    pub raw_text: String,
}

impl Report {
    pub fn sections_present(&self) -> usize {
        [
            &self.overview,
            &self.competitors,
            &self.pain_points,
            &self.recommendations,
            &self.pitch_outline,
        ]
        .iter()
        .filter(|section| section.is_some())
        .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_serializes_camel_case() {
        let report = Report {
            overview: Some("## Market Overview".to_string()),
            pain_points: Some("## Customer Pain".to_string()),
            raw_text: "raw".to_string(),
            ..Default::default()
        };
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["overview"], "## Market Overview");
        assert_eq!(value["painPoints"], "## Customer Pain");
        assert!(value["pitchOutline"].is_null());
        assert_eq!(value["rawText"], "raw");
    }

    #[test]
    fn test_sections_present() {
        assert_eq!(Report::default().sections_present(), 0);
        let report = Report {
            competitors: Some("c".to_string()),
            pitch_outline: Some("p".to_string()),
            ..Default::default()
        };
        assert_eq!(report.sections_present(), 2);
    }
}
