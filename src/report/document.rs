use chrono::NaiveDate;

use super::Report;
use crate::research::ResearchRequest;

pub const DOCUMENT_FILENAME: &str = "market-research-report.txt";

/// Plain-text download of a finished report.
pub struct ReportDocument<'a> {
    pub report: &'a Report,
    pub request: &'a ResearchRequest,
    pub generated_on: NaiveDate,
}

impl ReportDocument<'_> {
    pub fn render(&self) -> String {
        format!(
            "MARKET RESEARCH REPORT\n\
            Generated: {}\n\
            \n\
            Startup: {}\n\
            Query: {}\n\
            \n\
            {}\n",
            self.generated_on.format("%Y-%m-%d"),
            self.request.subject_description,
            self.request.query,
            self.report.raw_text,
        )
    }

    pub fn content_disposition() -> String {
        format!("attachment; filename=\"{DOCUMENT_FILENAME}\"")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_document() {
        let report = Report {
            raw_text: "## Market Overview\nGrowing.".to_string(),
            ..Default::default()
        };
        let request = ResearchRequest::new("Solar kiosks", "Top competitors");
        let document = ReportDocument {
            report: &report,
            request: &request,
            generated_on: NaiveDate::from_ymd_opt(2026, 3, 14).unwrap(),
        };

        assert_eq!(
            document.render(),
            "MARKET RESEARCH REPORT\n\
            Generated: 2026-03-14\n\
            \n\
            Startup: Solar kiosks\n\
            Query: Top competitors\n\
            \n\
            ## Market Overview\nGrowing.\n"
        );
    }

    #[test]
    fn test_render_empty_report_keeps_header() {
        let report = Report::default();
        let request = ResearchRequest::new("d", "q");
        let document = ReportDocument {
            report: &report,
            request: &request,
            generated_on: NaiveDate::from_ymd_opt(2026, 1, 2).unwrap(),
        };
        assert!(document.render().starts_with("MARKET RESEARCH REPORT\nGenerated: 2026-01-02\n"));
        assert!(document.render().ends_with("Query: q\n\n\n"));
    }

    #[test]
    fn test_content_disposition() {
        assert_eq!(
            ReportDocument::content_disposition(),
            "attachment; filename=\"market-research-report.txt\""
        );
    }
}
