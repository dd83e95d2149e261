use axum::{
    Json,
    extract::State,
    http::header,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::AppState;
use crate::error::{AppResult, ResearchError};
use crate::llm::ToolInvocation;
use crate::report::{self, Report, ReportDocument};
use crate::research::{ResearchRequest, SessionOrchestrator, SessionOutcome};
use crate::telemetry::metrics::REPORT_SECTIONS;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub round_trips: u8,
    pub tool_invocations: Vec<ToolInvocation>,
    pub stop_reason: Option<String>,
}

impl From<SessionOutcome> for SessionSummary {
    fn from(outcome: SessionOutcome) -> Self {
        Self {
            round_trips: outcome.round_trips,
            tool_invocations: outcome.tool_invocations,
            stop_reason: outcome.stop_reason,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ResearchResponse {
    pub report: Report,
    pub session: SessionSummary,
}

async fn research(
    state: &AppState,
    request: &ResearchRequest,
) -> Result<(Report, SessionOutcome), ResearchError> {
    let orchestrator = SessionOrchestrator::new(&state.llm_client, state.session_settings());
    let mut outcome = orchestrator.conduct(request).await?;

    let report = report::extract(&std::mem::take(&mut outcome.answer));
    REPORT_SECTIONS.record(report.sections_present() as f64, &[]);

    Ok((report, outcome))
}

pub async fn create_research(
    State(state): State<AppState>,
    Json(body): Json<ResearchRequest>,
) -> AppResult<Json<ResearchResponse>> {
    let (report, outcome) = research(&state, &body).await?;

    Ok(Json(ResearchResponse {
        report,
        session: outcome.into(),
    }))
}

pub async fn create_document(
    State(state): State<AppState>,
    Json(body): Json<ResearchRequest>,
) -> AppResult<Response> {
    let (report, _) = research(&state, &body).await?;

    let document = ReportDocument {
        report: &report,
        request: &body,
        generated_on: chrono::Local::now().date_naive(),
    };

    Ok((
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, ReportDocument::content_disposition()),
        ],
        document.render(),
    )
        .into_response())
}
