use std::time::Instant;

use opentelemetry::KeyValue;
use uuid::Uuid;

use crate::error::ResearchError;
use crate::llm::{Block, LlmClient, MessagesRequest, MessagesResponse, ToolInvocation, Turn};
use crate::telemetry::metrics::{
    RESEARCH_SESSION_DURATION, RESEARCH_SESSIONS, RESEARCH_TOOL_INVOCATIONS,
};

use super::prompt::{self, SYSTEM_INSTRUCTION, TOOL_ACKNOWLEDGEMENT};
use super::{DEFAULT_MAX_TOKENS, DEFAULT_MODEL, DEFAULT_TEMPERATURE, ResearchRequest};

#[derive(Debug, Clone, PartialEq)]
pub struct SessionSettings {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionOutcome {
    pub answer: String,
    pub round_trips: u8,
    pub tool_invocations: Vec<ToolInvocation>,
    pub stop_reason: Option<String>,
}

/// Drives one research session against the messages service.
///
/// A session is at most two strictly ordered round trips: the initial
/// request with web search enabled and, when the service stops to use a
/// tool, a single continuation that acknowledges every pending invocation.
/// The continuation's answer is final even if it asks for a tool again.
pub struct SessionOrchestrator<'a> {
    client: &'a LlmClient,
    settings: SessionSettings,
}

impl<'a> SessionOrchestrator<'a> {
    pub fn new(client: &'a LlmClient, settings: SessionSettings) -> Self {
        Self { client, settings }
    }

    pub async fn run(&self, request: &ResearchRequest) -> Result<String, ResearchError> {
        self.conduct(request).await.map(|outcome| outcome.answer)
    }

    #[tracing::instrument(
        name = "research.session",
        skip(self, request),
        fields(
            research.session_id = %Uuid::new_v4(),
            gen_ai.request.model = %self.settings.model,
            research.round_trips,
            research.tool_invocations,
            research.answer_chars,
        )
    )]
    pub async fn conduct(&self, request: &ResearchRequest) -> Result<SessionOutcome, ResearchError> {
        let start = Instant::now();
        let result = self.exchange(request).await;

        let outcome_kv = KeyValue::new(
            "research.outcome",
            match &result {
                Ok(_) => "success",
                Err(err) => err.kind(),
            },
        );
        RESEARCH_SESSIONS.add(1, &[outcome_kv.clone()]);
        RESEARCH_SESSION_DURATION.record(start.elapsed().as_secs_f64(), &[outcome_kv]);

        let outcome = result?;

        let span = tracing::Span::current();
        span.record("research.round_trips", outcome.round_trips);
        span.record("research.tool_invocations", outcome.tool_invocations.len());
        span.record("research.answer_chars", outcome.answer.chars().count());

        tracing::info!(
            round_trips = outcome.round_trips,
            tool_invocations = outcome.tool_invocations.len(),
            stop_reason = outcome.stop_reason.as_deref().unwrap_or(""),
            "Research session completed"
        );

        Ok(outcome)
    }

    async fn exchange(&self, request: &ResearchRequest) -> Result<SessionOutcome, ResearchError> {
        request.validate()?;

        let user_turn = Turn::user_text(prompt::user_message(request));
        let initial = self.client.send(&self.initial_request(user_turn.clone()), "initial").await?;

        let pending = initial.tool_invocations();
        if !(initial.stopped_for_tool_use() && !pending.is_empty()) {
            return Ok(SessionOutcome {
                answer: join_text(&initial),
                round_trips: 1,
                tool_invocations: pending,
                stop_reason: initial.stop_reason,
            });
        }

        RESEARCH_TOOL_INVOCATIONS.add(pending.len() as u64, &[]);
        tracing::debug!(
            tool_invocations = pending.len(),
            "Service paused for tool use, sending continuation"
        );

        let continuation = self
            .client
            .send(
                &self.continuation_request(user_turn, initial.content, &pending),
                "continuation",
            )
            .await?;

        if continuation.stopped_for_tool_use() {
            tracing::warn!(
                tool_invocations = continuation.tool_invocations().len(),
                "Continuation requested another tool round; using its text as final"
            );
        }

        Ok(SessionOutcome {
            answer: join_text(&continuation),
            round_trips: 2,
            tool_invocations: pending,
            stop_reason: continuation.stop_reason,
        })
    }

    fn initial_request(&self, user_turn: Turn) -> MessagesRequest {
        MessagesRequest {
            model: self.settings.model.clone(),
            max_tokens: self.settings.max_tokens,
            temperature: Some(self.settings.temperature),
            system: SYSTEM_INSTRUCTION.to_string(),
            messages: vec![user_turn],
            tools: vec![prompt::web_search_tool()],
        }
    }

    fn continuation_request(
        &self,
        user_turn: Turn,
        assistant_content: Vec<Block>,
        pending: &[ToolInvocation],
    ) -> MessagesRequest {
        let tool_results = pending
            .iter()
            .map(|invocation| Block::tool_result(invocation.id.clone(), TOOL_ACKNOWLEDGEMENT))
            .collect();

        MessagesRequest {
            model: self.settings.model.clone(),
            max_tokens: self.settings.max_tokens,
            temperature: None,
            system: SYSTEM_INSTRUCTION.to_string(),
            messages: vec![
                user_turn,
                Turn::assistant_blocks(assistant_content),
                Turn::user_blocks(tool_results),
            ],
            tools: Vec::new(),
        }
    }
}

fn join_text(response: &MessagesResponse) -> String {
    response.text_blocks().collect::<Vec<_>>().join("\n")
}
