use std::sync::Arc;
use std::time::Instant;

use opentelemetry::KeyValue;
use tracing::Instrument;
use tracing_opentelemetry::OpenTelemetrySpanExt;

use super::{MessagesRequest, MessagesResponse, Provider, TurnContent};
use crate::error::ResearchError;
use crate::telemetry::metrics::{
    GEN_AI_ERROR_COUNT, GEN_AI_OPERATION_DURATION, GEN_AI_TOKEN_USAGE,
};

/// Instrumented access to a messages provider. Every call is a single
/// attempt; failures are returned to the caller untouched.
pub struct LlmClient {
    provider: Arc<dyn Provider>,
    server_address: String,
}

impl LlmClient {
    pub fn new(provider: Arc<dyn Provider>, server_address: impl Into<String>) -> Self {
        Self {
            provider,
            server_address: server_address.into(),
        }
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    pub async fn send(
        &self,
        req: &MessagesRequest,
        round: &str,
    ) -> Result<MessagesResponse, ResearchError> {
        let provider_name = self.provider.name().to_string();
        let span_display_name = format!("gen_ai.chat {}", req.model);
        let start = Instant::now();

        let span = tracing::info_span!(
            "gen_ai.chat",
            otel.name = %span_display_name,
            gen_ai.operation.name = "chat",
            gen_ai.provider.name = %provider_name,
            gen_ai.request.model = %req.model,
            server.address = %self.server_address,
            gen_ai.request.temperature = req.temperature.map(f64::from),
            gen_ai.request.max_tokens = req.max_tokens as i64,
            gen_ai.request.messages = req.messages.len() as i64,
            gen_ai.request.tools = req.tools.len() as i64,
            gen_ai.response.model = tracing::field::Empty,
            gen_ai.usage.input_tokens = tracing::field::Empty,
            gen_ai.usage.output_tokens = tracing::field::Empty,
            gen_ai.response.finish_reasons = tracing::field::Empty,
            research.round = %round,
            otel.status_code = tracing::field::Empty,
            error.type = tracing::field::Empty,
        );

        if let Some(TurnContent::Text(prompt)) = req.messages.first().map(|turn| &turn.content) {
            let mut user_event_attrs = vec![KeyValue::new("gen_ai.prompt", truncate(prompt, 1000))];
            if !req.system.is_empty() {
                user_event_attrs.push(KeyValue::new(
                    "gen_ai.system_instructions",
                    truncate(&req.system, 500),
                ));
            }
            span.add_event("gen_ai.user.message", user_event_attrs);
        }

        let result = self.provider.create_message(req).instrument(span.clone()).await;

        let duration = start.elapsed().as_secs_f64();
        let op_kv = KeyValue::new("gen_ai.operation.name", "chat");
        let provider_kv = KeyValue::new("gen_ai.provider.name", provider_name);
        let model_kv = KeyValue::new("gen_ai.request.model", req.model.clone());

        match result {
            Ok(resp) => {
                if let Some(model) = resp.model.as_deref() {
                    span.record("gen_ai.response.model", model);
                }
                span.record("gen_ai.usage.input_tokens", resp.usage.input_tokens as i64);
                span.record("gen_ai.usage.output_tokens", resp.usage.output_tokens as i64);
                if let Some(stop_reason) = resp.stop_reason.as_deref() {
                    span.record("gen_ai.response.finish_reasons", stop_reason);
                }

                let completion = resp.text_blocks().collect::<Vec<_>>().join("\n");
                span.add_event(
                    "gen_ai.assistant.message",
                    vec![KeyValue::new(
                        "gen_ai.completion",
                        truncate(&completion, 2000),
                    )],
                );

                GEN_AI_TOKEN_USAGE.record(
                    f64::from(resp.usage.input_tokens),
                    &[
                        KeyValue::new("gen_ai.token.type", "input"),
                        op_kv.clone(),
                        provider_kv.clone(),
                        model_kv.clone(),
                    ],
                );
                GEN_AI_TOKEN_USAGE.record(
                    f64::from(resp.usage.output_tokens),
                    &[
                        KeyValue::new("gen_ai.token.type", "output"),
                        op_kv.clone(),
                        provider_kv.clone(),
                        model_kv.clone(),
                    ],
                );
                GEN_AI_OPERATION_DURATION.record(duration, &[op_kv, provider_kv, model_kv]);

                Ok(resp)
            }
            Err(err) => {
                span.record("otel.status_code", "ERROR");
                span.record("error.type", err.kind());

                GEN_AI_ERROR_COUNT.add(1, &[provider_kv, model_kv]);

                Err(err)
            }
        }
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.len() <= max {
        s.to_string()
    } else {
        s.char_indices()
            .take_while(|&(i, _)| i < max)
            .map(|(_, c)| c)
            .collect()
    }
}
