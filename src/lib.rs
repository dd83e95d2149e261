pub mod config;
pub mod error;
pub mod llm;
pub mod report;
pub mod research;
pub mod routes;
pub mod telemetry;

use std::sync::Arc;

pub use config::Config;

use research::SessionSettings;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub llm_client: Arc<llm::LlmClient>,
}

impl AppState {
    pub fn session_settings(&self) -> SessionSettings {
        SessionSettings {
            model: self.config.research_model.clone(),
            max_tokens: self.config.research_max_tokens,
            temperature: self.config.research_temperature,
        }
    }
}
