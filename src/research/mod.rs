pub mod orchestrator;
pub mod prompt;
pub mod request;

pub use orchestrator::{SessionOrchestrator, SessionOutcome, SessionSettings};
pub use request::ResearchRequest;

pub const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";
pub const DEFAULT_MAX_TOKENS: u32 = 4000;
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
