use serde::{Deserialize, Serialize};

use crate::error::ResearchError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResearchRequest {
    #[serde(default)]
    pub subject_description: String,
    #[serde(default)]
    pub query: String,
}

impl ResearchRequest {
    pub fn new(subject_description: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            subject_description: subject_description.into(),
            query: query.into(),
        }
    }

    /// Both fields must be non-empty. Missing JSON fields arrive empty and
    /// are rejected here, not by the body extractor.
    pub fn validate(&self) -> Result<(), ResearchError> {
        if self.subject_description.is_empty() || self.query.is_empty() {
            return Err(ResearchError::Validation(
                "Please provide both startup description and research query".to_string(),
            ));
        }
        Ok(())
    }
}
