use trip_agent_model::ModelProviderError;

use crate::services::{RenderError, SearchError};

/// An error that aborts a turn.
///
/// Mistakes in the model's tool calls are not errors of this kind. They
/// are reported back to the model as tool results and the turn goes on.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    /// The language model request failed.
    #[error("model request failed: {0}")]
    Model(Box<dyn ModelProviderError>),
    /// Every query of a search batch failed.
    #[error("place search failed: {0}")]
    Search(#[from] SearchError),
    /// The map could not be rendered.
    #[error(transparent)]
    Render(#[from] RenderError),
    /// A tool result could not be encoded.
    #[error("failed to encode tool result: {0}")]
    Encode(#[from] serde_json::Error),
    /// The turn kept cycling between the chat step and the handlers.
    #[error("turn did not finish within {0} steps")]
    StepLimitExceeded(usize),
}

impl AgentError {
    /// Returns `true` if running the same turn again later may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            AgentError::Model(err) => err.is_transient(),
            _ => false,
        }
    }
}
