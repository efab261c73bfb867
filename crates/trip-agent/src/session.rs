use std::time::Duration;

use backoff::ExponentialBackoff;
use trip_agent_core::services::{MapRenderer, PlaceSearch};
use trip_agent_core::{
    Agent, AgentBuilder, AgentError, AgentState, Message, SearchProgress,
};
use trip_agent_model::ModelProvider;
use trip_agent_openai_model::OpenAIProvider;

use crate::config::Config;
use crate::services::{GooglePlacesSearch, MapboxRenderer};

/// A session builder.
///
/// See [`Session`].
pub struct SessionBuilder {
    agent_builder: AgentBuilder,
    retry: Option<ExponentialBackoff>,
}

impl SessionBuilder {
    /// Creates a session builder with the model provider and services.
    pub fn new<P, S, R>(provider: P, place_search: S, map_renderer: R) -> Self
    where
        P: ModelProvider + 'static,
        S: PlaceSearch + 'static,
        R: MapRenderer + 'static,
    {
        Self {
            agent_builder: AgentBuilder::new(provider, place_search, map_renderer),
            retry: None,
        }
    }

    /// Creates a session builder talking to the services in `config`.
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            OpenAIProvider::new(config.openai_config()),
            GooglePlacesSearch::new(&config.google_maps_api_key),
            MapboxRenderer::new(&config.mapbox_access_token, &config.trip_map_path),
        )
    }

    /// Attaches a callback receiving assistant text as it streams in.
    #[inline]
    pub fn on_transcript(
        mut self,
        on_transcript: impl Fn(&str) + Send + Sync + 'static,
    ) -> Self {
        self.agent_builder = self.agent_builder.on_transcript(on_transcript);
        self
    }

    /// Attaches a callback receiving the progress of place searches.
    #[inline]
    pub fn on_search_progress(
        mut self,
        on_search_progress: impl Fn(&[SearchProgress]) + Send + Sync + 'static,
    ) -> Self {
        self.agent_builder =
            self.agent_builder.on_search_progress(on_search_progress);
        self
    }

    /// Sets the maximum number of steps in a turn.
    #[inline]
    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.agent_builder = self.agent_builder.with_max_steps(max_steps);
        self
    }

    /// Retries turns that failed with a transient error, following
    /// `policy`.
    #[inline]
    pub fn with_retry(mut self, policy: ExponentialBackoff) -> Self {
        self.retry = Some(policy);
        self
    }

    /// Builds a new session.
    pub fn build(self) -> Session {
        Session {
            agent: self.agent_builder.build(),
            state: AgentState::new(),
            retry: self.retry,
        }
    }
}

/// A chat session, holding the conversation and the trips planned so far.
///
/// A turn only takes effect when it completes. If it fails, the session
/// stays as it was before the message was sent.
pub struct Session {
    agent: Agent,
    state: AgentState,
    retry: Option<ExponentialBackoff>,
}

impl Session {
    /// Sends a message and runs the turn it starts.
    pub async fn send_message(&mut self, message: &str) -> Result<(), AgentError> {
        let state = match &self.retry {
            Some(policy) => {
                let agent = &self.agent;
                let current = &self.state;
                let turn = || async move {
                    agent.run_turn(current.clone(), message).await.map_err(
                        |err| {
                            if err.is_retryable() {
                                backoff::Error::transient(err)
                            } else {
                                backoff::Error::permanent(err)
                            }
                        },
                    )
                };
                backoff::future::retry_notify(
                    policy.clone(),
                    turn,
                    |err: AgentError, after: Duration| {
                        warn!("turn failed: {err}, retrying in {after:?}")
                    },
                )
                .await?
            }
            None => self.agent.run_turn(self.state.clone(), message).await?,
        };
        self.state = state;
        Ok(())
    }

    /// Returns the current state.
    #[inline]
    pub fn state(&self) -> &AgentState {
        &self.state
    }

    /// Returns the text of the last assistant message.
    pub fn last_reply(&self) -> Option<&str> {
        self.state.messages.iter().rev().find_map(|msg| match msg {
            Message::Assistant { content } => Some(content.as_str()),
            _ => None,
        })
    }
}
