use std::sync::Arc;

use trip_agent_model::ModelProvider;

use super::{Agent, ProgressHook, TranscriptHook};
use crate::chat::ChatStep;
use crate::model_client::ModelClient;
use crate::services::{MapRenderer, PlaceSearch};
use crate::state::SearchProgress;

/// Default limit of steps in a single turn.
pub const DEFAULT_MAX_STEPS: usize = 25;

/// [`Agent`] builder.
pub struct AgentBuilder {
    model_client: ModelClient,
    place_search: Arc<dyn PlaceSearch>,
    map_renderer: Arc<dyn MapRenderer>,
    on_transcript: Option<TranscriptHook>,
    on_search_progress: Option<ProgressHook>,
    max_steps: usize,
}

impl AgentBuilder {
    /// Creates a new builder with the model provider and the external
    /// services the handlers call.
    #[inline]
    pub fn new<P, S, R>(provider: P, place_search: S, map_renderer: R) -> Self
    where
        P: ModelProvider + 'static,
        S: PlaceSearch + 'static,
        R: MapRenderer + 'static,
    {
        Self {
            model_client: ModelClient::new(provider),
            place_search: Arc::new(place_search),
            map_renderer: Arc::new(map_renderer),
            on_transcript: None,
            on_search_progress: None,
            max_steps: DEFAULT_MAX_STEPS,
        }
    }

    /// Attaches a callback receiving assistant text as it streams in.
    #[inline]
    pub fn on_transcript(
        mut self,
        on_transcript: impl Fn(&str) + Send + Sync + 'static,
    ) -> Self {
        self.on_transcript = Some(Arc::new(on_transcript));
        self
    }

    /// Attaches a callback receiving search progress.
    #[inline]
    pub fn on_search_progress(
        mut self,
        on_search_progress: impl Fn(&[SearchProgress]) + Send + Sync + 'static,
    ) -> Self {
        self.on_search_progress = Some(Arc::new(on_search_progress));
        self
    }

    /// Sets the maximum number of steps in a turn.
    #[inline]
    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }

    /// Builds the agent.
    #[inline]
    pub fn build(self) -> Agent {
        let AgentBuilder {
            model_client,
            place_search,
            map_renderer,
            on_transcript,
            on_search_progress,
            max_steps,
        } = self;

        Agent {
            chat: ChatStep::new(model_client),
            place_search,
            map_renderer,
            on_transcript,
            on_search_progress,
            max_steps,
        }
    }
}
