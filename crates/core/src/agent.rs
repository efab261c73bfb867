mod builder;

use std::sync::Arc;

use tracing::Instrument;

use crate::chat::ChatStep;
use crate::conversation::Message;
use crate::error::AgentError;
use crate::handlers;
use crate::router::{Step, route};
use crate::services::{MapRenderer, PlaceSearch};
use crate::state::{AgentState, SearchProgress};
pub use builder::{AgentBuilder, DEFAULT_MAX_STEPS};

/// Receives assistant text as it streams in.
pub type TranscriptHook = Arc<dyn Fn(&str) + Send + Sync>;

/// Receives the progress of the running search batch after every change.
/// The last call of a batch passes an empty slice.
pub type ProgressHook = Arc<dyn Fn(&[SearchProgress]) + Send + Sync>;

/// The orchestrator loop of the trip planning agent.
///
/// A turn alternates between the chat step and the handler the router
/// picks for its reply, until the router terminates the turn. Steps run
/// strictly one after another.
pub struct Agent {
    chat: ChatStep,
    place_search: Arc<dyn PlaceSearch>,
    map_renderer: Arc<dyn MapRenderer>,
    on_transcript: Option<TranscriptHook>,
    on_search_progress: Option<ProgressHook>,
    max_steps: usize,
}

impl Agent {
    /// Appends the user input to `state` and runs the turn it starts.
    ///
    /// The state is only returned when the turn completes. On error, the
    /// caller is expected to go on with the state it had before the turn.
    pub async fn run_turn<S: Into<String>>(
        &self,
        mut state: AgentState,
        input: S,
    ) -> Result<AgentState, AgentError> {
        state.push_message(Message::user(input));
        self.run(state).await
    }

    /// Runs the loop from the chat step until the turn terminates.
    ///
    /// A state without messages terminates right away.
    pub async fn run(
        &self,
        mut state: AgentState,
    ) -> Result<AgentState, AgentError> {
        let mut step = if state.messages.is_empty() {
            Step::Terminal
        } else {
            Step::Chat
        };
        let mut steps = 0;

        while step != Step::Terminal {
            if steps == self.max_steps {
                warn!("turn aborted after {steps} steps");
                return Err(AgentError::StepLimitExceeded(self.max_steps));
            }
            steps += 1;

            let span = debug_span!("step", ?step, steps);
            self.run_step(step, &mut state).instrument(span).await?;
            step = route(&state.messages);
            trace!("next step: {step:?}");
        }

        debug!("turn finished after {steps} steps");
        Ok(state)
    }

    async fn run_step(
        &self,
        step: Step,
        state: &mut AgentState,
    ) -> Result<(), AgentError> {
        match step {
            Step::Chat => self.chat.run(state, self.on_transcript.as_ref()).await,
            Step::Search => {
                handlers::search::run(
                    state,
                    self.place_search.as_ref(),
                    self.on_search_progress.as_ref(),
                )
                .await
            }
            Step::TripMutation => {
                handlers::trips::run(state);
                Ok(())
            }
            Step::MapRender => {
                handlers::map::run(state, self.map_renderer.as_ref()).await
            }
            Step::Terminal => Ok(()),
        }
    }
}
