use std::collections::HashSet;
use std::iter;

use trip_agent_model::{ModelMessage, ModelRequest, ModelTool};

use crate::agent::TranscriptHook;
use crate::capability::{self, Capability, ToolIntent};
use crate::conversation::Message;
use crate::error::AgentError;
use crate::model_client::ModelClient;
use crate::state::{AgentState, Trip};

static SYSTEM_PROMPT: &str = include_str!("chat/system_prompt.md");

pub(crate) const TRIP_SELECTED: &str = "Trip selected.";

/// Asks the model for the next reply and appends it to the history.
pub(crate) struct ChatStep {
    model_client: ModelClient,
    tools: Vec<ModelTool>,
}

impl ChatStep {
    pub fn new(model_client: ModelClient) -> Self {
        Self {
            model_client,
            tools: Capability::declarations(),
        }
    }

    pub async fn run(
        &self,
        state: &mut AgentState,
        on_transcript: Option<&TranscriptHook>,
    ) -> Result<(), AgentError> {
        answer_pending_calls(state);

        let system = system_instruction(&state.trips)?;
        let req = ModelRequest {
            messages: iter::once(ModelMessage::System(system))
                .chain(state.messages.iter().map(Message::to_model_message))
                .collect(),
            tools: self.tools.clone(),
            parallel_tool_calls: false,
        };
        let reply = self
            .model_client
            .send_request(req, on_transcript.cloned())
            .await
            .map_err(AgentError::Model)?;

        if reply.tool_calls.is_empty() {
            state.push_message(Message::assistant(reply.transcript));
            return Ok(());
        }
        if reply.tool_calls.len() > 1 {
            warn!(
                "model requested {} tool calls, only the first is executed",
                reply.tool_calls.len()
            );
        }

        let first = reply.tool_calls[0].clone();
        let content = Some(reply.transcript).filter(|text| !text.is_empty());
        state.push_message(Message::ToolCalls {
            content,
            calls: reply.tool_calls,
        });

        // Selection needs no handler, resolve it right away.
        match ToolIntent::parse(&first) {
            Ok(ToolIntent::SelectTrip(args)) => {
                let trip_id = args.trip_id.unwrap_or_default();
                debug!("selecting trip `{trip_id}`");
                state.select_trip(trip_id);
                state.push_message(Message::tool_result(first.id, TRIP_SELECTED));
            }
            Err(err) if first.name == Capability::SelectTrip.name() => {
                state.push_message(Message::tool_result(
                    first.id,
                    err.to_tool_result(),
                ));
            }
            _ => {}
        }
        Ok(())
    }
}

fn system_instruction(trips: &[Trip]) -> Result<String, serde_json::Error> {
    let trips = serde_json::to_string(trips)?;
    Ok(SYSTEM_PROMPT.replace("{{TRIPS}}", &trips))
}

/// Answers the calls of the latest tool-call message that no handler
/// executed, so every call has a result before the model is asked again.
fn answer_pending_calls(state: &mut AgentState) {
    let Some(pos) = state
        .messages
        .iter()
        .rposition(|msg| matches!(msg, Message::ToolCalls { .. }))
    else {
        return;
    };

    let answered: HashSet<&str> = state.messages[pos + 1..]
        .iter()
        .filter_map(|msg| match msg {
            Message::ToolResult { call_id, .. } => Some(call_id.as_str()),
            _ => None,
        })
        .collect();
    let pending: Vec<_> = state.messages[pos]
        .tool_calls()
        .unwrap_or_default()
        .iter()
        .filter(|call| !answered.contains(call.id.as_str()))
        .map(|call| {
            let err = match Capability::from_name(&call.name) {
                None => capability::Error::unknown_tool()
                    .with_reason(format!("unknown tool `{}`", call.name)),
                Some(_) => capability::Error::skipped().with_reason(
                    "only one tool call is executed per reply",
                ),
            };
            Message::tool_result(call.id.clone(), err.to_tool_result())
        })
        .collect();

    for msg in pending {
        warn!("answering unexecuted tool call: {msg:?}");
        state.push_message(msg);
    }
}
