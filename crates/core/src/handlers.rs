//! Deterministic executors of the tool calls routed to them.

pub(crate) mod map;
pub(crate) mod search;
pub(crate) mod trips;

use trip_agent_model::ToolCallRequest;

use crate::state::AgentState;

/// Returns the call the router dispatched on.
#[inline]
fn routed_call(state: &AgentState) -> Option<ToolCallRequest> {
    state.last_message()?.first_tool_call().cloned()
}
