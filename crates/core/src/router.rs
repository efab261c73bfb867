//! Chooses the step that handles the latest message.

use crate::capability::Capability;
use crate::conversation::Message;

/// A step of the orchestrator loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Step {
    /// Ask the model for the next reply.
    Chat,
    /// Run a place search.
    Search,
    /// Add, update or delete trips.
    TripMutation,
    /// Render the selected trip to a map.
    MapRender,
    /// The turn is over.
    Terminal,
}

/// Routes on the last message of `messages`.
///
/// Only the first call of a tool-call message is inspected. The chat step
/// asks the model for one call per reply, so callers appending messages
/// with several calls must not rely on the later calls being routed. The
/// trip mutation handler is the only handler that processes every call of
/// the message.
pub fn route(messages: &[Message]) -> Step {
    let Some(last) = messages.last() else {
        return Step::Terminal;
    };
    match last {
        Message::ToolResult { .. } => Step::Chat,
        Message::ToolCalls { calls, .. } => {
            let Some(call) = calls.first() else {
                return Step::Terminal;
            };
            match Capability::from_name(&call.name) {
                Some(capability) => route_capability(capability),
                None => Step::Chat,
            }
        }
        Message::User { .. } | Message::Assistant { .. } => Step::Terminal,
    }
}

fn route_capability(capability: Capability) -> Step {
    match capability {
        Capability::AddTrips
        | Capability::UpdateTrips
        | Capability::DeleteTrips
        | Capability::SelectTrip => Step::TripMutation,
        Capability::SearchForPlaces => Step::Search,
        Capability::MapTrip => Step::MapRender,
    }
}
