use std::pin::Pin;
use std::task::{self, Poll};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::provider::ModelProviderError;

/// A tool call the model asked for.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCallRequest {
    /// Id echoed back by the matching [`ToolCallResult`](crate::ToolCallResult).
    pub id: String,
    /// Name of a declared [`ModelTool`](crate::ModelTool), or whatever the
    /// model made up.
    pub name: String,
    /// Decoded JSON arguments.
    ///
    /// Empty arguments decode to `{}`. Arguments that are not valid JSON
    /// arrive as `null` and fail validation downstream.
    pub arguments: Value,
}

/// Why the model stopped generating.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModelFinishReason {
    /// The reply ends with tool calls that must be answered.
    ToolCalls,
    /// The reply is plain text and the turn may end.
    Stop,
}

/// One piece of a streamed reply.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModelResponseEvent {
    /// A chunk of reply text, to be appended to the previous ones.
    MessageDelta(String),
    /// A tool call whose arguments are complete.
    ToolCall(ToolCallRequest),
    /// The last event of every successful reply.
    Completed(ModelFinishReason),
}

/// A reply being streamed back from a [`ModelProvider`](crate::ModelProvider).
///
/// Events arrive in a fixed order: text deltas, then the tool calls,
/// then a single [`ModelResponseEvent::Completed`]. Partial tool calls
/// are never exposed.
pub trait ModelResponse: Sized + Send + 'static {
    /// Error raised while reading the stream.
    type Error: ModelProviderError;

    /// Polls for the next event.
    ///
    /// While no event is ready this returns `Poll::Pending` and arranges
    /// for the task in `cx` to be woken. After the completion event it
    /// returns `Ok(None)`, also on every later call. An error ends the
    /// reply.
    fn poll_next_event(
        self: Pin<&mut Self>,
        cx: &mut task::Context<'_>,
    ) -> Poll<Result<Option<ModelResponseEvent>, Self::Error>>;
}
