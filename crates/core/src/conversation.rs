//! Conversation-related types.

use serde::{Deserialize, Serialize};
use trip_agent_model::{ModelMessage, ToolCallRequest, ToolCallResult};

/// A message in the conversation history.
///
/// The history is append-only: messages are never reordered or removed
/// within a turn.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Message {
    /// A text typed by the user.
    User {
        /// The text.
        content: String,
    },
    /// A plain text reply from the assistant.
    Assistant {
        /// The text.
        content: String,
    },
    /// An assistant reply that requests tool calls.
    ///
    /// The chat step asks for at most one call per reply. Only the first
    /// call is used for routing, see [`crate::router::route`].
    ToolCalls {
        /// Text the model emitted before the calls, if any.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        content: Option<String>,
        /// The requested calls, in the order the model emitted them.
        calls: Vec<ToolCallRequest>,
    },
    /// The outcome of a tool call.
    ToolResult {
        /// Id of the call this result answers.
        call_id: String,
        /// Human-readable result content sent back to the model.
        content: String,
    },
}

impl Message {
    /// Creates a user message.
    #[inline]
    pub fn user<S: Into<String>>(content: S) -> Self {
        Message::User {
            content: content.into(),
        }
    }

    /// Creates an assistant text message.
    #[inline]
    pub fn assistant<S: Into<String>>(content: S) -> Self {
        Message::Assistant {
            content: content.into(),
        }
    }

    /// Creates a tool result answering `call_id`.
    #[inline]
    pub fn tool_result<S1: Into<String>, S2: Into<String>>(
        call_id: S1,
        content: S2,
    ) -> Self {
        Message::ToolResult {
            call_id: call_id.into(),
            content: content.into(),
        }
    }

    /// Returns the tool calls if this message requests any.
    #[inline]
    pub fn tool_calls(&self) -> Option<&[ToolCallRequest]> {
        match self {
            Message::ToolCalls { calls, .. } => Some(calls),
            _ => None,
        }
    }

    /// Returns the first tool call of this message, if any.
    #[inline]
    pub fn first_tool_call(&self) -> Option<&ToolCallRequest> {
        self.tool_calls()?.first()
    }

    /// Returns the text of a user or assistant message.
    #[inline]
    pub fn text(&self) -> Option<&str> {
        match self {
            Message::User { content } | Message::Assistant { content } => {
                Some(content)
            }
            _ => None,
        }
    }

    pub(crate) fn to_model_message(&self) -> ModelMessage {
        match self {
            Message::User { content } => ModelMessage::User(content.clone()),
            Message::Assistant { content } => {
                ModelMessage::Assistant(content.clone())
            }
            Message::ToolCalls { content, calls } => {
                ModelMessage::AssistantToolCalls {
                    content: content.clone(),
                    calls: calls.clone(),
                }
            }
            Message::ToolResult { call_id, content } => {
                ModelMessage::Tool(ToolCallResult {
                    id: call_id.clone(),
                    content: content.clone(),
                })
            }
        }
    }
}
