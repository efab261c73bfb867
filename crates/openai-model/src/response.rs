use std::collections::{BTreeMap, VecDeque};
use std::pin::Pin;
use std::task::{Context, Poll, ready};

use pin_project_lite::pin_project;
use serde_json::Value;
use trip_agent_model::{
    ErrorKind, ModelFinishReason, ModelResponse, ModelResponseEvent,
    ToolCallRequest,
};

use crate::Error;
use crate::io::Sse;
use crate::proto::{ChatCompletionChunk, ToolCallDelta};

#[derive(Default)]
struct PartialToolCall {
    id: String,
    name: String,
    arguments: String,
}

impl PartialToolCall {
    fn patch(&mut self, delta: ToolCallDelta) {
        if let Some(id) = delta.id {
            self.id.push_str(&id);
        }
        if let Some(function) = delta.function {
            if let Some(name) = function.name {
                self.name.push_str(&name);
            }
            if let Some(arguments) = function.arguments {
                self.arguments.push_str(&arguments);
            }
        }
    }

    fn finish(self) -> ToolCallRequest {
        let arguments = if self.arguments.trim().is_empty() {
            Value::Object(Default::default())
        } else {
            serde_json::from_str(&self.arguments).unwrap_or_else(|err| {
                warn!("malformed arguments for tool `{}`: {err}", self.name);
                Value::Null
            })
        };
        ToolCallRequest {
            id: self.id,
            name: self.name,
            arguments,
        }
    }
}

struct PartialState {
    sse: Sse,
    id: Option<String>,
    // Tool call fragments keyed by their index in the choice. They are
    // only complete once the stream ends.
    tool_calls: BTreeMap<u32, PartialToolCall>,
    finish_reason: Option<ModelFinishReason>,
    pending_events: VecDeque<ModelResponseEvent>,
    finished: bool,
}

impl PartialState {
    fn apply_chunk(&mut self, chunk: ChatCompletionChunk) -> Result<(), Error> {
        if self.id.get_or_insert_with(|| chunk.id.clone()) != &chunk.id {
            return Err(Error::new("chunk id mismatch", ErrorKind::Other));
        }

        for choice in chunk.choices {
            if let Some(content) = choice.delta.content {
                if !content.is_empty() {
                    self.pending_events
                        .push_back(ModelResponseEvent::MessageDelta(content));
                }
            }
            for delta in choice.delta.tool_calls.into_iter().flatten() {
                self.tool_calls.entry(delta.index).or_default().patch(delta);
            }
            if let Some(finish_reason) = choice.finish_reason {
                self.finish_reason = Some(if finish_reason == "tool_calls" {
                    ModelFinishReason::ToolCalls
                } else {
                    ModelFinishReason::Stop
                });
            }
        }
        Ok(())
    }

    // The order of events are important. Tool calls are emitted after all
    // message deltas, and the completion event always comes last.
    fn finish(&mut self) {
        self.finished = true;
        let tool_calls = std::mem::take(&mut self.tool_calls);
        let has_tool_calls = !tool_calls.is_empty();
        for (_, tool_call) in tool_calls {
            self.pending_events
                .push_back(ModelResponseEvent::ToolCall(tool_call.finish()));
        }
        let finish_reason = self.finish_reason.unwrap_or(if has_tool_calls {
            ModelFinishReason::ToolCalls
        } else {
            ModelFinishReason::Stop
        });
        self.pending_events
            .push_back(ModelResponseEvent::Completed(finish_reason));
    }
}

type PinnedFuture<T> = Pin<Box<dyn Future<Output = T> + Send>>;
type NextEvent = Result<(Option<ModelResponseEvent>, PartialState), Error>;

pin_project! {
    pub struct OpenAIResponse {
        next_event_fut: Option<PinnedFuture<NextEvent>>,
    }
}

impl OpenAIResponse {
    #[inline]
    pub fn from_sse(sse: Sse) -> Self {
        let partial_state = PartialState {
            sse,
            id: None,
            tool_calls: Default::default(),
            finish_reason: None,
            pending_events: Default::default(),
            finished: false,
        };
        Self {
            next_event_fut: Some(Box::pin(next_event(partial_state))),
        }
    }
}

impl ModelResponse for OpenAIResponse {
    type Error = crate::Error;

    fn poll_next_event(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Result<Option<ModelResponseEvent>, Self::Error>> {
        let this = self.project();
        let Some(next_event_fut) = this.next_event_fut else {
            return Poll::Ready(Ok(None));
        };
        let result = ready!(next_event_fut.as_mut().poll(cx));
        *this.next_event_fut = None;

        let (event, partial_state) = match result {
            Ok((Some(event), partial_state)) => (event, partial_state),
            Ok((None, _)) => return Poll::Ready(Ok(None)),
            Err(err) => return Poll::Ready(Err(err)),
        };

        // The stream may still have more data to pull, create a new future
        // for the next event.
        *this.next_event_fut = Some(Box::pin(next_event(partial_state)));
        Poll::Ready(Ok(Some(event)))
    }
}

async fn next_event(mut partial_state: PartialState) -> NextEvent {
    loop {
        if let Some(event) = partial_state.pending_events.pop_front() {
            return Ok((Some(event), partial_state));
        }
        if partial_state.finished {
            return Ok((None, partial_state));
        }

        let sse_event = match partial_state.sse.next_event().await {
            Ok(Some(event)) => event,
            Ok(None) => {
                partial_state.finish();
                continue;
            }
            Err(err) => {
                return Err(Error::new(format!("{err:?}"), ErrorKind::Other));
            }
        };
        trace!("got sse event: {sse_event}");
        if sse_event == "[DONE]" {
            partial_state.finish();
            continue;
        }

        let chunk = serde_json::from_str::<ChatCompletionChunk>(&sse_event)
            .map_err(|err| Error::new(format!("{err}"), ErrorKind::Other))?;
        partial_state.apply_chunk(chunk)?;
    }
}
