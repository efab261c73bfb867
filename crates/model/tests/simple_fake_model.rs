use std::collections::VecDeque;
use std::error::Error;
use std::fmt::{self, Display, Formatter};
use std::future::ready;
use std::pin::Pin;
use std::task::{self, Poll, ready};
use std::time::Duration;

use serde_json::json;
use tokio::time::{Sleep, sleep};
use trip_agent_model::{
    ErrorKind, ModelFinishReason, ModelMessage, ModelProvider,
    ModelProviderError, ModelRequest, ModelResponse, ModelResponseEvent,
    ModelTool, ToolCallRequest,
};

#[derive(Debug)]
struct FakeModelProviderError(ErrorKind);

impl Display for FakeModelProviderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

impl Error for FakeModelProviderError {}

impl ModelProviderError for FakeModelProviderError {
    fn kind(&self) -> ErrorKind {
        self.0
    }
}

/// Echoes the last user message word by word, or asks for a place search
/// when the user says "find ..." and the tool is declared.
#[derive(Debug)]
struct FakeModelResponse {
    fake_items: VecDeque<ModelResponseEvent>,
    sleep: Option<Pin<Box<Sleep>>>,
}

impl FakeModelResponse {
    fn new(input: &str, can_search: bool) -> Self {
        let mut fake_items: VecDeque<_> = VecDeque::new();
        match input.strip_prefix("find ") {
            Some(query) if can_search => {
                fake_items.push_back(ModelResponseEvent::ToolCall(
                    ToolCallRequest {
                        id: "call:0".to_owned(),
                        name: "search_for_places".to_owned(),
                        arguments: json!({ "queries": [query] }),
                    },
                ));
                fake_items.push_back(ModelResponseEvent::Completed(
                    ModelFinishReason::ToolCalls,
                ));
            }
            _ => {
                let text = format!("You said {input}");
                let mut words = text.split(' ').peekable();
                while let Some(word) = words.next() {
                    let mut word = word.to_owned();
                    if words.peek().is_some() {
                        word.push(' ');
                    }
                    fake_items
                        .push_back(ModelResponseEvent::MessageDelta(word));
                }
                fake_items.push_back(ModelResponseEvent::Completed(
                    ModelFinishReason::Stop,
                ));
            }
        }
        Self {
            fake_items,
            sleep: None,
        }
    }
}

impl ModelResponse for FakeModelResponse {
    type Error = FakeModelProviderError;

    fn poll_next_event(
        self: Pin<&mut Self>,
        cx: &mut task::Context<'_>,
    ) -> Poll<Result<Option<ModelResponseEvent>, Self::Error>> {
        let this = self.get_mut();
        let sleep = this
            .sleep
            .get_or_insert_with(|| Box::pin(sleep(Duration::from_millis(1))));
        ready!(sleep.as_mut().poll(cx));
        this.sleep = None;
        Poll::Ready(Ok(this.fake_items.pop_front()))
    }
}

struct FakeModelProvider;

impl ModelProvider for FakeModelProvider {
    type Error = FakeModelProviderError;
    type Response = FakeModelResponse;

    fn send_request(
        &self,
        req: &ModelRequest,
    ) -> impl Future<Output = Result<Self::Response, Self::Error>> + Send + 'static
    {
        let last_user_input = req.messages.iter().rev().find_map(|msg| match msg {
            ModelMessage::User(text) => Some(text.as_str()),
            _ => None,
        });
        let can_search = req.tools.iter().any(|t| t.name == "search_for_places");
        let result = match last_user_input {
            Some(input) => Ok(FakeModelResponse::new(input, can_search)),
            None => Err(FakeModelProviderError(ErrorKind::Other)),
        };
        ready(result)
    }
}

mod tests {
    use std::future::poll_fn;

    use super::*;

    async fn collect(
        mut resp: FakeModelResponse,
    ) -> (String, Vec<ToolCallRequest>, Option<ModelFinishReason>) {
        let mut text = String::new();
        let mut tool_calls = vec![];
        let mut finish_reason = None;
        loop {
            let event = poll_fn(|cx| Pin::new(&mut resp).poll_next_event(cx))
                .await
                .unwrap();
            match event {
                Some(ModelResponseEvent::MessageDelta(delta)) => {
                    text.push_str(&delta);
                }
                Some(ModelResponseEvent::ToolCall(call)) => {
                    tool_calls.push(call);
                }
                Some(ModelResponseEvent::Completed(reason)) => {
                    finish_reason = Some(reason);
                }
                None => break,
            }
        }
        (text, tool_calls, finish_reason)
    }

    fn search_tool() -> ModelTool {
        ModelTool {
            name: "search_for_places".to_owned(),
            description: "Search for places".to_owned(),
            parameters: json!({ "type": "object" }),
        }
    }

    #[tokio::test]
    async fn test_completion() {
        let provider = FakeModelProvider;
        let req = ModelRequest {
            messages: vec![
                ModelMessage::System("Plan trips.".to_owned()),
                ModelMessage::User("Good morning".to_owned()),
            ],
            tools: vec![],
            parallel_tool_calls: false,
        };
        let resp = provider.send_request(&req).await.unwrap();
        let (text, tool_calls, finish_reason) = collect(resp).await;

        assert_eq!(text, "You said Good morning");
        assert!(tool_calls.is_empty());
        assert_eq!(finish_reason, Some(ModelFinishReason::Stop));
    }

    #[tokio::test]
    async fn test_tool_call() {
        let provider = FakeModelProvider;
        let req = ModelRequest {
            messages: vec![ModelMessage::User("find coffee in Rome".to_owned())],
            tools: vec![search_tool()],
            parallel_tool_calls: false,
        };
        let resp = provider.send_request(&req).await.unwrap();
        let (text, tool_calls, finish_reason) = collect(resp).await;

        assert!(text.is_empty());
        assert_eq!(tool_calls.len(), 1);
        assert_eq!(tool_calls[0].arguments, json!({ "queries": ["coffee in Rome"] }));
        assert_eq!(finish_reason, Some(ModelFinishReason::ToolCalls));
    }

    #[tokio::test]
    async fn test_error() {
        let provider = FakeModelProvider;
        let req = ModelRequest {
            messages: vec![],
            tools: vec![],
            parallel_tool_calls: false,
        };
        let result = provider.send_request(&req).await;
        let err = result.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Other);
        assert!(!err.is_transient());
        assert!(
            FakeModelProviderError(ErrorKind::RateLimitExceeded).is_transient()
        );
    }
}
