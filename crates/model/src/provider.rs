use std::error::Error;

use crate::error::ErrorKind;
use crate::request::ModelRequest;
use crate::response::ModelResponse;

/// An error reported by a [`ModelProvider`] or by one of its responses.
///
/// The agent never looks at the concrete type. What happens to a failed
/// turn is decided from [`kind`](Self::kind) alone.
pub trait ModelProviderError: Error + Send + Sync + 'static {
    /// Classifies the failure.
    fn kind(&self) -> ErrorKind;

    /// Returns `true` if the same turn may succeed when sent again later.
    ///
    /// Providers never retry by themselves. Whoever drives the turn owns
    /// the retry policy and consults this to apply it.
    #[inline]
    fn is_transient(&self) -> bool {
        self.kind().is_transient()
    }
}

/// A language model backend, asked for one chat reply at a time.
///
/// Every request carries the whole history, so a provider keeps no
/// conversation between calls. It is shared by every step of a turn and
/// may be used from any task.
///
/// A request with [`ModelRequest::parallel_tool_calls`] unset asks for at
/// most one tool call per reply. Backends that ignore the flag may still
/// send more. The agent tolerates that and answers the extra calls with
/// an error result.
pub trait ModelProvider: Send + Sync {
    /// Error returned when a request or its reply stream fails.
    type Error: ModelProviderError;

    /// The streamed reply.
    type Response: ModelResponse<Error = Self::Error>;

    /// Starts a chat completion for `req`.
    ///
    /// The future owns what it needs and may outlive both `self` and
    /// `req`. It resolves once the backend has accepted the request, the
    /// reply itself is then read from the returned [`ModelResponse`].
    fn send_request(
        &self,
        req: &ModelRequest,
    ) -> impl Future<Output = Result<Self::Response, Self::Error>> + Send + 'static;
}
