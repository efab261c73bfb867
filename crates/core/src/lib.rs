//! Core logic of the trip-planning agent: the shared state, the tool
//! intents the model may emit, the chat step, the capability handlers and
//! the loop that routes between them.

#![deny(missing_docs)]
#![deny(clippy::missing_safety_doc)]

#[macro_use]
extern crate tracing;

mod agent;
pub mod capability;
mod chat;
pub mod conversation;
mod error;
pub mod geo;
mod handlers;
mod model_client;
#[cfg(test)]
mod proptests;
pub mod router;
pub mod services;
pub mod state;
#[cfg(test)]
mod testing;

pub use agent::{
    Agent, AgentBuilder, DEFAULT_MAX_STEPS, ProgressHook, TranscriptHook,
};
pub use conversation::Message;
pub use error::AgentError;
pub use state::{AgentState, Place, SearchProgress, Trip, TripUpdate};
