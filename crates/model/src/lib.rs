//! The language-model protocol spoken by the trip agent.
//!
//! This crate establishes a provider-neutral contract between the agent
//! and whatever model backs it: what a request looks like, which messages
//! the history may contain, how tools are declared, and how a streamed
//! response is consumed.
//!
//! Types in this crate don't define any behavior, instead they are the
//! constraints that the provider implementations should adhere to.

#![deny(missing_docs)]

mod error;
mod provider;
mod request;
mod response;

pub use error::*;
pub use provider::*;
pub use request::*;
pub use response::*;
