//! An out-of-the-box trip planning agent, wired to OpenAI for chat,
//! Google Places for search and Mapbox for maps.
//!
//! The crate includes a CLI tool for using in the terminal. And you can also
//! use it as a library to bring trip planning into your own host apps.

#![deny(missing_docs)]

#[macro_use]
extern crate tracing;

mod config;
pub mod services;
mod session;

pub use config::{Config, ConfigError};
pub use session::{Session, SessionBuilder};

/// Re-exports of [`trip_agent_core`] crate.
pub mod core {
    pub use trip_agent_core::*;
}
