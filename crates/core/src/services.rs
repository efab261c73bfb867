//! External collaborators the handlers call out to.
//!
//! The agent only depends on these traits. Concrete clients for real
//! services live in the assembly crate, and tests use in-memory fakes.

use std::io;
use std::path::PathBuf;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::geo::FeatureCollection;

/// A place as returned by a place-search service.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlaceRecord {
    /// The service's id for the place, if it provides one.
    pub id: Option<String>,
    /// Name of the place.
    pub name: String,
    /// Formatted address.
    pub address: String,
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
    /// Rating from 0 to 5, if known.
    pub rating: Option<f64>,
}

/// Error returned by a [`PlaceSearch`] implementation.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// The request could not be sent or its body could not be read.
    #[error("place search request failed: {0}")]
    Request(String),
    /// The service answered with an error status.
    #[error("place search service returned {status}: {message}")]
    Service {
        /// Status reported by the service.
        status: String,
        /// Details reported by the service, may be empty.
        message: String,
    },
    /// The response could not be decoded.
    #[error("malformed place search response: {0}")]
    Decode(String),
}

/// A free-text place-search service.
#[async_trait]
pub trait PlaceSearch: Send + Sync {
    /// Searches places matching `query`, in the service's relevance order.
    async fn search(&self, query: &str) -> Result<Vec<PlaceRecord>, SearchError>;
}

/// Everything a renderer needs to draw one trip.
#[derive(Clone, Debug, PartialEq)]
pub struct MapRequest {
    /// Id of the rendered trip.
    pub trip_id: String,
    /// One point feature per place of the trip.
    pub features: FeatureCollection,
    /// Map center as `[longitude, latitude]`.
    pub center: [f64; 2],
    /// Zoom level of the trip.
    pub zoom: u8,
}

/// Error returned by a [`MapRenderer`] implementation.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// The rendered map could not be written.
    #[error("failed to write map to {}: {source}", path.display())]
    Io {
        /// Where the map was being written.
        path: PathBuf,
        /// The underlying error.
        source: io::Error,
    },
    /// Any other rendering failure.
    #[error("map rendering failed: {0}")]
    Other(String),
}

/// A service that renders a trip map and persists it.
#[async_trait]
pub trait MapRenderer: Send + Sync {
    /// Renders the map and returns the absolute path of the artifact.
    async fn render(&self, request: MapRequest) -> Result<PathBuf, RenderError>;
}
