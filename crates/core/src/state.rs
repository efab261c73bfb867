//! The state threaded through every step of a turn.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::conversation::Message;
use crate::services::PlaceRecord;

/// A point of interest found by a place search.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Place {
    /// Unique identifier of the place.
    pub id: String,
    /// Name of the place.
    pub name: String,
    /// Formatted address of the place.
    pub address: String,
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
    /// Rating from 0 to 5.
    pub rating: f64,
    /// Short description of the place.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Place {
    /// Converts a search service record found by the query at
    /// `query_idx`.
    ///
    /// Records without an id are given `"<name>-<query_idx>"`.
    pub fn from_record(record: PlaceRecord, query_idx: usize) -> Self {
        let id = record
            .id
            .unwrap_or_else(|| format!("{}-{query_idx}", record.name));
        Self {
            id,
            name: record.name,
            address: record.address,
            latitude: record.latitude,
            longitude: record.longitude,
            rating: record.rating.unwrap_or_default(),
            description: None,
        }
    }
}

/// A planned trip.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Trip {
    /// Unique identifier of the trip.
    pub id: String,
    /// Title of the trip.
    pub name: String,
    /// First day of the trip (YYYY-MM-DD).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    /// Last day of the trip (YYYY-MM-DD).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    /// Latitude of the map center.
    pub center_latitude: f64,
    /// Longitude of the map center.
    pub center_longitude: f64,
    /// Map zoom level, 1 (world) to 20 (building).
    pub zoom: u8,
    /// Places to visit, in order.
    #[serde(default)]
    pub places: Vec<Place>,
}

/// A partial trip, merged field-wise over the trip with the same id.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TripUpdate {
    /// Identifier of the trip to update.
    pub id: String,
    /// New title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// New first day (YYYY-MM-DD).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    /// New last day (YYYY-MM-DD).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    /// New latitude of the map center.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub center_latitude: Option<f64>,
    /// New longitude of the map center.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub center_longitude: Option<f64>,
    /// New map zoom level.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zoom: Option<u8>,
    /// Replaces the whole place list when given.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub places: Option<Vec<Place>>,
}

impl Trip {
    /// Overwrites every field present in `update`, keeping the others.
    ///
    /// The id is never changed.
    pub fn merge(&mut self, update: TripUpdate) {
        let TripUpdate {
            id: _,
            name,
            start_date,
            end_date,
            center_latitude,
            center_longitude,
            zoom,
            places,
        } = update;

        if let Some(name) = name {
            self.name = name;
        }
        if start_date.is_some() {
            self.start_date = start_date;
        }
        if end_date.is_some() {
            self.end_date = end_date;
        }
        if let Some(center_latitude) = center_latitude {
            self.center_latitude = center_latitude;
        }
        if let Some(center_longitude) = center_longitude {
            self.center_longitude = center_longitude;
        }
        if let Some(zoom) = zoom {
            self.zoom = zoom;
        }
        if let Some(places) = places {
            self.places = places;
        }
    }
}

/// Progress of one query in a running search batch.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchProgress {
    /// The free-text query sent to the search service.
    pub query: String,
    /// Names of the places found, filled in when the query completes.
    pub results: Vec<String>,
    /// Whether the query has completed, successfully or not.
    pub done: bool,
}

impl SearchProgress {
    #[inline]
    pub(crate) fn pending<S: Into<String>>(query: S) -> Self {
        Self {
            query: query.into(),
            results: vec![],
            done: false,
        }
    }
}

/// The aggregate state of a conversation.
///
/// A fresh state has no messages, no trips and no selection. Steps only
/// append to `messages`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentState {
    /// The conversation history, oldest first.
    pub messages: Vec<Message>,
    /// The trip collection. Ids are unique.
    pub trips: Vec<Trip>,
    /// Id of the selected trip. It is cleared by the handlers whenever it
    /// is found not to match any trip.
    pub selected_trip_id: Option<String>,
    /// Only non-empty while a search batch is running.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub search_progress: Vec<SearchProgress>,
}

impl AgentState {
    /// Creates an empty state.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the most recent message.
    #[inline]
    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Looks up a trip by id.
    #[inline]
    pub fn trip(&self, id: &str) -> Option<&Trip> {
        self.trips.iter().find(|trip| trip.id == id)
    }

    /// Returns the selected trip, if the selection resolves to one.
    #[inline]
    pub fn selected_trip(&self) -> Option<&Trip> {
        self.trip(self.selected_trip_id.as_deref()?)
    }

    /// Selects a trip by id. An empty id clears the selection.
    pub(crate) fn select_trip(&mut self, trip_id: String) {
        self.selected_trip_id = (!trip_id.is_empty()).then_some(trip_id);
    }

    #[inline]
    pub(crate) fn push_message(&mut self, message: Message) {
        self.messages.push(message);
    }
}
