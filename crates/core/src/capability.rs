//! The tools declared to the model, and parsing of the calls it makes.

mod error;

use schemars::{JsonSchema, schema_for};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use trip_agent_model::{ModelTool, ToolCallRequest};

use crate::state::{Trip, TripUpdate};
pub use error::{Error, ErrorKind};

/// A capability the model can invoke.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Capability {
    /// `search_for_places`
    SearchForPlaces,
    /// `add_trips`
    AddTrips,
    /// `update_trips`
    UpdateTrips,
    /// `delete_trips`
    DeleteTrips,
    /// `select_trip`
    SelectTrip,
    /// `map_trip`
    MapTrip,
}

impl Capability {
    /// Every capability, in declaration order.
    pub const ALL: [Capability; 6] = [
        Capability::SearchForPlaces,
        Capability::AddTrips,
        Capability::DeleteTrips,
        Capability::UpdateTrips,
        Capability::SelectTrip,
        Capability::MapTrip,
    ];

    /// Looks up a capability by its tool name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|cap| cap.name() == name)
    }

    /// Returns the tool name.
    pub fn name(self) -> &'static str {
        match self {
            Capability::SearchForPlaces => "search_for_places",
            Capability::AddTrips => "add_trips",
            Capability::UpdateTrips => "update_trips",
            Capability::DeleteTrips => "delete_trips",
            Capability::SelectTrip => "select_trip",
            Capability::MapTrip => "map_trip",
        }
    }

    /// Returns the description shown to the model.
    pub fn description(self) -> &'static str {
        match self {
            Capability::SearchForPlaces => {
                "Search for places based on a query, returns a list of places \
                 including their name, address, and coordinates."
            }
            Capability::AddTrips => "Add one or many trips to the list.",
            Capability::UpdateTrips => "Update one or many trips.",
            Capability::DeleteTrips => {
                "Delete one or many trips. \
                 YOU MUST NOT CALL this tool multiple times in a row!"
            }
            Capability::SelectTrip => "Select a trip.",
            Capability::MapTrip => "Map a trip by its ID.",
        }
    }

    /// Builds the declaration sent to the model.
    pub fn declaration(self) -> ModelTool {
        let schema = match self {
            Capability::SearchForPlaces => schema_for!(SearchForPlacesArgs),
            Capability::AddTrips => schema_for!(AddTripsArgs),
            Capability::UpdateTrips => schema_for!(UpdateTripsArgs),
            Capability::DeleteTrips => schema_for!(DeleteTripsArgs),
            Capability::SelectTrip => schema_for!(SelectTripArgs),
            Capability::MapTrip => schema_for!(MapTripArgs),
        };
        ModelTool {
            name: self.name().to_owned(),
            description: self.description().to_owned(),
            parameters: schema.to_value(),
        }
    }

    /// Builds the declarations of every capability.
    pub fn declarations() -> Vec<ModelTool> {
        Self::ALL.into_iter().map(Self::declaration).collect()
    }
}

/// Arguments of `search_for_places`.
#[derive(Clone, Debug, PartialEq, Deserialize, JsonSchema)]
pub struct SearchForPlacesArgs {
    /// Free-text queries, e.g. "coffee shop in Kyoto".
    pub queries: Vec<String>,
}

/// Arguments of `add_trips`.
#[derive(Clone, Debug, PartialEq, Deserialize, JsonSchema)]
pub struct AddTripsArgs {
    /// The trips to add.
    pub trips: Vec<Trip>,
}

/// Arguments of `update_trips`.
#[derive(Clone, Debug, PartialEq, Deserialize, JsonSchema)]
pub struct UpdateTripsArgs {
    /// The trips to update, matched by id.
    pub trips: Vec<TripUpdate>,
}

/// Arguments of `delete_trips`.
#[derive(Clone, Debug, PartialEq, Deserialize, JsonSchema)]
pub struct DeleteTripsArgs {
    /// Ids of the trips to delete.
    pub trip_ids: Vec<String>,
}

/// Arguments of `select_trip`.
///
/// A missing, null or empty id clears the selection.
#[derive(Clone, Debug, PartialEq, Deserialize, JsonSchema)]
pub struct SelectTripArgs {
    /// Id of the trip to select.
    #[serde(default)]
    pub trip_id: Option<String>,
}

/// Arguments of `map_trip`.
///
/// The map handler always renders the selected trip, this argument is
/// accepted but not used.
#[derive(Clone, Debug, PartialEq, Deserialize, JsonSchema)]
pub struct MapTripArgs {
    /// Id of the trip to map.
    #[serde(default)]
    pub trip_id: Option<String>,
}

/// Decodes the arguments of `req` into `T`.
pub(crate) fn decode_args<T: DeserializeOwned>(
    req: &ToolCallRequest,
) -> Result<T, Error> {
    serde_json::from_value(req.arguments.clone()).map_err(|err| {
        Error::invalid_input()
            .with_reason(format!("invalid arguments for `{}`: {err}", req.name))
    })
}

/// A tool call with its arguments decoded.
#[derive(Clone, Debug, PartialEq)]
pub enum ToolIntent {
    /// Search for places matching each query.
    SearchForPlaces(SearchForPlacesArgs),
    /// Append new trips.
    AddTrips(AddTripsArgs),
    /// Merge partial updates into existing trips.
    UpdateTrips(UpdateTripsArgs),
    /// Remove trips by id.
    DeleteTrips(DeleteTripsArgs),
    /// Change the selected trip.
    SelectTrip(SelectTripArgs),
    /// Render the selected trip to a map.
    MapTrip(MapTripArgs),
}

impl ToolIntent {
    /// Decodes a tool call requested by the model.
    pub fn parse(req: &ToolCallRequest) -> Result<Self, Error> {
        let capability = Capability::from_name(&req.name).ok_or_else(|| {
            Error::unknown_tool()
                .with_reason(format!("unknown tool `{}`", req.name))
        })?;
        Self::parse_as(capability, req)
    }

    fn parse_as(
        capability: Capability,
        req: &ToolCallRequest,
    ) -> Result<Self, Error> {
        Ok(match capability {
            Capability::SearchForPlaces => {
                ToolIntent::SearchForPlaces(decode_args(req)?)
            }
            Capability::AddTrips => ToolIntent::AddTrips(decode_args(req)?),
            Capability::UpdateTrips => {
                ToolIntent::UpdateTrips(decode_args(req)?)
            }
            Capability::DeleteTrips => {
                ToolIntent::DeleteTrips(decode_args(req)?)
            }
            Capability::SelectTrip => ToolIntent::SelectTrip(decode_args(req)?),
            Capability::MapTrip => ToolIntent::MapTrip(decode_args(req)?),
        })
    }

    /// Returns the capability this intent invokes.
    pub fn capability(&self) -> Capability {
        match self {
            ToolIntent::SearchForPlaces(_) => Capability::SearchForPlaces,
            ToolIntent::AddTrips(_) => Capability::AddTrips,
            ToolIntent::UpdateTrips(_) => Capability::UpdateTrips,
            ToolIntent::DeleteTrips(_) => Capability::DeleteTrips,
            ToolIntent::SelectTrip(_) => Capability::SelectTrip,
            ToolIntent::MapTrip(_) => Capability::MapTrip,
        }
    }
}
