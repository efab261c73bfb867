use std::collections::HashSet;

use crate::capability::{ErrorKind, ToolIntent};
use crate::chat::TRIP_SELECTED;
use crate::conversation::Message;
use crate::state::{AgentState, Trip, TripUpdate};

pub(crate) const TRIPS_ADDED: &str = "Successfully added the trip(s)!";
pub(crate) const TRIPS_UPDATED: &str = "Successfully updated the trip(s)!";
pub(crate) const TRIPS_DELETED: &str = "Successfully deleted the trip(s)!";

/// Applies every trip operation of the latest tool-call message in order,
/// appending one tool result per call.
///
/// Calls to other capabilities are left unanswered for the chat step.
pub(crate) fn run(state: &mut AgentState) {
    let Some(calls) = state.last_message().and_then(Message::tool_calls)
    else {
        warn!("trip mutation step reached without a tool call");
        return;
    };

    for call in calls.to_vec() {
        let content = match ToolIntent::parse(&call) {
            Ok(ToolIntent::AddTrips(args)) => add_trips(state, args.trips),
            Ok(ToolIntent::UpdateTrips(args)) => {
                update_trips(state, args.trips)
            }
            Ok(ToolIntent::DeleteTrips(args)) => {
                delete_trips(state, &args.trip_ids)
            }
            Ok(ToolIntent::SelectTrip(args)) => {
                state.select_trip(args.trip_id.unwrap_or_default());
                TRIP_SELECTED.to_owned()
            }
            Ok(ToolIntent::SearchForPlaces(_) | ToolIntent::MapTrip(_)) => {
                continue;
            }
            Err(err) if err.kind() == ErrorKind::UnknownTool => continue,
            Err(err) => {
                warn!("rejected `{}` call: {err}", call.name);
                err.to_tool_result()
            }
        };
        state.push_message(Message::tool_result(call.id, content));
    }
}

/// Appends new trips. Trips whose id is already taken are skipped.
pub(crate) fn add_trips(state: &mut AgentState, trips: Vec<Trip>) -> String {
    let mut ids: HashSet<String> =
        state.trips.iter().map(|trip| trip.id.clone()).collect();
    let mut skipped = vec![];
    for trip in trips {
        if !ids.insert(trip.id.clone()) {
            warn!("skipping trip with duplicate id `{}`", trip.id);
            skipped.push(trip.id);
            continue;
        }
        debug!("adding trip `{}`", trip.id);
        state.trips.push(trip);
    }

    if skipped.is_empty() {
        TRIPS_ADDED.to_owned()
    } else {
        format!(
            "{TRIPS_ADDED} Skipped trips with duplicate ids: {}.",
            skipped.join(", ")
        )
    }
}

/// Merges each update over the trip with the same id. Updates for unknown
/// ids are ignored.
pub(crate) fn update_trips(
    state: &mut AgentState,
    updates: Vec<TripUpdate>,
) -> String {
    for update in updates {
        match state.trips.iter_mut().find(|trip| trip.id == update.id) {
            Some(trip) => {
                debug!("updating trip `{}`", update.id);
                trip.merge(update);
            }
            None => debug!("ignoring update of unknown trip `{}`", update.id),
        }
    }
    TRIPS_UPDATED.to_owned()
}

/// Removes the trips with the given ids, clearing the selection if the
/// selected trip is among them.
pub(crate) fn delete_trips(state: &mut AgentState, trip_ids: &[String]) -> String {
    let before = state.trips.len();
    state.trips.retain(|trip| !trip_ids.contains(&trip.id));
    debug!("deleted {} trips", before - state.trips.len());

    if state
        .selected_trip_id
        .as_ref()
        .is_some_and(|id| trip_ids.contains(id))
    {
        state.selected_trip_id = None;
    }
    TRIPS_DELETED.to_owned()
}
