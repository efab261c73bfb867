use super::routed_call;
use crate::conversation::Message;
use crate::error::AgentError;
use crate::geo::FeatureCollection;
use crate::services::{MapRenderer, MapRequest};
use crate::state::AgentState;

pub(crate) const NO_TRIP_SELECTED: &str = "No trip selected to map.";
pub(crate) const SELECTED_TRIP_NOT_FOUND: &str = "Selected trip not found.";

/// Renders the selected trip.
///
/// The trip id passed with the call is ignored, the selection decides
/// what gets rendered.
pub(crate) async fn run(
    state: &mut AgentState,
    map_renderer: &dyn MapRenderer,
) -> Result<(), AgentError> {
    let call_id = routed_call(state).map(|call| call.id);

    let Some(selected_trip_id) = state.selected_trip_id.as_deref() else {
        reject(state, call_id, NO_TRIP_SELECTED);
        return Ok(());
    };
    let Some(trip) = state.trip(selected_trip_id) else {
        reject(state, call_id, SELECTED_TRIP_NOT_FOUND);
        return Ok(());
    };

    let request = MapRequest {
        trip_id: trip.id.clone(),
        features: FeatureCollection::from_places(&trip.places),
        center: [trip.center_longitude, trip.center_latitude],
        zoom: trip.zoom,
    };
    let trip_id = request.trip_id.clone();
    debug!(
        "rendering trip `{trip_id}` with {} places",
        request.features.features.len()
    );
    let path = map_renderer.render(request).await?;

    let content = format!(
        "Mapped the trip {trip_id} successfully. You can view it at: {}",
        path.display()
    );
    match call_id {
        Some(call_id) => {
            state.push_message(Message::tool_result(call_id, content))
        }
        None => state.push_message(Message::assistant(content)),
    }
    Ok(())
}

fn reject(state: &mut AgentState, call_id: Option<String>, reason: &str) {
    debug!("cannot map: {reason}");
    if let Some(call_id) = call_id {
        state.push_message(Message::tool_result(call_id, reason));
    }
    state.push_message(Message::assistant(reason));
    state.selected_trip_id = None;
}
