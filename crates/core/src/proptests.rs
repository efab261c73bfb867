//! Property tests for the trip collection and the selection.
//!
//! Trip operations are replayed through the trip mutation handler and
//! compared against a plain in-memory model after every batch.

use proptest::prelude::*;
use serde_json::json;
use trip_agent_model::ToolCallRequest;

use crate::chat::TRIP_SELECTED;
use crate::conversation::Message;
use crate::handlers::trips::{
    self, TRIPS_ADDED, TRIPS_DELETED, TRIPS_UPDATED,
};
use crate::state::{AgentState, Place, Trip, TripUpdate};

// A small id pool so that duplicates and misses are common.
const TRIP_IDS: [&str; 4] = ["kyoto", "osaka", "nara", "kobe"];

// ============================================================================
// Generators
// ============================================================================

fn arb_trip_id() -> impl Strategy<Value = String> {
    prop::sample::select(TRIP_IDS.to_vec()).prop_map(str::to_owned)
}

// Four decimals, the precision place searches report.
fn arb_coordinate(limit: i32) -> impl Strategy<Value = f64> {
    (-limit * 10_000..=limit * 10_000).prop_map(|v| f64::from(v) / 10_000.0)
}

fn arb_date() -> impl Strategy<Value = String> {
    "2026-(0[1-9]|1[0-2])-(0[1-9]|1[0-9]|2[0-8])"
}

fn arb_place() -> impl Strategy<Value = Place> {
    (
        "[a-z]{1,8}",
        "[A-Za-z ]{1,16}",
        "[A-Za-z0-9 ,]{0,24}",
        arb_coordinate(90),
        arb_coordinate(180),
        (0..=50i32).prop_map(|v| f64::from(v) / 10.0),
        proptest::option::of("[A-Za-z .]{0,32}"),
    )
        .prop_map(
            |(id, name, address, latitude, longitude, rating, description)| {
                Place {
                    id,
                    name,
                    address,
                    latitude,
                    longitude,
                    rating,
                    description,
                }
            },
        )
}

fn arb_trip() -> impl Strategy<Value = Trip> {
    (
        arb_trip_id(),
        "[A-Za-z ]{1,20}",
        proptest::option::of(arb_date()),
        proptest::option::of(arb_date()),
        arb_coordinate(90),
        arb_coordinate(180),
        1u8..=20,
        prop::collection::vec(arb_place(), 0..4),
    )
        .prop_map(
            |(
                id,
                name,
                start_date,
                end_date,
                center_latitude,
                center_longitude,
                zoom,
                places,
            )| Trip {
                id,
                name,
                start_date,
                end_date,
                center_latitude,
                center_longitude,
                zoom,
                places,
            },
        )
}

fn arb_update() -> impl Strategy<Value = TripUpdate> {
    (
        arb_trip_id(),
        proptest::option::of("[A-Za-z ]{1,20}"),
        proptest::option::of(arb_date()),
        proptest::option::of(arb_date()),
        proptest::option::of(arb_coordinate(90)),
        proptest::option::of(arb_coordinate(180)),
        proptest::option::of(1u8..=20),
        proptest::option::of(prop::collection::vec(arb_place(), 0..3)),
    )
        .prop_map(
            |(
                id,
                name,
                start_date,
                end_date,
                center_latitude,
                center_longitude,
                zoom,
                places,
            )| TripUpdate {
                id,
                name,
                start_date,
                end_date,
                center_latitude,
                center_longitude,
                zoom,
                places,
            },
        )
}

#[derive(Clone, Debug)]
enum TripOp {
    Add(Vec<Trip>),
    Update(Vec<TripUpdate>),
    Delete(Vec<String>),
    Select(Option<String>),
}

fn arb_op() -> impl Strategy<Value = TripOp> {
    prop_oneof![
        prop::collection::vec(arb_trip(), 0..3).prop_map(TripOp::Add),
        prop::collection::vec(arb_update(), 0..3).prop_map(TripOp::Update),
        prop::collection::vec(arb_trip_id(), 0..3).prop_map(TripOp::Delete),
        proptest::option::of(arb_trip_id()).prop_map(TripOp::Select),
    ]
}

impl TripOp {
    fn to_call(&self, id: String) -> ToolCallRequest {
        let (name, arguments) = match self {
            TripOp::Add(trips) => ("add_trips", json!({ "trips": trips })),
            TripOp::Update(trips) => {
                ("update_trips", json!({ "trips": trips }))
            }
            TripOp::Delete(trip_ids) => {
                ("delete_trips", json!({ "trip_ids": trip_ids }))
            }
            TripOp::Select(trip_id) => {
                ("select_trip", json!({ "trip_id": trip_id }))
            }
        };
        ToolCallRequest {
            id,
            name: name.to_owned(),
            arguments,
        }
    }

    fn ack(&self) -> &'static str {
        match self {
            TripOp::Add(_) => TRIPS_ADDED,
            TripOp::Update(_) => TRIPS_UPDATED,
            TripOp::Delete(_) => TRIPS_DELETED,
            TripOp::Select(_) => TRIP_SELECTED,
        }
    }
}

// ============================================================================
// Reference model
// ============================================================================

#[derive(Default)]
struct Reference {
    trips: Vec<Trip>,
    selected: Option<String>,
}

impl Reference {
    fn apply(&mut self, op: &TripOp) {
        match op {
            TripOp::Add(trips) => {
                for trip in trips {
                    if self.trips.iter().all(|known| known.id != trip.id) {
                        self.trips.push(trip.clone());
                    }
                }
            }
            TripOp::Update(updates) => {
                for update in updates {
                    if let Some(trip) =
                        self.trips.iter_mut().find(|trip| trip.id == update.id)
                    {
                        apply_update(trip, update);
                    }
                }
            }
            TripOp::Delete(trip_ids) => {
                self.trips.retain(|trip| !trip_ids.contains(&trip.id));
                if self
                    .selected
                    .as_ref()
                    .is_some_and(|id| trip_ids.contains(id))
                {
                    self.selected = None;
                }
            }
            TripOp::Select(trip_id) => {
                self.selected = trip_id.clone().filter(|id| !id.is_empty());
            }
        }
    }
}

fn apply_update(trip: &mut Trip, update: &TripUpdate) {
    if let Some(name) = &update.name {
        trip.name = name.clone();
    }
    if let Some(start_date) = &update.start_date {
        trip.start_date = Some(start_date.clone());
    }
    if let Some(end_date) = &update.end_date {
        trip.end_date = Some(end_date.clone());
    }
    if let Some(center_latitude) = update.center_latitude {
        trip.center_latitude = center_latitude;
    }
    if let Some(center_longitude) = update.center_longitude {
        trip.center_longitude = center_longitude;
    }
    if let Some(zoom) = update.zoom {
        trip.zoom = zoom;
    }
    if let Some(places) = &update.places {
        trip.places = places.clone();
    }
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// Any sequence of trip operations leaves the same trips and selection
    /// as applying them one by one, with one result per call.
    #[test]
    fn prop_trip_ops_match_reference(
        batches in prop::collection::vec(
            prop::collection::vec(arb_op(), 1..4),
            0..8,
        )
    ) {
        let mut state = AgentState::new();
        let mut reference = Reference::default();
        let mut next_id = 0;

        for batch in &batches {
            let calls: Vec<_> = batch
                .iter()
                .map(|op| {
                    next_id += 1;
                    op.to_call(format!("call_{next_id}"))
                })
                .collect();
            state.push_message(Message::ToolCalls {
                content: None,
                calls: calls.clone(),
            });
            let first_result = state.messages.len();
            trips::run(&mut state);

            for op in batch {
                reference.apply(op);
            }

            let results = &state.messages[first_result..];
            prop_assert_eq!(results.len(), calls.len());
            for ((call, op), result) in calls.iter().zip(batch).zip(results) {
                let Message::ToolResult { call_id, content } = result else {
                    return Err(TestCaseError::fail(format!(
                        "expected a tool result, got {result:?}"
                    )));
                };
                prop_assert_eq!(call_id, &call.id);
                prop_assert!(
                    content.starts_with(op.ack()),
                    "unexpected result {:?} for {:?}",
                    content,
                    op
                );
            }

            prop_assert_eq!(&state.trips, &reference.trips);
            prop_assert_eq!(&state.selected_trip_id, &reference.selected);

            let mut ids: Vec<_> =
                state.trips.iter().map(|trip| trip.id.as_str()).collect();
            ids.sort_unstable();
            ids.dedup();
            prop_assert_eq!(ids.len(), state.trips.len());
        }
    }

    /// Deleting the selected trip clears the selection, deleting any other
    /// trip keeps it.
    #[test]
    fn prop_delete_clears_only_selected(
        collection in prop::collection::vec(arb_trip(), 0..5),
        selected in arb_trip_id(),
        deleted in prop::collection::vec(arb_trip_id(), 0..4),
    ) {
        let mut state = AgentState::new();
        trips::add_trips(&mut state, collection);
        state.select_trip(selected.clone());

        trips::delete_trips(&mut state, &deleted);

        if deleted.contains(&selected) {
            prop_assert_eq!(state.selected_trip_id, None);
        } else {
            prop_assert_eq!(state.selected_trip_id, Some(selected));
        }
        prop_assert!(
            state.trips.iter().all(|trip| !deleted.contains(&trip.id))
        );
    }

    #[test]
    fn prop_trip_round_trip(trip in arb_trip()) {
        let json = serde_json::to_string(&trip).unwrap();
        let decoded: Trip = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(decoded, trip);
    }
}
