use futures_util::StreamExt;
use futures_util::stream::FuturesUnordered;

use super::routed_call;
use crate::agent::ProgressHook;
use crate::capability::{self, SearchForPlacesArgs};
use crate::conversation::Message;
use crate::error::AgentError;
use crate::services::{PlaceRecord, PlaceSearch, SearchError};
use crate::state::{AgentState, Place, SearchProgress};

/// Runs every query of a `search_for_places` call and appends one tool
/// result with all places found.
///
/// Queries run concurrently. Places are ordered by query, then by the
/// order the service returned them in. A failing query is skipped, the
/// batch only fails if every query fails.
pub(crate) async fn run(
    state: &mut AgentState,
    place_search: &dyn PlaceSearch,
    on_progress: Option<&ProgressHook>,
) -> Result<(), AgentError> {
    let Some(call) = routed_call(state) else {
        warn!("search step reached without a tool call");
        return Ok(());
    };
    let SearchForPlacesArgs { queries } = match capability::decode_args(&call)
    {
        Ok(args) => args,
        Err(err) => {
            state.push_message(Message::tool_result(call.id, err.to_tool_result()));
            return Ok(());
        }
    };
    debug!("searching {} queries", queries.len());

    state.search_progress =
        queries.iter().map(SearchProgress::pending).collect();
    notify(state, on_progress);

    let mut pending: FuturesUnordered<_> = queries
        .iter()
        .enumerate()
        .map(|(idx, query)| async move {
            (idx, place_search.search(query).await)
        })
        .collect();

    let mut results: Vec<Option<Result<Vec<PlaceRecord>, SearchError>>> =
        queries.iter().map(|_| None).collect();
    while let Some((idx, result)) = pending.next().await {
        let progress = &mut state.search_progress[idx];
        progress.done = true;
        match &result {
            Ok(records) => {
                trace!("query `{}` found {} places", queries[idx], records.len());
                progress.results =
                    records.iter().map(|record| record.name.clone()).collect();
            }
            Err(err) => warn!("query `{}` failed: {err}", queries[idx]),
        }
        results[idx] = Some(result);
        notify(state, on_progress);
    }
    drop(pending);

    state.search_progress.clear();
    notify(state, on_progress);

    let mut places = vec![];
    let mut first_error = None;
    let mut succeeded = 0;
    for (idx, result) in results.into_iter().enumerate() {
        match result {
            Some(Ok(records)) => {
                succeeded += 1;
                places.extend(
                    records
                        .into_iter()
                        .map(|record| Place::from_record(record, idx)),
                );
            }
            Some(Err(err)) => {
                first_error.get_or_insert(err);
            }
            None => {}
        }
    }
    if succeeded == 0 {
        if let Some(err) = first_error {
            return Err(AgentError::Search(err));
        }
    }

    let content = format!(
        "Added the following search results: {}",
        serde_json::to_string(&places)?
    );
    state.push_message(Message::tool_result(call.id, content));
    Ok(())
}

#[inline]
fn notify(state: &AgentState, on_progress: Option<&ProgressHook>) {
    if let Some(on_progress) = on_progress {
        on_progress(state.search_progress.as_slice());
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use serde_json::json;
    use trip_agent_model::ToolCallRequest;

    use super::*;
    use crate::testing::{FakePlaceSearch, record};

    fn search_state(queries: &[&str]) -> AgentState {
        let mut state = AgentState::new();
        state.push_message(Message::ToolCalls {
            content: None,
            calls: vec![ToolCallRequest {
                id: "call_1".to_owned(),
                name: "search_for_places".to_owned(),
                arguments: json!({ "queries": queries }),
            }],
        });
        state
    }

    fn result_places(state: &AgentState) -> Vec<Place> {
        let Some(Message::ToolResult { call_id, content }) = state.last_message()
        else {
            panic!("no tool result appended");
        };
        assert_eq!(call_id, "call_1");
        let json = content
            .strip_prefix("Added the following search results: ")
            .unwrap();
        serde_json::from_str(json).unwrap()
    }

    #[tokio::test]
    async fn test_results_ordered_by_query() {
        // The first query finishes last.
        let search = FakePlaceSearch::default()
            .with_results(
                "coffee shop",
                vec![record(Some("c1"), "Kurasu"), record(None, "Weekenders")],
            )
            .with_results(
                "museum",
                vec![record(Some("m1"), "Kyoto National Museum"), record(Some("m2"), "Miho")],
            )
            .with_delay("coffee shop", Duration::from_millis(20));

        let mut state = search_state(&["coffee shop", "museum"]);
        run(&mut state, &search, None).await.unwrap();

        let places = result_places(&state);
        let ids: Vec<_> = places.iter().map(|place| place.id.as_str()).collect();
        assert_eq!(ids, ["c1", "Weekenders-0", "m1", "m2"]);
        assert_eq!(state.messages.len(), 2);
        assert!(state.search_progress.is_empty());
    }

    #[tokio::test]
    async fn test_progress_reported() {
        let search = FakePlaceSearch::default()
            .with_results("museum", vec![record(Some("m1"), "Miho")]);
        let snapshots = Arc::new(Mutex::new(Vec::<Vec<SearchProgress>>::new()));
        let on_progress: ProgressHook = {
            let snapshots = Arc::clone(&snapshots);
            Arc::new(move |progress| {
                snapshots.lock().unwrap().push(progress.to_vec())
            })
        };

        let mut state = search_state(&["museum"]);
        run(&mut state, &search, Some(&on_progress)).await.unwrap();

        let snapshots = snapshots.lock().unwrap();
        assert_eq!(snapshots.len(), 3);
        assert!(!snapshots[0][0].done);
        assert!(snapshots[1][0].done);
        assert_eq!(snapshots[1][0].results, ["Miho"]);
        assert!(snapshots[2].is_empty());
    }

    #[tokio::test]
    async fn test_failed_query_skipped() {
        let search = FakePlaceSearch::default()
            .with_results("museum", vec![record(Some("m1"), "Miho")]);

        let mut state = search_state(&["haunted castle", "museum"]);
        run(&mut state, &search, None).await.unwrap();

        let places = result_places(&state);
        assert_eq!(places.len(), 1);
        assert_eq!(places[0].id, "m1");
        assert_eq!(search.queries().len(), 2);
    }

    #[tokio::test]
    async fn test_all_queries_failed() {
        let search = FakePlaceSearch::default();
        let mut state = search_state(&["haunted castle"]);
        let err = run(&mut state, &search, None).await.unwrap_err();

        assert!(matches!(err, AgentError::Search(_)));
        assert!(state.search_progress.is_empty());
    }

    #[tokio::test]
    async fn test_invalid_arguments() {
        let mut state = AgentState::new();
        state.push_message(Message::ToolCalls {
            content: None,
            calls: vec![ToolCallRequest {
                id: "call_1".to_owned(),
                name: "search_for_places".to_owned(),
                arguments: json!({ "query": "museum" }),
            }],
        });
        run(&mut state, &FakePlaceSearch::default(), None)
            .await
            .unwrap();

        let Some(Message::ToolResult { content, .. }) = state.last_message() else {
            panic!("no tool result appended");
        };
        assert!(content.starts_with("Error: invalid arguments"));
    }
}
