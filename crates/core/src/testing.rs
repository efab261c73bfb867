//! Fixtures and in-memory collaborators for tests.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::services::{
    MapRenderer, MapRequest, PlaceRecord, PlaceSearch, RenderError,
    SearchError,
};
use crate::state::{Place, Trip};

pub fn kyoto_trip() -> Trip {
    Trip {
        id: "kyoto".to_owned(),
        name: "Temples of Kyoto".to_owned(),
        start_date: Some("2026-11-02".to_owned()),
        end_date: Some("2026-11-05".to_owned()),
        center_latitude: 35.0116,
        center_longitude: 135.7681,
        zoom: 12,
        places: vec![Place {
            id: "fushimi".to_owned(),
            name: "Fushimi Inari Taisha".to_owned(),
            address: "68 Fukakusa Yabunouchicho, Kyoto".to_owned(),
            latitude: 34.9671,
            longitude: 135.7727,
            rating: 4.7,
            description: Some("Thousands of vermilion torii gates.".to_owned()),
        }],
    }
}

pub fn osaka_trip() -> Trip {
    Trip {
        id: "osaka".to_owned(),
        name: "Eating through Osaka".to_owned(),
        start_date: None,
        end_date: None,
        center_latitude: 34.6937,
        center_longitude: 135.5023,
        zoom: 11,
        places: vec![],
    }
}

pub fn record(id: Option<&str>, name: &str) -> PlaceRecord {
    PlaceRecord {
        id: id.map(str::to_owned),
        name: name.to_owned(),
        address: format!("{name}, Kyoto"),
        latitude: 35.0,
        longitude: 135.7,
        rating: Some(4.2),
    }
}

#[derive(Default)]
struct SearchScript {
    results: HashMap<String, Vec<PlaceRecord>>,
    delays: HashMap<String, Duration>,
    queries: Vec<String>,
}

/// A place search answering from canned results.
///
/// Queries without canned results fail.
#[derive(Clone, Default)]
pub struct FakePlaceSearch {
    script: Arc<Mutex<SearchScript>>,
}

impl FakePlaceSearch {
    pub fn with_results(self, query: &str, records: Vec<PlaceRecord>) -> Self {
        self.script
            .lock()
            .unwrap()
            .results
            .insert(query.to_owned(), records);
        self
    }

    pub fn with_delay(self, query: &str, delay: Duration) -> Self {
        self.script
            .lock()
            .unwrap()
            .delays
            .insert(query.to_owned(), delay);
        self
    }

    /// Queries received so far, in call order.
    pub fn queries(&self) -> Vec<String> {
        self.script.lock().unwrap().queries.clone()
    }
}

#[async_trait]
impl PlaceSearch for FakePlaceSearch {
    async fn search(&self, query: &str) -> Result<Vec<PlaceRecord>, SearchError> {
        let (delay, result) = {
            let mut script = self.script.lock().unwrap();
            script.queries.push(query.to_owned());
            (
                script.delays.get(query).copied(),
                script.results.get(query).cloned(),
            )
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        result.ok_or_else(|| SearchError::Service {
            status: "INVALID_REQUEST".to_owned(),
            message: format!("no canned results for `{query}`"),
        })
    }
}

/// A map renderer that records requests instead of drawing.
#[derive(Clone)]
pub struct FakeMapRenderer {
    requests: Arc<Mutex<Vec<MapRequest>>>,
    path: PathBuf,
    fail: bool,
}

impl Default for FakeMapRenderer {
    fn default() -> Self {
        Self {
            requests: Default::default(),
            path: PathBuf::from("/tmp/trip_map.html"),
            fail: false,
        }
    }
}

impl FakeMapRenderer {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn requests(&self) -> Vec<MapRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl MapRenderer for FakeMapRenderer {
    async fn render(&self, request: MapRequest) -> Result<PathBuf, RenderError> {
        self.requests.lock().unwrap().push(request);
        if self.fail {
            return Err(RenderError::Other("renderer unavailable".to_owned()));
        }
        Ok(self.path.clone())
    }
}
