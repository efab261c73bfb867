use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;
use trip_agent_core::services::{PlaceRecord, PlaceSearch, SearchError};

const TEXT_SEARCH_URL: &str =
    "https://maps.googleapis.com/maps/api/place/textsearch/json";

/// Place search backed by the Google Places Text Search API.
#[derive(Clone)]
pub struct GooglePlacesSearch {
    client: Client,
    api_key: String,
    endpoint: String,
}

impl GooglePlacesSearch {
    /// Creates a client authenticating with `api_key`.
    #[inline]
    pub fn new<S: Into<String>>(api_key: S) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            endpoint: TEXT_SEARCH_URL.to_owned(),
        }
    }

    /// Sends requests to `endpoint` instead of the public API.
    #[inline]
    pub fn with_endpoint<S: Into<String>>(mut self, endpoint: S) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

#[async_trait]
impl PlaceSearch for GooglePlacesSearch {
    async fn search(&self, query: &str) -> Result<Vec<PlaceRecord>, SearchError> {
        let url = Url::parse_with_params(
            &self.endpoint,
            &[("query", query), ("key", self.api_key.as_str())],
        )
        .map_err(|err| SearchError::Request(format!("invalid endpoint: {err}")))?;

        trace!("searching places for `{query}`");
        // Request errors carry the URL, which holds the key.
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|err| SearchError::Request(err.without_url().to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(SearchError::Service {
                status: status.to_string(),
                message: body,
            });
        }

        let body: TextSearchResponse = resp
            .json()
            .await
            .map_err(|err| SearchError::Decode(err.without_url().to_string()))?;
        into_records(body)
    }
}

#[derive(Debug, Deserialize)]
struct TextSearchResponse {
    status: String,
    #[serde(default)]
    error_message: Option<String>,
    #[serde(default)]
    results: Vec<TextSearchResult>,
}

#[derive(Debug, Deserialize)]
struct TextSearchResult {
    place_id: Option<String>,
    #[serde(default)]
    name: String,
    #[serde(default)]
    formatted_address: String,
    #[serde(default)]
    geometry: Geometry,
    rating: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
struct Geometry {
    #[serde(default)]
    location: Location,
}

#[derive(Debug, Default, Deserialize)]
struct Location {
    #[serde(default)]
    lat: f64,
    #[serde(default)]
    lng: f64,
}

fn into_records(
    resp: TextSearchResponse,
) -> Result<Vec<PlaceRecord>, SearchError> {
    match resp.status.as_str() {
        "OK" | "ZERO_RESULTS" => {}
        _ => {
            return Err(SearchError::Service {
                status: resp.status,
                message: resp.error_message.unwrap_or_default(),
            });
        }
    }

    Ok(resp
        .results
        .into_iter()
        .map(|result| PlaceRecord {
            id: result.place_id,
            name: result.name,
            address: result.formatted_address,
            latitude: result.geometry.location.lat,
            longitude: result.geometry.location.lng,
            rating: result.rating,
        })
        .collect())
}
