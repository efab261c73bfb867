//! Clients of the external services the agent calls.

mod google_places;
mod mapbox;

pub use google_places::GooglePlacesSearch;
pub use mapbox::MapboxRenderer;
