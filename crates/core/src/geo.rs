//! GeoJSON types for trip maps.

use serde::{Deserialize, Serialize};

use crate::state::Place;

/// A GeoJSON `FeatureCollection` of places.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub struct FeatureCollection {
    /// The features, in place order.
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    /// Builds one point feature per place, keeping their order.
    pub fn from_places(places: &[Place]) -> Self {
        Self {
            features: places.iter().map(Feature::from_place).collect(),
        }
    }
}

/// A GeoJSON `Feature` describing one place.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub struct Feature {
    /// Location of the place.
    pub geometry: Geometry,
    /// Descriptive properties of the place.
    pub properties: PlaceProperties,
}

impl Feature {
    fn from_place(place: &Place) -> Self {
        Self {
            geometry: Geometry::Point {
                coordinates: [place.longitude, place.latitude],
            },
            properties: PlaceProperties {
                id: place.id.clone(),
                name: place.name.clone(),
                address: place.address.clone(),
                rating: place.rating,
                description: place.description.clone(),
            },
        }
    }
}

/// A GeoJSON geometry. Only points are needed for places.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Geometry {
    /// A single position.
    Point {
        /// `[longitude, latitude]`, in that order as GeoJSON requires.
        coordinates: [f64; 2],
    },
}

/// The `properties` member of a place feature.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlaceProperties {
    /// Place id.
    pub id: String,
    /// Place name.
    pub name: String,
    /// Formatted address.
    pub address: String,
    /// Rating from 0 to 5, used to color the marker.
    pub rating: f64,
    /// Optional description, `null` when absent.
    pub description: Option<String>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::testing::kyoto_trip;

    #[test]
    fn test_feature_collection_json() {
        let trip = kyoto_trip();
        let collection = FeatureCollection::from_places(&trip.places);
        assert_eq!(
            serde_json::to_value(&collection).unwrap(),
            json!({
                "type": "FeatureCollection",
                "features": [{
                    "type": "Feature",
                    "geometry": {
                        "type": "Point",
                        "coordinates": [135.7727, 34.9671]
                    },
                    "properties": {
                        "id": "fushimi",
                        "name": "Fushimi Inari Taisha",
                        "address": "68 Fukakusa Yabunouchicho, Kyoto",
                        "rating": 4.7,
                        "description": "Thousands of vermilion torii gates."
                    }
                }]
            })
        );
    }

    #[test]
    fn test_empty_trip() {
        let collection = FeatureCollection::from_places(&[]);
        assert_eq!(
            serde_json::to_value(&collection).unwrap(),
            json!({ "type": "FeatureCollection", "features": [] })
        );
    }
}
