use std::path::{self, PathBuf};

use async_trait::async_trait;
use serde_json::{Value, json};
use trip_agent_core::services::{MapRenderer, MapRequest, RenderError};

static TEMPLATE: &str = include_str!("mapbox/map.html");

const STYLE_URL: &str = "mapbox://styles/mapbox/outdoors-v11";
const BELOW_LAYER: &str = "poi-label";
const WIDTH: &str = "1000px";
const HEIGHT: &str = "400px";
/// YlGnBu, one color per rating from 0 to 5.
const COLOR_STOPS: [(u8, &str); 6] = [
    (0, "#ffffcc"),
    (1, "#c7e9b4"),
    (2, "#7fcdbb"),
    (3, "#41b6c4"),
    (4, "#2c7fb8"),
    (5, "#253494"),
];

/// Renders trips to a standalone Mapbox GL JS page, with one circle per
/// place colored by rating.
pub struct MapboxRenderer {
    access_token: String,
    path: PathBuf,
}

impl MapboxRenderer {
    /// Creates a renderer writing pages to `path`.
    #[inline]
    pub fn new<S: Into<String>, P: Into<PathBuf>>(access_token: S, path: P) -> Self {
        Self {
            access_token: access_token.into(),
            path: path.into(),
        }
    }

    fn render_html(&self, request: &MapRequest) -> Result<String, serde_json::Error> {
        let mut color = vec![
            json!("interpolate"),
            json!(["linear"]),
            json!(["get", "rating"]),
        ];
        for (rating, hex) in COLOR_STOPS {
            color.push(json!(rating));
            color.push(json!(hex));
        }

        let config = json!({
            "style": STYLE_URL,
            "center": request.center,
            // The page shows a little more than the trip's own zoom.
            "zoom": request.zoom.saturating_sub(1),
            "data": request.features,
            "below_layer": BELOW_LAYER,
            "layer": {
                "id": "places",
                "type": "circle",
                "source": "places",
                "paint": {
                    "circle-color": Value::Array(color),
                    "circle-radius": 3,
                    "circle-stroke-color": "black",
                    "circle-stroke-width": 1,
                },
            },
        });

        Ok(TEMPLATE
            .replace("{{TITLE}}", &escape_html(&request.trip_id))
            .replace("{{WIDTH}}", WIDTH)
            .replace("{{HEIGHT}}", HEIGHT)
            .replace("{{ACCESS_TOKEN}}", &script_json(&self.access_token)?)
            .replace("{{CONFIG}}", &script_json(&config)?))
    }
}

#[async_trait]
impl MapRenderer for MapboxRenderer {
    async fn render(&self, request: MapRequest) -> Result<PathBuf, RenderError> {
        let html = self
            .render_html(&request)
            .map_err(|err| RenderError::Other(err.to_string()))?;
        let path = path::absolute(&self.path).map_err(|source| RenderError::Io {
            path: self.path.clone(),
            source,
        })?;

        tokio::fs::write(&path, html)
            .await
            .map_err(|source| RenderError::Io {
                path: path.clone(),
                source,
            })?;
        debug!("wrote map of trip `{}` to {}", request.trip_id, path.display());
        Ok(path)
    }
}

/// Serializes `value` for embedding in a `<script>` element.
fn script_json<T: serde::Serialize + ?Sized>(
    value: &T,
) -> Result<String, serde_json::Error> {
    Ok(serde_json::to_string(value)?.replace("</", "<\\/"))
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
