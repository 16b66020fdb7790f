use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Activity {
    pub activity_id: u64,
    pub name: String,
    #[serde(rename = "type")]
    pub activity_type: String,
    pub date: String,
    #[serde(default)]
    pub time: Option<String>,
    /// Kilometres.
    pub distance: f64,
    /// Minutes.
    pub duration: f64,
    #[serde(default)]
    pub coordinates: Vec<[f64; 2]>,
}

impl Activity {
    pub fn has_gps_data(&self) -> bool {
        !self.coordinates.is_empty()
    }
}

#[derive(Debug, Deserialize)]
pub struct RangeRequest {
    pub values: [String; 2],
}

#[derive(Debug, Serialize)]
pub struct RangeLabelResponse {
    pub label: String,
}

#[derive(Debug, Serialize)]
pub struct FilterResponse {
    pub start: String,
    pub end: String,
    pub attached: usize,
    pub detached: usize,
    pub visible: usize,
}

#[derive(Debug, Deserialize)]
pub struct OverlayRequest {
    pub active: bool,
}

#[derive(Debug, Serialize)]
pub struct OverlayStatus {
    pub name: String,
    pub active: bool,
}

#[derive(Debug, Serialize)]
pub struct TileStatus {
    pub name: String,
    pub url: String,
    pub attribution: Option<String>,
    pub active: bool,
}

#[derive(Debug, Serialize)]
pub struct VisibleLayer {
    pub id: usize,
    pub group: Option<String>,
    pub color: String,
    pub date: Option<String>,
    pub popup: Option<String>,
    pub popup_max_width: Option<u32>,
    pub highlight: bool,
    pub coordinates: Vec<[f64; 2]>,
}

#[derive(Debug, Serialize, Default)]
pub struct LayersResponse {
    pub center: [f64; 2],
    pub zoom: u8,
    pub tiles: Vec<TileStatus>,
    pub overlays: Vec<OverlayStatus>,
    pub layers: Vec<VisibleLayer>,
}

#[derive(Debug, Serialize)]
pub struct AlertsResponse {
    pub alerts: Vec<String>,
}
