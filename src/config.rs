use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Config {
    pub activities: ActivitiesConfig,
    pub filter: FilterConfig,
    pub map_tiles: MapTilesConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ActivitiesConfig {
    pub mapping: Vec<TypeMapping>,
    pub activity_url: String,
    pub embed_date_property: bool,
    pub enable_activity_highlighting: bool,
}

impl Default for ActivitiesConfig {
    fn default() -> Self {
        Self {
            mapping: default_mappings(),
            activity_url: "https://connect.garmin.com/modern/activity/".to_string(),
            embed_date_property: true,
            enable_activity_highlighting: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct TypeMapping {
    pub name: String,
    pub color: String,
    #[serde(default)]
    pub type_keys: Vec<String>,
}

impl TypeMapping {
    fn new(name: &str, color: &str, type_keys: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            color: color.to_string(),
            type_keys: type_keys.iter().map(|key| key.to_string()).collect(),
        }
    }

    pub fn contains_key(&self, type_key: &str) -> bool {
        self.type_keys.iter().any(|key| key == type_key)
    }
}

fn default_mappings() -> Vec<TypeMapping> {
    vec![
        TypeMapping::new(
            "Running",
            "deepskyblue",
            &["running", "track_running", "trail_running"],
        ),
        TypeMapping::new("Inline", "limegreen", &["inline_skating"]),
        TypeMapping::new(
            "Skiing",
            "deeppink",
            &[
                "resort_skiing",
                "resort_snowboarding",
                "resort_skiing_snowboarding_ws",
            ],
        ),
        TypeMapping::new(
            "Crosscountry",
            "magenta",
            &[
                "skate_skiing_ws",
                "cross_country_skiing_ws",
                "backcountry_skiing",
            ],
        ),
        TypeMapping::new("Hiking", "yellow", &["hiking", "walking"]),
        TypeMapping::new(
            "Cycling",
            "darkorange",
            &["cycling", "mountain_biking", "gravel_cycling"],
        ),
    ]
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct FilterConfig {
    pub grouped: bool,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self { grouped: true }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct MapTilesConfig {
    pub tiles: Vec<TileConfig>,
    pub zoom_start: u8,
    pub center_point: Option<[f64; 2]>,
    pub mapy_cz_api_key: Option<String>,
}

impl Default for MapTilesConfig {
    fn default() -> Self {
        Self {
            tiles: vec![
                TileConfig {
                    name: "OpenStreetMap".to_string(),
                    tiles: "https://tile.openstreetmap.org/{z}/{x}/{y}.png".to_string(),
                    attribution: Some("&copy; OpenStreetMap contributors".to_string()),
                },
                TileConfig {
                    name: "OpenTopoMap".to_string(),
                    tiles: "https://{s}.tile.opentopomap.org/{z}/{x}/{y}.png".to_string(),
                    attribution: Some("&copy; OpenTopoMap (CC-BY-SA)".to_string()),
                },
            ],
            zoom_start: 8,
            center_point: None,
            mapy_cz_api_key: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TileConfig {
    pub name: String,
    // URL template, or `mapy.cz` for the keyed Mapy.cz outdoor tiles.
    pub tiles: String,
    #[serde(default)]
    pub attribution: Option<String>,
}
