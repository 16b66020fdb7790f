use crate::config::{Config, TileConfig, TypeMapping};
use crate::errors::AppError;
use crate::indexer::DATE_PROPERTY;
use crate::layers::{
    ActivityMap, FeatureLayer, FeatureShape, GlobalValue, Globals, LayerControl, LayerHost,
    LayerKind, Popup, PopupContent, TileLayer,
};
use crate::models::Activity;
use serde_json::{Map, Value, json};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info};

pub const MAP_GLOBAL: &str = "map_activities";
pub const CONTROL_GLOBAL: &str = "layer_control_activities";

const POPUP_MAX_WIDTH: u32 = 500;
const MAPY_CZ_ATTRIBUTION: &str =
    "<a href=\"https://api.mapy.cz/copyright\" target=\"_blank\">&copy; Seznam.cz a.s. a další</a>";

// Unknown keys land in the first mapping and are reported once.
fn type_mapping<'a>(
    mappings: &'a [TypeMapping],
    type_key: &str,
    unmapped: &mut BTreeSet<String>,
) -> &'a TypeMapping {
    if let Some(mapping) = mappings.iter().find(|mapping| mapping.contains_key(type_key)) {
        return mapping;
    }
    if unmapped.insert(type_key.to_string()) {
        debug!(
            "unmapped activity type {type_key}, putting it into {}",
            mappings[0].name
        );
    }
    &mappings[0]
}

fn format_duration(minutes: f64) -> String {
    let hours = (minutes / 60.0).floor();
    let rest = minutes - hours * 60.0;
    format!("{}h {}m", hours as i64, rest as i64)
}

pub fn popup_html(activity: &Activity, group: &str, activity_url: &str) -> String {
    let when = match &activity.time {
        Some(time) => format!("{} {}", activity.date, time),
        None => activity.date.clone(),
    };
    format!(
        "{when}<br>{group}<br>{}<br>{} km, {}<br><a href='{activity_url}{id}' target='_blank'>Activity {id}</a>",
        activity.name,
        activity.distance,
        format_duration(activity.duration),
        id = activity.activity_id,
    )
}

pub fn map_center(activities: &[Activity], configured: Option<[f64; 2]>) -> [f64; 2] {
    if let Some(center) = configured {
        return center;
    }
    let mut sum = [0.0, 0.0];
    let mut count = 0u32;
    for activity in activities {
        let (Some(first), Some(last)) = (activity.coordinates.first(), activity.coordinates.last())
        else {
            continue;
        };
        sum[0] += first[0] + last[0];
        sum[1] += first[1] + last[1];
        count += 2;
    }
    if count == 0 {
        return [0.0, 0.0];
    }
    let center = [sum[0] / f64::from(count), sum[1] / f64::from(count)];
    debug!("calculated center point from all activities: {center:?}");
    center
}

fn tile_layer(tile: &TileConfig, mapy_cz_api_key: Option<&str>) -> Option<TileLayer> {
    if tile.tiles != "mapy.cz" {
        return Some(TileLayer {
            name: tile.name.clone(),
            url: tile.tiles.clone(),
            attribution: tile.attribution.clone(),
        });
    }
    let Some(key) = mapy_cz_api_key.filter(|key| !key.is_empty()) else {
        info!("no Mapy.cz API key configured, skipping {} tiles", tile.name);
        return None;
    };
    Some(TileLayer {
        name: tile.name.clone(),
        url: format!("https://api.mapy.cz/v1/maptiles/outdoor/256/{{z}}/{{x}}/{{y}}?apikey={key}"),
        attribution: Some(MAPY_CZ_ATTRIBUTION.to_string()),
    })
}

fn feature_properties(activity: &Activity, embed_date: bool) -> Map<String, Value> {
    let mut properties = Map::new();
    properties.insert("activity_id".into(), json!(activity.activity_id));
    properties.insert("name".into(), json!(activity.name));
    properties.insert("type".into(), json!(activity.activity_type));
    properties.insert("distance".into(), json!(activity.distance));
    if embed_date {
        properties.insert(DATE_PROPERTY.into(), json!(activity.date));
    }
    properties
}

pub fn build_scene(activities: &[Activity], config: &Config) -> Result<Globals, AppError> {
    let mappings = &config.activities.mapping;
    if mappings.is_empty() {
        return Err(AppError::config(
            "no activity type mappings configured, fix [activities][mapping]",
        ));
    }

    let tiles_config = &config.map_tiles;
    let mut map = ActivityMap::new(
        map_center(activities, tiles_config.center_point),
        tiles_config.zoom_start,
    );
    let mut control = LayerControl::default();

    let api_key = tiles_config.mapy_cz_api_key.as_deref();
    for tile in tiles_config.tiles.iter().filter_map(|tile| tile_layer(tile, api_key)) {
        let name = tile.name.clone();
        let id = map.insert(LayerKind::Tile(tile), None);
        if control.base_layers.is_empty() {
            map.add_layer(id);
        }
        control.base_layers.insert(name, id);
    }

    let shape = if config.activities.enable_activity_highlighting {
        FeatureShape::GeoJson
    } else {
        FeatureShape::Polyline
    };
    let mut groups = BTreeMap::new();
    let mut unmapped = BTreeSet::new();
    let mut count = 0usize;
    for activity in activities {
        if !activity.has_gps_data() {
            debug!("skipping activity {} without coordinates", activity.activity_id);
            continue;
        }
        let mapping = type_mapping(mappings, &activity.activity_type, &mut unmapped);
        let popup = Popup {
            content: PopupContent::Markup(popup_html(
                activity,
                &mapping.name,
                &config.activities.activity_url,
            )),
            max_width: POPUP_MAX_WIDTH,
        };
        let feature = LayerKind::Feature(FeatureLayer {
            shape,
            coordinates: activity.coordinates.clone(),
            color: mapping.color.clone(),
            properties: feature_properties(activity, config.activities.embed_date_property),
        });
        let layer = map.insert(feature, Some(popup));
        let group = *groups
            .entry(mapping.name.clone())
            .or_insert_with(|| map.insert_group(mapping.name.clone()));
        map.group_add_layer(group, layer);
        count += 1;
    }

    for (name, group) in &groups {
        map.add_layer(*group);
        control.overlays.insert(name.clone(), *group);
    }

    info!(
        "added {count} activities with GPS data divided into {} groups to the map",
        groups.len()
    );

    let mut globals = Globals::default();
    globals.insert(MAP_GLOBAL, GlobalValue::Map(map));
    globals.insert(CONTROL_GLOBAL, GlobalValue::Control(control));
    Ok(globals)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::date_filter::DateFilter;
    use crate::filter::DateInterval;
    use crate::locator::locate_map_and_control;
    use chrono::NaiveDate;

    fn activity(id: u64, activity_type: &str, date: &str, coordinates: Vec<[f64; 2]>) -> Activity {
        Activity {
            activity_id: id,
            name: format!("Activity {id}"),
            activity_type: activity_type.to_string(),
            date: date.to_string(),
            time: Some("07:30:00".to_string()),
            distance: 10.5,
            duration: 95.0,
            coordinates,
        }
    }

    #[test]
    fn popup_carries_date_group_and_link() {
        let html = popup_html(
            &activity(42, "running", "2024-03-15", vec![]),
            "Running",
            "https://example.com/activity/",
        );
        assert_eq!(
            html,
            "2024-03-15 07:30:00<br>Running<br>Activity 42<br>10.5 km, 1h 35m<br>\
             <a href='https://example.com/activity/42' target='_blank'>Activity 42</a>"
        );
    }

    #[test]
    fn center_is_mean_of_endpoints() {
        let activities = vec![
            activity(1, "running", "2024-01-01", vec![[50.0, 14.0], [51.0, 15.0]]),
            activity(2, "cycling", "2024-01-02", vec![]),
        ];
        assert_eq!(map_center(&activities, None), [50.5, 14.5]);
        assert_eq!(map_center(&activities, Some([1.0, 2.0])), [1.0, 2.0]);
        assert_eq!(map_center(&[], None), [0.0, 0.0]);
    }

    #[test]
    fn activities_are_grouped_by_mapping() {
        let activities = vec![
            activity(1, "running", "2024-01-01", vec![[50.0, 14.0]]),
            activity(2, "gravel_cycling", "2024-02-01", vec![[50.1, 14.1]]),
            activity(3, "kayaking", "2024-03-01", vec![[50.2, 14.2]]),
            activity(4, "hiking", "2024-04-01", vec![]),
        ];
        let mut globals = build_scene(&activities, &Config::default()).unwrap();
        let mut alerts: Vec<String> = Vec::new();
        let (map, control) = locate_map_and_control(&mut globals, &mut alerts).unwrap();

        assert_eq!(control.overlays.len(), 2);
        let running = control.overlays["Running"];
        assert_eq!(map.group_members(running).len(), 2);
        assert_eq!(map.group_members(control.overlays["Cycling"]).len(), 1);
        assert!(!control.overlays.contains_key("Hiking"));
        assert_eq!(map.visible_features().len(), 3);

        let base = &control.base_layers;
        assert!(map.has_layer(base["OpenStreetMap"]));
        assert!(!map.has_layer(base["OpenTopoMap"]));
    }

    #[test]
    fn mapy_cz_tiles_need_a_key() {
        let tile = TileConfig {
            name: "Mapy.cz".into(),
            tiles: "mapy.cz".into(),
            attribution: None,
        };
        assert!(tile_layer(&tile, None).is_none());
        let layer = tile_layer(&tile, Some("secret")).unwrap();
        assert!(layer.url.ends_with("apikey=secret"));
        assert!(layer.url.contains("/{z}/{x}/{y}"));
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn popup_dates_drive_grouped_filter_without_date_property() {
        let mut config = Config::default();
        config.activities.embed_date_property = false;
        let activities = vec![
            activity(1, "running", "2024-01-01", vec![[50.0, 14.0], [50.1, 14.1]]),
            activity(2, "cycling", "2024-06-15", vec![[49.0, 16.0], [49.1, 16.1]]),
        ];
        let globals = build_scene(&activities, &config).unwrap();
        let mut alerts: Vec<String> = Vec::new();
        let mut filter = DateFilter::from_globals(globals, true, &mut alerts).expect("filter");
        assert!(alerts.is_empty());

        let slider = filter.slider().expect("slider");
        assert_eq!(slider.labels, ["2024-01-01".to_string(), "2024-06-15".to_string()]);

        let outcome = filter
            .on_set(DateInterval::new(ymd(2024, 3, 1), ymd(2024, 9, 1)))
            .expect("enabled");
        assert_eq!(outcome.detached, 1);
        assert_eq!(filter.map().visible_features().len(), 1);
    }

    #[test]
    fn polylines_are_drawn_but_not_filtered() {
        let mut config = Config::default();
        config.activities.enable_activity_highlighting = false;
        let activities = vec![activity(1, "running", "2024-01-01", vec![[50.0, 14.0]])];
        let globals = build_scene(&activities, &config).unwrap();
        let mut alerts: Vec<String> = Vec::new();
        let filter = DateFilter::from_globals(globals, true, &mut alerts).expect("filter");

        assert_eq!(filter.map().visible_features().len(), 1);
        assert!(!filter.is_enabled());
        assert!(filter.slider().is_none());
    }

    #[test]
    fn empty_mapping_is_rejected() {
        let mut config = Config::default();
        config.activities.mapping.clear();
        assert!(build_scene(&[], &config).is_err());
    }
}
