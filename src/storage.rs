use crate::config::Config;
use crate::models::Activity;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::{env, path::Path, path::PathBuf};
use tokio::fs;
use tracing::{debug, error, info, warn};

pub fn resolve_data_path() -> PathBuf {
    env::var("APP_DATA_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("data/activities.json"))
}

pub fn resolve_config_path() -> PathBuf {
    env::var("APP_CONFIG_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("data/config.json"))
}

const COORDINATES_DIR: &str = "coordinates";

#[derive(Debug, Deserialize)]
struct ActivityRow {
    activity_id: u64,
    name: String,
    #[serde(rename = "type")]
    activity_type: String,
    date: String,
    #[serde(default)]
    time: Option<String>,
    distance: f64,
    duration: f64,
    filename: String,
    has_gps_data: String,
}

#[derive(Debug, Deserialize)]
struct CoordinateRow {
    latitude: f64,
    longitude: f64,
}

async fn read_file(path: &Path, what: &str) -> Option<Vec<u8>> {
    match fs::read(path).await {
        Ok(bytes) => Some(bytes),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            info!("{what} file {} not found", path.display());
            None
        }
        Err(err) => {
            error!("failed to read {what} file {}: {err}", path.display());
            None
        }
    }
}

async fn load_json<T>(path: &Path, what: &str) -> Option<T>
where
    T: DeserializeOwned,
{
    let bytes = read_file(path, what).await?;
    match serde_json::from_slice(&bytes) {
        Ok(value) => Some(value),
        Err(err) => {
            error!("failed to parse {what} file {}: {err}", path.display());
            None
        }
    }
}

async fn load_csv<T>(path: &Path, what: &str) -> Option<Vec<T>>
where
    T: DeserializeOwned,
{
    let bytes = read_file(path, what).await?;
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(bytes.as_slice());
    match reader.deserialize().collect::<Result<Vec<T>, csv::Error>>() {
        Ok(rows) => Some(rows),
        Err(err) => {
            error!("failed to parse {what} file {}: {err}", path.display());
            None
        }
    }
}

fn is_csv(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
}

async fn read_coordinates(path: &Path) -> Vec<[f64; 2]> {
    load_csv::<CoordinateRow>(path, "coordinates")
        .await
        .unwrap_or_default()
        .into_iter()
        .map(|row| [row.latitude, row.longitude])
        .collect()
}

// Track points live next to the list, in `coordinates/<filename>.csv`.
async fn load_activities_csv(path: &Path) -> Vec<Activity> {
    let rows: Vec<ActivityRow> = load_csv(path, "activities").await.unwrap_or_default();
    let coordinates_dir = path
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .join(COORDINATES_DIR);

    let mut activities = Vec::with_capacity(rows.len());
    for row in rows {
        let coordinates = if row.has_gps_data == "True" {
            let file = coordinates_dir.join(format!("{}.csv", row.filename));
            let coordinates = read_coordinates(&file).await;
            if coordinates.is_empty() {
                warn!("activity {} has no track points in {}", row.activity_id, file.display());
            }
            coordinates
        } else {
            debug!("activity {} has no GPS data", row.activity_id);
            Vec::new()
        };
        activities.push(Activity {
            activity_id: row.activity_id,
            name: row.name,
            activity_type: row.activity_type,
            date: row.date,
            time: row.time.filter(|time| !time.is_empty()),
            distance: row.distance,
            duration: row.duration,
            coordinates,
        });
    }
    activities
}

pub async fn load_activities(path: &Path) -> Vec<Activity> {
    let activities: Vec<Activity> = if is_csv(path) {
        load_activities_csv(path).await
    } else {
        load_json(path, "activities").await.unwrap_or_default()
    };
    info!("found {} activities in {}", activities.len(), path.display());
    activities
}

pub async fn load_config(path: &Path) -> Config {
    load_json(path, "config").await.unwrap_or_default()
}
