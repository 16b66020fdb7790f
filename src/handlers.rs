use crate::date_filter::{DateFilter, SliderConfig, parse_interval, range_label};
use crate::errors::AppError;
use crate::indexer::DATE_FORMAT;
use crate::layers::{FeatureShape, LayerHost, LayerKind};
use crate::models::{
    AlertsResponse, FilterResponse, LayersResponse, OverlayRequest, OverlayStatus,
    RangeLabelResponse, RangeRequest, TileStatus, VisibleLayer,
};
use crate::state::AppState;
use crate::ui::render_index;
use axum::{
    extract::{Path, State},
    response::Html,
    Json,
};

pub async fn index(State(state): State<AppState>) -> Html<String> {
    Html(render_index(&state.alerts))
}

pub async fn get_slider(State(state): State<AppState>) -> Json<Option<SliderConfig>> {
    let filter = state.filter.lock().await;
    Json(filter.as_ref().and_then(DateFilter::slider))
}

pub async fn range_update(Json(payload): Json<RangeRequest>) -> Json<RangeLabelResponse> {
    Json(RangeLabelResponse {
        label: range_label(&payload.values),
    })
}

pub async fn range_set(
    State(state): State<AppState>,
    Json(payload): Json<RangeRequest>,
) -> Result<Json<FilterResponse>, AppError> {
    let interval = parse_interval(&payload.values)
        .ok_or_else(|| AppError::bad_request("values must be two YYYY-MM-DD dates"))?;

    let mut guard = state.filter.lock().await;
    let filter = guard
        .as_mut()
        .ok_or_else(|| AppError::conflict("no activity map located"))?;
    let outcome = filter
        .on_set(interval)
        .ok_or_else(|| AppError::conflict("no dated activities to filter"))?;

    Ok(Json(FilterResponse {
        start: interval.start.format(DATE_FORMAT).to_string(),
        end: interval.end.format(DATE_FORMAT).to_string(),
        attached: outcome.attached,
        detached: outcome.detached,
        visible: filter.map().visible_features().len(),
    }))
}

pub async fn get_layers(State(state): State<AppState>) -> Json<LayersResponse> {
    let filter = state.filter.lock().await;
    Json(filter.as_ref().map(describe_layers).unwrap_or_default())
}

pub async fn set_overlay(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(payload): Json<OverlayRequest>,
) -> Result<Json<OverlayStatus>, AppError> {
    let mut guard = state.filter.lock().await;
    let filter = guard
        .as_mut()
        .ok_or_else(|| AppError::conflict("no activity map located"))?;
    filter
        .set_overlay_active(&name, payload.active)
        .ok_or_else(|| AppError::not_found(format!("unknown overlay '{name}'")))?;

    Ok(Json(OverlayStatus {
        name,
        active: payload.active,
    }))
}

pub async fn get_alerts(State(state): State<AppState>) -> Json<AlertsResponse> {
    Json(AlertsResponse {
        alerts: state.alerts.as_ref().clone(),
    })
}

fn describe_layers(filter: &DateFilter) -> LayersResponse {
    let map = filter.map();
    let mut response = LayersResponse {
        center: map.center,
        zoom: map.zoom_start,
        ..LayersResponse::default()
    };

    if let Some(control) = filter.control() {
        for (name, &id) in &control.base_layers {
            if let Some(LayerKind::Tile(tile)) = map.layer(id).map(|layer| &layer.kind) {
                response.tiles.push(TileStatus {
                    name: name.clone(),
                    url: tile.url.clone(),
                    attribution: tile.attribution.clone(),
                    active: map.has_layer(id),
                });
            }
        }
        response.overlays = control
            .overlays
            .iter()
            .map(|(name, &id)| OverlayStatus {
                name: name.clone(),
                active: map.has_layer(id),
            })
            .collect();
    }

    response.layers = map
        .visible_features()
        .into_iter()
        .filter_map(|id| {
            let layer = map.layer(id)?;
            let feature = layer.feature()?;
            Some(VisibleLayer {
                id: id.index(),
                group: map.owning_group(id).map(|group| group.name.clone()),
                color: feature.color.clone(),
                date: filter
                    .index()
                    .and_then(|index| index.date_of(id))
                    .map(|date| date.format(DATE_FORMAT).to_string()),
                popup: layer
                    .popup
                    .as_ref()
                    .map(|popup| popup.content.as_text().to_string()),
                popup_max_width: layer.popup.as_ref().map(|popup| popup.max_width),
                highlight: feature.shape == FeatureShape::GeoJson,
                coordinates: feature.coordinates.clone(),
            })
        })
        .collect();
    response
}
