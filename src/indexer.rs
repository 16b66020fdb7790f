use crate::layers::{ActivityMap, FeatureShape, Layer, LayerControl, LayerId};
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub const DATE_PROPERTY: &str = "date";

static DATE_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[0-9]{4}-[0-9]{2}-[0-9]{2}").expect("valid date pattern"));

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActivityDateIndex {
    entries: BTreeMap<LayerId, NaiveDate>,
}

impl ActivityDateIndex {
    pub fn get(&self, layer: LayerId) -> Option<NaiveDate> {
        self.entries.get(&layer).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (LayerId, NaiveDate)> + '_ {
        self.entries.iter().map(|(layer, date)| (*layer, *date))
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.entries.values().copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(LayerId, NaiveDate)> for ActivityDateIndex {
    fn from_iter<T: IntoIterator<Item = (LayerId, NaiveDate)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupedDateIndex {
    pub groups: BTreeMap<String, ActivityDateIndex>,
}

impl GroupedDateIndex {
    pub fn group(&self, name: &str) -> Option<&ActivityDateIndex> {
        self.groups.get(name)
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.groups.values().flat_map(ActivityDateIndex::dates)
    }

    pub fn len(&self) -> usize {
        self.groups.values().map(ActivityDateIndex::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub fn find_date_token(text: &str) -> Option<&str> {
    DATE_TOKEN.find(text).map(|found| found.as_str())
}

pub fn parse_date(token: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(token, DATE_FORMAT).ok()
}

// Only GeoJSON features are indexed. The `date` property wins over the popup text.
pub fn layer_date(layer: &Layer) -> Option<NaiveDate> {
    let feature = layer.feature().filter(|f| f.shape == FeatureShape::GeoJson)?;

    let token = match feature.properties.get(DATE_PROPERTY).and_then(|v| v.as_str()) {
        Some(value) => value,
        None => find_date_token(layer.popup.as_ref()?.content.as_text())?,
    };

    let date = parse_date(token);
    if date.is_none() {
        warn!("skipping layer with malformed date {token:?}");
    }
    date
}

fn index_layers<I>(map: &ActivityMap, layers: I) -> ActivityDateIndex
where
    I: IntoIterator<Item = LayerId>,
{
    layers
        .into_iter()
        .filter_map(|id| {
            let date = map.layer(id).and_then(layer_date);
            if date.is_none() {
                debug!("layer {} has no activity date", id.index());
            }
            date.map(|date| (id, date))
        })
        .collect()
}

pub fn index_map(map: &ActivityMap) -> Option<ActivityDateIndex> {
    let mut candidates = Vec::new();
    map.each_layer(|id, layer| {
        if layer.feature().is_some() {
            candidates.push(id);
        }
    });

    let index = index_layers(map, candidates);
    if index.is_empty() {
        info!("no dates found");
        return None;
    }
    info!("indexed {} dated activities", index.len());
    Some(index)
}

pub fn index_overlays(map: &ActivityMap, control: &LayerControl) -> Option<GroupedDateIndex> {
    let groups: BTreeMap<String, ActivityDateIndex> = control
        .overlays
        .iter()
        .map(|(name, &group)| {
            let members = map.group_members(group).into_iter().filter(|&id| {
                map.layer(id).is_some_and(|layer| layer.feature().is_some())
            });
            (name.clone(), index_layers(map, members))
        })
        .collect();

    let index = GroupedDateIndex { groups };
    if index.is_empty() {
        info!("no dates found");
        return None;
    }
    info!(
        "indexed {} dated activities in {} overlay groups",
        index.len(),
        index.groups.len()
    );
    Some(index)
}
