use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct LayerId(usize);

impl LayerId {
    pub fn index(self) -> usize {
        self.0
    }
}

// Markup holds the inner HTML of the element wrapping the popup body.
#[derive(Debug, Clone)]
pub enum PopupContent {
    Text(String),
    Markup(String),
}

impl PopupContent {
    pub fn as_text(&self) -> &str {
        match self {
            PopupContent::Text(text) | PopupContent::Markup(text) => text,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Popup {
    pub content: PopupContent,
    pub max_width: u32,
}

#[derive(Debug, Clone)]
pub struct TileLayer {
    pub name: String,
    pub url: String,
    pub attribution: Option<String>,
}

// GeoJSON features take part in date filtering and highlighting; plain
// polylines are only drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureShape {
    GeoJson,
    Polyline,
}

#[derive(Debug, Clone)]
pub struct FeatureLayer {
    pub shape: FeatureShape,
    pub coordinates: Vec<[f64; 2]>,
    pub color: String,
    pub properties: Map<String, Value>,
}

#[derive(Debug, Clone)]
pub struct LayerGroup {
    pub name: String,
    members: BTreeSet<LayerId>,
}

impl LayerGroup {
    pub fn members(&self) -> impl Iterator<Item = LayerId> + '_ {
        self.members.iter().copied()
    }
}

#[derive(Debug, Clone)]
pub enum LayerKind {
    Tile(TileLayer),
    Feature(FeatureLayer),
    Group(LayerGroup),
}

#[derive(Debug, Clone)]
pub struct Layer {
    pub kind: LayerKind,
    pub popup: Option<Popup>,
}

impl Layer {
    pub fn feature(&self) -> Option<&FeatureLayer> {
        match &self.kind {
            LayerKind::Feature(feature) => Some(feature),
            _ => None,
        }
    }

    pub fn group(&self) -> Option<&LayerGroup> {
        match &self.kind {
            LayerKind::Group(group) => Some(group),
            _ => None,
        }
    }
}

pub trait LayerHost {
    fn has_layer(&self, id: LayerId) -> bool;
    fn add_layer(&mut self, id: LayerId);
    fn remove_layer(&mut self, id: LayerId);
}

// `attached` is flattened: members of an attached group are listed too.
#[derive(Debug, Clone, Default)]
pub struct ActivityMap {
    pub center: [f64; 2],
    pub zoom_start: u8,
    layers: Vec<Layer>,
    attached: BTreeSet<LayerId>,
}

impl ActivityMap {
    pub fn new(center: [f64; 2], zoom_start: u8) -> Self {
        Self {
            center,
            zoom_start,
            ..Self::default()
        }
    }

    pub fn insert(&mut self, kind: LayerKind, popup: Option<Popup>) -> LayerId {
        let id = LayerId(self.layers.len());
        self.layers.push(Layer { kind, popup });
        id
    }

    pub fn insert_group(&mut self, name: impl Into<String>) -> LayerId {
        self.insert(
            LayerKind::Group(LayerGroup {
                name: name.into(),
                members: BTreeSet::new(),
            }),
            None,
        )
    }

    pub fn layer(&self, id: LayerId) -> Option<&Layer> {
        self.layers.get(id.0)
    }

    pub fn group(&self, id: LayerId) -> Option<&LayerGroup> {
        self.layer(id).and_then(Layer::group)
    }

    pub fn each_layer<F>(&self, mut visit: F)
    where
        F: FnMut(LayerId, &Layer),
    {
        for &id in &self.attached {
            if let Some(layer) = self.layers.get(id.0) {
                visit(id, layer);
            }
        }
    }

    pub fn group_members(&self, group: LayerId) -> Vec<LayerId> {
        self.group(group)
            .map(|group| group.members().collect())
            .unwrap_or_default()
    }

    pub fn group_has_layer(&self, group: LayerId, id: LayerId) -> bool {
        self.group(group)
            .is_some_and(|group| group.members.contains(&id))
    }

    pub fn group_add_layer(&mut self, group: LayerId, id: LayerId) {
        let Some(LayerKind::Group(entry)) = self.layers.get_mut(group.0).map(|l| &mut l.kind)
        else {
            return;
        };
        entry.members.insert(id);
        if self.attached.contains(&group) {
            self.add_layer(id);
        }
    }

    pub fn group_remove_layer(&mut self, group: LayerId, id: LayerId) {
        let Some(LayerKind::Group(entry)) = self.layers.get_mut(group.0).map(|l| &mut l.kind)
        else {
            return;
        };
        entry.members.remove(&id);
        if self.attached.contains(&group) {
            self.remove_layer(id);
        }
    }

    pub fn visible_features(&self) -> Vec<LayerId> {
        let mut visible = Vec::new();
        self.each_layer(|id, layer| {
            if layer.feature().is_some() {
                visible.push(id);
            }
        });
        visible
    }

    pub fn owning_group(&self, id: LayerId) -> Option<&LayerGroup> {
        self.layers
            .iter()
            .filter_map(Layer::group)
            .find(|group| group.members.contains(&id))
    }
}

impl LayerHost for ActivityMap {
    fn has_layer(&self, id: LayerId) -> bool {
        self.attached.contains(&id)
    }

    fn add_layer(&mut self, id: LayerId) {
        if id.0 >= self.layers.len() || !self.attached.insert(id) {
            return;
        }
        for member in self.group_members(id) {
            self.add_layer(member);
        }
    }

    fn remove_layer(&mut self, id: LayerId) {
        if !self.attached.remove(&id) {
            return;
        }
        for member in self.group_members(id) {
            self.remove_layer(member);
        }
    }
}

pub struct GroupHost<'a> {
    pub map: &'a mut ActivityMap,
    pub group: LayerId,
}

impl LayerHost for GroupHost<'_> {
    fn has_layer(&self, id: LayerId) -> bool {
        self.map.group_has_layer(self.group, id)
    }

    fn add_layer(&mut self, id: LayerId) {
        self.map.group_add_layer(self.group, id);
    }

    fn remove_layer(&mut self, id: LayerId) {
        self.map.group_remove_layer(self.group, id);
    }
}

#[derive(Debug, Clone, Default)]
pub struct LayerControl {
    pub base_layers: BTreeMap<String, LayerId>,
    pub overlays: BTreeMap<String, LayerId>,
}

#[derive(Debug, Clone, Default)]
pub struct Globals {
    entries: BTreeMap<String, GlobalValue>,
}

#[derive(Debug, Clone)]
pub enum GlobalValue {
    Map(ActivityMap),
    Control(LayerControl),
}

impl Globals {
    pub fn insert(&mut self, name: impl Into<String>, value: GlobalValue) {
        self.entries.insert(name.into(), value);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &GlobalValue)> {
        self.entries.iter()
    }

    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut GlobalValue> {
        self.entries.values_mut()
    }
}
