use crate::filter::{
    DateBounds, DateInterval, FilterOutcome, apply_range, apply_range_grouped, apply_range_to_group,
};
use crate::indexer::{ActivityDateIndex, DATE_FORMAT, GroupedDateIndex, index_map, index_overlays, parse_date};
use crate::layers::{ActivityMap, Globals, LayerControl, LayerHost, LayerId};
use crate::locator::{AlertSink, find_control, locate_map, locate_map_and_control};
use chrono::{NaiveDate, NaiveTime};
use serde::Serialize;
use tracing::info;

#[derive(Debug, Clone)]
pub enum DateIndex {
    Single(ActivityDateIndex),
    Grouped(GroupedDateIndex),
}

impl DateIndex {
    pub fn bounds(&self) -> Option<DateBounds> {
        match self {
            DateIndex::Single(index) => DateBounds::of_index(index),
            DateIndex::Grouped(index) => DateBounds::of_groups(index),
        }
    }

    pub fn date_of(&self, layer: LayerId) -> Option<NaiveDate> {
        match self {
            DateIndex::Single(index) => index.get(layer),
            DateIndex::Grouped(index) => index.groups.values().find_map(|group| group.get(layer)),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct SliderRange {
    pub min: i64,
    pub max: i64,
}

// Values are epoch milliseconds.
#[derive(Debug, Clone, Serialize)]
pub struct SliderConfig {
    pub start: [i64; 2],
    pub connect: bool,
    pub range: SliderRange,
    pub format: &'static str,
    pub labels: [String; 2],
}

impl SliderConfig {
    pub fn from_bounds(bounds: DateBounds) -> Self {
        let min = epoch_millis(bounds.min);
        let max = epoch_millis(bounds.max);
        let (min_label, max_label) = bounds.formatted();
        Self {
            start: [min, max],
            connect: true,
            range: SliderRange { min, max },
            format: "YYYY-MM-DD",
            labels: [min_label, max_label],
        }
    }
}

pub fn epoch_millis(date: NaiveDate) -> i64 {
    date.and_time(NaiveTime::MIN).and_utc().timestamp_millis()
}

pub fn range_label(values: &[String; 2]) -> String {
    values.join(" - ")
}

pub fn parse_interval(values: &[String; 2]) -> Option<DateInterval> {
    let start = parse_date(values[0].trim())?;
    let end = parse_date(values[1].trim())?;
    Some(DateInterval::new(start, end))
}

#[derive(Debug, Clone)]
pub struct DateFilter {
    map: ActivityMap,
    control: Option<LayerControl>,
    index: Option<DateIndex>,
    committed: Option<DateInterval>,
}

impl DateFilter {
    pub fn single(map: ActivityMap, control: Option<LayerControl>) -> Self {
        let index = index_map(&map).map(DateIndex::Single);
        Self {
            map,
            control,
            index,
            committed: None,
        }
    }

    pub fn grouped(map: ActivityMap, control: LayerControl) -> Self {
        let index = index_overlays(&map, &control).map(DateIndex::Grouped);
        Self {
            map,
            control: Some(control),
            index,
            committed: None,
        }
    }

    pub fn from_globals(
        mut globals: Globals,
        grouped: bool,
        alerts: &mut dyn AlertSink,
    ) -> Option<Self> {
        if grouped {
            let (map, control) = locate_map_and_control(&mut globals, alerts)?;
            let control = control.clone();
            return Some(Self::grouped(std::mem::take(map), control));
        }

        let control = find_control(&globals).cloned();
        let map = locate_map(&mut globals, alerts)?;
        Some(Self::single(std::mem::take(map), control))
    }

    pub fn map(&self) -> &ActivityMap {
        &self.map
    }

    pub fn control(&self) -> Option<&LayerControl> {
        self.control.as_ref()
    }

    pub fn index(&self) -> Option<&DateIndex> {
        self.index.as_ref()
    }

    pub fn is_enabled(&self) -> bool {
        self.index.is_some()
    }

    pub fn slider(&self) -> Option<SliderConfig> {
        self.index
            .as_ref()
            .and_then(DateIndex::bounds)
            .map(SliderConfig::from_bounds)
    }

    pub fn on_set(&mut self, interval: DateInterval) -> Option<FilterOutcome> {
        let index = self.index.as_ref()?;
        let outcome = match index {
            DateIndex::Single(index) => apply_range(&mut self.map, index, interval),
            DateIndex::Grouped(index) => {
                let control = self.control.as_ref()?;
                apply_range_grouped(&mut self.map, control, index, interval)
            }
        };
        self.committed = Some(interval);
        info!(
            "filtered activities to {} - {}: {} attached, {} detached",
            interval.start.format(DATE_FORMAT),
            interval.end.format(DATE_FORMAT),
            outcome.attached,
            outcome.detached
        );
        Some(outcome)
    }

    /// Switching a group on re-applies the last committed interval to it.
    pub fn set_overlay_active(&mut self, name: &str, active: bool) -> Option<FilterOutcome> {
        let group = *self.control.as_ref()?.overlays.get(name)?;
        if !active {
            self.map.remove_layer(group);
            info!("overlay {name} hidden");
            return Some(FilterOutcome::default());
        }

        self.map.add_layer(group);
        info!("overlay {name} shown");
        let (Some(interval), Some(index), Some(control)) =
            (self.committed, self.index.as_ref(), self.control.as_ref())
        else {
            return Some(FilterOutcome::default());
        };
        let outcome = match index {
            DateIndex::Single(index) => apply_range(&mut self.map, index, interval),
            DateIndex::Grouped(index) => {
                apply_range_to_group(&mut self.map, control, index, name, interval)
            }
        };
        Some(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layers::{FeatureLayer, FeatureShape, GlobalValue, LayerKind, Popup, PopupContent};
    use crate::locator::MISSING_MAP;
    use serde_json::Map;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn dated(map: &mut ActivityMap, text: &str) -> LayerId {
        map.insert(
            LayerKind::Feature(FeatureLayer {
                shape: FeatureShape::GeoJson,
                coordinates: vec![[50.0, 14.4]],
                color: "magenta".into(),
                properties: Map::new(),
            }),
            Some(Popup {
                content: PopupContent::Text(text.into()),
                max_width: 500,
            }),
        )
    }

    fn two_groups() -> (ActivityMap, LayerControl, LayerId, LayerId) {
        let mut map = ActivityMap::default();
        let run = map.insert_group("Run");
        let bike = map.insert_group("Bike");
        let l1 = dated(&mut map, "2024-02-01<br>Run");
        let l2 = dated(&mut map, "2024-06-01<br>Bike");
        map.group_add_layer(run, l1);
        map.group_add_layer(bike, l2);
        map.add_layer(run);
        map.add_layer(bike);
        let mut control = LayerControl::default();
        control.overlays.insert("Run".into(), run);
        control.overlays.insert("Bike".into(), bike);
        (map, control, l1, l2)
    }

    #[test]
    fn slider_is_seeded_from_bounds() {
        let (map, control, _, _) = two_groups();
        let filter = DateFilter::grouped(map, control);
        let slider = filter.slider().expect("slider");
        assert_eq!(slider.labels, ["2024-02-01".to_string(), "2024-06-01".to_string()]);
        assert_eq!(slider.range.min, 1_706_745_600_000);
        assert!(slider.range.min <= slider.range.max);
        assert_eq!(slider.start, [slider.range.min, slider.range.max]);
    }

    #[test]
    fn no_dates_disables_slider() {
        let mut map = ActivityMap::default();
        let undated = dated(&mut map, "Morning jog");
        map.add_layer(undated);
        let mut filter = DateFilter::single(map, None);

        assert!(!filter.is_enabled());
        assert!(filter.slider().is_none());
        assert!(filter.on_set(DateInterval::new(ymd(2024, 1, 1), ymd(2024, 1, 2))).is_none());
        assert!(filter.map().has_layer(undated));
    }

    #[test]
    fn label_and_interval_come_from_slider_values() {
        let values = ["2024-03-01".to_string(), "2024-09-01".to_string()];
        assert_eq!(range_label(&values), "2024-03-01 - 2024-09-01");
        assert_eq!(
            parse_interval(&values),
            Some(DateInterval::new(ymd(2024, 3, 1), ymd(2024, 9, 1)))
        );
        assert_eq!(parse_interval(&["yesterday".into(), "2024-09-01".into()]), None);
    }

    #[test]
    fn reactivated_overlay_gets_committed_interval() {
        let (map, control, l1, l2) = two_groups();
        let mut filter = DateFilter::grouped(map, control);

        filter.set_overlay_active("Bike", false);
        filter.on_set(DateInterval::new(ymd(2024, 1, 1), ymd(2024, 3, 1)));
        assert!(filter.map().has_layer(l1));
        assert!(!filter.map().has_layer(l2));

        let outcome = filter.set_overlay_active("Bike", true).expect("known overlay");
        assert_eq!(outcome.detached, 1);
        assert!(!filter.map().has_layer(l2));
        assert!(filter.set_overlay_active("Swim", true).is_none());
    }

    #[test]
    fn globals_lookup_alerts_and_builds() {
        let mut alerts: Vec<String> = Vec::new();
        assert!(DateFilter::from_globals(Globals::default(), false, &mut alerts).is_none());
        assert_eq!(alerts, vec![MISSING_MAP.to_string()]);

        let (map, control, _, _) = two_groups();
        let mut globals = Globals::default();
        globals.insert("map_a1", GlobalValue::Map(map));
        globals.insert("layer_control_a1", GlobalValue::Control(control));
        let mut alerts: Vec<String> = Vec::new();
        let filter = DateFilter::from_globals(globals, true, &mut alerts).expect("filter");
        assert!(alerts.is_empty());
        assert!(matches!(filter.index(), Some(DateIndex::Grouped(_))));
        assert_eq!(filter.map().visible_features().len(), 2);
    }
}
