use crate::indexer::{ActivityDateIndex, DATE_FORMAT, GroupedDateIndex};
use crate::layers::{ActivityMap, GroupHost, LayerControl, LayerHost};
use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, info};

// Closed interval. A reversed one contains nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateInterval {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateInterval {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateBounds {
    pub min: NaiveDate,
    pub max: NaiveDate,
}

impl DateBounds {
    pub fn from_dates<I>(dates: I) -> Option<Self>
    where
        I: IntoIterator<Item = NaiveDate>,
    {
        let bounds = dates.into_iter().fold(None, |bounds: Option<Self>, date| {
            Some(match bounds {
                Some(bounds) => Self {
                    min: bounds.min.min(date),
                    max: bounds.max.max(date),
                },
                None => Self {
                    min: date,
                    max: date,
                },
            })
        });
        if bounds.is_none() {
            info!("no dates found");
        }
        bounds
    }

    pub fn of_index(index: &ActivityDateIndex) -> Option<Self> {
        Self::from_dates(index.dates())
    }

    pub fn of_groups(index: &GroupedDateIndex) -> Option<Self> {
        Self::from_dates(index.dates())
    }

    pub fn formatted(&self) -> (String, String) {
        (
            self.min.format(DATE_FORMAT).to_string(),
            self.max.format(DATE_FORMAT).to_string(),
        )
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FilterOutcome {
    pub attached: usize,
    pub detached: usize,
}

impl FilterOutcome {
    fn merge(&mut self, other: FilterOutcome) {
        self.attached += other.attached;
        self.detached += other.detached;
    }
}

/// Layers missing from the index are left alone.
pub fn apply_range<H>(host: &mut H, index: &ActivityDateIndex, interval: DateInterval) -> FilterOutcome
where
    H: LayerHost + ?Sized,
{
    let mut outcome = FilterOutcome::default();
    for (layer, date) in index.iter() {
        if interval.contains(date) {
            if !host.has_layer(layer) {
                host.add_layer(layer);
                outcome.attached += 1;
            }
        } else if host.has_layer(layer) {
            host.remove_layer(layer);
            outcome.detached += 1;
        }
    }
    outcome
}

pub fn apply_range_to_group(
    map: &mut ActivityMap,
    control: &LayerControl,
    index: &GroupedDateIndex,
    name: &str,
    interval: DateInterval,
) -> FilterOutcome {
    let (Some(&group), Some(entries)) = (control.overlays.get(name), index.group(name)) else {
        return FilterOutcome::default();
    };
    if !map.has_layer(group) {
        debug!("overlay {name} is inactive, leaving it unfiltered");
        return FilterOutcome::default();
    }
    apply_range(&mut GroupHost { map, group }, entries, interval)
}

pub fn apply_range_grouped(
    map: &mut ActivityMap,
    control: &LayerControl,
    index: &GroupedDateIndex,
    interval: DateInterval,
) -> FilterOutcome {
    let mut outcome = FilterOutcome::default();
    for name in index.groups.keys() {
        outcome.merge(apply_range_to_group(map, control, index, name, interval));
    }
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layers::{FeatureLayer, FeatureShape, LayerId, LayerKind};
    use chrono::Duration;
    use serde_json::Map;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn feature(map: &mut ActivityMap) -> LayerId {
        map.insert(
            LayerKind::Feature(FeatureLayer {
                shape: FeatureShape::GeoJson,
                coordinates: vec![[49.0, 16.0]],
                color: "darkorange".into(),
                properties: Map::new(),
            }),
            None,
        )
    }

    fn scenario_b() -> (ActivityMap, [LayerId; 3], ActivityDateIndex) {
        let mut map = ActivityMap::default();
        let layers = [feature(&mut map), feature(&mut map), feature(&mut map)];
        for id in layers {
            map.add_layer(id);
        }
        let index = [
            (layers[0], ymd(2024, 1, 1)),
            (layers[1], ymd(2024, 6, 15)),
            (layers[2], ymd(2024, 12, 31)),
        ]
        .into_iter()
        .collect();
        (map, layers, index)
    }

    #[test]
    fn min_max_over_index() {
        let (_, _, index) = scenario_b();
        let bounds = DateBounds::of_index(&index).expect("bounds");
        assert!(bounds.min <= bounds.max);
        assert_eq!(
            bounds.formatted(),
            ("2024-01-01".to_string(), "2024-12-31".to_string())
        );
    }

    #[test]
    fn min_max_absent_for_empty_index() {
        assert_eq!(DateBounds::of_index(&ActivityDateIndex::default()), None);
        assert_eq!(DateBounds::of_groups(&GroupedDateIndex::default()), None);
    }

    #[test]
    fn range_keeps_only_dates_inside() {
        let (mut map, [l1, l2, l3], index) = scenario_b();
        let outcome = apply_range(
            &mut map,
            &index,
            DateInterval::new(ymd(2024, 3, 1), ymd(2024, 9, 1)),
        );

        assert!(!map.has_layer(l1));
        assert!(map.has_layer(l2));
        assert!(!map.has_layer(l3));
        assert_eq!(outcome, FilterOutcome { attached: 0, detached: 2 });
    }

    #[test]
    fn second_application_changes_nothing() {
        let (mut map, _, index) = scenario_b();
        let interval = DateInterval::new(ymd(2024, 3, 1), ymd(2024, 9, 1));
        apply_range(&mut map, &index, interval);
        let visible = map.visible_features();

        let outcome = apply_range(&mut map, &index, interval);
        assert_eq!(outcome, FilterOutcome::default());
        assert_eq!(map.visible_features(), visible);
    }

    #[test]
    fn bounds_are_inclusive() {
        let (mut map, [l1, l2, l3], index) = scenario_b();
        apply_range(&mut map, &index, DateInterval::new(ymd(2024, 6, 15), ymd(2024, 6, 15)));
        assert_eq!(map.visible_features(), vec![l2]);

        let start = ymd(2024, 1, 1) + Duration::days(1);
        let end = ymd(2024, 12, 31) - Duration::days(1);
        apply_range(&mut map, &index, DateInterval::new(start, end));
        assert_eq!(map.visible_features(), vec![l2]);

        let outcome = apply_range(
            &mut map,
            &index,
            DateInterval::new(ymd(2024, 1, 1), ymd(2024, 12, 31)),
        );
        assert_eq!(outcome.attached, 2);
        assert_eq!(map.visible_features(), vec![l1, l2, l3]);
    }

    #[test]
    fn reversed_interval_shows_nothing() {
        let (mut map, _, index) = scenario_b();
        apply_range(&mut map, &index, DateInterval::new(ymd(2024, 12, 31), ymd(2024, 1, 1)));
        assert!(map.visible_features().is_empty());
    }

    #[test]
    fn unindexed_layers_are_untouched() {
        let (mut map, _, index) = scenario_b();
        let undated = feature(&mut map);
        map.add_layer(undated);
        apply_range(&mut map, &index, DateInterval::new(ymd(2030, 1, 1), ymd(2030, 1, 2)));
        assert_eq!(map.visible_features(), vec![undated]);
    }

    #[test]
    fn inactive_groups_are_left_alone() {
        let mut map = ActivityMap::default();
        let run = map.insert_group("Run");
        let bike = map.insert_group("Bike");
        let l1 = feature(&mut map);
        let l2 = feature(&mut map);
        map.group_add_layer(run, l1);
        map.group_add_layer(bike, l2);
        map.add_layer(run);

        let mut control = LayerControl::default();
        control.overlays.insert("Run".into(), run);
        control.overlays.insert("Bike".into(), bike);

        let mut index = GroupedDateIndex::default();
        index.groups.insert("Run".into(), [(l1, ymd(2024, 2, 1))].into_iter().collect());
        index.groups.insert("Bike".into(), [(l2, ymd(2024, 2, 1))].into_iter().collect());

        // Detach the run first so the covering interval has something to re-attach.
        apply_range_grouped(
            &mut map,
            &control,
            &index,
            DateInterval::new(ymd(2025, 1, 1), ymd(2025, 1, 2)),
        );
        assert!(!map.has_layer(l1));
        assert!(map.group_has_layer(bike, l2));

        let outcome = apply_range_grouped(
            &mut map,
            &control,
            &index,
            DateInterval::new(ymd(2024, 1, 1), ymd(2024, 3, 1)),
        );
        assert_eq!(outcome, FilterOutcome { attached: 1, detached: 0 });
        assert!(map.has_layer(l1));
        assert!(!map.has_layer(l2));
        assert!(map.group_has_layer(bike, l2));
    }
}
