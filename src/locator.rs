use crate::layers::{ActivityMap, GlobalValue, Globals, LayerControl};
use tracing::warn;

pub const MISSING_MAP: &str = "No activity map found. Date filtering will not work.";
pub const MISSING_CONTROL: &str = "No layer control found. Date filtering will not work.";

pub trait AlertSink {
    fn alert(&mut self, message: &str);
}

impl AlertSink for Vec<String> {
    fn alert(&mut self, message: &str) {
        self.push(message.to_string());
    }
}

fn raise(alerts: &mut dyn AlertSink, message: &str) {
    warn!("{message}");
    alerts.alert(message);
}

pub fn locate_map<'a>(
    globals: &'a mut Globals,
    alerts: &mut dyn AlertSink,
) -> Option<&'a mut ActivityMap> {
    let found = globals.values_mut().find_map(|value| match value {
        GlobalValue::Map(map) => Some(map),
        _ => None,
    });
    if found.is_none() {
        raise(alerts, MISSING_MAP);
    }
    found
}

// Unlike the locate functions this stays silent when nothing is found.
pub fn find_control(globals: &Globals) -> Option<&LayerControl> {
    globals.iter().find_map(|(_, value)| match value {
        GlobalValue::Control(control) => Some(control),
        _ => None,
    })
}

pub fn locate_map_and_control<'a>(
    globals: &'a mut Globals,
    alerts: &mut dyn AlertSink,
) -> Option<(&'a mut ActivityMap, &'a LayerControl)> {
    let mut map = None;
    let mut control = None;
    for value in globals.values_mut() {
        match value {
            GlobalValue::Map(found) if map.is_none() => map = Some(found),
            GlobalValue::Control(found) if control.is_none() => control = Some(&*found),
            _ => {}
        }
    }

    let Some(map) = map else {
        raise(alerts, MISSING_MAP);
        return None;
    };
    let Some(control) = control else {
        raise(alerts, MISSING_CONTROL);
        return None;
    };
    Some((map, control))
}
