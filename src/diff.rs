use std::collections::BTreeMap;

use serde::Serialize;

use crate::state::DeviceState;
use crate::types::Event;
use crate::vocabulary::{is_canonical_alias, to_canonical, to_human, POWER_OFF};
use crate::zones::{clean_name, mask_bits, name_field, ZONE_MASK_FIELD};

/// One device field whose value is new or different.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Change {
    pub field: String,
    pub old: Option<String>,
    pub new: String,
}

/// Keys of `current` that are missing from or differ in `previous`.
/// Canonical duplicates are skipped so each device field is reported once.
pub(crate) fn diff_maps(
    previous: &BTreeMap<String, String>,
    current: &BTreeMap<String, String>,
) -> Vec<Change> {
    current
        .iter()
        .filter(|(key, _)| !is_canonical_alias(key))
        .filter(|(key, value)| previous.get(*key) != Some(*value))
        .map(|(key, value)| Change {
            field: key.clone(),
            old: previous.get(key).cloned(),
            new: value.clone(),
        })
        .collect()
}

fn temperature(value: &str) -> Option<f64> {
    value.trim().parse().ok()
}

fn zone_events(change: &Change, state: &DeviceState) -> Option<Vec<Event>> {
    let new_bits = mask_bits(&change.new).ok()?;
    let old_bits = change.old.as_deref().and_then(|old| mask_bits(old).ok());
    let events = new_bits
        .chars()
        .zip(1u8..)
        .enumerate()
        .filter(|(i, (bit, _))| {
            old_bits
                .as_ref()
                .is_none_or(|old| old.as_bytes()[*i] != *bit as u8)
        })
        .map(|(_, (bit, zone_id))| Event::ZoneChanged {
            zone_id,
            name: state
                .get(&name_field(zone_id))
                .map(clean_name)
                .unwrap_or_default(),
            on: bit == '1',
        })
        .collect();
    Some(events)
}

fn typed_events(change: &Change, state: &DeviceState) -> Option<Vec<Event>> {
    let event = match to_canonical(&change.field) {
        "pow" => Event::PowerChanged {
            on: change.new != POWER_OFF,
        },
        "mode" => Event::ModeChanged {
            mode: to_human("mode", &change.new).to_string(),
        },
        "stemp" => Event::TargetTemperatureChanged {
            temp: temperature(&change.new)?,
        },
        "htemp" => Event::RoomTemperatureChanged {
            temp: temperature(&change.new)?,
        },
        "otemp" => Event::OutsideTemperatureChanged {
            temp: temperature(&change.new)?,
        },
        "f_rate" => Event::FanRateChanged {
            rate: to_human("f_rate", &change.new).to_string(),
        },
        ZONE_MASK_FIELD => return zone_events(change, state),
        _ => return None,
    };
    Some(vec![event])
}

fn generic_event(change: &Change) -> Event {
    Event::FieldChanged {
        field: change.field.clone(),
        canonical: to_canonical(&change.field).to_string(),
        old: change.old.clone(),
        new: change.new.clone(),
    }
}

/// Typed events where the field has a meaning, `FieldChanged` otherwise.
pub(crate) fn events_for(changes: &[Change], state: &DeviceState) -> Vec<Event> {
    changes
        .iter()
        .flat_map(|change| typed_events(change, state).unwrap_or_else(|| vec![generic_event(change)]))
        .collect()
}
