use std::borrow::Cow;

use crate::state::DeviceState;
use crate::types::Zone;
use crate::{Error, Result};

pub const ZONE_COUNT: u8 = 8;

/// Present only on bridges configured with zones.
pub const ZONE_COUNT_FIELD: &str = "nz";
pub const ZONE_MASK_FIELD: &str = "zone";

pub fn name_field(zone_id: u8) -> String {
    format!("zone{zone_id}")
}

/// Percent-decodes a zone name and strips the padding the bridge adds.
pub fn clean_name(raw: &str) -> String {
    let decoded = urlencoding::decode(raw).unwrap_or(Cow::Borrowed(raw));
    decoded
        .trim_matches(|c: char| matches!(c, ' ' | '+' | ','))
        .to_string()
}

/// Eight `'0'`/`'1'` digits, zone 1 first.
pub fn mask_bits(raw: &str) -> Result<String> {
    let mask: u8 = raw
        .trim()
        .parse()
        .map_err(|_| Error::Protocol(format!("zone mask {raw:?} is not in 0..=255")))?;
    Ok(format!("{mask:08b}"))
}

pub fn validate_zone_id(zone_id: u8) -> Result<()> {
    if (1..=ZONE_COUNT).contains(&zone_id) {
        Ok(())
    } else {
        Err(Error::InvalidZone(zone_id))
    }
}

/// `Ok(None)` when the bridge has no zones configured.
pub fn decode_zones(state: &DeviceState) -> Result<Option<Vec<Zone>>> {
    if !state.contains(ZONE_COUNT_FIELD) {
        return Ok(None);
    }
    let bits = mask_bits(state.get(ZONE_MASK_FIELD)?)?;
    let zones = bits
        .chars()
        .zip(1..=ZONE_COUNT)
        .map(|(bit, id)| -> Result<Zone> {
            Ok(Zone {
                id,
                name: clean_name(state.get(&name_field(id))?),
                on: bit == '1',
            })
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(Some(zones))
}
