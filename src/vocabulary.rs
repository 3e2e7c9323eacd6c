use crate::{Error, Result};

/// (local, canonical). Names missing here translate to themselves.
const FIELDS: &[(&str, &str)] = &[
    ("outsidetemp", "otemp"),
    ("roomtemp", "htemp"),
    ("settemp", "stemp"),
    ("opmode", "pow"),
    ("fanspeed", "f_rate"),
    ("fanflags", "f_dir"),
    ("acmode", "mode"),
];

/// Coded values per canonical field.
const VALUES: &[(&str, &[(&str, &str)])] = &[
    (
        "mode",
        &[
            ("0", "Off"),
            ("1", "auto"),
            ("2", "hot"),
            ("3", "auto-3"),
            ("4", "dry"),
            ("8", "cool"),
            ("9", "auto-9"),
            ("16", "fan"),
        ],
    ),
    (
        "f_rate",
        &[("0", "auto"), ("1", "low"), ("2", "medium"), ("3", "high")],
    ),
    ("f_mode", &[("1", "manual"), ("3", "auto")]),
];

const LABELS: &[(&str, &str)] = &[
    ("opmode", "power"),
    ("settemp", "target temp"),
    ("fanspeed", "fan rate"),
    ("fanflags", "fan direction"),
    ("acmode", "mode"),
    ("roomtemp", "inside temp"),
    ("outsidetemp", "outside temp"),
    ("err", "error code"),
];

/// Local fields shown by [`crate::SkyFiClient::summary`], in display order.
pub const SUMMARY_FIELDS: &[&str] = &[
    "opmode",
    "settemp",
    "fanspeed",
    "fanflags",
    "acmode",
    "roomtemp",
    "outsidetemp",
    "zone",
    "flt",
];

pub const POWER_FIELD: &str = "opmode";
pub const MODE_FIELD: &str = "acmode";
pub const TARGET_TEMP_FIELD: &str = "settemp";
pub const FAN_RATE_FIELD: &str = "fanspeed";

pub const POWER_ON: &str = "1";
pub const POWER_OFF: &str = "0";

/// Mode value with no device code of its own. Setting it powers the unit down.
pub const SYNTHETIC_OFF: &str = "off";

pub fn to_local(canonical: &str) -> &str {
    FIELDS
        .iter()
        .find(|(_, c)| *c == canonical)
        .map_or(canonical, |(l, _)| *l)
}

pub fn to_canonical(local: &str) -> &str {
    FIELDS
        .iter()
        .find(|(l, _)| *l == local)
        .map_or(local, |(_, c)| *c)
}

/// True for canonical names that stand in for a different local name.
pub fn is_canonical_alias(name: &str) -> bool {
    to_local(name) != name
}

fn value_table(field: &str) -> Option<&'static [(&'static str, &'static str)]> {
    let canonical = to_canonical(field);
    VALUES
        .iter()
        .find(|(f, _)| *f == canonical)
        .map(|(_, table)| *table)
}

/// Device code to human string. Codes outside the table are returned as-is.
pub fn to_human<'a>(field: &str, code: &'a str) -> &'a str {
    value_table(field)
        .and_then(|table| table.iter().find(|(c, _)| *c == code))
        .map_or(code, |(_, human)| *human)
}

/// Human string to device code, identity when unknown.
pub fn to_device<'a>(field: &str, human: &'a str) -> &'a str {
    value_table(field)
        .and_then(|table| table.iter().find(|(_, h)| *h == human))
        .map_or(human, |(code, _)| *code)
}

/// Human values of an enumerated field in table order, empty for free-form fields.
pub fn table_values(field: &str) -> Vec<&'static str> {
    value_table(field)
        .map(|table| table.iter().map(|(_, h)| *h).collect())
        .unwrap_or_default()
}

/// Sorted human values of an enumerated field.
pub fn human_values(field: &str) -> Vec<&'static str> {
    let mut values = table_values(field);
    values.sort_unstable();
    values
}

pub fn label(field: &str) -> &str {
    let local = to_local(field);
    LABELS
        .iter()
        .find(|(l, _)| *l == local)
        .map_or(field, |(_, label)| *label)
}

/// Both vocabularies share one state map, so a canonical name must never
/// shadow an unrelated local name.
pub fn check_vocabulary() -> Result<()> {
    check_fields(FIELDS)
}

fn check_fields(fields: &[(&str, &str)]) -> Result<()> {
    for (i, (local, canonical)) in fields.iter().enumerate() {
        if let Some((other, _)) = fields.iter().find(|(l, _)| l == canonical) {
            return Err(Error::Vocabulary(format!(
                "canonical name {canonical} (for {local}) collides with local name {other}"
            )));
        }
        if fields[i + 1..]
            .iter()
            .any(|(l, c)| l == local || c == canonical)
        {
            return Err(Error::Vocabulary(format!(
                "mapping {local} <-> {canonical} is not one-to-one"
            )));
        }
    }
    Ok(())
}
