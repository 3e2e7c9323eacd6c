use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HvacMode {
    /// Not a device mode: setting it powers the unit down and keeps the
    /// previous mode for the next power-on.
    Off,
    Auto,
    Heat,
    Dry,
    Cool,
    Fan,
}

impl HvacMode {
    /// Human value as used by the mode translation table.
    pub fn as_str(&self) -> &'static str {
        match self {
            HvacMode::Off => "off",
            HvacMode::Auto => "auto",
            HvacMode::Heat => "hot",
            HvacMode::Dry => "dry",
            HvacMode::Cool => "cool",
            HvacMode::Fan => "fan",
        }
    }

    pub fn from_human_str(s: &str) -> Option<Self> {
        match s {
            "off" | "Off" => Some(HvacMode::Off),
            "auto" | "auto-3" | "auto-9" => Some(HvacMode::Auto),
            "hot" => Some(HvacMode::Heat),
            "dry" => Some(HvacMode::Dry),
            "cool" => Some(HvacMode::Cool),
            "fan" => Some(HvacMode::Fan),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FanRate {
    Auto,
    Low,
    Medium,
    High,
}

impl FanRate {
    pub fn as_str(&self) -> &'static str {
        match self {
            FanRate::Auto => "auto",
            FanRate::Low => "low",
            FanRate::Medium => "medium",
            FanRate::High => "high",
        }
    }

    pub fn from_human_str(s: &str) -> Option<Self> {
        match s {
            "auto" => Some(FanRate::Auto),
            "low" => Some(FanRate::Low),
            "medium" => Some(FanRate::Medium),
            "high" => Some(FanRate::High),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Zone {
    /// 1-based, as used by `set_zone`.
    pub id: u8,
    pub name: String,
    pub on: bool,
}

/// Events emitted when a device response changes the cached state.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum Event {
    PowerChanged { on: bool },
    ModeChanged { mode: String },
    TargetTemperatureChanged { temp: f64 },
    RoomTemperatureChanged { temp: f64 },
    OutsideTemperatureChanged { temp: f64 },
    FanRateChanged { rate: String },
    ZoneChanged { zone_id: u8, name: String, on: bool },
    FieldChanged {
        field: String,
        canonical: String,
        old: Option<String>,
        new: String,
    },
}
