use std::collections::BTreeMap;
use std::time::Duration;

use tracing::debug;

use crate::diff::{events_for, Change};
use crate::logger::{MessageLogMode, MessageLogger};
use crate::protocol::{
    parse_response, set_command, with_password, zone_command, CURRENT_SETTINGS, DEFAULT_PORT,
    HTTP_RESOURCES,
};
use crate::retry::{retry, RetryPolicy};
use crate::state::DeviceState;
use crate::types::*;
use crate::vocabulary::{
    self, check_vocabulary, label, to_device, to_human, to_local, FAN_RATE_FIELD, MODE_FIELD,
    POWER_FIELD, POWER_OFF, POWER_ON, SUMMARY_FIELDS, SYNTHETIC_OFF, TARGET_TEMP_FIELD,
};
use crate::zones::{self, decode_zones, ZONE_COUNT_FIELD, ZONE_MASK_FIELD};
use crate::{Error, Result};

type EventCallback = Box<dyn Fn(&Event) + Send + Sync>;

pub struct SkyFiClientBuilder {
    host: String,
    password: String,
    port: u16,
    protocol: String,
    timeout: Option<Duration>,
    retry: RetryPolicy,
    event_callbacks: Vec<EventCallback>,
    log_mode: Option<MessageLogMode>,
    log_path: Option<String>,
}

impl SkyFiClientBuilder {
    pub fn new(host: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            password: password.into(),
            port: DEFAULT_PORT,
            protocol: "http".to_string(),
            timeout: None,
            retry: RetryPolicy::default(),
            event_callbacks: Vec::new(),
            log_mode: None,
            log_path: None,
        }
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn protocol(mut self, proto: &str) -> Self {
        self.protocol = proto.to_string();
        self
    }

    /// Per-request transport timeout. A timed-out request is not retried.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry = policy;
        self
    }

    pub fn on_event(mut self, f: impl Fn(&Event) + Send + Sync + 'static) -> Self {
        self.event_callbacks.push(Box::new(f));
        self
    }

    pub fn message_log(mut self, mode: MessageLogMode, path: impl Into<String>) -> Self {
        self.log_mode = Some(mode);
        self.log_path = Some(path.into());
        self
    }

    pub fn build(self) -> Result<SkyFiClient> {
        check_vocabulary()?;

        let mut http = reqwest::Client::builder();
        if let Some(timeout) = self.timeout {
            http = http.timeout(timeout);
        }
        let http = http.build()?;

        let logger = match (self.log_mode, self.log_path) {
            (Some(mode), Some(path)) => Some(MessageLogger::new(mode, &path)?),
            _ => None,
        };

        Ok(SkyFiClient {
            http,
            base_url: format!("{}://{}:{}", self.protocol, self.host, self.port),
            password: self.password,
            retry: self.retry,
            values: DeviceState::new(),
            event_callbacks: self.event_callbacks,
            logger,
        })
    }
}

/// One SkyFi bridge. Operations take `&mut self`; share a client between
/// tasks behind a mutex so merges never interleave.
pub struct SkyFiClient {
    http: reqwest::Client,
    base_url: String,
    password: String,
    retry: RetryPolicy,
    values: DeviceState,
    event_callbacks: Vec<EventCallback>,
    logger: Option<MessageLogger>,
}

impl SkyFiClient {
    pub fn builder(host: impl Into<String>, password: impl Into<String>) -> SkyFiClientBuilder {
        SkyFiClientBuilder::new(host, password)
    }

    /// Loads current settings and zones.
    pub async fn init(&mut self) -> Result<()> {
        self.update_status(HTTP_RESOURCES).await
    }

    pub async fn update_status(&mut self, resources: &[&str]) -> Result<()> {
        debug!(?resources, "updating status");
        for resource in resources {
            let response = self.fetch(resource).await?;
            self.merge_response(&response);
        }
        Ok(())
    }

    /// Applies caller settings (field names and human values in either
    /// vocabulary) on top of the device's current state.
    ///
    /// A mode of `"off"` powers the unit down and resends the mode the
    /// device currently holds, so the next power-on resumes it.
    pub async fn set(&mut self, settings: &[(&str, &str)]) -> Result<()> {
        debug!(?settings, "updating settings");

        let current = self.fetch(CURRENT_SETTINGS).await?;
        debug!(?current, "current settings");
        self.merge_response(&current);
        let before = self.values.clone();

        for (name, value) in settings {
            let local = to_local(name);
            self.values.insert(local, to_device(local, value));
        }

        let powering_off = settings
            .iter()
            .any(|(name, value)| to_local(name) == MODE_FIELD && value.eq_ignore_ascii_case(SYNTHETIC_OFF));
        if powering_off {
            let mode = current
                .get(MODE_FIELD)
                .ok_or_else(|| Error::NotFound(MODE_FIELD.to_string()))?;
            self.values.insert(POWER_FIELD, POWER_OFF);
            self.values.insert(MODE_FIELD, mode.as_str());
        } else {
            self.values.insert(POWER_FIELD, POWER_ON);
        }

        let command = set_command(
            self.values.get(POWER_FIELD)?,
            self.values.get(TARGET_TEMP_FIELD)?,
            self.values.get(FAN_RATE_FIELD)?,
            self.values.get(MODE_FIELD)?,
        )
        .render();
        debug!(query = %command, "sending command");
        if let Some(ref mut logger) = self.logger {
            logger.log_command("set", None, &command);
        }

        let response = self.fetch(&command).await?;
        self.values.merge(&response);
        let changes = self.values.changes_since(&before);
        self.emit(&changes);
        debug!(values = ?self.values, "updated values");
        Ok(())
    }

    pub async fn set_mode(&mut self, mode: HvacMode) -> Result<()> {
        self.set(&[("mode", mode.as_str())]).await
    }

    pub async fn power_off(&mut self) -> Result<()> {
        self.set_mode(HvacMode::Off).await
    }

    pub async fn set_target_temperature(&mut self, temp: f64) -> Result<()> {
        let temp = temp.to_string();
        self.set(&[("stemp", temp.as_str())]).await
    }

    pub async fn set_fan_rate(&mut self, rate: FanRate) -> Result<()> {
        self.set(&[("f_rate", rate.as_str())]).await
    }

    /// Switches one zone (1-based). Each zone needs its own request.
    pub async fn set_zone(&mut self, zone_id: u8, on: bool) -> Result<()> {
        zones::validate_zone_id(zone_id)?;
        let command = zone_command(zone_id, on).render();
        debug!(query = %command, "set zone");
        if let Some(ref mut logger) = self.logger {
            logger.log_command("set_zone", Some(zone_id), &command);
        }
        let response = self.fetch(&command).await?;
        self.merge_response(&response);
        Ok(())
    }

    // -- Read accessors --

    pub fn values(&self) -> &DeviceState {
        &self.values
    }

    pub fn get(&self, name: &str) -> Result<&str> {
        self.values.get(name)
    }

    /// Display label and human value of one field.
    pub fn represent(&self, key: &str) -> Result<(String, String)> {
        let local = to_local(key);
        let raw = self.values.get(local)?;
        let value = if local == ZONE_MASK_FIELD {
            zones::mask_bits(raw)?
        } else if is_zone_name(local) {
            urlencoding::decode(raw)
                .map(|v| v.into_owned())
                .unwrap_or_else(|_| raw.to_string())
        } else if local == MODE_FIELD && self.values.get(POWER_FIELD).ok() == Some(POWER_OFF) {
            SYNTHETIC_OFF.to_string()
        } else {
            to_human(local, raw).to_string()
        };
        debug!(key, value = %value, "represent");
        Ok((label(local).to_string(), value))
    }

    /// `None` when the bridge has no zones configured.
    pub fn zones(&self) -> Result<Option<Vec<Zone>>> {
        decode_zones(&self.values)
    }

    /// Label/value pairs for the summary fields the device reported.
    pub fn summary(&self) -> Vec<(String, String)> {
        SUMMARY_FIELDS
            .iter()
            .filter(|field| self.values.contains(field))
            .filter_map(|field| self.represent(field).ok())
            .collect()
    }

    pub fn inside_temperature(&self) -> Option<f64> {
        self.temperature("htemp")
    }

    pub fn outside_temperature(&self) -> Option<f64> {
        self.temperature("otemp")
    }

    pub fn target_temperature(&self) -> Option<f64> {
        self.temperature("stemp")
    }

    pub fn is_on(&self) -> bool {
        self.values.get(POWER_FIELD).is_ok_and(|p| p != POWER_OFF)
    }

    /// Current mode, `Off` while powered down.
    pub fn mode(&self) -> Option<HvacMode> {
        let (_, value) = self.represent(MODE_FIELD).ok()?;
        HvacMode::from_human_str(&value)
    }

    pub fn fan_rate(&self) -> Option<FanRate> {
        let raw = self.values.get(FAN_RATE_FIELD).ok()?;
        FanRate::from_human_str(to_human(FAN_RATE_FIELD, raw))
    }

    /// Supported fan rates in device order, title-cased for display.
    pub fn fan_rates(&self) -> Vec<String> {
        vocabulary::table_values("f_rate")
            .into_iter()
            .map(title_case)
            .collect()
    }

    pub fn support_away_mode(&self) -> bool {
        false
    }

    pub fn support_fan_rate(&self) -> bool {
        true
    }

    pub fn support_swing_mode(&self) -> bool {
        false
    }

    pub fn support_outside_temperature(&self) -> bool {
        self.outside_temperature().is_some()
    }

    pub fn support_zones(&self) -> bool {
        self.values.contains(ZONE_COUNT_FIELD)
    }

    // -- Helpers --

    fn temperature(&self, name: &str) -> Option<f64> {
        self.values.get(name).ok()?.trim().parse().ok()
    }

    fn merge_response(&mut self, response: &BTreeMap<String, String>) {
        let changes = self.values.merge(response);
        self.emit(&changes);
    }

    fn emit(&self, changes: &[Change]) {
        if changes.is_empty() || self.event_callbacks.is_empty() {
            return;
        }
        for event in events_for(changes, &self.values) {
            for cb in &self.event_callbacks {
                cb(&event);
            }
        }
    }

    /// GETs a resource template, retrying transient failures, and parses
    /// the body.
    async fn fetch(&mut self, template: &str) -> Result<BTreeMap<String, String>> {
        if let Some(ref mut logger) = self.logger {
            logger.log_request(template);
        }
        let resource = with_password(template, &self.password);
        let url = format!("{}/{}", self.base_url, resource.trim_start_matches('/'));
        let http = &self.http;
        let url = url.as_str();
        let body = retry(&self.retry, Error::is_transient, move |attempt| async move {
            debug!(resource = template, attempt, "fetching");
            get_body(http, url).await
        })
        .await?;

        let response = parse_response(&body)?;
        if let Some(ref mut logger) = self.logger {
            logger.log_response(template, &response);
        }
        Ok(response)
    }
}

async fn get_body(http: &reqwest::Client, url: &str) -> Result<String> {
    let body = http
        .get(url)
        .send()
        .await?
        .error_for_status()?
        .text()
        .await?;
    Ok(body)
}

fn is_zone_name(field: &str) -> bool {
    (1..=zones::ZONE_COUNT).any(|id| zones::name_field(id) == field)
}

fn title_case(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
