use std::collections::BTreeMap;
use std::fs::{File, OpenOptions};
use std::io::Write;

use chrono::Utc;
use serde_json::{json, Value};
use tracing::warn;

use crate::diff::diff_maps;

pub enum MessageLogMode {
    Full,
    /// First response in full, then only the changed fields.
    Diffed,
}

/// NDJSON record of bridge traffic. Resources are logged as templates, so
/// the password never reaches the file.
pub(crate) struct MessageLogger {
    mode: MessageLogMode,
    file: File,
    previous_state: Option<BTreeMap<String, String>>,
}

impl MessageLogger {
    pub fn new(mode: MessageLogMode, path: &str) -> std::io::Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)?;
        Ok(Self {
            mode,
            file,
            previous_state: None,
        })
    }

    pub fn log_request(&mut self, resource: &str) {
        let entry = json!({
            "ts": Utc::now().to_rfc3339(),
            "dir": "req",
            "resource": resource,
        });
        self.write_line(&entry);
    }

    pub fn log_command(&mut self, action: &str, zone: Option<u8>, resource: &str) {
        let entry = json!({
            "ts": Utc::now().to_rfc3339(),
            "dir": "cmd",
            "action": action,
            "zone": zone,
            "resource": resource,
        });
        self.write_line(&entry);
    }

    pub fn log_response(&mut self, resource: &str, body: &BTreeMap<String, String>) {
        match self.mode {
            MessageLogMode::Full => {
                let entry = json!({
                    "ts": Utc::now().to_rfc3339(),
                    "dir": "resp",
                    "resource": resource,
                    "body": body,
                });
                self.write_line(&entry);
            }
            MessageLogMode::Diffed => match self.previous_state.as_mut() {
                None => {
                    let entry = json!({
                        "ts": Utc::now().to_rfc3339(),
                        "dir": "resp",
                        "resource": resource,
                        "full": true,
                        "body": body,
                    });
                    self.previous_state = Some(body.clone());
                    self.write_line(&entry);
                }
                Some(prev) => {
                    let changes = diff_maps(prev, body);
                    prev.extend(body.iter().map(|(k, v)| (k.clone(), v.clone())));
                    let entry = json!({
                        "ts": Utc::now().to_rfc3339(),
                        "dir": "resp",
                        "resource": resource,
                        "changes": changes,
                    });
                    self.write_line(&entry);
                }
            },
        }
    }

    fn write_line(&mut self, entry: &Value) {
        if let Ok(line) = serde_json::to_string(entry)
            && let Err(e) = writeln!(self.file, "{line}")
        {
            warn!("failed to write log entry: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use tempfile::NamedTempFile;

    fn read_lines(path: &str) -> Vec<Value> {
        let mut contents = String::new();
        std::fs::File::open(path)
            .unwrap()
            .read_to_string(&mut contents)
            .unwrap();
        contents
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    fn body(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn log_request_writes_ndjson() {
        let tmp = NamedTempFile::new().unwrap();
        let path = tmp.path().to_str().unwrap();
        let mut logger = MessageLogger::new(MessageLogMode::Full, path).unwrap();
        logger.log_request("ac.cgi?pass={pass}");

        let lines = read_lines(path);
        assert_eq!(lines[0]["dir"], "req");
        assert_eq!(lines[0]["resource"], "ac.cgi?pass={pass}");
        assert!(lines[0]["ts"].as_str().is_some());
    }

    #[test]
    fn diffed_mode_logs_full_first_then_changes() {
        let tmp = NamedTempFile::new().unwrap();
        let path = tmp.path().to_str().unwrap();
        let mut logger = MessageLogger::new(MessageLogMode::Diffed, path).unwrap();

        logger.log_response("ac.cgi", &body(&[("roomtemp", "22"), ("settemp", "21")]));
        logger.log_response("ac.cgi", &body(&[("roomtemp", "23"), ("settemp", "21")]));

        let lines = read_lines(path);
        assert_eq!(lines[0]["full"], true);
        assert_eq!(lines[0]["body"]["roomtemp"], "22");
        let changes = lines[1]["changes"].as_array().unwrap();
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0]["field"], "roomtemp");
        assert_eq!(changes[0]["old"], "22");
        assert_eq!(changes[0]["new"], "23");
    }

    #[test]
    fn diffed_mode_accumulates_across_resources() {
        let tmp = NamedTempFile::new().unwrap();
        let path = tmp.path().to_str().unwrap();
        let mut logger = MessageLogger::new(MessageLogMode::Diffed, path).unwrap();

        logger.log_response("ac.cgi", &body(&[("roomtemp", "22")]));
        logger.log_response("zones.cgi", &body(&[("nz", "4")]));
        logger.log_response("ac.cgi", &body(&[("roomtemp", "22")]));

        let lines = read_lines(path);
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1]["changes"].as_array().unwrap().len(), 1);
        assert_eq!(lines[2]["changes"].as_array().unwrap().len(), 0);
    }

    #[test]
    fn log_command_captures_zone() {
        let tmp = NamedTempFile::new().unwrap();
        let path = tmp.path().to_str().unwrap();
        let mut logger = MessageLogger::new(MessageLogMode::Full, path).unwrap();
        logger.log_command("set_zone", Some(3), "/setzone.cgi?z=3&s=1&");

        let lines = read_lines(path);
        assert_eq!(lines[0]["dir"], "cmd");
        assert_eq!(lines[0]["action"], "set_zone");
        assert_eq!(lines[0]["zone"], 3);
    }
}
