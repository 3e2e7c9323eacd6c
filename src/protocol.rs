use std::collections::BTreeMap;

use tracing::trace;

use crate::vocabulary::to_canonical;
use crate::{Error, Result};

pub const DEFAULT_PORT: u16 = 2000;

/// Replaced by the percent-encoded bridge password before a request is sent.
pub const PASSWORD_PLACEHOLDER: &str = "{pass}";

pub const CURRENT_SETTINGS: &str = "ac.cgi?pass={pass}";
pub const ZONES: &str = "zones.cgi?pass={pass}";

/// Resources read by `init`.
pub const HTTP_RESOURCES: &[&str] = &[CURRENT_SETTINGS, ZONES];

/// Ordered query parameters for a bridge resource. Values are
/// percent-encoded; every pair is terminated by `&` as the bridge expects.
#[derive(Debug, Clone)]
pub struct Query {
    resource: &'static str,
    params: Vec<(&'static str, String)>,
}

impl Query {
    pub fn new(resource: &'static str) -> Self {
        Self {
            resource,
            params: Vec::new(),
        }
    }

    /// Adds the `pass` parameter, left as a placeholder until send time.
    pub fn with_password(mut self) -> Self {
        self.params.push(("pass", PASSWORD_PLACEHOLDER.to_string()));
        self
    }

    pub fn param(mut self, key: &'static str, value: impl AsRef<str>) -> Self {
        self.params
            .push((key, urlencoding::encode(value.as_ref()).into_owned()));
        self
    }

    pub fn render(&self) -> String {
        let mut out = format!("{}?", self.resource);
        for (key, value) in &self.params {
            out.push_str(key);
            out.push('=');
            out.push_str(value);
            out.push('&');
        }
        out
    }
}

pub fn set_command(power: &str, target_temp: &str, fan_rate: &str, mode: &str) -> Query {
    Query::new("set.cgi")
        .with_password()
        .param("p", power)
        .param("t", target_temp)
        .param("f", fan_rate)
        .param("m", mode)
}

pub fn zone_command(zone_id: u8, on: bool) -> Query {
    Query::new("/setzone.cgi")
        .param("z", zone_id.to_string())
        .param("s", if on { "1" } else { "0" })
}

pub fn with_password(template: &str, password: &str) -> String {
    template.replacen(PASSWORD_PLACEHOLDER, &urlencoding::encode(password), 1)
}

/// Splits a `key=value&key=value` body into local fields, then adds the
/// canonical duplicate of every mapped key.
pub fn parse_response(body: &str) -> Result<BTreeMap<String, String>> {
    trace!(body, "parsing response");
    let mut response = BTreeMap::new();
    for token in body.trim().split('&').filter(|t| !t.is_empty()) {
        let (key, value) = token
            .split_once('=')
            .ok_or_else(|| Error::Protocol(format!("missing '=' in token {token:?}")))?;
        response.insert(key.to_string(), value.to_string());
    }
    let aliases: Vec<(String, String)> = response
        .iter()
        .filter_map(|(key, value)| {
            let canonical = to_canonical(key);
            (canonical != key).then(|| (canonical.to_string(), value.clone()))
        })
        .collect();
    response.extend(aliases);
    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_plain_pairs() {
        let parsed = parse_response("a=1&b=2").unwrap();
        assert_eq!(parsed.get("a").map(String::as_str), Some("1"));
        assert_eq!(parsed.get("b").map(String::as_str), Some("2"));
        assert_eq!(parsed.len(), 2);
    }

    #[test]
    fn parse_adds_canonical_duplicates() {
        let parsed = parse_response("acmode=8&settemp=22&nz=4").unwrap();
        assert_eq!(parsed["acmode"], "8");
        assert_eq!(parsed["mode"], "8");
        assert_eq!(parsed["settemp"], "22");
        assert_eq!(parsed["stemp"], "22");
        assert_eq!(parsed["nz"], "4");
        assert_eq!(parsed.len(), 5);
    }

    #[test]
    fn parse_splits_on_first_equals_only() {
        let parsed = parse_response("zone1=a%3Db=c").unwrap();
        assert_eq!(parsed["zone1"], "a%3Db=c");
    }

    #[test]
    fn parse_ignores_trailing_separator_and_newline() {
        let parsed = parse_response("opmode=1&zone=5&\r\n").unwrap();
        assert_eq!(parsed["zone"], "5");
        assert_eq!(parsed["pow"], "1");
    }

    #[test]
    fn parse_rejects_token_without_equals() {
        let err = parse_response("opmode=1&garbage").unwrap_err();
        assert!(matches!(err, Error::Protocol(_)), "got {err:?}");
    }

    #[test]
    fn set_command_layout() {
        let query = set_command("1", "22", "2", "8").render();
        assert_eq!(query, "set.cgi?pass={pass}&p=1&t=22&f=2&m=8&");
    }

    #[test]
    fn set_command_encodes_reserved_characters() {
        let query = set_command("1", "22&x=1", "2", "8").render();
        assert_eq!(query, "set.cgi?pass={pass}&p=1&t=22%26x%3D1&f=2&m=8&");
    }

    #[test]
    fn zone_command_layout() {
        assert_eq!(zone_command(3, true).render(), "/setzone.cgi?z=3&s=1&");
        assert_eq!(zone_command(8, false).render(), "/setzone.cgi?z=8&s=0&");
    }

    #[test]
    fn password_substitution_is_encoded() {
        assert_eq!(with_password(CURRENT_SETTINGS, "pa&ss"), "ac.cgi?pass=pa%26ss");
        assert_eq!(with_password("/setzone.cgi?z=1&s=1&", "x"), "/setzone.cgi?z=1&s=1&");
    }
}
