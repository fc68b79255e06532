// Copyright 2025 OpenObserve Inc.
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.

//! Vendor webhook normalization.
//!
//! Every vendor has a typed adapter backed by a legacy map-driven
//! fallback. When both fail the payload still yields exactly one
//! generic alert, so a malformed webhook never turns into a dropped
//! page.

use std::collections::HashMap;

use config::{
    meta::{
        alerts::{AlertSeverity, AlertStatus, NormalizedAlert},
        integrations::IntegrationType,
    },
    utils::{json, time},
};
use sha2::{Digest, Sha256};

pub mod aws;
pub mod coralogix;
pub mod datadog;
pub mod generic;
pub mod grafana;
pub mod pagerduty;
pub mod prometheus;

/// Turn one inbound payload into at least one normalized alert
pub fn normalize(integration_type: IntegrationType, body: &json::Value) -> Vec<NormalizedAlert> {
    let alerts = match integration_type {
        IntegrationType::Prometheus => prometheus::normalize(body),
        IntegrationType::Datadog => datadog::normalize(body),
        IntegrationType::Grafana => grafana::normalize(body),
        IntegrationType::Aws => aws::normalize(body),
        IntegrationType::Pagerduty => pagerduty::normalize(body),
        IntegrationType::Coralogix => coralogix::normalize(body),
        IntegrationType::Webhook => generic::normalize(body),
    };
    match alerts {
        Some(alerts) if !alerts.is_empty() => alerts,
        _ => {
            log::warn!(
                "[WEBHOOK] {integration_type} payload not recognized, falling back to a generic alert"
            );
            vec![fallback_alert(integration_type, body)]
        }
    }
}

/// Last-resort alert when no adapter understood the payload. The
/// fingerprint hashes the canonical body so retries stay stable.
fn fallback_alert(integration_type: IntegrationType, body: &json::Value) -> NormalizedAlert {
    let title = ["title", "alertname", "alert_name", "message", "name"]
        .iter()
        .find_map(|key| body.get(key).and_then(|v| v.as_str()))
        .unwrap_or("Unparsed alert")
        .to_string();
    let digest = Sha256::digest(json::canonical_string(body).as_bytes());
    NormalizedAlert {
        alert_name: title.clone(),
        severity: AlertSeverity::Warning,
        status: AlertStatus::Firing,
        summary: title,
        description: String::new(),
        labels: HashMap::from([("source".to_string(), integration_type.to_string())]),
        annotations: HashMap::new(),
        starts_at: time::now_micros(),
        ends_at: None,
        fingerprint: format!("{integration_type}-{}", hex::encode(&digest[..12])),
        priority: AlertSeverity::Warning.priority(),
    }
}

/// Prometheus-style derived fingerprint: "{alertname}-{instance}-{job}"
pub(crate) fn derived_fingerprint(labels: &HashMap<String, String>) -> String {
    let alertname = labels.get("alertname").map(|v| v.as_str()).unwrap_or("unknown");
    let instance = labels.get("instance").map(|v| v.as_str()).unwrap_or("");
    let job = labels.get("job").map(|v| v.as_str()).unwrap_or("");
    format!("{alertname}-{instance}-{job}")
}

/// RFC3339 timestamp or "now"; Alertmanager's zero value counts as
/// absent
pub(crate) fn parse_time_or_now(value: Option<&str>) -> i64 {
    parse_time(value).unwrap_or_else(time::now_micros)
}

pub(crate) fn parse_time(value: Option<&str>) -> Option<i64> {
    let value = value?;
    if value.is_empty() || value.starts_with("0001-") {
        return None;
    }
    time::parse_str_to_timestamp_micros(value).ok()
}

/// Pull a string out of a raw map under any of the given keys
pub(crate) fn str_field<'a>(body: &'a json::Value, keys: &[&str]) -> Option<&'a str> {
    keys.iter().find_map(|key| body.get(key).and_then(|v| v.as_str()))
}

pub(crate) fn string_map(value: Option<&json::Value>) -> HashMap<String, String> {
    let Some(json::Value::Object(map)) = value else {
        return HashMap::new();
    };
    map.iter()
        .map(|(k, v)| {
            let v = match v {
                json::Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            (k.clone(), v)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_alert_stable_fingerprint() {
        let body = json::json!({"unexpected": {"shape": true}});
        let a = fallback_alert(IntegrationType::Webhook, &body);
        let b = fallback_alert(IntegrationType::Webhook, &body);
        assert_eq!(a.fingerprint, b.fingerprint);
        assert_eq!(a.status, AlertStatus::Firing);
        assert_eq!(a.severity, AlertSeverity::Warning);
    }

    #[test]
    fn test_derived_fingerprint() {
        let labels = HashMap::from([
            ("alertname".to_string(), "HighCPU".to_string()),
            ("instance".to_string(), "h1:9100".to_string()),
            ("job".to_string(), "node".to_string()),
        ]);
        assert_eq!(derived_fingerprint(&labels), "HighCPU-h1:9100-node");
    }

    #[test]
    fn test_parse_time_zero_value() {
        assert_eq!(parse_time(Some("0001-01-01T00:00:00Z")), None);
        assert_eq!(parse_time(Some("")), None);
        assert!(parse_time(Some("2025-01-02T03:04:05Z")).is_some());
    }

    #[test]
    fn test_normalize_always_yields_alert() {
        let body = json::json!({"complete": "garbage"});
        for t in [
            IntegrationType::Prometheus,
            IntegrationType::Datadog,
            IntegrationType::Grafana,
            IntegrationType::Aws,
            IntegrationType::Pagerduty,
            IntegrationType::Coralogix,
            IntegrationType::Webhook,
        ] {
            let alerts = normalize(t, &body);
            assert_eq!(alerts.len(), 1, "{t} must fall back to one alert");
        }
    }
}
