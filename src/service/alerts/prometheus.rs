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

//! Prometheus AlertManager webhook adapter

use std::collections::HashMap;

use config::{
    meta::alerts::{AlertSeverity, AlertStatus, NormalizedAlert},
    utils::json,
};
use serde::Deserialize;

use super::{derived_fingerprint, parse_time, parse_time_or_now, string_map};

#[derive(Debug, Deserialize)]
struct AlertmanagerWebhook {
    alerts: Vec<AlertmanagerAlert>,
}

#[derive(Debug, Deserialize)]
struct AlertmanagerAlert {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    labels: HashMap<String, String>,
    #[serde(default)]
    annotations: HashMap<String, String>,
    #[serde(default, rename = "startsAt")]
    starts_at: Option<String>,
    #[serde(default, rename = "endsAt")]
    ends_at: Option<String>,
    #[serde(default)]
    fingerprint: Option<String>,
}

pub fn normalize(body: &json::Value) -> Option<Vec<NormalizedAlert>> {
    match json::from_value::<AlertmanagerWebhook>(body.clone()) {
        Ok(webhook) => Some(
            webhook
                .alerts
                .into_iter()
                .map(|alert| {
                    convert(
                        alert.status.as_deref(),
                        alert.labels,
                        alert.annotations,
                        alert.starts_at.as_deref(),
                        alert.ends_at.as_deref(),
                        alert.fingerprint,
                    )
                })
                .collect(),
        ),
        Err(e) => {
            log::debug!("[WEBHOOK] prometheus typed decode failed: {e}, trying legacy shape");
            normalize_legacy(body)
        }
    }
}

/// Legacy shape: the body is a single alert object, or carries a
/// non-standard alerts array of loose maps
fn normalize_legacy(body: &json::Value) -> Option<Vec<NormalizedAlert>> {
    let raw_alerts: Vec<&json::Value> = match body.get("alerts") {
        Some(json::Value::Array(items)) => items.iter().collect(),
        _ if body.is_object() => vec![body],
        _ => return None,
    };

    let mut alerts = Vec::with_capacity(raw_alerts.len());
    for raw in raw_alerts {
        if !raw.is_object() {
            continue;
        }
        let labels = string_map(raw.get("labels"));
        if labels.is_empty() && raw.get("status").is_none() {
            continue;
        }
        alerts.push(convert(
            raw.get("status").and_then(|v| v.as_str()),
            labels,
            string_map(raw.get("annotations")),
            raw.get("startsAt").and_then(|v| v.as_str()),
            raw.get("endsAt").and_then(|v| v.as_str()),
            raw.get("fingerprint")
                .and_then(|v| v.as_str())
                .map(|v| v.to_string()),
        ));
    }
    if alerts.is_empty() { None } else { Some(alerts) }
}

fn convert(
    status: Option<&str>,
    labels: HashMap<String, String>,
    annotations: HashMap<String, String>,
    starts_at: Option<&str>,
    ends_at: Option<&str>,
    fingerprint: Option<String>,
) -> NormalizedAlert {
    // resolved iff the status field says so, anything else fires
    let status = match status {
        Some("resolved") => AlertStatus::Resolved,
        _ => AlertStatus::Firing,
    };
    let severity = labels
        .get("severity")
        .and_then(|v| v.parse::<AlertSeverity>().ok())
        .unwrap_or(AlertSeverity::Warning);
    let alert_name = labels
        .get("alertname")
        .cloned()
        .unwrap_or_else(|| "unknown".to_string());
    let summary = annotations
        .get("summary")
        .or_else(|| annotations.get("description"))
        .cloned()
        .unwrap_or_else(|| alert_name.clone());
    let fingerprint = fingerprint.unwrap_or_else(|| derived_fingerprint(&labels));

    NormalizedAlert {
        alert_name,
        severity,
        status,
        summary,
        description: annotations.get("description").cloned().unwrap_or_default(),
        labels,
        annotations,
        starts_at: parse_time_or_now(starts_at),
        ends_at: parse_time(ends_at),
        fingerprint,
        priority: severity.priority(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn firing_payload() -> json::Value {
        json::json!({
            "alerts": [{
                "status": "firing",
                "labels": {
                    "alertname": "HighCPU",
                    "instance": "h1:9100",
                    "job": "node",
                    "severity": "critical"
                },
                "annotations": {"summary": "CPU above 95% for 10m"},
                "startsAt": "2025-01-02T03:04:05Z"
            }]
        })
    }

    #[test]
    fn test_firing_alert() {
        let alerts = normalize(&firing_payload()).unwrap();
        assert_eq!(alerts.len(), 1);
        let alert = &alerts[0];
        assert_eq!(alert.alert_name, "HighCPU");
        assert_eq!(alert.status, AlertStatus::Firing);
        assert_eq!(alert.severity, AlertSeverity::Critical);
        assert_eq!(alert.fingerprint, "HighCPU-h1:9100-node");
        assert_eq!(alert.summary, "CPU above 95% for 10m");
        assert_eq!(alert.starts_at, 1735787045000000);
    }

    #[test]
    fn test_resolved_alert() {
        let payload = json::json!({
            "alerts": [{
                "status": "resolved",
                "labels": {"alertname": "HighCPU", "instance": "h1:9100", "job": "node"},
                "startsAt": "2025-01-02T03:04:05Z",
                "endsAt": "2025-01-02T03:04:07Z"
            }]
        });
        let alerts = normalize(&payload).unwrap();
        assert_eq!(alerts[0].status, AlertStatus::Resolved);
        assert!(alerts[0].ends_at.is_some());
        // severity defaults to warning without the label
        assert_eq!(alerts[0].severity, AlertSeverity::Warning);
    }

    #[test]
    fn test_supplied_fingerprint_wins() {
        let payload = json::json!({
            "alerts": [{
                "status": "firing",
                "labels": {"alertname": "HighCPU"},
                "fingerprint": "f1a2b3"
            }]
        });
        let alerts = normalize(&payload).unwrap();
        assert_eq!(alerts[0].fingerprint, "f1a2b3");
    }

    #[test]
    fn test_legacy_single_alert_shape() {
        let payload = json::json!({
            "status": "firing",
            "labels": {"alertname": "DiskFull", "severity": "high"}
        });
        let alerts = normalize(&payload).unwrap();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].alert_name, "DiskFull");
        assert_eq!(alerts[0].severity, AlertSeverity::High);
    }

    #[test]
    fn test_unparseable_returns_none() {
        assert!(normalize(&json::json!("not an object")).is_none());
        assert!(normalize(&json::json!({"alerts": "nope"})).is_none());
    }
}
