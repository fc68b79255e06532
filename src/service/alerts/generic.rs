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

//! Generic webhook adapter: honours status and severity fields when
//! present, defaults to firing/warning otherwise.

use std::collections::HashMap;

use config::{
    meta::alerts::{AlertSeverity, AlertStatus, NormalizedAlert},
    utils::{json, time},
};
use serde::Deserialize;

use super::{derived_fingerprint, parse_time, string_map};

#[derive(Debug, Deserialize)]
struct GenericWebhook {
    #[serde(alias = "alert_name", alias = "title", alias = "name")]
    alertname: String,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    severity: Option<String>,
    #[serde(default)]
    summary: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    labels: HashMap<String, String>,
    #[serde(default)]
    annotations: HashMap<String, String>,
    #[serde(default)]
    starts_at: Option<String>,
    #[serde(default)]
    ends_at: Option<String>,
    #[serde(default)]
    fingerprint: Option<String>,
}

pub fn normalize(body: &json::Value) -> Option<Vec<NormalizedAlert>> {
    // batches are allowed: {"alerts": [...]}
    if let Some(json::Value::Array(items)) = body.get("alerts") {
        let alerts: Vec<NormalizedAlert> = items.iter().filter_map(normalize_one).collect();
        return if alerts.is_empty() { None } else { Some(alerts) };
    }
    normalize_one(body).map(|alert| vec![alert])
}

fn normalize_one(body: &json::Value) -> Option<NormalizedAlert> {
    match json::from_value::<GenericWebhook>(body.clone()) {
        Ok(webhook) => Some(convert(webhook)),
        Err(e) => {
            log::debug!("[WEBHOOK] generic typed decode failed: {e}, trying legacy shape");
            legacy_one(body)
        }
    }
}

fn legacy_one(body: &json::Value) -> Option<NormalizedAlert> {
    let labels = string_map(body.get("labels"));
    let alertname = super::str_field(body, &["alertname", "alert_name", "title", "name"])
        .map(|v| v.to_string())
        .or_else(|| labels.get("alertname").cloned())?;
    let webhook = GenericWebhook {
        alertname,
        status: super::str_field(body, &["status", "state"]).map(|v| v.to_string()),
        severity: super::str_field(body, &["severity", "priority"]).map(|v| v.to_string()),
        summary: super::str_field(body, &["summary", "message"]).map(|v| v.to_string()),
        description: super::str_field(body, &["description"]).map(|v| v.to_string()),
        labels,
        annotations: string_map(body.get("annotations")),
        starts_at: super::str_field(body, &["starts_at", "startsAt"]).map(|v| v.to_string()),
        ends_at: super::str_field(body, &["ends_at", "endsAt"]).map(|v| v.to_string()),
        fingerprint: super::str_field(body, &["fingerprint"]).map(|v| v.to_string()),
    };
    Some(convert(webhook))
}

fn convert(webhook: GenericWebhook) -> NormalizedAlert {
    let status = webhook
        .status
        .as_deref()
        .and_then(|v| v.parse::<AlertStatus>().ok())
        .unwrap_or(AlertStatus::Firing);
    let severity = webhook
        .severity
        .as_deref()
        .and_then(|v| v.parse::<AlertSeverity>().ok())
        .unwrap_or(AlertSeverity::Warning);

    let mut labels = webhook.labels;
    labels
        .entry("alertname".to_string())
        .or_insert_with(|| webhook.alertname.clone());

    let fingerprint = webhook
        .fingerprint
        .unwrap_or_else(|| derived_fingerprint(&labels));

    NormalizedAlert {
        alert_name: webhook.alertname.clone(),
        severity,
        status,
        summary: webhook.summary.unwrap_or_else(|| webhook.alertname.clone()),
        description: webhook.description.unwrap_or_default(),
        labels,
        annotations: webhook.annotations,
        starts_at: parse_time(webhook.starts_at.as_deref()).unwrap_or_else(time::now_micros),
        ends_at: parse_time(webhook.ends_at.as_deref()),
        fingerprint,
        priority: severity.priority(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let payload = json::json!({"alertname": "Something broke"});
        let alerts = normalize(&payload).unwrap();
        let alert = &alerts[0];
        assert_eq!(alert.status, AlertStatus::Firing);
        assert_eq!(alert.severity, AlertSeverity::Warning);
        assert_eq!(alert.fingerprint, "Something broke--");
    }

    #[test]
    fn test_honours_fields() {
        let payload = json::json!({
            "title": "Queue depth",
            "status": "resolved",
            "severity": "critical",
            "labels": {"alertname": "QueueDepth", "instance": "q1", "job": "mq"},
            "fingerprint": "custom-fp"
        });
        let alerts = normalize(&payload).unwrap();
        let alert = &alerts[0];
        assert_eq!(alert.status, AlertStatus::Resolved);
        assert_eq!(alert.severity, AlertSeverity::Critical);
        assert_eq!(alert.fingerprint, "custom-fp");
    }

    #[test]
    fn test_batch() {
        let payload = json::json!({
            "alerts": [
                {"alertname": "a1"},
                {"alertname": "a2", "severity": "info"},
                {"no_name_at_all": true}
            ]
        });
        // the malformed entry is dropped, the batch continues
        let alerts = normalize(&payload).unwrap();
        assert_eq!(alerts.len(), 2);
        assert_eq!(alerts[1].severity, AlertSeverity::Info);
    }

    #[test]
    fn test_no_name_rejected() {
        assert!(normalize(&json::json!({"severity": "high"})).is_none());
    }
}
