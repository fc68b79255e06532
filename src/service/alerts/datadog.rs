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

//! Datadog monitor webhook adapter

use std::collections::HashMap;

use config::{
    meta::alerts::{AlertPriority, AlertSeverity, AlertStatus, NormalizedAlert},
    utils::{json, time},
};
use serde::Deserialize;

use super::str_field;

#[derive(Debug, Deserialize)]
struct DatadogWebhook {
    #[serde(default)]
    alert_transition: Option<String>,
    #[serde(default)]
    alert_priority: Option<String>,
    #[serde(default)]
    alert_title: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    body: Option<String>,
    #[serde(default)]
    alert_id: Option<json::Value>,
    #[serde(default)]
    host: Option<String>,
    #[serde(default)]
    date: Option<i64>,
    #[serde(default)]
    tags: Option<String>,
}

pub fn normalize(body: &json::Value) -> Option<Vec<NormalizedAlert>> {
    match json::from_value::<DatadogWebhook>(body.clone()) {
        Ok(webhook) if webhook.alert_title.is_some() || webhook.title.is_some() => {
            Some(vec![convert(webhook)])
        }
        _ => {
            log::debug!("[WEBHOOK] datadog typed decode failed, trying legacy shape");
            normalize_legacy(body)
        }
    }
}

fn normalize_legacy(body: &json::Value) -> Option<Vec<NormalizedAlert>> {
    let title = str_field(body, &["alert_title", "title", "event_title"])?;
    let webhook = DatadogWebhook {
        alert_transition: str_field(body, &["alert_transition", "transition"])
            .map(|v| v.to_string()),
        alert_priority: str_field(body, &["alert_priority", "priority"]).map(|v| v.to_string()),
        alert_title: Some(title.to_string()),
        title: None,
        body: str_field(body, &["body", "event_msg", "text"]).map(|v| v.to_string()),
        alert_id: body.get("alert_id").cloned(),
        host: str_field(body, &["host", "hostname"]).map(|v| v.to_string()),
        date: body.get("date").and_then(|v| v.as_i64()),
        tags: str_field(body, &["tags"]).map(|v| v.to_string()),
    };
    Some(vec![convert(webhook)])
}

fn convert(webhook: DatadogWebhook) -> NormalizedAlert {
    let title = webhook
        .alert_title
        .or(webhook.title)
        .unwrap_or_else(|| "Datadog alert".to_string());

    // a transition like "Triggered->Recovered" resolves the incident
    let recovered = webhook
        .alert_transition
        .as_deref()
        .is_some_and(|t| t.to_lowercase().contains("recovered"));
    let status = if recovered {
        AlertStatus::Resolved
    } else {
        AlertStatus::Firing
    };

    let priority = webhook
        .alert_priority
        .as_deref()
        .and_then(|p| p.parse::<AlertPriority>().ok());
    let severity = if recovered {
        AlertSeverity::Info
    } else {
        priority
            .map(|p| p.severity())
            .unwrap_or(AlertSeverity::Warning)
    };

    let mut labels = HashMap::from([("alertname".to_string(), title.clone())]);
    if let Some(host) = &webhook.host {
        labels.insert("host".to_string(), host.clone());
    }
    if let Some(tags) = &webhook.tags {
        for tag in tags.split(',') {
            if let Some((key, value)) = tag.trim().split_once(':') {
                labels.insert(key.to_string(), value.to_string());
            }
        }
    }

    // the monitor id is stable across trigger and recovery, which is
    // exactly what the dedup key needs
    let fingerprint = match &webhook.alert_id {
        Some(json::Value::String(id)) if !id.is_empty() => format!("datadog-{id}"),
        Some(json::Value::Number(id)) => format!("datadog-{id}"),
        _ => format!(
            "{title}-{}",
            webhook.host.as_deref().unwrap_or("datadog")
        ),
    };

    NormalizedAlert {
        alert_name: title.clone(),
        severity,
        status,
        summary: title,
        description: webhook.body.unwrap_or_default(),
        labels,
        annotations: HashMap::new(),
        starts_at: webhook
            .date
            .map(time::parse_i64_to_timestamp_micros)
            .unwrap_or_else(time::now_micros),
        ends_at: recovered.then(time::now_micros),
        fingerprint,
        priority: severity.priority(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_p1_trigger() {
        let payload = json::json!({
            "alert_title": "Latency too high",
            "alert_transition": "Triggered",
            "alert_priority": "P1",
            "alert_id": 12345,
            "host": "web-1",
            "tags": "env:prod, service:api"
        });
        let alerts = normalize(&payload).unwrap();
        let alert = &alerts[0];
        assert_eq!(alert.status, AlertStatus::Firing);
        assert_eq!(alert.severity, AlertSeverity::Critical);
        assert_eq!(alert.priority, AlertPriority::P1);
        assert_eq!(alert.fingerprint, "datadog-12345");
        assert_eq!(alert.labels.get("service").map(String::as_str), Some("api"));
    }

    #[test]
    fn test_recovery_downgrades_to_info() {
        let payload = json::json!({
            "alert_title": "Latency too high",
            "alert_transition": "Triggered->Recovered",
            "alert_priority": "P1",
            "alert_id": 12345
        });
        let alerts = normalize(&payload).unwrap();
        let alert = &alerts[0];
        assert_eq!(alert.status, AlertStatus::Resolved);
        assert_eq!(alert.severity, AlertSeverity::Info);
        // fingerprint matches the trigger, so the resolve finds it
        assert_eq!(alert.fingerprint, "datadog-12345");
    }

    #[test]
    fn test_priority_mapping() {
        for (priority, severity) in [
            ("P1", AlertSeverity::Critical),
            ("P2", AlertSeverity::High),
            ("P3", AlertSeverity::Warning),
            ("P4", AlertSeverity::Low),
            ("P5", AlertSeverity::Info),
        ] {
            let payload = json::json!({
                "alert_title": "x",
                "alert_transition": "Triggered",
                "alert_priority": priority
            });
            let alerts = normalize(&payload).unwrap();
            assert_eq!(alerts[0].severity, severity, "{priority}");
        }
    }

    #[test]
    fn test_legacy_event_title() {
        let payload = json::json!({
            "event_title": "Disk almost full",
            "transition": "Triggered",
            "hostname": "db-2"
        });
        let alerts = normalize(&payload).unwrap();
        assert_eq!(alerts[0].alert_name, "Disk almost full");
        assert_eq!(alerts[0].fingerprint, "Disk almost full-db-2");
    }

    #[test]
    fn test_no_title_rejected() {
        assert!(normalize(&json::json!({"transition": "Triggered"})).is_none());
    }
}
