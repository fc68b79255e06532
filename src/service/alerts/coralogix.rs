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

//! Coralogix alert webhook adapter

use std::collections::HashMap;

use config::{
    meta::alerts::{AlertSeverity, AlertStatus, NormalizedAlert},
    utils::{json, time},
};
use serde::Deserialize;

use super::{str_field, string_map};

#[derive(Debug, Deserialize)]
struct CoralogixWebhook {
    alert_name: String,
    #[serde(default)]
    alert_action: Option<String>,
    #[serde(default)]
    alert_severity: Option<String>,
    #[serde(default)]
    alert_description: Option<String>,
    #[serde(default)]
    alert_id: Option<String>,
    #[serde(default)]
    fields: Option<HashMap<String, String>>,
}

pub fn normalize(body: &json::Value) -> Option<Vec<NormalizedAlert>> {
    match json::from_value::<CoralogixWebhook>(body.clone()) {
        Ok(webhook) => Some(vec![convert(webhook)]),
        Err(e) => {
            log::debug!("[WEBHOOK] coralogix typed decode failed: {e}, trying legacy shape");
            normalize_legacy(body)
        }
    }
}

fn normalize_legacy(body: &json::Value) -> Option<Vec<NormalizedAlert>> {
    let name = str_field(body, &["alert_name", "alertName", "name"])?;
    let webhook = CoralogixWebhook {
        alert_name: name.to_string(),
        alert_action: str_field(body, &["alert_action", "action"]).map(|v| v.to_string()),
        alert_severity: str_field(body, &["alert_severity", "severity"]).map(|v| v.to_string()),
        alert_description: str_field(body, &["alert_description", "description"])
            .map(|v| v.to_string()),
        alert_id: str_field(body, &["alert_id", "alertId", "id"]).map(|v| v.to_string()),
        fields: Some(string_map(body.get("fields"))),
    };
    Some(vec![convert(webhook)])
}

fn convert(webhook: CoralogixWebhook) -> NormalizedAlert {
    let status = match webhook.alert_action.as_deref() {
        Some("resolve") => AlertStatus::Resolved,
        _ => AlertStatus::Firing,
    };
    let severity = match webhook
        .alert_severity
        .as_deref()
        .unwrap_or("")
        .to_lowercase()
        .as_str()
    {
        "critical" => AlertSeverity::Critical,
        "error" => AlertSeverity::High,
        "info" => AlertSeverity::Info,
        _ => AlertSeverity::Warning,
    };

    let mut labels = webhook.fields.unwrap_or_default();
    labels.insert("alertname".to_string(), webhook.alert_name.clone());

    // alert_id is stable across trigger and resolve, use it verbatim
    let fingerprint = webhook
        .alert_id
        .clone()
        .unwrap_or_else(|| format!("coralogix-{}", webhook.alert_name));

    NormalizedAlert {
        alert_name: webhook.alert_name.clone(),
        severity,
        status,
        summary: webhook.alert_name,
        description: webhook.alert_description.unwrap_or_default(),
        labels,
        annotations: HashMap::new(),
        starts_at: time::now_micros(),
        ends_at: None,
        fingerprint,
        priority: severity.priority(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trigger() {
        let payload = json::json!({
            "alert_name": "Error spike",
            "alert_action": "trigger",
            "alert_severity": "error",
            "alert_id": "cgx-123",
            "fields": {"application": "checkout"}
        });
        let alerts = normalize(&payload).unwrap();
        let alert = &alerts[0];
        assert_eq!(alert.status, AlertStatus::Firing);
        assert_eq!(alert.severity, AlertSeverity::High);
        assert_eq!(alert.fingerprint, "cgx-123");
        assert_eq!(
            alert.labels.get("application").map(String::as_str),
            Some("checkout")
        );
    }

    #[test]
    fn test_severity_mapping() {
        for (input, want) in [
            ("critical", AlertSeverity::Critical),
            ("error", AlertSeverity::High),
            ("warning", AlertSeverity::Warning),
            ("info", AlertSeverity::Info),
            ("weird", AlertSeverity::Warning),
        ] {
            let payload = json::json!({"alert_name": "a", "alert_severity": input});
            let alerts = normalize(&payload).unwrap();
            assert_eq!(alerts[0].severity, want, "{input}");
        }
    }

    #[test]
    fn test_resolve_action() {
        let payload = json::json!({
            "alert_name": "Error spike",
            "alert_action": "resolve",
            "alert_id": "cgx-123"
        });
        let alerts = normalize(&payload).unwrap();
        assert_eq!(alerts[0].status, AlertStatus::Resolved);
        assert_eq!(alerts[0].fingerprint, "cgx-123");
    }

    #[test]
    fn test_missing_name_rejected() {
        assert!(normalize(&json::json!({"alert_action": "trigger"})).is_none());
    }
}
