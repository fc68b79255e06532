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

//! Grafana alerting webhook adapter

use std::collections::HashMap;

use config::{
    meta::alerts::{AlertSeverity, AlertStatus, NormalizedAlert},
    utils::{json, time},
};
use serde::Deserialize;

use super::str_field;

#[derive(Debug, Deserialize)]
struct GrafanaWebhook {
    state: String,
    #[serde(default, rename = "ruleName")]
    rule_name: Option<String>,
    #[serde(default, rename = "ruleId")]
    rule_id: Option<i64>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    tags: Option<HashMap<String, String>>,
}

pub fn normalize(body: &json::Value) -> Option<Vec<NormalizedAlert>> {
    match json::from_value::<GrafanaWebhook>(body.clone()) {
        Ok(webhook) => Some(vec![convert(webhook)]),
        Err(e) => {
            log::debug!("[WEBHOOK] grafana typed decode failed: {e}, trying legacy shape");
            normalize_legacy(body)
        }
    }
}

fn normalize_legacy(body: &json::Value) -> Option<Vec<NormalizedAlert>> {
    let state = str_field(body, &["state", "status"])?;
    let webhook = GrafanaWebhook {
        state: state.to_string(),
        rule_name: str_field(body, &["ruleName", "rule_name", "alertname"]).map(|v| v.to_string()),
        rule_id: body.get("ruleId").and_then(|v| v.as_i64()),
        title: str_field(body, &["title"]).map(|v| v.to_string()),
        message: str_field(body, &["message", "text"]).map(|v| v.to_string()),
        tags: None,
    };
    Some(vec![convert(webhook)])
}

fn convert(webhook: GrafanaWebhook) -> NormalizedAlert {
    // alerting/pending fire, ok resolves
    let state = webhook.state.to_lowercase();
    let (status, severity) = match state.as_str() {
        "ok" => (AlertStatus::Resolved, AlertSeverity::Info),
        "pending" => (AlertStatus::Firing, AlertSeverity::Warning),
        _ => (AlertStatus::Firing, AlertSeverity::Critical),
    };

    let rule_name = webhook
        .rule_name
        .or(webhook.title.clone())
        .unwrap_or_else(|| "Grafana alert".to_string());

    let mut labels = webhook.tags.unwrap_or_default();
    labels.insert("alertname".to_string(), rule_name.clone());

    let fingerprint = match webhook.rule_id {
        Some(rule_id) => format!("{rule_name}-{rule_id}"),
        None => rule_name.clone(),
    };

    NormalizedAlert {
        alert_name: rule_name.clone(),
        severity,
        status,
        summary: webhook.title.unwrap_or_else(|| rule_name.clone()),
        description: webhook.message.unwrap_or_default(),
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
    fn test_alerting_state() {
        let payload = json::json!({
            "state": "alerting",
            "ruleName": "HeapUsage",
            "ruleId": 42,
            "title": "[Alerting] HeapUsage",
            "message": "heap over limit",
            "tags": {"team": "core"}
        });
        let alerts = normalize(&payload).unwrap();
        let alert = &alerts[0];
        assert_eq!(alert.status, AlertStatus::Firing);
        assert_eq!(alert.severity, AlertSeverity::Critical);
        assert_eq!(alert.fingerprint, "HeapUsage-42");
        assert_eq!(alert.labels.get("team").map(String::as_str), Some("core"));
    }

    #[test]
    fn test_state_mapping() {
        for (state, status, severity) in [
            ("alerting", AlertStatus::Firing, AlertSeverity::Critical),
            ("pending", AlertStatus::Firing, AlertSeverity::Warning),
            ("ok", AlertStatus::Resolved, AlertSeverity::Info),
        ] {
            let payload = json::json!({"state": state, "ruleName": "r"});
            let alerts = normalize(&payload).unwrap();
            assert_eq!(alerts[0].status, status, "{state}");
            assert_eq!(alerts[0].severity, severity, "{state}");
        }
    }

    #[test]
    fn test_legacy_status_field() {
        let payload = json::json!({"status": "ok", "alertname": "Ping"});
        let alerts = normalize(&payload).unwrap();
        assert_eq!(alerts[0].status, AlertStatus::Resolved);
        assert_eq!(alerts[0].alert_name, "Ping");
    }

    #[test]
    fn test_missing_state_rejected() {
        assert!(normalize(&json::json!({"ruleName": "r"})).is_none());
    }
}
