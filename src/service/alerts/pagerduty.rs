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

//! PagerDuty webhook adapter (v2 messages array or a bare incident)

use std::collections::HashMap;

use config::{
    meta::alerts::{AlertSeverity, AlertStatus, NormalizedAlert},
    utils::json,
};
use serde::Deserialize;

use super::{parse_time_or_now, str_field};

#[derive(Debug, Deserialize)]
struct PagerDutyWebhook {
    messages: Vec<PagerDutyMessage>,
}

#[derive(Debug, Deserialize)]
struct PagerDutyMessage {
    #[serde(default)]
    incident: Option<PagerDutyIncident>,
}

#[derive(Debug, Deserialize)]
struct PagerDutyIncident {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    incident_key: Option<String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    urgency: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    created_at: Option<String>,
}

pub fn normalize(body: &json::Value) -> Option<Vec<NormalizedAlert>> {
    match json::from_value::<PagerDutyWebhook>(body.clone()) {
        Ok(webhook) => {
            let alerts: Vec<NormalizedAlert> = webhook
                .messages
                .into_iter()
                .filter_map(|message| message.incident.map(convert))
                .collect();
            if alerts.is_empty() { None } else { Some(alerts) }
        }
        Err(e) => {
            log::debug!("[WEBHOOK] pagerduty typed decode failed: {e}, trying legacy shape");
            normalize_legacy(body)
        }
    }
}

/// Legacy shape: the body is the incident itself, possibly under an
/// "incident" key
fn normalize_legacy(body: &json::Value) -> Option<Vec<NormalizedAlert>> {
    let incident = body.get("incident").unwrap_or(body);
    str_field(incident, &["title", "description", "incident_key"])?;
    let incident: PagerDutyIncident = json::from_value(incident.clone()).ok()?;
    Some(vec![convert(incident)])
}

fn convert(incident: PagerDutyIncident) -> NormalizedAlert {
    let status = match incident.status.as_deref() {
        Some("resolved") => AlertStatus::Resolved,
        _ => AlertStatus::Firing,
    };
    let severity = match incident.urgency.as_deref() {
        Some("high") => AlertSeverity::High,
        Some("low") => AlertSeverity::Low,
        _ => AlertSeverity::Warning,
    };

    let title = incident
        .title
        .or(incident.description.clone())
        .unwrap_or_else(|| "PagerDuty incident".to_string());

    // incident_key is the vendor's dedup key, use it verbatim
    let fingerprint = incident
        .incident_key
        .clone()
        .or(incident.id.clone())
        .unwrap_or_else(|| format!("pagerduty-{title}"));

    let mut labels = HashMap::from([("alertname".to_string(), title.clone())]);
    if let Some(urgency) = &incident.urgency {
        labels.insert("urgency".to_string(), urgency.clone());
    }

    NormalizedAlert {
        alert_name: title.clone(),
        severity,
        status,
        summary: title,
        description: incident.description.unwrap_or_default(),
        labels,
        annotations: HashMap::new(),
        starts_at: parse_time_or_now(incident.created_at.as_deref()),
        ends_at: None,
        fingerprint,
        priority: severity.priority(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_triggered_message() {
        let payload = json::json!({
            "messages": [{
                "event": "incident.trigger",
                "incident": {
                    "id": "PIJ90N7",
                    "incident_key": "srv01/load",
                    "status": "triggered",
                    "urgency": "high",
                    "title": "Load too high on srv01",
                    "created_at": "2025-01-02T03:04:05Z"
                }
            }]
        });
        let alerts = normalize(&payload).unwrap();
        let alert = &alerts[0];
        assert_eq!(alert.status, AlertStatus::Firing);
        assert_eq!(alert.severity, AlertSeverity::High);
        assert_eq!(alert.fingerprint, "srv01/load");
    }

    #[test]
    fn test_resolved_and_urgency_mapping() {
        for (urgency, severity) in [
            (Some("high"), AlertSeverity::High),
            (Some("low"), AlertSeverity::Low),
            (None, AlertSeverity::Warning),
        ] {
            let mut incident = json::json!({
                "incident_key": "k1",
                "status": "resolved",
                "title": "t"
            });
            if let Some(urgency) = urgency {
                incident["urgency"] = json::json!(urgency);
            }
            let payload = json::json!({"messages": [{"incident": incident}]});
            let alerts = normalize(&payload).unwrap();
            assert_eq!(alerts[0].status, AlertStatus::Resolved);
            assert_eq!(alerts[0].severity, severity, "{urgency:?}");
        }
    }

    #[test]
    fn test_legacy_bare_incident() {
        let payload = json::json!({
            "incident_key": "db/replication",
            "status": "triggered",
            "title": "Replication lag"
        });
        let alerts = normalize(&payload).unwrap();
        assert_eq!(alerts[0].fingerprint, "db/replication");
    }

    #[test]
    fn test_empty_messages_rejected() {
        assert!(normalize(&json::json!({"messages": []})).is_none());
    }
}
