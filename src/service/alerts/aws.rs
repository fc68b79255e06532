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

//! AWS CloudWatch alarm adapter. Accepts both the raw alarm document
//! and the SNS notification envelope that wraps it as a JSON string.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use config::{
    meta::alerts::{AlertSeverity, AlertStatus, NormalizedAlert},
    utils::{json, time},
};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct CloudWatchAlarm {
    #[serde(rename = "AlarmName")]
    alarm_name: String,
    #[serde(default, rename = "AlarmDescription")]
    alarm_description: Option<String>,
    #[serde(default, rename = "NewStateValue")]
    new_state_value: Option<String>,
    #[serde(default, rename = "NewStateReason")]
    new_state_reason: Option<String>,
    #[serde(default, rename = "StateChangeTime")]
    state_change_time: Option<String>,
    #[serde(default, rename = "Region")]
    region: Option<String>,
}

pub fn normalize(body: &json::Value) -> Option<Vec<NormalizedAlert>> {
    // unwrap an SNS envelope first
    if let Some(message) = body.get("Message").and_then(|v| v.as_str())
        && let Ok(inner) = json::from_str::<json::Value>(message)
    {
        return normalize(&inner);
    }

    match json::from_value::<CloudWatchAlarm>(body.clone()) {
        Ok(alarm) => Some(vec![convert(alarm)]),
        Err(e) => {
            log::debug!("[WEBHOOK] aws typed decode failed: {e}, trying legacy shape");
            normalize_legacy(body)
        }
    }
}

fn normalize_legacy(body: &json::Value) -> Option<Vec<NormalizedAlert>> {
    let alarm_name = body
        .get("alarmName")
        .or_else(|| body.get("alarm_name"))
        .and_then(|v| v.as_str())?;
    let alarm = CloudWatchAlarm {
        alarm_name: alarm_name.to_string(),
        alarm_description: body
            .get("alarmDescription")
            .and_then(|v| v.as_str())
            .map(|v| v.to_string()),
        new_state_value: body
            .get("newStateValue")
            .or_else(|| body.get("state"))
            .and_then(|v| v.as_str())
            .map(|v| v.to_string()),
        new_state_reason: body
            .get("newStateReason")
            .and_then(|v| v.as_str())
            .map(|v| v.to_string()),
        state_change_time: None,
        region: body.get("region").and_then(|v| v.as_str()).map(|v| v.to_string()),
    };
    Some(vec![convert(alarm)])
}

fn convert(alarm: CloudWatchAlarm) -> NormalizedAlert {
    let state = alarm
        .new_state_value
        .as_deref()
        .unwrap_or("ALARM")
        .to_uppercase();
    // ALARM fires critical, OK resolves, INSUFFICIENT_DATA fires at
    // warning so a broken metric still pages someone
    let (status, severity) = match state.as_str() {
        "OK" => (AlertStatus::Resolved, AlertSeverity::Info),
        "INSUFFICIENT_DATA" => (AlertStatus::Firing, AlertSeverity::Warning),
        _ => (AlertStatus::Firing, AlertSeverity::Critical),
    };

    let region = alarm.region.as_deref().unwrap_or("aws");
    let fingerprint = format!("{}-{region}", alarm.alarm_name);

    let mut labels = HashMap::from([
        ("alertname".to_string(), alarm.alarm_name.clone()),
        ("region".to_string(), region.to_string()),
        ("state".to_string(), state),
    ]);
    if let Some(description) = &alarm.alarm_description {
        labels.insert("description".to_string(), description.clone());
    }

    NormalizedAlert {
        alert_name: alarm.alarm_name.clone(),
        severity,
        status,
        summary: alarm
            .alarm_description
            .unwrap_or_else(|| alarm.alarm_name.clone()),
        description: alarm.new_state_reason.unwrap_or_default(),
        labels,
        annotations: HashMap::new(),
        starts_at: alarm
            .state_change_time
            .as_deref()
            .and_then(parse_state_change_time)
            .unwrap_or_else(time::now_micros),
        ends_at: None,
        fingerprint,
        priority: severity.priority(),
    }
}

/// CloudWatch emits "2025-01-02T03:04:05.000+0000", which is not quite
/// RFC3339
fn parse_state_change_time(value: &str) -> Option<i64> {
    if let Ok(ts) = time::parse_str_to_timestamp_micros(value) {
        return Some(ts);
    }
    DateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f%z")
        .ok()
        .map(|dt| dt.with_timezone(&Utc).timestamp_micros())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alarm_state() {
        let payload = json::json!({
            "AlarmName": "cpu-high",
            "AlarmDescription": "CPU over 80%",
            "NewStateValue": "ALARM",
            "NewStateReason": "Threshold crossed",
            "StateChangeTime": "2025-01-02T03:04:05.000+0000",
            "Region": "us-east-1"
        });
        let alerts = normalize(&payload).unwrap();
        let alert = &alerts[0];
        assert_eq!(alert.status, AlertStatus::Firing);
        assert_eq!(alert.severity, AlertSeverity::Critical);
        assert_eq!(alert.fingerprint, "cpu-high-us-east-1");
        assert_eq!(alert.starts_at, 1735787045000000);
    }

    #[test]
    fn test_state_mapping() {
        for (state, status, severity) in [
            ("ALARM", AlertStatus::Firing, AlertSeverity::Critical),
            ("OK", AlertStatus::Resolved, AlertSeverity::Info),
            (
                "INSUFFICIENT_DATA",
                AlertStatus::Firing,
                AlertSeverity::Warning,
            ),
        ] {
            let payload = json::json!({"AlarmName": "a", "NewStateValue": state});
            let alerts = normalize(&payload).unwrap();
            assert_eq!(alerts[0].status, status, "{state}");
            assert_eq!(alerts[0].severity, severity, "{state}");
        }
    }

    #[test]
    fn test_sns_envelope() {
        let inner = json::json!({"AlarmName": "mem-high", "NewStateValue": "ALARM"}).to_string();
        let payload = json::json!({"Type": "Notification", "Message": inner});
        let alerts = normalize(&payload).unwrap();
        assert_eq!(alerts[0].alert_name, "mem-high");
    }

    #[test]
    fn test_missing_alarm_name_rejected() {
        assert!(normalize(&json::json!({"NewStateValue": "ALARM"})).is_none());
    }
}
