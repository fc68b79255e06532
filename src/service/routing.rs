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

//! Service routing and escalation-policy assignee resolution.
//!
//! Routing walks the integration's service routes in stored order and
//! takes the first whose conditions match. Assignee resolution walks
//! the escalation levels and stops at the first concrete user.

use config::meta::{
    alerts::NormalizedAlert,
    escalation::EscalationTargetType,
    integrations::RoutingConditions,
};
use infra::{
    errors,
    table::{self, entity::integrations, entity::services},
};

use crate::service::schedule;

#[derive(Debug, Default)]
pub struct RouteResult {
    pub service: Option<services::Model>,
    pub assignee: Option<String>,
}

/// Does a routing document accept this alert? Empty or absent
/// conditions match everything.
pub fn conditions_match(conditions: &RoutingConditions, alert: &NormalizedAlert) -> bool {
    if let Some(severities) = &conditions.severity {
        let severity = alert.severity.to_string();
        if !severities.iter().any(|s| s.eq_ignore_ascii_case(&severity)) {
            return false;
        }
    }
    if let Some(alertnames) = &conditions.alertname {
        let matched = alertnames
            .iter()
            .any(|name| name == "*" || name == &alert.alert_name);
        if !matched {
            return false;
        }
    }
    if let Some(labels) = &conditions.labels {
        for (key, value) in labels {
            if alert.label(key) != Some(value.as_str()) {
                return false;
            }
        }
    }
    true
}

/// First matching active service for the alert, plus the resolved
/// assignee when the service carries an escalation policy
pub async fn route(
    integration: &integrations::Model,
    alert: &NormalizedAlert,
) -> Result<RouteResult, errors::Error> {
    for link in table::services::routes_for_integration(&integration.id).await? {
        let conditions: RoutingConditions =
            serde_json::from_value(link.routing_conditions.clone()).unwrap_or_default();
        if !conditions_match(&conditions, alert) {
            continue;
        }
        let Some(service) = table::services::get_unscoped(&link.service_id).await? else {
            log::warn!(
                "[ROUTE] service {} referenced by integration {} is gone",
                link.service_id,
                integration.id
            );
            continue;
        };
        if !service.is_active {
            continue;
        }

        let assignee = match &service.escalation_policy_id {
            Some(policy_id) => resolve_assignee(policy_id, &service.group_id).await?,
            None => None,
        };
        return Ok(RouteResult {
            service: Some(service),
            assignee,
        });
    }
    Ok(RouteResult::default())
}

/// Walk the policy's levels in order and stop at the first user found.
/// External targets are skipped at ingest; they are the notification
/// sink's business.
pub async fn resolve_assignee(
    policy_id: &str,
    group_id: &str,
) -> Result<Option<String>, errors::Error> {
    let Some(policy) = table::escalation::get_policy(policy_id).await? else {
        log::warn!("[ROUTE] escalation policy {policy_id} not found");
        return Ok(None);
    };
    if !policy.is_active {
        return Ok(None);
    }

    let levels = table::escalation::levels(policy_id).await?;
    let now = config::utils::time::now_micros();

    // no levels configured: default to the group's current schedule
    if levels.is_empty() {
        return Ok(on_call_user(group_id, now).await?);
    }

    for level in levels {
        let Ok(target_type) = level.target_type.parse::<EscalationTargetType>() else {
            log::warn!(
                "[ROUTE] level {} of policy {policy_id} has invalid target type {}",
                level.level_number,
                level.target_type
            );
            continue;
        };
        let user = match target_type {
            EscalationTargetType::User => level.target_id.clone(),
            EscalationTargetType::CurrentSchedule => on_call_user(group_id, now).await?,
            EscalationTargetType::Scheduler => match &level.target_id {
                Some(scheduler_id) => schedule::current_on_call(scheduler_id, now)
                    .await
                    .ok()
                    .flatten()
                    .map(|r| r.effective_user().to_string()),
                None => None,
            },
            EscalationTargetType::Group => table::groups::first_member(group_id).await?,
            EscalationTargetType::External => None,
        };
        if user.is_some() {
            return Ok(user);
        }
    }
    Ok(None)
}

async fn on_call_user(group_id: &str, t: i64) -> Result<Option<String>, errors::Error> {
    Ok(schedule::group_on_call(group_id, t)
        .await?
        .map(|r| r.effective_user().to_string()))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use config::meta::alerts::{AlertPriority, AlertSeverity, AlertStatus};

    use super::*;

    fn alert(severity: AlertSeverity, name: &str, labels: &[(&str, &str)]) -> NormalizedAlert {
        NormalizedAlert {
            alert_name: name.to_string(),
            severity,
            status: AlertStatus::Firing,
            summary: name.to_string(),
            description: String::new(),
            labels: labels
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            annotations: HashMap::new(),
            starts_at: 0,
            ends_at: None,
            fingerprint: "fp".to_string(),
            priority: AlertPriority::P3,
        }
    }

    fn conditions(json: serde_json::Value) -> RoutingConditions {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_empty_conditions_match_everything() {
        let c = conditions(serde_json::json!({}));
        assert!(conditions_match(&c, &alert(AlertSeverity::Info, "x", &[])));
    }

    #[test]
    fn test_severity_list() {
        let c = conditions(serde_json::json!({"severity": ["critical", "high"]}));
        assert!(conditions_match(&c, &alert(AlertSeverity::Critical, "x", &[])));
        assert!(conditions_match(&c, &alert(AlertSeverity::High, "x", &[])));
        assert!(!conditions_match(&c, &alert(AlertSeverity::Warning, "x", &[])));
    }

    #[test]
    fn test_alertname_wildcard_and_exact() {
        let c = conditions(serde_json::json!({"alertname": ["*"]}));
        assert!(conditions_match(&c, &alert(AlertSeverity::Low, "anything", &[])));

        let c = conditions(serde_json::json!({"alertname": ["HighCPU", "DiskFull"]}));
        assert!(conditions_match(&c, &alert(AlertSeverity::Low, "DiskFull", &[])));
        assert!(!conditions_match(&c, &alert(AlertSeverity::Low, "Other", &[])));
    }

    #[test]
    fn test_label_equality() {
        let c = conditions(serde_json::json!({"labels": {"env": "prod", "team": "core"}}));
        assert!(conditions_match(
            &c,
            &alert(AlertSeverity::Low, "x", &[("env", "prod"), ("team", "core")])
        ));
        // every listed key must exist and be equal
        assert!(!conditions_match(
            &c,
            &alert(AlertSeverity::Low, "x", &[("env", "prod")])
        ));
        assert!(!conditions_match(
            &c,
            &alert(AlertSeverity::Low, "x", &[("env", "staging"), ("team", "core")])
        ));
    }

    #[test]
    fn test_combined_conditions() {
        let c = conditions(serde_json::json!({
            "severity": ["critical"],
            "alertname": ["*"],
            "labels": {"env": "prod"}
        }));
        assert!(conditions_match(
            &c,
            &alert(AlertSeverity::Critical, "x", &[("env", "prod")])
        ));
        assert!(!conditions_match(
            &c,
            &alert(AlertSeverity::Critical, "x", &[("env", "dev")])
        ));
    }
}
