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

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Supported monitoring vendors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum IntegrationType {
    Prometheus,
    Datadog,
    Grafana,
    Aws,
    Pagerduty,
    Coralogix,
    Webhook,
}

impl IntegrationType {
    /// Deterministic system user that auto-resolve actions are
    /// attributed to
    pub fn system_user(&self) -> &'static str {
        match self {
            Self::Prometheus => "system-prometheus",
            Self::Datadog => "system-datadog",
            Self::Grafana => "system-grafana",
            Self::Aws => "system-aws",
            Self::Pagerduty => "system-pagerduty",
            Self::Coralogix => "system-coralogix",
            Self::Webhook => "system-webhook",
        }
    }
}

impl std::fmt::Display for IntegrationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Prometheus => write!(f, "prometheus"),
            Self::Datadog => write!(f, "datadog"),
            Self::Grafana => write!(f, "grafana"),
            Self::Aws => write!(f, "aws"),
            Self::Pagerduty => write!(f, "pagerduty"),
            Self::Coralogix => write!(f, "coralogix"),
            Self::Webhook => write!(f, "webhook"),
        }
    }
}

impl std::str::FromStr for IntegrationType {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "prometheus" => Ok(Self::Prometheus),
            "datadog" => Ok(Self::Datadog),
            "grafana" => Ok(Self::Grafana),
            "aws" | "cloudwatch" => Ok(Self::Aws),
            "pagerduty" => Ok(Self::Pagerduty),
            "coralogix" => Ok(Self::Coralogix),
            "webhook" | "generic" => Ok(Self::Webhook),
            _ => Err("invalid integration type"),
        }
    }
}

/// Integration health derived from heartbeats and uptime checks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    #[default]
    Unknown,
    Healthy,
    Degraded,
    Unhealthy,
}

impl std::fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unknown => write!(f, "unknown"),
            Self::Healthy => write!(f, "healthy"),
            Self::Degraded => write!(f, "degraded"),
            Self::Unhealthy => write!(f, "unhealthy"),
        }
    }
}

impl std::str::FromStr for HealthStatus {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "unknown" => Ok(Self::Unknown),
            "healthy" => Ok(Self::Healthy),
            "degraded" => Ok(Self::Degraded),
            "unhealthy" => Ok(Self::Unhealthy),
            _ => Err("invalid health status"),
        }
    }
}

/// Per-service routing conditions attached to a ServiceIntegration.
/// Empty or absent fields match everything; the first match in stored
/// order wins.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RoutingConditions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<Vec<String>>,
    /// "*" matches all alert names
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alertname: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<std::collections::HashMap<String, String>>,
}

impl RoutingConditions {
    pub fn is_empty(&self) -> bool {
        self.severity.is_none() && self.alertname.is_none() && self.labels.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_parse_aliases() {
        assert_eq!(
            "cloudwatch".parse::<IntegrationType>().unwrap(),
            IntegrationType::Aws
        );
        assert_eq!(
            "generic".parse::<IntegrationType>().unwrap(),
            IntegrationType::Webhook
        );
    }

    #[test]
    fn test_system_users() {
        assert_eq!(IntegrationType::Prometheus.system_user(), "system-prometheus");
        assert_eq!(IntegrationType::Webhook.system_user(), "system-webhook");
    }

    #[test]
    fn test_routing_conditions_empty() {
        let rc: RoutingConditions = serde_json::from_str("{}").unwrap();
        assert!(rc.is_empty());
    }
}
