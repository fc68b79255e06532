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

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Alert status as reported by the vendor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AlertStatus {
    #[default]
    Firing,
    Resolved,
}

impl std::fmt::Display for AlertStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Firing => write!(f, "firing"),
            Self::Resolved => write!(f, "resolved"),
        }
    }
}

impl std::str::FromStr for AlertStatus {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "firing" => Ok(Self::Firing),
            "resolved" => Ok(Self::Resolved),
            _ => Err("invalid alert status"),
        }
    }
}

/// Alert severity, highest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    Critical,
    High,
    #[default]
    Warning,
    Medium,
    Low,
    Info,
}

impl AlertSeverity {
    /// P1..P5 paging priority derived from severity
    pub fn priority(&self) -> AlertPriority {
        match self {
            Self::Critical => AlertPriority::P1,
            Self::High => AlertPriority::P2,
            Self::Warning | Self::Medium => AlertPriority::P3,
            Self::Low => AlertPriority::P4,
            Self::Info => AlertPriority::P5,
        }
    }

    /// Incident urgency derived from severity: info/warning page low
    pub fn urgency(&self) -> Urgency {
        match self {
            Self::Info | Self::Warning => Urgency::Low,
            _ => Urgency::High,
        }
    }
}

impl std::fmt::Display for AlertSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Critical => write!(f, "critical"),
            Self::High => write!(f, "high"),
            Self::Warning => write!(f, "warning"),
            Self::Medium => write!(f, "medium"),
            Self::Low => write!(f, "low"),
            Self::Info => write!(f, "info"),
        }
    }
}

impl std::str::FromStr for AlertSeverity {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "critical" => Ok(Self::Critical),
            "high" => Ok(Self::High),
            "warning" => Ok(Self::Warning),
            "medium" => Ok(Self::Medium),
            "low" => Ok(Self::Low),
            "info" => Ok(Self::Info),
            _ => Err("invalid alert severity"),
        }
    }
}

/// Paging priority P1 (page now) .. P5 (informational)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
pub enum AlertPriority {
    P1,
    P2,
    #[default]
    P3,
    P4,
    P5,
}

impl AlertPriority {
    /// Severity a vendor-supplied priority maps back to
    pub fn severity(&self) -> AlertSeverity {
        match self {
            Self::P1 => AlertSeverity::Critical,
            Self::P2 => AlertSeverity::High,
            Self::P3 => AlertSeverity::Warning,
            Self::P4 => AlertSeverity::Low,
            Self::P5 => AlertSeverity::Info,
        }
    }
}

impl std::fmt::Display for AlertPriority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::P1 => write!(f, "P1"),
            Self::P2 => write!(f, "P2"),
            Self::P3 => write!(f, "P3"),
            Self::P4 => write!(f, "P4"),
            Self::P5 => write!(f, "P5"),
        }
    }
}

impl std::str::FromStr for AlertPriority {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "P1" => Ok(Self::P1),
            "P2" => Ok(Self::P2),
            "P3" => Ok(Self::P3),
            "P4" => Ok(Self::P4),
            "P5" => Ok(Self::P5),
            _ => Err("invalid alert priority"),
        }
    }
}

/// Incident urgency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    #[default]
    High,
    Low,
}

impl std::fmt::Display for Urgency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::High => write!(f, "high"),
            Self::Low => write!(f, "low"),
        }
    }
}

impl std::str::FromStr for Urgency {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "high" => Ok(Self::High),
            "low" => Ok(Self::Low),
            _ => Err("invalid urgency"),
        }
    }
}

/// One alert after vendor normalization. All webhook adapters produce
/// this shape; everything downstream of the normalizer consumes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct NormalizedAlert {
    pub alert_name: String,
    pub severity: AlertSeverity,
    pub status: AlertStatus,
    pub summary: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub labels: HashMap<String, String>,
    #[serde(default)]
    pub annotations: HashMap<String, String>,
    /// Microseconds since epoch, UTC
    pub starts_at: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ends_at: Option<i64>,
    /// Vendor-supplied or derived stable dedup key
    pub fingerprint: String,
    pub priority: AlertPriority,
}

impl NormalizedAlert {
    pub fn label(&self, key: &str) -> Option<&str> {
        self.labels.get(key).map(|v| v.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_priority_mapping() {
        assert_eq!(AlertSeverity::Critical.priority(), AlertPriority::P1);
        assert_eq!(AlertSeverity::High.priority(), AlertPriority::P2);
        assert_eq!(AlertSeverity::Warning.priority(), AlertPriority::P3);
        assert_eq!(AlertSeverity::Medium.priority(), AlertPriority::P3);
        assert_eq!(AlertSeverity::Low.priority(), AlertPriority::P4);
        assert_eq!(AlertSeverity::Info.priority(), AlertPriority::P5);
    }

    #[test]
    fn test_priority_severity_roundtrip() {
        assert_eq!(AlertPriority::P1.severity(), AlertSeverity::Critical);
        assert_eq!(AlertPriority::P4.severity(), AlertSeverity::Low);
        assert_eq!(AlertPriority::P5.severity(), AlertSeverity::Info);
    }

    #[test]
    fn test_urgency_from_severity() {
        assert_eq!(AlertSeverity::Info.urgency(), Urgency::Low);
        assert_eq!(AlertSeverity::Warning.urgency(), Urgency::Low);
        assert_eq!(AlertSeverity::Medium.urgency(), Urgency::High);
        assert_eq!(AlertSeverity::Critical.urgency(), Urgency::High);
    }

    #[test]
    fn test_status_parse() {
        assert_eq!(
            "resolved".parse::<AlertStatus>().unwrap(),
            AlertStatus::Resolved
        );
        assert!("flapping".parse::<AlertStatus>().is_err());
    }
}
