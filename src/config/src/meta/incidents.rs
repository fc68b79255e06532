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

/// Incident status lifecycle: Triggered → Acknowledged → Resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum IncidentStatus {
    #[default]
    Triggered,
    Acknowledged,
    Resolved,
}

impl IncidentStatus {
    pub fn is_open(&self) -> bool {
        !matches!(self, Self::Resolved)
    }
}

impl std::fmt::Display for IncidentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Triggered => write!(f, "triggered"),
            Self::Acknowledged => write!(f, "acknowledged"),
            Self::Resolved => write!(f, "resolved"),
        }
    }
}

impl std::str::FromStr for IncidentStatus {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "triggered" => Ok(Self::Triggered),
            "acknowledged" => Ok(Self::Acknowledged),
            "resolved" => Ok(Self::Resolved),
            _ => Err("invalid incident status"),
        }
    }
}

/// Events recorded on the incident timeline and handed to notification
/// sinks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum IncidentEventKind {
    Created,
    Acknowledged,
    Resolved,
    Assigned,
    Notified,
}

impl std::fmt::Display for IncidentEventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Created => write!(f, "created"),
            Self::Acknowledged => write!(f, "acknowledged"),
            Self::Resolved => write!(f, "resolved"),
            Self::Assigned => write!(f, "assigned"),
            Self::Notified => write!(f, "notified"),
        }
    }
}

impl std::str::FromStr for IncidentEventKind {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "created" => Ok(Self::Created),
            "acknowledged" => Ok(Self::Acknowledged),
            "resolved" => Ok(Self::Resolved),
            "assigned" => Ok(Self::Assigned),
            "notified" => Ok(Self::Notified),
            _ => Err("invalid incident event kind"),
        }
    }
}

/// Explicit transition table. The state machine is total: every pair not
/// listed here is a conflict, never a silent no-op.
pub fn next_status(current: IncidentStatus, target: IncidentStatus) -> Option<IncidentStatus> {
    use IncidentStatus::*;
    match (current, target) {
        (Triggered, Acknowledged) => Some(Acknowledged),
        (Triggered, Resolved) => Some(Resolved),
        (Acknowledged, Resolved) => Some(Resolved),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transition_matrix() {
        use IncidentStatus::*;
        // all 9 cells
        let cases = [
            (Triggered, Triggered, None),
            (Triggered, Acknowledged, Some(Acknowledged)),
            (Triggered, Resolved, Some(Resolved)),
            (Acknowledged, Triggered, None),
            (Acknowledged, Acknowledged, None),
            (Acknowledged, Resolved, Some(Resolved)),
            (Resolved, Triggered, None),
            (Resolved, Acknowledged, None),
            (Resolved, Resolved, None),
        ];
        for (from, to, want) in cases {
            assert_eq!(next_status(from, to), want, "{from} -> {to}");
        }
    }

    #[test]
    fn test_is_open() {
        assert!(IncidentStatus::Triggered.is_open());
        assert!(IncidentStatus::Acknowledged.is_open());
        assert!(!IncidentStatus::Resolved.is_open());
    }
}
