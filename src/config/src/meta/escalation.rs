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

/// What an escalation level points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum EscalationTargetType {
    /// Current on-call of the owning group
    CurrentSchedule,
    /// Current on-call of a specific scheduler
    Scheduler,
    User,
    /// First active member by escalation order
    Group,
    /// Delivered by the notification sink, skipped at ingest
    External,
}

impl std::fmt::Display for EscalationTargetType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CurrentSchedule => write!(f, "current_schedule"),
            Self::Scheduler => write!(f, "scheduler"),
            Self::User => write!(f, "user"),
            Self::Group => write!(f, "group"),
            Self::External => write!(f, "external"),
        }
    }
}

impl std::str::FromStr for EscalationTargetType {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "current_schedule" => Ok(Self::CurrentSchedule),
            "scheduler" => Ok(Self::Scheduler),
            "user" => Ok(Self::User),
            "group" => Ok(Self::Group),
            "external" => Ok(Self::External),
            _ => Err("invalid escalation target type"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_type_roundtrip() {
        for t in [
            EscalationTargetType::CurrentSchedule,
            EscalationTargetType::Scheduler,
            EscalationTargetType::User,
            EscalationTargetType::Group,
            EscalationTargetType::External,
        ] {
            assert_eq!(t.to_string().parse::<EscalationTargetType>().unwrap(), t);
        }
    }
}
