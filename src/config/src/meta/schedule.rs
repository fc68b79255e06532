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

use chrono::Weekday;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum RotationType {
    Daily,
    #[default]
    Weekly,
    Custom,
}

impl std::fmt::Display for RotationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Daily => write!(f, "daily"),
            Self::Weekly => write!(f, "weekly"),
            Self::Custom => write!(f, "custom"),
        }
    }
}

impl std::str::FromStr for RotationType {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "daily" => Ok(Self::Daily),
            "weekly" => Ok(Self::Weekly),
            "custom" => Ok(Self::Custom),
            _ => Err("invalid rotation type"),
        }
    }
}

/// How long one shift lasts before handing off
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ShiftLength {
    OneDay,
    #[default]
    OneWeek,
    TwoWeeks,
    OneMonth,
}

impl ShiftLength {
    /// Nominal shift duration in days. OneMonth is fixed at 30 days so
    /// expansion stays deterministic across month boundaries.
    pub fn days(&self) -> i64 {
        match self {
            Self::OneDay => 1,
            Self::OneWeek => 7,
            Self::TwoWeeks => 14,
            Self::OneMonth => 30,
        }
    }

    pub fn duration_micros(&self) -> i64 {
        self.days() * 24 * 3600 * 1_000_000
    }
}

impl std::fmt::Display for ShiftLength {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OneDay => write!(f, "one_day"),
            Self::OneWeek => write!(f, "one_week"),
            Self::TwoWeeks => write!(f, "two_weeks"),
            Self::OneMonth => write!(f, "one_month"),
        }
    }
}

impl std::str::FromStr for ShiftLength {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "one_day" => Ok(Self::OneDay),
            "one_week" => Ok(Self::OneWeek),
            "two_weeks" => Ok(Self::TwoWeeks),
            "one_month" => Ok(Self::OneMonth),
            _ => Err("invalid shift length"),
        }
    }
}

/// Weekday the rotation hands off on, stored lowercase
pub fn parse_handoff_day(s: &str) -> Result<Weekday, &'static str> {
    match s.to_lowercase().as_str() {
        "monday" | "mon" => Ok(Weekday::Mon),
        "tuesday" | "tue" => Ok(Weekday::Tue),
        "wednesday" | "wed" => Ok(Weekday::Wed),
        "thursday" | "thu" => Ok(Weekday::Thu),
        "friday" | "fri" => Ok(Weekday::Fri),
        "saturday" | "sat" => Ok(Weekday::Sat),
        "sunday" | "sun" => Ok(Weekday::Sun),
        _ => Err("invalid handoff day"),
    }
}

/// "HH:MM" in UTC
pub fn parse_handoff_time(s: &str) -> Result<(u32, u32), &'static str> {
    let (h, m) = s.split_once(':').ok_or("invalid handoff time")?;
    let h: u32 = h.parse().map_err(|_| "invalid handoff time")?;
    let m: u32 = m.parse().map_err(|_| "invalid handoff time")?;
    if h > 23 || m > 59 {
        return Err("invalid handoff time");
    }
    Ok((h, m))
}

/// One concrete shift produced by rotation expansion. Times are
/// microseconds since epoch, UTC.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ExpandedShift {
    pub rotation_id: String,
    pub user_id: String,
    pub start_time: i64,
    pub end_time: i64,
}

/// Who is on call for a shift once overrides are applied
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ShiftResolution {
    Scheduled {
        user_id: String,
    },
    Overridden {
        original_user_id: String,
        override_user_id: String,
        override_id: String,
        reason: String,
    },
}

impl ShiftResolution {
    /// The user that is effectively on call
    pub fn effective_user(&self) -> &str {
        match self {
            Self::Scheduled { user_id } => user_id,
            Self::Overridden {
                override_user_id, ..
            } => override_user_id,
        }
    }

    pub fn is_overridden(&self) -> bool {
        matches!(self, Self::Overridden { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shift_length_days() {
        assert_eq!(ShiftLength::OneDay.days(), 1);
        assert_eq!(ShiftLength::OneWeek.days(), 7);
        assert_eq!(ShiftLength::TwoWeeks.days(), 14);
        assert_eq!(ShiftLength::OneMonth.days(), 30);
    }

    #[test]
    fn test_parse_handoff_day() {
        assert_eq!(parse_handoff_day("Monday").unwrap(), Weekday::Mon);
        assert_eq!(parse_handoff_day("sun").unwrap(), Weekday::Sun);
        assert!(parse_handoff_day("someday").is_err());
    }

    #[test]
    fn test_parse_handoff_time() {
        assert_eq!(parse_handoff_time("00:00").unwrap(), (0, 0));
        assert_eq!(parse_handoff_time("23:59").unwrap(), (23, 59));
        assert!(parse_handoff_time("24:00").is_err());
        assert!(parse_handoff_time("0800").is_err());
    }

    #[test]
    fn test_resolution_effective_user() {
        let s = ShiftResolution::Scheduled {
            user_id: "u1".to_string(),
        };
        assert_eq!(s.effective_user(), "u1");
        assert!(!s.is_overridden());

        let o = ShiftResolution::Overridden {
            original_user_id: "u1".to_string(),
            override_user_id: "u3".to_string(),
            override_id: "ov1".to_string(),
            reason: "swap".to_string(),
        };
        assert_eq!(o.effective_user(), "u3");
        assert!(o.is_overridden());
    }
}
