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

//! On-call scheduler engine.
//!
//! Rotations expand deterministically into shifts: the first shift
//! starts at `start_at`, every later shift starts at the next handoff
//! instant on or after the previous shift's end, and users cycle
//! round-robin. All boundary arithmetic is UTC.

use chrono::{Datelike, Days, Weekday};
use config::{
    meta::schedule::{
        ExpandedShift, ShiftLength, ShiftResolution, parse_handoff_day, parse_handoff_time,
    },
    utils::time,
};
use infra::{
    errors::{self, HttpError},
    table::{self, entity::rotations, entity::shifts},
};
use serde::Serialize;
use utoipa::ToSchema;

pub mod overrides;

// backstop against a runaway expansion loop
const MAX_SHIFTS_PER_EXPANSION: usize = 10_000;

/// Smallest handoff instant `h >= t` with the given weekday and
/// wall-clock time, UTC
pub fn next_handoff(t: i64, handoff_day: Weekday, hour: u32, minute: u32) -> i64 {
    let date = time::micros_to_datetime(t).date_naive();
    for offset in 0..=7u64 {
        let day = date + Days::new(offset);
        if day.weekday() != handoff_day {
            continue;
        }
        let candidate = day
            .and_hms_opt(hour, minute, 0)
            .expect("validated handoff time")
            .and_utc()
            .timestamp_micros();
        if candidate >= t {
            return candidate;
        }
    }
    unreachable!("a weekday repeats within eight days")
}

/// Expand a rotation into the shifts overlapping `[window_start,
/// window_end)`. Expansion always walks from the rotation start so the
/// round-robin index is stable, which makes regeneration byte-identical.
pub fn expand_rotation(
    rotation: &rotations::Model,
    window_start: i64,
    window_end: i64,
) -> Vec<ExpandedShift> {
    let users = rotation.user_ids();
    if users.is_empty() {
        // a rotation without users is inert
        return vec![];
    }
    let Ok(shift_length) = rotation.shift_length.parse::<ShiftLength>() else {
        log::warn!(
            "[SCHEDULE] rotation {} has invalid shift_length {}",
            rotation.id,
            rotation.shift_length
        );
        return vec![];
    };
    let Ok(handoff_day) = parse_handoff_day(&rotation.handoff_day) else {
        log::warn!(
            "[SCHEDULE] rotation {} has invalid handoff_day {}",
            rotation.id,
            rotation.handoff_day
        );
        return vec![];
    };
    let Ok((hour, minute)) = parse_handoff_time(&rotation.handoff_time) else {
        log::warn!(
            "[SCHEDULE] rotation {} has invalid handoff_time {}",
            rotation.id,
            rotation.handoff_time
        );
        return vec![];
    };

    let bound = rotation
        .end_at
        .map_or(window_end, |end_at| end_at.min(window_end));

    let mut shifts = Vec::new();
    let mut start = rotation.start_at;
    let mut index = 0usize;
    while start < bound && shifts.len() < MAX_SHIFTS_PER_EXPANSION {
        let end = start + shift_length.duration_micros();
        if end > window_start {
            shifts.push(ExpandedShift {
                rotation_id: rotation.id.clone(),
                user_id: users[index % users.len()].clone(),
                start_time: start,
                end_time: end,
            });
        }
        index += 1;
        let next = next_handoff(end, handoff_day, hour, minute);
        if next <= start {
            break;
        }
        start = next;
    }
    shifts
}

/// The one shift of a rotation covering instant `t`, if any
fn shift_covering(rotation: &rotations::Model, t: i64) -> Option<ExpandedShift> {
    expand_rotation(rotation, t, t + 1)
        .into_iter()
        .find(|shift| shift.start_time <= t && t < shift.end_time)
}

/// Who is on call for a scheduler at instant `t`. Overrides beat the
/// scheduled user; overlapping overrides tie-break by most recent
/// creation.
pub async fn current_on_call(
    scheduler_id: &str,
    t: i64,
) -> Result<Option<ShiftResolution>, errors::Error> {
    if table::schedulers::get(scheduler_id).await?.is_none() {
        return Err(HttpError::NotFound(format!("scheduler {scheduler_id} not found")).into());
    }
    for rotation in table::schedulers::rotations_by_scheduler(scheduler_id).await? {
        let Some(expanded) = shift_covering(&rotation, t) else {
            continue;
        };
        let shift = table::shifts::ensure(
            &rotation.scheduler_id,
            &rotation.id,
            &expanded.user_id,
            expanded.start_time,
            expanded.end_time,
        )
        .await?;
        return Ok(Some(resolve_shift(&shift, t).await?));
    }
    Ok(None)
}

async fn resolve_shift(shift: &shifts::Model, t: i64) -> Result<ShiftResolution, errors::Error> {
    let overrides = table::shifts::overrides_for_shift(&shift.id).await?;
    let active = overrides
        .into_iter()
        .find(|o| o.covers(t, shift.start_time, shift.end_time));
    Ok(match active {
        Some(active) => ShiftResolution::Overridden {
            original_user_id: shift.user_id.clone(),
            override_user_id: active.override_user_id,
            override_id: active.id,
            reason: active.reason,
        },
        None => ShiftResolution::Scheduled {
            user_id: shift.user_id.clone(),
        },
    })
}

/// Group on-call: the group's first scheduler by creation order
pub async fn group_on_call(
    group_id: &str,
    t: i64,
) -> Result<Option<ShiftResolution>, errors::Error> {
    let Some(scheduler) = table::schedulers::first_by_group(group_id).await? else {
        return Ok(None);
    };
    current_on_call(&scheduler.id, t).await
}

/// Shift as served over HTTP: `user_id` is the effective on-call,
/// `original_user_id` the scheduled one. Clients rely on this swap.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ShiftEnvelope {
    pub shift_id: String,
    pub scheduler_id: String,
    pub rotation_id: String,
    pub user_id: String,
    pub user_name: String,
    pub user_email: String,
    pub original_user_id: String,
    pub original_user_name: String,
    pub original_user_email: String,
    pub start_time: i64,
    pub end_time: i64,
    pub is_overridden: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub override_id: Option<String>,
}

/// Materialized, override-flattened shifts of a scheduler in `[from,
/// to)`, clamped to the expansion horizon
pub async fn list_shifts(
    scheduler_id: &str,
    from: i64,
    to: i64,
) -> Result<Vec<ShiftEnvelope>, errors::Error> {
    let cfg = config::get_config();
    let horizon = time::now_micros() + cfg.limit.shift_horizon_days * time::DAY_MICROS;
    let to = to.min(horizon);

    if table::schedulers::get(scheduler_id).await?.is_none() {
        return Err(HttpError::NotFound(format!("scheduler {scheduler_id} not found")).into());
    }

    let mut persisted = Vec::new();
    for rotation in table::schedulers::rotations_by_scheduler(scheduler_id).await? {
        for expanded in expand_rotation(&rotation, from, to) {
            let shift = table::shifts::ensure(
                &rotation.scheduler_id,
                &rotation.id,
                &expanded.user_id,
                expanded.start_time,
                expanded.end_time,
            )
            .await?;
            persisted.push(shift);
        }
    }

    let shift_ids: Vec<String> = persisted.iter().map(|s| s.id.clone()).collect();
    let overrides = table::shifts::overrides_for_shifts(&shift_ids).await?;

    let mut envelopes = Vec::with_capacity(persisted.len());
    for shift in persisted {
        // most recently created override on the shift wins
        let active = overrides.iter().find(|o| o.shift_id == shift.id);
        let (effective_user, override_id) = match active {
            Some(active) => (active.override_user_id.clone(), Some(active.id.clone())),
            None => (shift.user_id.clone(), None),
        };
        let (user_name, user_email) = user_display(&effective_user).await?;
        let (original_user_name, original_user_email) = if effective_user == shift.user_id {
            (user_name.clone(), user_email.clone())
        } else {
            user_display(&shift.user_id).await?
        };
        envelopes.push(ShiftEnvelope {
            shift_id: shift.id,
            scheduler_id: shift.scheduler_id,
            rotation_id: shift.rotation_id,
            user_id: effective_user,
            user_name,
            user_email,
            original_user_id: shift.user_id,
            original_user_name,
            original_user_email,
            start_time: shift.start_time,
            end_time: shift.end_time,
            is_overridden: active.is_some(),
            override_id,
        });
    }
    envelopes.sort_by_key(|e| e.start_time);
    Ok(envelopes)
}

async fn user_display(user_id: &str) -> Result<(String, String), errors::Error> {
    Ok(match table::users::get(user_id).await? {
        Some(user) => (user.name, user.email),
        None => (user_id.to_string(), String::new()),
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn weekly_rotation(start_at: i64, users: &[&str]) -> rotations::Model {
        rotations::Model {
            id: "rot1".to_string(),
            scheduler_id: "sched1".to_string(),
            name: "primary".to_string(),
            shift_length: "one_week".to_string(),
            handoff_day: "monday".to_string(),
            handoff_time: "00:00".to_string(),
            start_at,
            end_at: None,
            user_order: json!(users),
            created_at: 0,
            updated_at: 0,
        }
    }

    // 2025-01-06 is a Monday
    const MON_JAN6: i64 = 1736121600000000;
    const WEEK: i64 = 7 * time::DAY_MICROS;

    #[test]
    fn test_next_handoff_same_instant() {
        assert_eq!(next_handoff(MON_JAN6, Weekday::Mon, 0, 0), MON_JAN6);
    }

    #[test]
    fn test_next_handoff_advances() {
        let tue = MON_JAN6 + time::DAY_MICROS;
        assert_eq!(next_handoff(tue, Weekday::Mon, 0, 0), MON_JAN6 + WEEK);
        // same day, later wall clock
        assert_eq!(
            next_handoff(MON_JAN6 + 1, Weekday::Mon, 0, 0),
            MON_JAN6 + WEEK
        );
    }

    #[test]
    fn test_weekly_expansion_round_robin() {
        let rotation = weekly_rotation(MON_JAN6, &["u1", "u2"]);
        let shifts = expand_rotation(&rotation, MON_JAN6, MON_JAN6 + 4 * WEEK);
        assert_eq!(shifts.len(), 4);
        assert_eq!(shifts[0].user_id, "u1");
        assert_eq!(shifts[1].user_id, "u2");
        assert_eq!(shifts[2].user_id, "u1");
        assert_eq!(shifts[3].user_id, "u2");
        for (i, shift) in shifts.iter().enumerate() {
            assert_eq!(shift.start_time, MON_JAN6 + i as i64 * WEEK);
            assert_eq!(shift.end_time, shift.start_time + WEEK);
        }
    }

    #[test]
    fn test_expansion_is_deterministic() {
        let rotation = weekly_rotation(MON_JAN6, &["u1", "u2", "u3"]);
        let a = expand_rotation(&rotation, MON_JAN6, MON_JAN6 + 90 * time::DAY_MICROS);
        let b = expand_rotation(&rotation, MON_JAN6, MON_JAN6 + 90 * time::DAY_MICROS);
        assert_eq!(a, b);
    }

    #[test]
    fn test_window_keeps_round_robin_index() {
        let rotation = weekly_rotation(MON_JAN6, &["u1", "u2"]);
        // a later window must see the same users on the same shifts
        let late = expand_rotation(&rotation, MON_JAN6 + 2 * WEEK, MON_JAN6 + 3 * WEEK);
        assert_eq!(late.len(), 1);
        assert_eq!(late[0].user_id, "u1");
        assert_eq!(late[0].start_time, MON_JAN6 + 2 * WEEK);
    }

    #[test]
    fn test_empty_user_order_is_inert() {
        let rotation = weekly_rotation(MON_JAN6, &[]);
        assert!(expand_rotation(&rotation, MON_JAN6, MON_JAN6 + 4 * WEEK).is_empty());
    }

    #[test]
    fn test_end_at_bounds_expansion() {
        let mut rotation = weekly_rotation(MON_JAN6, &["u1", "u2"]);
        rotation.end_at = Some(MON_JAN6 + 2 * WEEK);
        let shifts = expand_rotation(&rotation, MON_JAN6, MON_JAN6 + 10 * WEEK);
        assert_eq!(shifts.len(), 2);
    }

    #[test]
    fn test_misaligned_start_snaps_to_handoff() {
        // rotation starts Wednesday, one-week shifts, Monday handoff:
        // first shift runs Wed->Wed, the second starts the Monday after
        let wed = MON_JAN6 + 2 * time::DAY_MICROS;
        let rotation = weekly_rotation(wed, &["u1", "u2"]);
        let shifts = expand_rotation(&rotation, wed, wed + 3 * WEEK);
        assert_eq!(shifts[0].start_time, wed);
        assert_eq!(shifts[0].end_time, wed + WEEK);
        // next handoff on/after Wed Jan 15 is Mon Jan 20
        assert_eq!(shifts[1].start_time, MON_JAN6 + 2 * WEEK);
        assert_eq!(shifts[1].user_id, "u2");
    }

    #[test]
    fn test_shift_covering_instant() {
        let rotation = weekly_rotation(MON_JAN6, &["u1", "u2"]);
        // Wednesday 10:00 of the first week belongs to u1
        let t = MON_JAN6 + 2 * time::DAY_MICROS + 10 * 3600 * 1_000_000;
        let shift = shift_covering(&rotation, t).unwrap();
        assert_eq!(shift.user_id, "u1");
        // second week belongs to u2
        let shift = shift_covering(&rotation, t + WEEK).unwrap();
        assert_eq!(shift.user_id, "u2");
    }

    #[test]
    fn test_daily_rotation() {
        let mut rotation = weekly_rotation(MON_JAN6, &["u1", "u2", "u3"]);
        rotation.shift_length = "one_day".to_string();
        // daily handoff aligns every day only when the handoff weekday
        // matches; with a weekly handoff day the next shift waits for
        // Monday, so use the expansion bound to check shape only
        let shifts = expand_rotation(&rotation, MON_JAN6, MON_JAN6 + 2 * time::DAY_MICROS);
        assert_eq!(shifts[0].end_time - shifts[0].start_time, time::DAY_MICROS);
    }
}
