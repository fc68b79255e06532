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

//! Shift overrides and swaps.
//!
//! An override replaces the scheduled user for one contiguous window
//! inside a single shift. Deleting it restores the scheduled user with
//! no other record mutation.

use config::meta::auth::Principal;
use infra::{
    errors::{self, HttpError},
    table::{self, entity::shift_overrides, entity::shifts},
};

/// Validate that the window is one contiguous interval inside the
/// shift, i.e. the shift splits into at most pre + override + post
pub fn validate_containment(
    shift: &shifts::Model,
    override_start: Option<i64>,
    override_end: Option<i64>,
) -> Result<(), errors::Error> {
    let start = override_start.unwrap_or(shift.start_time);
    let end = override_end.unwrap_or(shift.end_time);
    if start >= end {
        return Err(
            HttpError::Validation("override window must have positive length".to_string()).into(),
        );
    }
    if start < shift.start_time || end > shift.end_time {
        return Err(HttpError::Validation(
            "override window must lie within the covered shift".to_string(),
        )
        .into());
    }
    Ok(())
}

async fn can_manage_shift(principal: &Principal, shift: &shifts::Model) -> Result<bool, errors::Error> {
    if principal.user_id == shift.user_id || principal.role.is_admin() {
        return Ok(true);
    }
    let Some(scheduler) = table::schedulers::get(&shift.scheduler_id).await? else {
        return Ok(false);
    };
    table::groups::is_group_admin(&scheduler.group_id, &principal.user_id).await
}

pub async fn create(
    principal: &Principal,
    shift_id: &str,
    override_user_id: &str,
    override_start: Option<i64>,
    override_end: Option<i64>,
    reason: &str,
) -> Result<shift_overrides::Model, errors::Error> {
    let shift = table::shifts::get(shift_id)
        .await?
        .ok_or_else(|| HttpError::NotFound(format!("shift {shift_id} not found")))?;

    validate_containment(&shift, override_start, override_end)?;

    if !can_manage_shift(principal, &shift).await? {
        return Err(HttpError::Forbidden(
            "only the shift owner or a group admin may override this shift".to_string(),
        )
        .into());
    }

    table::shifts::add_override(
        shift_id,
        override_user_id,
        override_start,
        override_end,
        reason,
        &principal.user_id,
    )
    .await
}

pub async fn delete(principal: &Principal, override_id: &str) -> Result<(), errors::Error> {
    let existing = table::shifts::get_override(override_id)
        .await?
        .ok_or_else(|| HttpError::NotFound(format!("override {override_id} not found")))?;

    let shift = table::shifts::get(&existing.shift_id)
        .await?
        .ok_or_else(|| HttpError::NotFound(format!("shift {} not found", existing.shift_id)))?;

    let allowed = existing.created_by == principal.user_id
        || can_manage_shift(principal, &shift).await?;
    if !allowed {
        return Err(HttpError::Forbidden(
            "only the override creator or a group admin may remove it".to_string(),
        )
        .into());
    }

    table::shifts::delete_override(override_id).await
}

/// Swap two shifts of the same group: one whole-shift override on each,
/// both attributed to the requesting user
pub async fn swap(
    principal: &Principal,
    shift_a_id: &str,
    shift_b_id: &str,
    reason: &str,
) -> Result<(shift_overrides::Model, shift_overrides::Model), errors::Error> {
    let shift_a = table::shifts::get(shift_a_id)
        .await?
        .ok_or_else(|| HttpError::NotFound(format!("shift {shift_a_id} not found")))?;
    let shift_b = table::shifts::get(shift_b_id)
        .await?
        .ok_or_else(|| HttpError::NotFound(format!("shift {shift_b_id} not found")))?;

    let scheduler_a = table::schedulers::get(&shift_a.scheduler_id)
        .await?
        .ok_or_else(|| HttpError::NotFound("scheduler not found".to_string()))?;
    let scheduler_b = table::schedulers::get(&shift_b.scheduler_id)
        .await?
        .ok_or_else(|| HttpError::NotFound("scheduler not found".to_string()))?;
    if scheduler_a.group_id != scheduler_b.group_id {
        return Err(
            HttpError::Validation("swapped shifts must belong to the same group".to_string())
                .into(),
        );
    }

    // swapping other people's schedules needs group admin
    let owns_one = principal.user_id == shift_a.user_id || principal.user_id == shift_b.user_id;
    if !owns_one
        && !principal.role.is_admin()
        && !table::groups::is_group_admin(&scheduler_a.group_id, &principal.user_id).await?
    {
        return Err(HttpError::Forbidden(
            "only group admins may swap schedules owned by other users".to_string(),
        )
        .into());
    }

    let override_a = table::shifts::add_override(
        shift_a_id,
        &shift_b.user_id,
        None,
        None,
        reason,
        &principal.user_id,
    )
    .await?;
    let override_b = table::shifts::add_override(
        shift_b_id,
        &shift_a.user_id,
        None,
        None,
        reason,
        &principal.user_id,
    )
    .await?;
    Ok((override_a, override_b))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shift(start: i64, end: i64) -> shifts::Model {
        shifts::Model {
            id: "s1".to_string(),
            scheduler_id: "sched1".to_string(),
            rotation_id: "rot1".to_string(),
            user_id: "u1".to_string(),
            start_time: start,
            end_time: end,
            is_active: true,
            created_at: 0,
        }
    }

    #[test]
    fn test_containment_whole_shift() {
        let s = shift(100, 200);
        assert!(validate_containment(&s, None, None).is_ok());
    }

    #[test]
    fn test_containment_inner_window() {
        let s = shift(100, 200);
        assert!(validate_containment(&s, Some(120), Some(180)).is_ok());
        // touching the shift edges is fine
        assert!(validate_containment(&s, Some(100), Some(200)).is_ok());
    }

    #[test]
    fn test_containment_rejects_outside() {
        let s = shift(100, 200);
        assert!(validate_containment(&s, Some(50), Some(150)).is_err());
        assert!(validate_containment(&s, Some(150), Some(250)).is_err());
    }

    #[test]
    fn test_containment_rejects_empty_window() {
        let s = shift(100, 200);
        assert!(validate_containment(&s, Some(150), Some(150)).is_err());
        assert!(validate_containment(&s, Some(180), Some(120)).is_err());
    }
}
