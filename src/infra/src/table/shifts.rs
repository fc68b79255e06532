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

//! Shifts and Shift Overrides Table Operations

use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};

use super::{entity::shift_overrides, entity::shifts, orm_err};
use crate::{
    db::{ORM_CLIENT, connect_to_orm},
    errors::{self, DbError, Error},
};

/// Materialize one expanded shift. Races on the (rotation_id,
/// start_time) unique index resolve to the already-persisted row, so
/// the call is idempotent.
pub async fn ensure(
    scheduler_id: &str,
    rotation_id: &str,
    user_id: &str,
    start_time: i64,
    end_time: i64,
) -> Result<shifts::Model, errors::Error> {
    if let Some(existing) = find_by_start(rotation_id, start_time).await? {
        return Ok(existing);
    }

    let client = ORM_CLIENT.get_or_init(connect_to_orm).await;
    let model = shifts::ActiveModel {
        id: Set(config::ider::generate()),
        scheduler_id: Set(scheduler_id.to_string()),
        rotation_id: Set(rotation_id.to_string()),
        user_id: Set(user_id.to_string()),
        start_time: Set(start_time),
        end_time: Set(end_time),
        is_active: Set(true),
        created_at: Set(config::utils::time::now_micros()),
    };

    match model.insert(client).await {
        Ok(model) => Ok(model),
        Err(e) if crate::db::is_unique_violation(&e) => find_by_start(rotation_id, start_time)
            .await?
            .ok_or_else(|| {
                Error::DbError(DbError::SeaORMError("shift vanished after insert race".to_string()))
            }),
        Err(e) => Err(orm_err(e)),
    }
}

pub async fn get(shift_id: &str) -> Result<Option<shifts::Model>, errors::Error> {
    let client = ORM_CLIENT.get_or_init(connect_to_orm).await;

    shifts::Entity::find_by_id(shift_id)
        .one(client)
        .await
        .map_err(orm_err)
}

pub async fn find_by_start(
    rotation_id: &str,
    start_time: i64,
) -> Result<Option<shifts::Model>, errors::Error> {
    let client = ORM_CLIENT.get_or_init(connect_to_orm).await;

    shifts::Entity::find()
        .filter(shifts::Column::RotationId.eq(rotation_id))
        .filter(shifts::Column::StartTime.eq(start_time))
        .one(client)
        .await
        .map_err(orm_err)
}

/// Persisted shifts of a scheduler intersecting `[from, to)`
pub async fn list_by_scheduler(
    scheduler_id: &str,
    from: i64,
    to: i64,
) -> Result<Vec<shifts::Model>, errors::Error> {
    let client = ORM_CLIENT.get_or_init(connect_to_orm).await;

    shifts::Entity::find()
        .filter(shifts::Column::SchedulerId.eq(scheduler_id))
        .filter(shifts::Column::EndTime.gt(from))
        .filter(shifts::Column::StartTime.lt(to))
        .order_by_asc(shifts::Column::StartTime)
        .all(client)
        .await
        .map_err(orm_err)
}

pub async fn add_override(
    shift_id: &str,
    override_user_id: &str,
    override_start: Option<i64>,
    override_end: Option<i64>,
    reason: &str,
    created_by: &str,
) -> Result<shift_overrides::Model, errors::Error> {
    let client = ORM_CLIENT.get_or_init(connect_to_orm).await;

    let model = shift_overrides::ActiveModel {
        id: Set(config::ider::generate()),
        shift_id: Set(shift_id.to_string()),
        override_user_id: Set(override_user_id.to_string()),
        override_start: Set(override_start),
        override_end: Set(override_end),
        reason: Set(reason.to_string()),
        created_by: Set(created_by.to_string()),
        created_at: Set(config::utils::time::now_micros()),
    };

    model.insert(client).await.map_err(orm_err)
}

pub async fn get_override(
    override_id: &str,
) -> Result<Option<shift_overrides::Model>, errors::Error> {
    let client = ORM_CLIENT.get_or_init(connect_to_orm).await;

    shift_overrides::Entity::find_by_id(override_id)
        .one(client)
        .await
        .map_err(orm_err)
}

/// Removing the override restores the scheduled user; nothing else is
/// mutated.
pub async fn delete_override(override_id: &str) -> Result<(), errors::Error> {
    let client = ORM_CLIENT.get_or_init(connect_to_orm).await;

    shift_overrides::Entity::delete_by_id(override_id)
        .exec(client)
        .await
        .map_err(orm_err)?;
    Ok(())
}

/// Overrides of a shift, most recently created first (the tie-break
/// order for overlapping windows)
pub async fn overrides_for_shift(
    shift_id: &str,
) -> Result<Vec<shift_overrides::Model>, errors::Error> {
    let client = ORM_CLIENT.get_or_init(connect_to_orm).await;

    shift_overrides::Entity::find()
        .filter(shift_overrides::Column::ShiftId.eq(shift_id))
        .order_by_desc(shift_overrides::Column::CreatedAt)
        .order_by_desc(shift_overrides::Column::Id)
        .all(client)
        .await
        .map_err(orm_err)
}

pub async fn overrides_for_shifts(
    shift_ids: &[String],
) -> Result<Vec<shift_overrides::Model>, errors::Error> {
    if shift_ids.is_empty() {
        return Ok(vec![]);
    }
    let client = ORM_CLIENT.get_or_init(connect_to_orm).await;

    shift_overrides::Entity::find()
        .filter(shift_overrides::Column::ShiftId.is_in(shift_ids.iter().cloned()))
        .order_by_desc(shift_overrides::Column::CreatedAt)
        .order_by_desc(shift_overrides::Column::Id)
        .all(client)
        .await
        .map_err(orm_err)
}
