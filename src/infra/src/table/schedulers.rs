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

//! Schedulers and Rotations Table Operations

use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};

use super::{entity::rotations, entity::schedulers, orm_err};
use crate::{
    db::{ORM_CLIENT, connect_to_orm},
    errors::{self, HttpError},
};

pub async fn add(
    org_id: &str,
    group_id: &str,
    name: &str,
    display_name: &str,
    rotation_type: &str,
) -> Result<schedulers::Model, errors::Error> {
    let client = ORM_CLIENT.get_or_init(connect_to_orm).await;

    let model = schedulers::ActiveModel {
        id: Set(config::ider::generate()),
        group_id: Set(group_id.to_string()),
        org_id: Set(org_id.to_string()),
        name: Set(name.to_string()),
        display_name: Set(display_name.to_string()),
        rotation_type: Set(rotation_type.to_string()),
        created_at: Set(config::utils::time::now_micros()),
    };

    model.insert(client).await.map_err(orm_err)
}

pub async fn get(scheduler_id: &str) -> Result<Option<schedulers::Model>, errors::Error> {
    let client = ORM_CLIENT.get_or_init(connect_to_orm).await;

    schedulers::Entity::find_by_id(scheduler_id)
        .one(client)
        .await
        .map_err(orm_err)
}

/// Schedulers of a group in creation order. The first one is the
/// group's default for on-call lookups.
pub async fn list_by_group(group_id: &str) -> Result<Vec<schedulers::Model>, errors::Error> {
    let client = ORM_CLIENT.get_or_init(connect_to_orm).await;

    schedulers::Entity::find()
        .filter(schedulers::Column::GroupId.eq(group_id))
        .order_by_asc(schedulers::Column::CreatedAt)
        .order_by_asc(schedulers::Column::Id)
        .all(client)
        .await
        .map_err(orm_err)
}

pub async fn first_by_group(group_id: &str) -> Result<Option<schedulers::Model>, errors::Error> {
    Ok(list_by_group(group_id).await?.into_iter().next())
}

#[allow(clippy::too_many_arguments)]
pub async fn add_rotation(
    scheduler_id: &str,
    name: &str,
    shift_length: &str,
    handoff_day: &str,
    handoff_time: &str,
    start_at: i64,
    end_at: Option<i64>,
    user_order: &[String],
) -> Result<rotations::Model, errors::Error> {
    // end before start is rejected at persistence
    if let Some(end) = end_at
        && end <= start_at
    {
        return Err(HttpError::Validation("rotation end_at precedes start_at".to_string()).into());
    }

    let client = ORM_CLIENT.get_or_init(connect_to_orm).await;
    let now = config::utils::time::now_micros();

    let model = rotations::ActiveModel {
        id: Set(config::ider::generate()),
        scheduler_id: Set(scheduler_id.to_string()),
        name: Set(name.to_string()),
        shift_length: Set(shift_length.to_string()),
        handoff_day: Set(handoff_day.to_string()),
        handoff_time: Set(handoff_time.to_string()),
        start_at: Set(start_at),
        end_at: Set(end_at),
        user_order: Set(serde_json::json!(user_order)),
        created_at: Set(now),
        updated_at: Set(now),
    };

    model.insert(client).await.map_err(orm_err)
}

pub async fn get_rotation(rotation_id: &str) -> Result<Option<rotations::Model>, errors::Error> {
    let client = ORM_CLIENT.get_or_init(connect_to_orm).await;

    rotations::Entity::find_by_id(rotation_id)
        .one(client)
        .await
        .map_err(orm_err)
}

pub async fn rotations_by_scheduler(
    scheduler_id: &str,
) -> Result<Vec<rotations::Model>, errors::Error> {
    let client = ORM_CLIENT.get_or_init(connect_to_orm).await;

    rotations::Entity::find()
        .filter(rotations::Column::SchedulerId.eq(scheduler_id))
        .order_by_asc(rotations::Column::CreatedAt)
        .order_by_asc(rotations::Column::Id)
        .all(client)
        .await
        .map_err(orm_err)
}
