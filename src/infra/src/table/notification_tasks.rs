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

//! Notification Tasks Table Operations
//!
//! Tasks are written transactionally with incident changes and drained
//! by the notifier job with exponential backoff.

use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set};

use super::{entity::notification_tasks, orm_err};
use crate::{
    db::{ORM_CLIENT, connect_to_orm},
    errors,
};

/// Pending tasks whose next attempt is due
pub async fn list_due(
    now: i64,
    limit: u64,
) -> Result<Vec<notification_tasks::Model>, errors::Error> {
    let client = ORM_CLIENT.get_or_init(connect_to_orm).await;

    notification_tasks::Entity::find()
        .filter(notification_tasks::Column::Status.eq("pending"))
        .filter(notification_tasks::Column::NextAttemptAt.lte(now))
        .order_by_asc(notification_tasks::Column::NextAttemptAt)
        .limit(limit)
        .all(client)
        .await
        .map_err(orm_err)
}

pub async fn mark_sent(task_id: &str) -> Result<(), errors::Error> {
    set_status(task_id, "sent", None, None).await
}

/// Schedule another attempt after a delivery failure
pub async fn mark_retry(
    task_id: &str,
    attempts: i32,
    next_attempt_at: i64,
    error: &str,
) -> Result<(), errors::Error> {
    let client = ORM_CLIENT.get_or_init(connect_to_orm).await;

    let Some(task) = notification_tasks::Entity::find_by_id(task_id)
        .one(client)
        .await
        .map_err(orm_err)?
    else {
        return Ok(());
    };

    let mut active: notification_tasks::ActiveModel = task.into();
    active.attempts = Set(attempts);
    active.next_attempt_at = Set(next_attempt_at);
    active.last_error = Set(Some(error.to_string()));
    active.updated_at = Set(config::utils::time::now_micros());
    active.update(client).await.map_err(orm_err)?;
    Ok(())
}

/// Attempts exhausted; the task is kept for inspection
pub async fn mark_failed(task_id: &str, error: &str) -> Result<(), errors::Error> {
    set_status(task_id, "failed", Some(error.to_string()), None).await
}

async fn set_status(
    task_id: &str,
    status: &str,
    error: Option<String>,
    attempts: Option<i32>,
) -> Result<(), errors::Error> {
    let client = ORM_CLIENT.get_or_init(connect_to_orm).await;

    let Some(task) = notification_tasks::Entity::find_by_id(task_id)
        .one(client)
        .await
        .map_err(orm_err)?
    else {
        return Ok(());
    };

    let mut active: notification_tasks::ActiveModel = task.into();
    active.status = Set(status.to_string());
    if let Some(error) = error {
        active.last_error = Set(Some(error));
    }
    if let Some(attempts) = attempts {
        active.attempts = Set(attempts);
    }
    active.updated_at = Set(config::utils::time::now_micros());
    active.update(client).await.map_err(orm_err)?;
    Ok(())
}
