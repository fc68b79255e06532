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

use sea_orm::{ConnectionTrait, EntityTrait, Schema};

use crate::{
    db::{self, IndexStatement, ORM_CLIENT, connect_to_orm},
    errors::{DbError, Error, Result},
};

pub mod entity;
pub mod escalation;
pub mod groups;
pub mod incident_events;
pub mod incidents;
pub mod instance_identity;
pub mod integrations;
pub mod notification_tasks;
pub mod organizations;
pub mod schedulers;
pub mod services;
pub mod shifts;
pub mod users;

/// Map a SeaORM error, keeping unique violations distinguishable so the
/// dedup path can fold them.
pub(crate) fn orm_err(e: sea_orm::DbErr) -> Error {
    if db::is_unique_violation(&e) {
        Error::DbError(DbError::UniqueViolation(e.to_string()))
    } else {
        Error::DbError(DbError::SeaORMError(e.to_string()))
    }
}

pub async fn init() -> Result<()> {
    create_tables().await?;
    create_table_indexes().await?;
    Ok(())
}

async fn create_tables() -> Result<()> {
    create_table(entity::organizations::Entity).await?;
    create_table(entity::projects::Entity).await?;
    create_table(entity::users::Entity).await?;
    create_table(entity::org_users::Entity).await?;
    create_table(entity::groups::Entity).await?;
    create_table(entity::group_members::Entity).await?;
    create_table(entity::schedulers::Entity).await?;
    create_table(entity::rotations::Entity).await?;
    create_table(entity::shifts::Entity).await?;
    create_table(entity::shift_overrides::Entity).await?;
    create_table(entity::services::Entity).await?;
    create_table(entity::integrations::Entity).await?;
    create_table(entity::service_integrations::Entity).await?;
    create_table(entity::escalation_policies::Entity).await?;
    create_table(entity::escalation_levels::Entity).await?;
    create_table(entity::incidents::Entity).await?;
    create_table(entity::incident_events::Entity).await?;
    create_table(entity::notification_tasks::Entity).await?;
    create_table(entity::instance_identity::Entity).await?;
    Ok(())
}

async fn create_table<E: EntityTrait>(e: E) -> Result<()> {
    let client = ORM_CLIENT.get_or_init(connect_to_orm).await;
    let builder = client.get_database_backend();
    let schema = Schema::new(builder);
    let stmt = schema.create_table_from_entity(e).if_not_exists().take();
    client.execute(builder.build(&stmt)).await.map_err(orm_err)?;
    Ok(())
}

async fn create_table_indexes() -> Result<()> {
    // The open-incident dedup index: one open incident per fingerprint
    // per tenant. COALESCE folds NULL project ids so org-level rows
    // collide too.
    db::create_index(IndexStatement::partial(
        "incidents_open_fingerprint_idx",
        "incidents",
        true,
        &["org_id", "COALESCE(project_id, '')", "fingerprint"],
        "status != 'resolved'",
    ))
    .await?;
    db::create_index(IndexStatement::new(
        "incidents_org_status_idx",
        "incidents",
        false,
        &["org_id", "status"],
    ))
    .await?;
    db::create_index(IndexStatement::new(
        "incidents_created_at_idx",
        "incidents",
        false,
        &["created_at"],
    ))
    .await?;
    db::create_index(IndexStatement::new(
        "incident_events_incident_idx",
        "incident_events",
        false,
        &["incident_id"],
    ))
    .await?;
    // Shift materialization is idempotent through this index
    db::create_index(IndexStatement::new(
        "shifts_rotation_start_idx",
        "shifts",
        true,
        &["rotation_id", "start_time"],
    ))
    .await?;
    db::create_index(IndexStatement::new(
        "shift_overrides_shift_idx",
        "shift_overrides",
        false,
        &["shift_id"],
    ))
    .await?;
    db::create_index(IndexStatement::new(
        "org_users_org_user_idx",
        "org_users",
        true,
        &["org_id", "user_id"],
    ))
    .await?;
    db::create_index(IndexStatement::new(
        "group_members_group_order_idx",
        "group_members",
        false,
        &["group_id", "escalation_order"],
    ))
    .await?;
    db::create_index(IndexStatement::new(
        "service_integrations_integration_idx",
        "service_integrations",
        false,
        &["integration_id", "position"],
    ))
    .await?;
    db::create_index(IndexStatement::new(
        "notification_tasks_due_idx",
        "notification_tasks",
        false,
        &["status", "next_attempt_at"],
    ))
    .await?;
    db::create_index(IndexStatement::new(
        "schedulers_group_idx",
        "schedulers",
        false,
        &["group_id"],
    ))
    .await?;
    db::create_index(IndexStatement::new(
        "rotations_scheduler_idx",
        "rotations",
        false,
        &["scheduler_id"],
    ))
    .await?;
    Ok(())
}
