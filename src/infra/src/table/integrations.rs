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

//! Integrations Table Operations

use config::meta::auth::TenantFilter;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};

use super::{entity::integrations, orm_err};
use crate::{
    db::{ORM_CLIENT, connect_to_orm},
    errors,
};

pub async fn add(
    tenant: &TenantFilter,
    name: &str,
    integration_type: &str,
    webhook_url: &str,
    check_url: Option<String>,
) -> Result<integrations::Model, errors::Error> {
    let client = ORM_CLIENT.get_or_init(connect_to_orm).await;
    let now = config::utils::time::now_micros();

    let model = integrations::ActiveModel {
        id: Set(config::ider::generate()),
        org_id: Set(tenant.org_id.clone()),
        project_id: Set(tenant.project_id.clone()),
        name: Set(name.to_string()),
        integration_type: Set(integration_type.to_string()),
        is_active: Set(true),
        health_status: Set("unknown".to_string()),
        last_heartbeat: Set(None),
        webhook_url: Set(webhook_url.to_string()),
        check_url: Set(check_url),
        created_at: Set(now),
        updated_at: Set(now),
    };

    model.insert(client).await.map_err(orm_err)
}

/// Unscoped lookup used by the webhook path: the integration row itself
/// is what establishes the tenant.
pub async fn get(integration_id: &str) -> Result<Option<integrations::Model>, errors::Error> {
    let client = ORM_CLIENT.get_or_init(connect_to_orm).await;

    integrations::Entity::find_by_id(integration_id)
        .one(client)
        .await
        .map_err(orm_err)
}

pub async fn get_for_tenant(
    tenant: &TenantFilter,
    integration_id: &str,
) -> Result<Option<integrations::Model>, errors::Error> {
    let client = ORM_CLIENT.get_or_init(connect_to_orm).await;

    let mut query = integrations::Entity::find_by_id(integration_id)
        .filter(integrations::Column::OrgId.eq(&tenant.org_id));
    if let Some(project_id) = &tenant.project_id {
        query = query.filter(integrations::Column::ProjectId.eq(project_id));
    }
    query.one(client).await.map_err(orm_err)
}

pub async fn list(tenant: &TenantFilter) -> Result<Vec<integrations::Model>, errors::Error> {
    let client = ORM_CLIENT.get_or_init(connect_to_orm).await;

    let mut query =
        integrations::Entity::find().filter(integrations::Column::OrgId.eq(&tenant.org_id));
    if let Some(project_id) = &tenant.project_id {
        query = query.filter(integrations::Column::ProjectId.eq(project_id));
    }
    query
        .order_by_asc(integrations::Column::CreatedAt)
        .all(client)
        .await
        .map_err(orm_err)
}

/// Record webhook acceptance. Best-effort: callers log and continue on
/// failure.
pub async fn touch_heartbeat(integration_id: &str) -> Result<(), errors::Error> {
    let client = ORM_CLIENT.get_or_init(connect_to_orm).await;
    let now = config::utils::time::now_micros();

    let Some(model) = get(integration_id).await? else {
        return Ok(());
    };
    let mut active: integrations::ActiveModel = model.into();
    active.last_heartbeat = Set(Some(now));
    active.health_status = Set("healthy".to_string());
    active.updated_at = Set(now);
    active.update(client).await.map_err(orm_err)?;
    Ok(())
}

/// The inbound URL embeds the generated id, so it is patched right
/// after insert
pub async fn set_webhook_url(integration_id: &str, webhook_url: &str) -> Result<(), errors::Error> {
    let client = ORM_CLIENT.get_or_init(connect_to_orm).await;

    let Some(model) = get(integration_id).await? else {
        return Ok(());
    };
    let mut active: integrations::ActiveModel = model.into();
    active.webhook_url = Set(webhook_url.to_string());
    active.updated_at = Set(config::utils::time::now_micros());
    active.update(client).await.map_err(orm_err)?;
    Ok(())
}

pub async fn set_health(integration_id: &str, health_status: &str) -> Result<(), errors::Error> {
    let client = ORM_CLIENT.get_or_init(connect_to_orm).await;

    let Some(model) = get(integration_id).await? else {
        return Ok(());
    };
    if model.health_status == health_status {
        return Ok(());
    }
    let mut active: integrations::ActiveModel = model.into();
    active.health_status = Set(health_status.to_string());
    active.updated_at = Set(config::utils::time::now_micros());
    active.update(client).await.map_err(orm_err)?;
    Ok(())
}

pub async fn list_active() -> Result<Vec<integrations::Model>, errors::Error> {
    let client = ORM_CLIENT.get_or_init(connect_to_orm).await;

    integrations::Entity::find()
        .filter(integrations::Column::IsActive.eq(true))
        .all(client)
        .await
        .map_err(orm_err)
}

/// Active integrations with an uptime check target
pub async fn list_with_check_url() -> Result<Vec<integrations::Model>, errors::Error> {
    let client = ORM_CLIENT.get_or_init(connect_to_orm).await;

    integrations::Entity::find()
        .filter(integrations::Column::IsActive.eq(true))
        .filter(integrations::Column::CheckUrl.is_not_null())
        .all(client)
        .await
        .map_err(orm_err)
}
