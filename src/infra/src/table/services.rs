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

//! Services and Service-Integration Routing Table Operations

use config::meta::auth::TenantFilter;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};

use super::{entity::service_integrations, entity::services, orm_err};
use crate::{
    db::{ORM_CLIENT, connect_to_orm},
    errors,
};

#[allow(clippy::too_many_arguments)]
pub async fn add(
    tenant: &TenantFilter,
    group_id: &str,
    name: &str,
    description: &str,
    routing_key: &str,
    escalation_policy_id: Option<String>,
) -> Result<services::Model, errors::Error> {
    let client = ORM_CLIENT.get_or_init(connect_to_orm).await;
    let now = config::utils::time::now_micros();

    let model = services::ActiveModel {
        id: Set(config::ider::generate()),
        group_id: Set(group_id.to_string()),
        org_id: Set(tenant.org_id.clone()),
        project_id: Set(tenant.project_id.clone()),
        name: Set(name.to_string()),
        description: Set(description.to_string()),
        routing_key: Set(routing_key.to_string()),
        escalation_policy_id: Set(escalation_policy_id),
        is_active: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
    };

    model.insert(client).await.map_err(orm_err)
}

pub async fn get(
    tenant: &TenantFilter,
    service_id: &str,
) -> Result<Option<services::Model>, errors::Error> {
    let client = ORM_CLIENT.get_or_init(connect_to_orm).await;

    let mut query = services::Entity::find_by_id(service_id)
        .filter(services::Column::OrgId.eq(&tenant.org_id));
    if let Some(project_id) = &tenant.project_id {
        query = query.filter(services::Column::ProjectId.eq(project_id));
    }
    query.one(client).await.map_err(orm_err)
}

pub async fn get_unscoped(service_id: &str) -> Result<Option<services::Model>, errors::Error> {
    let client = ORM_CLIENT.get_or_init(connect_to_orm).await;

    services::Entity::find_by_id(service_id)
        .one(client)
        .await
        .map_err(orm_err)
}

pub async fn list(tenant: &TenantFilter) -> Result<Vec<services::Model>, errors::Error> {
    let client = ORM_CLIENT.get_or_init(connect_to_orm).await;

    let mut query = services::Entity::find().filter(services::Column::OrgId.eq(&tenant.org_id));
    if let Some(project_id) = &tenant.project_id {
        query = query.filter(services::Column::ProjectId.eq(project_id));
    }
    query
        .order_by_asc(services::Column::CreatedAt)
        .all(client)
        .await
        .map_err(orm_err)
}

/// Routing rows of an integration in stored order; first match wins
pub async fn routes_for_integration(
    integration_id: &str,
) -> Result<Vec<service_integrations::Model>, errors::Error> {
    let client = ORM_CLIENT.get_or_init(connect_to_orm).await;

    service_integrations::Entity::find()
        .filter(service_integrations::Column::IntegrationId.eq(integration_id))
        .order_by_asc(service_integrations::Column::Position)
        .order_by_asc(service_integrations::Column::CreatedAt)
        .all(client)
        .await
        .map_err(orm_err)
}

pub async fn add_route(
    integration_id: &str,
    service_id: &str,
    routing_conditions: serde_json::Value,
    position: i32,
) -> Result<service_integrations::Model, errors::Error> {
    let client = ORM_CLIENT.get_or_init(connect_to_orm).await;

    let model = service_integrations::ActiveModel {
        id: Set(config::ider::generate()),
        integration_id: Set(integration_id.to_string()),
        service_id: Set(service_id.to_string()),
        routing_conditions: Set(routing_conditions),
        position: Set(position),
        created_at: Set(config::utils::time::now_micros()),
    };

    model.insert(client).await.map_err(orm_err)
}
