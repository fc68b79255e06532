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

//! Escalation Policies and Levels Table Operations

use config::meta::auth::TenantFilter;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};

use super::{entity::escalation_levels, entity::escalation_policies, orm_err};
use crate::{
    db::{ORM_CLIENT, connect_to_orm},
    errors,
};

pub async fn add_policy(
    tenant: &TenantFilter,
    group_id: &str,
    name: &str,
    max_escalation_levels: i32,
    escalation_timeout_secs: i32,
    severity_levels: serde_json::Value,
) -> Result<escalation_policies::Model, errors::Error> {
    let client = ORM_CLIENT.get_or_init(connect_to_orm).await;
    let now = config::utils::time::now_micros();

    let model = escalation_policies::ActiveModel {
        id: Set(config::ider::generate()),
        group_id: Set(group_id.to_string()),
        org_id: Set(tenant.org_id.clone()),
        name: Set(name.to_string()),
        is_active: Set(true),
        max_escalation_levels: Set(max_escalation_levels),
        escalation_timeout_secs: Set(escalation_timeout_secs),
        severity_levels: Set(severity_levels),
        created_at: Set(now),
        updated_at: Set(now),
    };

    model.insert(client).await.map_err(orm_err)
}

pub async fn get_policy(
    policy_id: &str,
) -> Result<Option<escalation_policies::Model>, errors::Error> {
    let client = ORM_CLIENT.get_or_init(connect_to_orm).await;

    escalation_policies::Entity::find_by_id(policy_id)
        .one(client)
        .await
        .map_err(orm_err)
}

pub async fn list_policies(
    tenant: &TenantFilter,
) -> Result<Vec<escalation_policies::Model>, errors::Error> {
    let client = ORM_CLIENT.get_or_init(connect_to_orm).await;

    escalation_policies::Entity::find()
        .filter(escalation_policies::Column::OrgId.eq(&tenant.org_id))
        .order_by_asc(escalation_policies::Column::CreatedAt)
        .all(client)
        .await
        .map_err(orm_err)
}

#[allow(clippy::too_many_arguments)]
pub async fn add_level(
    policy_id: &str,
    level_number: i32,
    target_type: &str,
    target_id: Option<String>,
    timeout_minutes: i32,
    notification_methods: serde_json::Value,
    message_template: Option<String>,
) -> Result<escalation_levels::Model, errors::Error> {
    let client = ORM_CLIENT.get_or_init(connect_to_orm).await;

    let model = escalation_levels::ActiveModel {
        id: Set(config::ider::generate()),
        policy_id: Set(policy_id.to_string()),
        level_number: Set(level_number),
        target_type: Set(target_type.to_string()),
        target_id: Set(target_id),
        timeout_minutes: Set(timeout_minutes),
        notification_methods: Set(notification_methods),
        message_template: Set(message_template),
        created_at: Set(config::utils::time::now_micros()),
    };

    model.insert(client).await.map_err(orm_err)
}

/// Levels of a policy in escalation order
pub async fn levels(policy_id: &str) -> Result<Vec<escalation_levels::Model>, errors::Error> {
    let client = ORM_CLIENT.get_or_init(connect_to_orm).await;

    escalation_levels::Entity::find()
        .filter(escalation_levels::Column::PolicyId.eq(policy_id))
        .order_by_asc(escalation_levels::Column::LevelNumber)
        .all(client)
        .await
        .map_err(orm_err)
}
