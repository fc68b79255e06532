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

//! Groups and Group Membership Table Operations

use config::meta::auth::TenantFilter;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};

use super::{entity::group_members, entity::groups, orm_err};
use crate::{
    db::{ORM_CLIENT, connect_to_orm},
    errors,
};

pub async fn add(
    tenant: &TenantFilter,
    name: &str,
    description: &str,
    group_type: &str,
) -> Result<groups::Model, errors::Error> {
    let client = ORM_CLIENT.get_or_init(connect_to_orm).await;
    let now = config::utils::time::now_micros();

    let model = groups::ActiveModel {
        id: Set(config::ider::generate()),
        org_id: Set(tenant.org_id.clone()),
        project_id: Set(tenant.project_id.clone()),
        name: Set(name.to_string()),
        description: Set(description.to_string()),
        group_type: Set(group_type.to_string()),
        is_active: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
    };

    model.insert(client).await.map_err(orm_err)
}

pub async fn get(
    tenant: &TenantFilter,
    group_id: &str,
) -> Result<Option<groups::Model>, errors::Error> {
    let client = ORM_CLIENT.get_or_init(connect_to_orm).await;

    let mut query = groups::Entity::find_by_id(group_id)
        .filter(groups::Column::OrgId.eq(&tenant.org_id));
    if let Some(project_id) = &tenant.project_id {
        query = query.filter(groups::Column::ProjectId.eq(project_id));
    }
    query.one(client).await.map_err(orm_err)
}

/// Group lookup without tenant scoping, for pipeline internals that
/// already derived the tenant from the integration row
pub async fn get_unscoped(group_id: &str) -> Result<Option<groups::Model>, errors::Error> {
    let client = ORM_CLIENT.get_or_init(connect_to_orm).await;

    groups::Entity::find_by_id(group_id)
        .one(client)
        .await
        .map_err(orm_err)
}

pub async fn list(tenant: &TenantFilter) -> Result<Vec<groups::Model>, errors::Error> {
    let client = ORM_CLIENT.get_or_init(connect_to_orm).await;

    let mut query = groups::Entity::find().filter(groups::Column::OrgId.eq(&tenant.org_id));
    if let Some(project_id) = &tenant.project_id {
        query = query.filter(groups::Column::ProjectId.eq(project_id));
    }
    query
        .order_by_asc(groups::Column::CreatedAt)
        .all(client)
        .await
        .map_err(orm_err)
}

pub async fn add_member(
    group_id: &str,
    user_id: &str,
    role: &str,
    escalation_order: i32,
    notify_fcm: bool,
    notify_email: bool,
    notify_sms: bool,
) -> Result<group_members::Model, errors::Error> {
    let client = ORM_CLIENT.get_or_init(connect_to_orm).await;

    let model = group_members::ActiveModel {
        id: Set(config::ider::generate()),
        group_id: Set(group_id.to_string()),
        user_id: Set(user_id.to_string()),
        role: Set(role.to_string()),
        escalation_order: Set(escalation_order),
        notify_fcm: Set(notify_fcm),
        notify_email: Set(notify_email),
        notify_sms: Set(notify_sms),
        created_at: Set(config::utils::time::now_micros()),
    };

    model.insert(client).await.map_err(orm_err)
}

/// Members ordered by escalation position
pub async fn members(group_id: &str) -> Result<Vec<group_members::Model>, errors::Error> {
    let client = ORM_CLIENT.get_or_init(connect_to_orm).await;

    group_members::Entity::find()
        .filter(group_members::Column::GroupId.eq(group_id))
        .order_by_asc(group_members::Column::EscalationOrder)
        .all(client)
        .await
        .map_err(orm_err)
}

pub async fn is_group_admin(group_id: &str, user_id: &str) -> Result<bool, errors::Error> {
    let client = ORM_CLIENT.get_or_init(connect_to_orm).await;

    let member = group_members::Entity::find()
        .filter(group_members::Column::GroupId.eq(group_id))
        .filter(group_members::Column::UserId.eq(user_id))
        .one(client)
        .await
        .map_err(orm_err)?;

    Ok(member.is_some_and(|m| m.role == "admin"))
}

/// First member by escalation order; used by the group escalation target
pub async fn first_member(group_id: &str) -> Result<Option<String>, errors::Error> {
    Ok(members(group_id).await?.into_iter().next().map(|m| m.user_id))
}
