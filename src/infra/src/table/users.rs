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

//! Users and Org Membership Table Operations

use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, JoinType, QueryFilter, QueryOrder, QuerySelect,
    RelationTrait, Set,
};

use super::{entity::org_users, entity::users, orm_err};
use crate::{
    db::{ORM_CLIENT, connect_to_orm},
    errors,
};

pub async fn add(
    email: &str,
    name: &str,
    role: &str,
    team: Option<String>,
    phone: Option<String>,
) -> Result<users::Model, errors::Error> {
    let client = ORM_CLIENT.get_or_init(connect_to_orm).await;
    let now = config::utils::time::now_micros();

    let model = users::ActiveModel {
        id: Set(config::ider::generate()),
        email: Set(email.to_string()),
        name: Set(name.to_string()),
        role: Set(role.to_string()),
        team: Set(team),
        phone: Set(phone),
        is_active: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
    };

    model.insert(client).await.map_err(orm_err)
}

pub async fn get(user_id: &str) -> Result<Option<users::Model>, errors::Error> {
    let client = ORM_CLIENT.get_or_init(connect_to_orm).await;

    users::Entity::find_by_id(user_id)
        .one(client)
        .await
        .map_err(orm_err)
}

pub async fn get_by_email(email: &str) -> Result<Option<users::Model>, errors::Error> {
    let client = ORM_CLIENT.get_or_init(connect_to_orm).await;

    users::Entity::find()
        .filter(users::Column::Email.eq(email))
        .one(client)
        .await
        .map_err(orm_err)
}

/// Link a user to an organization with a role
pub async fn add_org_member(
    org_id: &str,
    user_id: &str,
    role: &str,
) -> Result<org_users::Model, errors::Error> {
    let client = ORM_CLIENT.get_or_init(connect_to_orm).await;

    let model = org_users::ActiveModel {
        id: Set(config::ider::generate()),
        org_id: Set(org_id.to_string()),
        user_id: Set(user_id.to_string()),
        role: Set(role.to_string()),
        created_at: Set(config::utils::time::now_micros()),
    };

    model.insert(client).await.map_err(orm_err)
}

/// Role of a user within an org, None when not a member
pub async fn get_org_role(org_id: &str, user_id: &str) -> Result<Option<String>, errors::Error> {
    let client = ORM_CLIENT.get_or_init(connect_to_orm).await;

    let membership = org_users::Entity::find()
        .filter(org_users::Column::OrgId.eq(org_id))
        .filter(org_users::Column::UserId.eq(user_id))
        .one(client)
        .await
        .map_err(orm_err)?;

    Ok(membership.map(|m| m.role))
}

pub async fn list_by_org(org_id: &str) -> Result<Vec<users::Model>, errors::Error> {
    let client = ORM_CLIENT.get_or_init(connect_to_orm).await;

    users::Entity::find()
        .join(JoinType::InnerJoin, users::Relation::OrgUsers.def())
        .filter(org_users::Column::OrgId.eq(org_id))
        .order_by_asc(users::Column::Email)
        .all(client)
        .await
        .map_err(orm_err)
}
