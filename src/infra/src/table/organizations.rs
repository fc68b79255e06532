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

//! Organizations and Projects Table Operations

use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};

use super::{entity::organizations, entity::projects, orm_err};
use crate::{
    db::{ORM_CLIENT, connect_to_orm},
    errors,
};

pub async fn add(name: &str, slug: &str) -> Result<organizations::Model, errors::Error> {
    let client = ORM_CLIENT.get_or_init(connect_to_orm).await;
    let now = config::utils::time::now_micros();

    let model = organizations::ActiveModel {
        id: Set(config::ider::generate()),
        name: Set(name.to_string()),
        slug: Set(slug.to_string()),
        created_at: Set(now),
        updated_at: Set(now),
    };

    model.insert(client).await.map_err(orm_err)
}

pub async fn get(org_id: &str) -> Result<Option<organizations::Model>, errors::Error> {
    let client = ORM_CLIENT.get_or_init(connect_to_orm).await;

    organizations::Entity::find_by_id(org_id)
        .one(client)
        .await
        .map_err(orm_err)
}

pub async fn get_by_slug(slug: &str) -> Result<Option<organizations::Model>, errors::Error> {
    let client = ORM_CLIENT.get_or_init(connect_to_orm).await;

    organizations::Entity::find()
        .filter(organizations::Column::Slug.eq(slug))
        .one(client)
        .await
        .map_err(orm_err)
}

pub async fn add_project(org_id: &str, name: &str) -> Result<projects::Model, errors::Error> {
    let client = ORM_CLIENT.get_or_init(connect_to_orm).await;

    let model = projects::ActiveModel {
        id: Set(config::ider::generate()),
        org_id: Set(org_id.to_string()),
        name: Set(name.to_string()),
        created_at: Set(config::utils::time::now_micros()),
    };

    model.insert(client).await.map_err(orm_err)
}

pub async fn list_projects(org_id: &str) -> Result<Vec<projects::Model>, errors::Error> {
    let client = ORM_CLIENT.get_or_init(connect_to_orm).await;

    projects::Entity::find()
        .filter(projects::Column::OrgId.eq(org_id))
        .order_by_asc(projects::Column::CreatedAt)
        .all(client)
        .await
        .map_err(orm_err)
}
