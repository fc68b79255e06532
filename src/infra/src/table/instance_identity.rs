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

//! Instance Identity Table Operations

use sea_orm::{ActiveModelTrait, EntityTrait, Set};

use super::{entity::instance_identity, orm_err};
use crate::{
    db::{ORM_CLIENT, connect_to_orm},
    errors,
};

pub async fn get(instance_id: &str) -> Result<Option<instance_identity::Model>, errors::Error> {
    let client = ORM_CLIENT.get_or_init(connect_to_orm).await;

    instance_identity::Entity::find_by_id(instance_id)
        .one(client)
        .await
        .map_err(orm_err)
}

/// Write the keypair for this instance, replacing any previous row
pub async fn upsert(
    instance_id: &str,
    private_key_pem: &str,
    public_key_pem: &str,
) -> Result<(), errors::Error> {
    let client = ORM_CLIENT.get_or_init(connect_to_orm).await;
    let now = config::utils::time::now_micros();

    match get(instance_id).await? {
        Some(existing) => {
            let mut active: instance_identity::ActiveModel = existing.into();
            active.private_key_pem = Set(private_key_pem.to_string());
            active.public_key_pem = Set(public_key_pem.to_string());
            active.updated_at = Set(now);
            active.update(client).await.map_err(orm_err)?;
        }
        None => {
            let model = instance_identity::ActiveModel {
                instance_id: Set(instance_id.to_string()),
                private_key_pem: Set(private_key_pem.to_string()),
                public_key_pem: Set(public_key_pem.to_string()),
                updated_at: Set(now),
            };
            model.insert(client).await.map_err(orm_err)?;
        }
    }
    Ok(())
}
