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

//! Incident Events Table Operations (audit timeline reads)

use config::meta::auth::TenantFilter;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};

use super::{entity::incident_events, orm_err};
use crate::{
    db::{ORM_CLIENT, connect_to_orm},
    errors,
};

/// Timeline of one incident, oldest first
pub async fn list(
    tenant: &TenantFilter,
    incident_id: &str,
) -> Result<Vec<incident_events::Model>, errors::Error> {
    let client = ORM_CLIENT.get_or_init(connect_to_orm).await;

    incident_events::Entity::find()
        .filter(incident_events::Column::OrgId.eq(&tenant.org_id))
        .filter(incident_events::Column::IncidentId.eq(incident_id))
        .order_by_asc(incident_events::Column::CreatedAt)
        .all(client)
        .await
        .map_err(orm_err)
}
