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

//! `SeaORM` Entity for integrations table

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "integrations")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub org_id: String,
    pub project_id: Option<String>,
    pub name: String,
    /// prometheus | datadog | grafana | aws | pagerduty | coralogix | webhook
    pub integration_type: String,
    pub is_active: bool,
    /// unknown | healthy | degraded | unhealthy
    pub health_status: String,
    /// Last accepted webhook, microseconds since epoch
    pub last_heartbeat: Option<i64>,
    /// Inbound URL shown to the vendor, derived from PUBLIC_URL
    pub webhook_url: String,
    /// Optional target for the HTTP uptime checker
    pub check_url: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::service_integrations::Entity")]
    ServiceIntegrations,
}

impl Related<super::service_integrations::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ServiceIntegrations.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
