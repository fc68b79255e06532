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

//! `SeaORM` Entity for escalation_levels table

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "escalation_levels")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub policy_id: String,
    pub level_number: i32,
    /// current_schedule | scheduler | user | group | external
    pub target_type: String,
    pub target_id: Option<String>,
    pub timeout_minutes: i32,
    /// JSON array, e.g. ["fcm", "email"]
    pub notification_methods: Json,
    pub message_template: Option<String>,
    pub created_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::escalation_policies::Entity",
        from = "Column::PolicyId",
        to = "super::escalation_policies::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    EscalationPolicies,
}

impl Related<super::escalation_policies::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::EscalationPolicies.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
