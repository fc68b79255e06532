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

//! `SeaORM` Entity for rotations table

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "rotations")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub scheduler_id: String,
    pub name: String,
    /// one_day | one_week | two_weeks | one_month
    pub shift_length: String,
    /// Weekday of the handoff, lowercase english name
    pub handoff_day: String,
    /// "HH:MM", interpreted in UTC
    pub handoff_time: String,
    /// Microseconds since epoch
    pub start_at: i64,
    pub end_at: Option<i64>,
    /// Ordered JSON array of user ids cycled round-robin. An empty
    /// order leaves the rotation inert.
    pub user_order: Json,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::schedulers::Entity",
        from = "Column::SchedulerId",
        to = "super::schedulers::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Schedulers,
    #[sea_orm(has_many = "super::shifts::Entity")]
    Shifts,
}

impl Related<super::schedulers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Schedulers.def()
    }
}

impl Related<super::shifts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Shifts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Ordered user ids, tolerating malformed stored JSON
    pub fn user_ids(&self) -> Vec<String> {
        serde_json::from_value(self.user_order.clone()).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_user_ids_parsing() {
        let model = Model {
            id: "r1".to_string(),
            scheduler_id: "s1".to_string(),
            name: "primary".to_string(),
            shift_length: "one_week".to_string(),
            handoff_day: "monday".to_string(),
            handoff_time: "00:00".to_string(),
            start_at: 0,
            end_at: None,
            user_order: json!(["u1", "u2"]),
            created_at: 0,
            updated_at: 0,
        };
        assert_eq!(model.user_ids(), vec!["u1", "u2"]);

        let empty = Model {
            user_order: json!({"bogus": true}),
            ..model
        };
        assert!(empty.user_ids().is_empty());
    }
}
