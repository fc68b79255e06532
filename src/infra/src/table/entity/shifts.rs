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

//! `SeaORM` Entity for shifts table
//!
//! Shifts are deterministic projections of a rotation, materialized on
//! demand so overrides have a stable row to attach to. The unique
//! (rotation_id, start_time) index keeps re-materialization idempotent.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "shifts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub scheduler_id: String,
    pub rotation_id: String,
    pub user_id: String,
    /// Microseconds since epoch, UTC
    pub start_time: i64,
    pub end_time: i64,
    pub is_active: bool,
    pub created_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::rotations::Entity",
        from = "Column::RotationId",
        to = "super::rotations::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Rotations,
    #[sea_orm(
        belongs_to = "super::schedulers::Entity",
        from = "Column::SchedulerId",
        to = "super::schedulers::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Schedulers,
    #[sea_orm(has_many = "super::shift_overrides::Entity")]
    ShiftOverrides,
}

impl Related<super::rotations::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Rotations.def()
    }
}

impl Related<super::schedulers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Schedulers.def()
    }
}

impl Related<super::shift_overrides::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ShiftOverrides.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
