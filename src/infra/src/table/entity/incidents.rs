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

//! `SeaORM` Entity for incidents table

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "incidents")]
pub struct Model {
    /// Incident ID (KSUID, primary key)
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub org_id: String,
    pub project_id: Option<String>,
    pub group_id: Option<String>,
    pub service_id: Option<String>,
    pub integration_id: Option<String>,
    pub escalation_policy_id: Option<String>,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    /// triggered | acknowledged | resolved
    pub status: String,
    /// high | low
    pub urgency: String,
    /// critical | high | warning | medium | low | info
    pub severity: String,
    /// P1..P5
    pub priority: String,
    /// webhook | api | checker
    pub source: String,
    pub external_id: Option<String>,
    pub assigned_to: Option<String>,
    pub assigned_at: Option<i64>,
    pub acknowledged_by: Option<String>,
    pub acknowledged_at: Option<i64>,
    pub resolved_by: Option<String>,
    pub resolved_at: Option<i64>,
    /// Alert labels, also carries labels.fingerprint
    pub labels: Json,
    /// Dedup key, duplicated from labels for the open-incident index
    pub fingerprint: String,
    pub incident_key: Option<String>,
    /// Number of alerts folded into this incident
    pub alert_count: i32,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::incident_events::Entity")]
    IncidentEvents,
}

impl Related<super::incident_events::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::IncidentEvents.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_model_creation() {
        let model = Model {
            id: "inc_1".to_string(),
            org_id: "org_1".to_string(),
            project_id: None,
            group_id: Some("grp_1".to_string()),
            service_id: Some("svc_1".to_string()),
            integration_id: Some("int_1".to_string()),
            escalation_policy_id: None,
            title: "HighCPU on h1".to_string(),
            description: "CPU above 95%".to_string(),
            status: "triggered".to_string(),
            urgency: "high".to_string(),
            severity: "critical".to_string(),
            priority: "P1".to_string(),
            source: "webhook".to_string(),
            external_id: None,
            assigned_to: Some("u1".to_string()),
            assigned_at: Some(1234567890_000000),
            acknowledged_by: None,
            acknowledged_at: None,
            resolved_by: None,
            resolved_at: None,
            labels: json!({"fingerprint": "HighCPU-h1:9100-node"}),
            fingerprint: "HighCPU-h1:9100-node".to_string(),
            incident_key: None,
            alert_count: 1,
            created_at: 1234567890_000000,
            updated_at: 1234567890_000000,
        };
        assert_eq!(model.status, "triggered");
        assert_eq!(model.labels["fingerprint"], model.fingerprint);
        // assigned_at present iff assigned_to present
        assert_eq!(model.assigned_to.is_some(), model.assigned_at.is_some());
    }
}
