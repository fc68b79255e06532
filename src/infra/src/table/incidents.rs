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

//! Incidents Table Operations
//!
//! Every mutation that touches more than one row (incident + audit
//! event + notification task) runs in a single transaction.

use config::meta::{
    auth::TenantFilter,
    incidents::{IncidentEventKind, IncidentStatus, next_status},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseTransaction, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};

use super::{entity::incident_events, entity::incidents, entity::notification_tasks, orm_err};
use crate::{
    db::{ORM_CLIENT, connect_to_orm},
    errors::{self, HttpError},
};

/// Everything needed to open an incident
#[derive(Debug, Clone, Default)]
pub struct IncidentNew {
    pub org_id: String,
    pub project_id: Option<String>,
    pub group_id: Option<String>,
    pub service_id: Option<String>,
    pub integration_id: Option<String>,
    pub escalation_policy_id: Option<String>,
    pub title: String,
    pub description: String,
    pub severity: String,
    pub priority: String,
    pub urgency: String,
    pub source: String,
    pub external_id: Option<String>,
    pub assigned_to: Option<String>,
    pub labels: serde_json::Value,
    pub fingerprint: String,
    pub incident_key: Option<String>,
}

fn tenant_condition(tenant: &TenantFilter) -> Condition {
    let mut cond = Condition::all().add(incidents::Column::OrgId.eq(&tenant.org_id));
    if let Some(project_id) = &tenant.project_id {
        cond = cond.add(incidents::Column::ProjectId.eq(project_id));
    }
    cond
}

async fn add_event_tx(
    txn: &DatabaseTransaction,
    org_id: &str,
    incident_id: &str,
    kind: IncidentEventKind,
    actor: &str,
    detail: Option<serde_json::Value>,
) -> Result<(), errors::Error> {
    let event = incident_events::ActiveModel {
        id: Set(config::ider::generate()),
        org_id: Set(org_id.to_string()),
        incident_id: Set(incident_id.to_string()),
        kind: Set(kind.to_string()),
        actor: Set(actor.to_string()),
        detail: Set(detail),
        created_at: Set(config::utils::time::now_micros()),
    };
    event.insert(txn).await.map_err(orm_err)?;
    Ok(())
}

async fn enqueue_notification_tx(
    txn: &DatabaseTransaction,
    org_id: &str,
    user_id: &str,
    incident_id: &str,
    kind: IncidentEventKind,
) -> Result<(), errors::Error> {
    let now = config::utils::time::now_micros();
    let task = notification_tasks::ActiveModel {
        id: Set(config::ider::generate()),
        org_id: Set(org_id.to_string()),
        user_id: Set(user_id.to_string()),
        incident_id: Set(incident_id.to_string()),
        event_kind: Set(kind.to_string()),
        status: Set("pending".to_string()),
        attempts: Set(0),
        next_attempt_at: Set(now),
        last_error: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    };
    task.insert(txn).await.map_err(orm_err)?;
    Ok(())
}

/// Atomic create: incident row, created audit event and (when assigned)
/// the notification task all land or none do. A unique violation on the
/// open-fingerprint index surfaces as Conflict for the dedup path to
/// fold.
pub async fn create(params: IncidentNew, actor: &str) -> Result<incidents::Model, errors::Error> {
    let client = ORM_CLIENT.get_or_init(connect_to_orm).await;
    let now = config::utils::time::now_micros();
    let id = config::ider::generate();

    let txn = client.begin().await.map_err(orm_err)?;

    let model = incidents::ActiveModel {
        id: Set(id.clone()),
        org_id: Set(params.org_id.clone()),
        project_id: Set(params.project_id),
        group_id: Set(params.group_id),
        service_id: Set(params.service_id),
        integration_id: Set(params.integration_id),
        escalation_policy_id: Set(params.escalation_policy_id),
        title: Set(params.title),
        description: Set(params.description),
        status: Set(IncidentStatus::Triggered.to_string()),
        urgency: Set(params.urgency),
        severity: Set(params.severity),
        priority: Set(params.priority),
        source: Set(params.source),
        external_id: Set(params.external_id),
        assigned_to: Set(params.assigned_to.clone()),
        assigned_at: Set(params.assigned_to.as_ref().map(|_| now)),
        acknowledged_by: Set(None),
        acknowledged_at: Set(None),
        resolved_by: Set(None),
        resolved_at: Set(None),
        labels: Set(params.labels),
        fingerprint: Set(params.fingerprint),
        incident_key: Set(params.incident_key),
        alert_count: Set(1),
        created_at: Set(now),
        updated_at: Set(now),
    };

    let inserted = model.insert(&txn).await.map_err(orm_err)?;

    add_event_tx(&txn, &params.org_id, &id, IncidentEventKind::Created, actor, None).await?;

    if let Some(assignee) = &params.assigned_to {
        enqueue_notification_tx(&txn, &params.org_id, assignee, &id, IncidentEventKind::Created)
            .await?;
    }

    txn.commit().await.map_err(orm_err)?;
    Ok(inserted)
}

pub async fn get(
    tenant: &TenantFilter,
    incident_id: &str,
) -> Result<Option<incidents::Model>, errors::Error> {
    let client = ORM_CLIENT.get_or_init(connect_to_orm).await;

    incidents::Entity::find_by_id(incident_id)
        .filter(tenant_condition(tenant))
        .one(client)
        .await
        .map_err(orm_err)
}

/// Most recent open incident carrying this fingerprint within the tenant
pub async fn find_open_by_fingerprint(
    tenant: &TenantFilter,
    fingerprint: &str,
) -> Result<Option<incidents::Model>, errors::Error> {
    let client = ORM_CLIENT.get_or_init(connect_to_orm).await;

    incidents::Entity::find()
        .filter(tenant_condition(tenant))
        .filter(incidents::Column::Fingerprint.eq(fingerprint))
        .filter(incidents::Column::Status.ne(IncidentStatus::Resolved.to_string()))
        .order_by_desc(incidents::Column::CreatedAt)
        .one(client)
        .await
        .map_err(orm_err)
}

/// All open incidents of the tenant, newest first. The resolved-path
/// label and title matching runs over this set in memory.
pub async fn list_open(tenant: &TenantFilter) -> Result<Vec<incidents::Model>, errors::Error> {
    let client = ORM_CLIENT.get_or_init(connect_to_orm).await;

    incidents::Entity::find()
        .filter(tenant_condition(tenant))
        .filter(incidents::Column::Status.ne(IncidentStatus::Resolved.to_string()))
        .order_by_desc(incidents::Column::CreatedAt)
        .all(client)
        .await
        .map_err(orm_err)
}

#[derive(Debug, Clone, Default)]
pub struct ListParams {
    pub status: Option<String>,
    pub severity: Option<String>,
    pub search: Option<String>,
    pub limit: Option<u64>,
}

pub async fn list(
    tenant: &TenantFilter,
    params: &ListParams,
) -> Result<Vec<incidents::Model>, errors::Error> {
    let client = ORM_CLIENT.get_or_init(connect_to_orm).await;

    let mut query = incidents::Entity::find()
        .filter(tenant_condition(tenant))
        .order_by_desc(incidents::Column::CreatedAt);

    if let Some(status) = &params.status {
        query = query.filter(incidents::Column::Status.eq(status));
    }
    if let Some(severity) = &params.severity {
        query = query.filter(incidents::Column::Severity.eq(severity));
    }
    if let Some(search) = &params.search {
        let pattern = format!("%{search}%");
        query = query.filter(
            Condition::any()
                .add(incidents::Column::Title.like(pattern.clone()))
                .add(incidents::Column::Description.like(pattern)),
        );
    }

    query
        .limit(params.limit.unwrap_or(100))
        .all(client)
        .await
        .map_err(orm_err)
}

/// Dedup hit: fold another alert into an open incident. No notification
/// is enqueued.
pub async fn increment_alert_count(
    tenant: &TenantFilter,
    incident_id: &str,
) -> Result<incidents::Model, errors::Error> {
    let client = ORM_CLIENT.get_or_init(connect_to_orm).await;
    let now = config::utils::time::now_micros();

    let txn = client.begin().await.map_err(orm_err)?;

    let incident = incidents::Entity::find_by_id(incident_id)
        .filter(tenant_condition(tenant))
        .one(&txn)
        .await
        .map_err(orm_err)?
        .ok_or_else(|| HttpError::NotFound(format!("incident {incident_id} not found")))?;

    let count = incident.alert_count;
    let mut active: incidents::ActiveModel = incident.into();
    active.alert_count = Set(count + 1);
    active.updated_at = Set(now);
    let updated = active.update(&txn).await.map_err(orm_err)?;

    txn.commit().await.map_err(orm_err)?;
    Ok(updated)
}

/// Drive the state machine. Illegal transitions return Conflict with
/// the incident id.
pub async fn transition(
    tenant: &TenantFilter,
    incident_id: &str,
    target: IncidentStatus,
    actor: &str,
) -> Result<incidents::Model, errors::Error> {
    let client = ORM_CLIENT.get_or_init(connect_to_orm).await;
    let now = config::utils::time::now_micros();

    let txn = client.begin().await.map_err(orm_err)?;

    let incident = incidents::Entity::find_by_id(incident_id)
        .filter(tenant_condition(tenant))
        .one(&txn)
        .await
        .map_err(orm_err)?
        .ok_or_else(|| HttpError::NotFound(format!("incident {incident_id} not found")))?;

    let current: IncidentStatus = incident
        .status
        .parse()
        .map_err(|_| HttpError::Internal(format!("corrupt status on incident {incident_id}")))?;

    let Some(next) = next_status(current, target) else {
        return Err(HttpError::Conflict(format!(
            "illegal transition {current} -> {target} on incident {incident_id}"
        ))
        .into());
    };

    let org_id = incident.org_id.clone();
    let assignee = incident.assigned_to.clone();

    let mut active: incidents::ActiveModel = incident.into();
    active.status = Set(next.to_string());
    active.updated_at = Set(now);
    let event_kind = match next {
        IncidentStatus::Acknowledged => {
            active.acknowledged_by = Set(Some(actor.to_string()));
            active.acknowledged_at = Set(Some(now));
            IncidentEventKind::Acknowledged
        }
        IncidentStatus::Resolved => {
            active.resolved_by = Set(Some(actor.to_string()));
            active.resolved_at = Set(Some(now));
            IncidentEventKind::Resolved
        }
        IncidentStatus::Triggered => unreachable!("no transition targets triggered"),
    };

    let updated = active.update(&txn).await.map_err(orm_err)?;

    add_event_tx(&txn, &org_id, incident_id, event_kind, actor, None).await?;
    if let Some(assignee) = &assignee {
        enqueue_notification_tx(&txn, &org_id, assignee, incident_id, event_kind).await?;
    }

    txn.commit().await.map_err(orm_err)?;
    Ok(updated)
}

/// Reassign regardless of status; allowed-by checks happen upstream
pub async fn reassign(
    tenant: &TenantFilter,
    incident_id: &str,
    new_assignee: &str,
    actor: &str,
) -> Result<incidents::Model, errors::Error> {
    let client = ORM_CLIENT.get_or_init(connect_to_orm).await;
    let now = config::utils::time::now_micros();

    let txn = client.begin().await.map_err(orm_err)?;

    let incident = incidents::Entity::find_by_id(incident_id)
        .filter(tenant_condition(tenant))
        .one(&txn)
        .await
        .map_err(orm_err)?
        .ok_or_else(|| HttpError::NotFound(format!("incident {incident_id} not found")))?;

    let org_id = incident.org_id.clone();

    let mut active: incidents::ActiveModel = incident.into();
    active.assigned_to = Set(Some(new_assignee.to_string()));
    active.assigned_at = Set(Some(now));
    active.updated_at = Set(now);
    let updated = active.update(&txn).await.map_err(orm_err)?;

    add_event_tx(
        &txn,
        &org_id,
        incident_id,
        IncidentEventKind::Assigned,
        actor,
        Some(serde_json::json!({ "assigned_to": new_assignee })),
    )
    .await?;
    enqueue_notification_tx(&txn, &org_id, new_assignee, incident_id, IncidentEventKind::Assigned)
        .await?;

    txn.commit().await.map_err(orm_err)?;
    Ok(updated)
}
