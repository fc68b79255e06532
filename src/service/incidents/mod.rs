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

//! The ingest-to-assignment pipeline and the incident state machine.
//!
//! Firing alerts dedup by fingerprint under a per-fingerprint lock, so
//! a storm of identical webhooks collapses into one incident with a
//! running alert_count. Resolved alerts look up their open incident by
//! fingerprint, then labels, then title.

use std::time::{Duration, Instant};

use config::{
    get_config,
    meta::{
        alerts::{AlertStatus, NormalizedAlert},
        auth::{Principal, TenantFilter},
        incidents::IncidentStatus,
        integrations::IntegrationType,
    },
    utils::json,
};
use infra::{
    errors::{self, DbError, Error, HttpError},
    table::{
        self,
        entity::{incidents, integrations},
        incidents::IncidentNew,
    },
};
use once_cell::sync::Lazy;

use crate::{
    common::infra::{locks, ratelimit::RateLimiter},
    service::routing,
};

static WEBHOOK_LIMITER: Lazy<RateLimiter> = Lazy::new(|| {
    let cfg = get_config();
    RateLimiter::new(cfg.limit.webhook_rate_limit, cfg.limit.webhook_rate_burst)
});

/// Handle one inbound webhook end to end. Returns the number of alerts
/// accepted from the batch.
pub async fn process_webhook(
    integration_type: IntegrationType,
    integration_id: &str,
    body: json::Value,
) -> Result<usize, errors::Error> {
    let integration = table::integrations::get(integration_id)
        .await?
        .ok_or_else(|| HttpError::NotFound(format!("integration {integration_id} not found")))?;

    if integration.integration_type != integration_type.to_string() {
        return Err(HttpError::Validation(format!(
            "integration {integration_id} is of type {}, not {integration_type}",
            integration.integration_type
        ))
        .into());
    }
    if !integration.is_active {
        return Err(
            HttpError::Forbidden(format!("integration {integration_id} is inactive")).into(),
        );
    }
    if !WEBHOOK_LIMITER.check(integration_id) {
        return Err(HttpError::RateLimited(format!(
            "integration {integration_id} exceeded its webhook rate limit"
        ))
        .into());
    }

    // heartbeat is best-effort, a failure never fails the webhook
    if let Err(e) = table::integrations::touch_heartbeat(integration_id).await {
        log::warn!("[WEBHOOK] heartbeat update failed for {integration_id}: {e}");
    }

    let cfg = get_config();
    let deadline = Instant::now() + Duration::from_secs(cfg.limit.webhook_deadline_secs);
    let alerts = crate::service::alerts::normalize(integration_type, &body);
    let total = alerts.len();

    let mut accepted = 0;
    for (index, alert) in alerts.into_iter().enumerate() {
        if Instant::now() >= deadline {
            log::warn!(
                "[WEBHOOK] deadline elapsed for integration {integration_id}, dropping {} of {total} alerts",
                total - index
            );
            break;
        }
        match ingest_alert(&integration, alert).await {
            Ok(()) => accepted += 1,
            Err(e) => {
                // one bad alert must not sink the batch
                log::error!("[WEBHOOK] alert {index} of {total} failed for {integration_id}: {e}");
            }
        }
    }
    Ok(accepted)
}

/// Route one normalized alert into the incident store. Also used by the
/// uptime checker.
pub async fn ingest_alert(
    integration: &integrations::Model,
    alert: NormalizedAlert,
) -> Result<(), errors::Error> {
    let integration_type: IntegrationType = integration
        .integration_type
        .parse()
        .map_err(|_| HttpError::Internal("corrupt integration type".to_string()))?;
    match alert.status {
        AlertStatus::Firing => handle_firing(integration, integration_type, alert).await,
        AlertStatus::Resolved => handle_resolved(integration, integration_type, alert).await,
    }
}

/// The incident title an alert maps to; resolution matching relies on
/// this staying deterministic
fn incident_title(alert: &NormalizedAlert) -> String {
    if alert.summary.is_empty() {
        alert.alert_name.clone()
    } else {
        alert.summary.clone()
    }
}

fn tenant_of(integration: &integrations::Model) -> TenantFilter {
    TenantFilter::new(&integration.org_id, integration.project_id.as_deref())
}

async fn handle_firing(
    integration: &integrations::Model,
    integration_type: IntegrationType,
    alert: NormalizedAlert,
) -> Result<(), errors::Error> {
    let tenant = tenant_of(integration);
    let route = routing::route(integration, &alert).await?;

    // serialize concurrent firings of one fingerprint within the tenant
    let lock_key = format!(
        "{}/{}/{}",
        tenant.org_id,
        tenant.project_id.as_deref().unwrap_or(""),
        alert.fingerprint
    );
    let _guard = locks::lock(&lock_key).await;

    if let Some(open) = table::incidents::find_open_by_fingerprint(&tenant, &alert.fingerprint).await?
    {
        let updated = table::incidents::increment_alert_count(&tenant, &open.id).await?;
        log::info!(
            "[WEBHOOK] dedup hit on {} for incident {}, alert_count={}",
            alert.fingerprint,
            updated.id,
            updated.alert_count
        );
        return Ok(());
    }

    let mut labels = alert.labels.clone();
    labels.insert("fingerprint".to_string(), alert.fingerprint.clone());

    let params = IncidentNew {
        org_id: integration.org_id.clone(),
        project_id: integration.project_id.clone(),
        group_id: route.service.as_ref().map(|s| s.group_id.clone()),
        service_id: route.service.as_ref().map(|s| s.id.clone()),
        integration_id: Some(integration.id.clone()),
        escalation_policy_id: route
            .service
            .as_ref()
            .and_then(|s| s.escalation_policy_id.clone()),
        title: incident_title(&alert),
        description: alert.description.clone(),
        severity: alert.severity.to_string(),
        priority: alert.priority.to_string(),
        urgency: alert.severity.urgency().to_string(),
        source: "webhook".to_string(),
        external_id: None,
        assigned_to: route.assignee,
        labels: json::to_value(&labels)?,
        fingerprint: alert.fingerprint.clone(),
        incident_key: None,
    };

    match table::incidents::create(params, integration_type.system_user()).await {
        Ok(incident) => {
            log::info!(
                "[WEBHOOK] created incident {} ({}) assigned to {:?}",
                incident.id,
                incident.title,
                incident.assigned_to
            );
            Ok(())
        }
        // a concurrent insert won the unique index, fold into it
        Err(Error::DbError(DbError::UniqueViolation(_))) => {
            if let Some(open) =
                table::incidents::find_open_by_fingerprint(&tenant, &alert.fingerprint).await?
            {
                table::incidents::increment_alert_count(&tenant, &open.id).await?;
            }
            Ok(())
        }
        Err(e) => Err(e),
    }
}

async fn handle_resolved(
    integration: &integrations::Model,
    integration_type: IntegrationType,
    alert: NormalizedAlert,
) -> Result<(), errors::Error> {
    let tenant = tenant_of(integration);
    let actor = integration_type.system_user();

    let Some(incident) = find_incident_to_resolve(&tenant, &alert).await? else {
        log::warn!(
            "[WEBHOOK] resolved alert {} ({}) matches no open incident, ignoring",
            alert.alert_name,
            alert.fingerprint
        );
        return Ok(());
    };

    table::incidents::transition(&tenant, &incident.id, IncidentStatus::Resolved, actor).await?;
    log::info!("[WEBHOOK] incident {} auto-resolved by {actor}", incident.id);
    Ok(())
}

/// Resolution lookup order: fingerprint, then the (alertname, instance,
/// job) label triple, then exact title among open incidents with the
/// same alertname
async fn find_incident_to_resolve(
    tenant: &TenantFilter,
    alert: &NormalizedAlert,
) -> Result<Option<incidents::Model>, errors::Error> {
    if let Some(incident) =
        table::incidents::find_open_by_fingerprint(tenant, &alert.fingerprint).await?
    {
        return Ok(Some(incident));
    }

    let open = table::incidents::list_open(tenant).await?;

    if let (Some(instance), Some(job)) = (alert.label("instance"), alert.label("job")) {
        let found = open.iter().find(|incident| {
            incident_label(incident, "alertname") == Some(alert.alert_name.as_str())
                && incident_label(incident, "instance") == Some(instance)
                && incident_label(incident, "job") == Some(job)
        });
        if let Some(found) = found {
            return Ok(Some(found.clone()));
        }
    }

    let title = incident_title(alert);
    Ok(open
        .iter()
        .find(|incident| {
            incident.title == title
                && incident_label(incident, "alertname") == Some(alert.alert_name.as_str())
        })
        .cloned())
}

fn incident_label<'a>(incident: &'a incidents::Model, key: &str) -> Option<&'a str> {
    incident.labels.get(key).and_then(|v| v.as_str())
}

/// Manual creation through the API
pub struct ManualIncident {
    pub title: String,
    pub description: String,
    pub severity: String,
    pub service_id: Option<String>,
}

pub async fn create_manual(
    principal: &Principal,
    req: ManualIncident,
) -> Result<incidents::Model, errors::Error> {
    let tenant = principal.tenant();
    let severity: config::meta::alerts::AlertSeverity = req
        .severity
        .parse()
        .map_err(|_| HttpError::Validation(format!("invalid severity {}", req.severity)))?;

    let mut service = None;
    let mut assignee = None;
    if let Some(service_id) = &req.service_id {
        let found = table::services::get(&tenant, service_id)
            .await?
            .ok_or_else(|| HttpError::NotFound(format!("service {service_id} not found")))?;
        if let Some(policy_id) = &found.escalation_policy_id {
            assignee = routing::resolve_assignee(policy_id, &found.group_id).await?;
        }
        service = Some(found);
    }

    let fingerprint = format!("manual-{}", config::ider::generate());
    let params = IncidentNew {
        org_id: tenant.org_id.clone(),
        project_id: tenant.project_id.clone(),
        group_id: service.as_ref().map(|s| s.group_id.clone()),
        service_id: service.as_ref().map(|s| s.id.clone()),
        integration_id: None,
        escalation_policy_id: service.as_ref().and_then(|s| s.escalation_policy_id.clone()),
        title: req.title,
        description: req.description,
        severity: severity.to_string(),
        priority: severity.priority().to_string(),
        urgency: severity.urgency().to_string(),
        source: "api".to_string(),
        external_id: None,
        assigned_to: assignee,
        labels: json::json!({ "fingerprint": fingerprint }),
        fingerprint,
        incident_key: None,
    };

    table::incidents::create(params, &principal.user_id).await
}

/// assignee, group admin or org admin
async fn can_manage(principal: &Principal, incident: &incidents::Model) -> Result<bool, errors::Error> {
    if principal.role.is_admin() {
        return Ok(true);
    }
    if incident.assigned_to.as_deref() == Some(principal.user_id.as_str()) {
        return Ok(true);
    }
    if let Some(group_id) = &incident.group_id {
        return table::groups::is_group_admin(group_id, &principal.user_id).await;
    }
    Ok(false)
}

pub async fn acknowledge(
    principal: &Principal,
    incident_id: &str,
) -> Result<incidents::Model, errors::Error> {
    transition_checked(principal, incident_id, IncidentStatus::Acknowledged).await
}

pub async fn resolve(
    principal: &Principal,
    incident_id: &str,
) -> Result<incidents::Model, errors::Error> {
    transition_checked(principal, incident_id, IncidentStatus::Resolved).await
}

async fn transition_checked(
    principal: &Principal,
    incident_id: &str,
    target: IncidentStatus,
) -> Result<incidents::Model, errors::Error> {
    let tenant = principal.tenant();
    let incident = table::incidents::get(&tenant, incident_id)
        .await?
        .ok_or_else(|| HttpError::NotFound(format!("incident {incident_id} not found")))?;
    if !can_manage(principal, &incident).await? {
        return Err(HttpError::Forbidden(format!(
            "user {} may not modify incident {incident_id}",
            principal.user_id
        ))
        .into());
    }
    table::incidents::transition(&tenant, incident_id, target, &principal.user_id).await
}

/// Reassignment is reserved for group and org admins
pub async fn reassign(
    principal: &Principal,
    incident_id: &str,
    new_assignee: &str,
) -> Result<incidents::Model, errors::Error> {
    let tenant = principal.tenant();
    let incident = table::incidents::get(&tenant, incident_id)
        .await?
        .ok_or_else(|| HttpError::NotFound(format!("incident {incident_id} not found")))?;

    let mut allowed = principal.role.is_admin();
    if !allowed && let Some(group_id) = &incident.group_id {
        allowed = table::groups::is_group_admin(group_id, &principal.user_id).await?;
    }
    if !allowed {
        return Err(HttpError::Forbidden(
            "only group or org admins may reassign incidents".to_string(),
        )
        .into());
    }

    table::incidents::reassign(&tenant, incident_id, new_assignee, &principal.user_id).await
}
