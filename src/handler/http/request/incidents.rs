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

use axum::{
    Json,
    extract::{Path, Query},
    response::Response,
};
use infra::table;
use serde::Deserialize;
use utoipa::ToSchema;

use crate::{
    common::meta::http::HttpResponse as MetaHttpResponse,
    handler::http::auth::ExtractPrincipal,
    service::incidents,
};

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub severity: Option<String>,
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub limit: Option<u64>,
}

/// listIncidents
#[utoipa::path(
    get,
    path = "/incidents",
    context_path = "/api",
    tag = "Incidents",
    operation_id = "ListIncidents",
    security(("Authorization" = [])),
    params(
        ("status" = Option<String>, Query, description = "Filter by status"),
        ("severity" = Option<String>, Query, description = "Filter by severity"),
        ("search" = Option<String>, Query, description = "Substring match on title and description"),
        ("limit" = Option<u64>, Query, description = "Page size, default 100"),
    ),
    responses(
        (status = 200, description = "Success", content_type = "application/json"),
    ),
)]
#[tracing::instrument(skip_all)]
pub async fn list(
    ExtractPrincipal(principal): ExtractPrincipal,
    Query(query): Query<ListQuery>,
) -> Response {
    let params = table::incidents::ListParams {
        status: query.status,
        severity: query.severity,
        search: query.search,
        limit: query.limit,
    };
    match table::incidents::list(&principal.tenant(), &params).await {
        Ok(incidents) => MetaHttpResponse::json(incidents),
        Err(e) => MetaHttpResponse::from_error(&e),
    }
}

/// getIncident
#[utoipa::path(
    get,
    path = "/incidents/{incident_id}",
    context_path = "/api",
    tag = "Incidents",
    operation_id = "GetIncident",
    security(("Authorization" = [])),
    params(("incident_id" = String, Path, description = "Incident identifier")),
    responses(
        (status = 200, description = "Success", content_type = "application/json"),
        (status = 404, description = "Not found", content_type = "application/json", body = MetaHttpResponse),
    ),
)]
#[tracing::instrument(skip_all, fields(incident_id = %incident_id))]
pub async fn get(
    ExtractPrincipal(principal): ExtractPrincipal,
    Path(incident_id): Path<String>,
) -> Response {
    match table::incidents::get(&principal.tenant(), &incident_id).await {
        Ok(Some(incident)) => MetaHttpResponse::json(incident),
        Ok(None) => MetaHttpResponse::not_found(format!("incident {incident_id} not found")),
        Err(e) => MetaHttpResponse::from_error(&e),
    }
}

/// getIncidentEvents
#[utoipa::path(
    get,
    path = "/incidents/{incident_id}/events",
    context_path = "/api",
    tag = "Incidents",
    operation_id = "GetIncidentEvents",
    security(("Authorization" = [])),
    params(("incident_id" = String, Path, description = "Incident identifier")),
    responses(
        (status = 200, description = "Success", content_type = "application/json"),
    ),
)]
#[tracing::instrument(skip_all, fields(incident_id = %incident_id))]
pub async fn events(
    ExtractPrincipal(principal): ExtractPrincipal,
    Path(incident_id): Path<String>,
) -> Response {
    match table::incident_events::list(&principal.tenant(), &incident_id).await {
        Ok(events) => MetaHttpResponse::json(events),
        Err(e) => MetaHttpResponse::from_error(&e),
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateIncidentRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_severity")]
    pub severity: String,
    #[serde(default)]
    pub service_id: Option<String>,
}

fn default_severity() -> String {
    "warning".to_string()
}

/// createIncident
#[utoipa::path(
    post,
    path = "/incidents",
    context_path = "/api",
    tag = "Incidents",
    operation_id = "CreateIncident",
    security(("Authorization" = [])),
    request_body(content = CreateIncidentRequest, content_type = "application/json"),
    responses(
        (status = 200, description = "Created", content_type = "application/json"),
        (status = 400, description = "Validation error", content_type = "application/json", body = MetaHttpResponse),
    ),
)]
#[tracing::instrument(skip_all)]
pub async fn create(
    ExtractPrincipal(principal): ExtractPrincipal,
    Json(req): Json<CreateIncidentRequest>,
) -> Response {
    if req.title.trim().is_empty() {
        return MetaHttpResponse::bad_request("incident title is required");
    }
    let manual = incidents::ManualIncident {
        title: req.title,
        description: req.description,
        severity: req.severity,
        service_id: req.service_id,
    };
    match incidents::create_manual(&principal, manual).await {
        Ok(incident) => MetaHttpResponse::json(incident),
        Err(e) => MetaHttpResponse::from_error(&e),
    }
}

/// acknowledgeIncident
#[utoipa::path(
    put,
    path = "/incidents/{incident_id}/acknowledge",
    context_path = "/api",
    tag = "Incidents",
    operation_id = "AcknowledgeIncident",
    security(("Authorization" = [])),
    params(("incident_id" = String, Path, description = "Incident identifier")),
    responses(
        (status = 200, description = "Acknowledged", content_type = "application/json"),
        (status = 409, description = "Illegal transition", content_type = "application/json", body = MetaHttpResponse),
    ),
)]
#[tracing::instrument(skip_all, fields(incident_id = %incident_id))]
pub async fn acknowledge(
    ExtractPrincipal(principal): ExtractPrincipal,
    Path(incident_id): Path<String>,
) -> Response {
    match incidents::acknowledge(&principal, &incident_id).await {
        Ok(incident) => MetaHttpResponse::json(incident),
        Err(e) => MetaHttpResponse::from_error(&e),
    }
}

/// resolveIncident
#[utoipa::path(
    put,
    path = "/incidents/{incident_id}/resolve",
    context_path = "/api",
    tag = "Incidents",
    operation_id = "ResolveIncident",
    security(("Authorization" = [])),
    params(("incident_id" = String, Path, description = "Incident identifier")),
    responses(
        (status = 200, description = "Resolved", content_type = "application/json"),
        (status = 409, description = "Illegal transition", content_type = "application/json", body = MetaHttpResponse),
    ),
)]
#[tracing::instrument(skip_all, fields(incident_id = %incident_id))]
pub async fn resolve(
    ExtractPrincipal(principal): ExtractPrincipal,
    Path(incident_id): Path<String>,
) -> Response {
    match incidents::resolve(&principal, &incident_id).await {
        Ok(incident) => MetaHttpResponse::json(incident),
        Err(e) => MetaHttpResponse::from_error(&e),
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ReassignRequest {
    pub assigned_to: String,
}

/// reassignIncident
#[utoipa::path(
    put,
    path = "/incidents/{incident_id}/reassign",
    context_path = "/api",
    tag = "Incidents",
    operation_id = "ReassignIncident",
    security(("Authorization" = [])),
    params(("incident_id" = String, Path, description = "Incident identifier")),
    request_body(content = ReassignRequest, content_type = "application/json"),
    responses(
        (status = 200, description = "Reassigned", content_type = "application/json"),
        (status = 403, description = "Forbidden", content_type = "application/json", body = MetaHttpResponse),
    ),
)]
#[tracing::instrument(skip_all, fields(incident_id = %incident_id))]
pub async fn reassign(
    ExtractPrincipal(principal): ExtractPrincipal,
    Path(incident_id): Path<String>,
    Json(req): Json<ReassignRequest>,
) -> Response {
    match incidents::reassign(&principal, &incident_id, &req.assigned_to).await {
        Ok(incident) => MetaHttpResponse::json(incident),
        Err(e) => MetaHttpResponse::from_error(&e),
    }
}
