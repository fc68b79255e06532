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
use config::utils::time;
use infra::table;
use serde::Deserialize;
use utoipa::ToSchema;

use crate::{
    common::meta::http::HttpResponse as MetaHttpResponse,
    handler::http::auth::ExtractPrincipal,
    service::schedule::{self, overrides},
};

async fn group_in_tenant(
    principal: &config::meta::auth::Principal,
    group_id: &str,
) -> Result<(), Response> {
    match table::groups::get(&principal.tenant(), group_id).await {
        Ok(Some(_)) => Ok(()),
        Ok(None) => Err(MetaHttpResponse::not_found(format!(
            "group {group_id} not found"
        ))),
        Err(e) => Err(MetaHttpResponse::from_error(&e)),
    }
}

/// listGroupSchedulers
#[utoipa::path(
    get,
    path = "/groups/{group_id}/schedulers",
    context_path = "/api",
    tag = "Schedules",
    operation_id = "ListGroupSchedulers",
    security(("Authorization" = [])),
    params(("group_id" = String, Path, description = "Group identifier")),
    responses(
        (status = 200, description = "Success", content_type = "application/json"),
    ),
)]
#[tracing::instrument(skip_all, fields(group_id = %group_id))]
pub async fn list_schedulers(
    ExtractPrincipal(principal): ExtractPrincipal,
    Path(group_id): Path<String>,
) -> Response {
    if let Err(response) = group_in_tenant(&principal, &group_id).await {
        return response;
    }
    match table::schedulers::list_by_group(&group_id).await {
        Ok(schedulers) => MetaHttpResponse::json(schedulers),
        Err(e) => MetaHttpResponse::from_error(&e),
    }
}

#[derive(Debug, Deserialize)]
pub struct ShiftsQuery {
    #[serde(default)]
    pub from: Option<i64>,
    #[serde(default)]
    pub to: Option<i64>,
}

/// listGroupShifts
#[utoipa::path(
    get,
    path = "/groups/{group_id}/shifts",
    context_path = "/api",
    tag = "Schedules",
    operation_id = "ListGroupShifts",
    security(("Authorization" = [])),
    params(
        ("group_id" = String, Path, description = "Group identifier"),
        ("from" = Option<i64>, Query, description = "Window start, microseconds"),
        ("to" = Option<i64>, Query, description = "Window end, microseconds"),
    ),
    responses(
        (status = 200, description = "Override-flattened shifts", content_type = "application/json", body = [schedule::ShiftEnvelope]),
    ),
)]
#[tracing::instrument(skip_all, fields(group_id = %group_id))]
pub async fn list_group_shifts(
    ExtractPrincipal(principal): ExtractPrincipal,
    Path(group_id): Path<String>,
    Query(query): Query<ShiftsQuery>,
) -> Response {
    if let Err(response) = group_in_tenant(&principal, &group_id).await {
        return response;
    }
    let from = query.from.unwrap_or_else(time::now_micros);
    let to = query.to.unwrap_or(from + 30 * time::DAY_MICROS);
    if to <= from {
        return MetaHttpResponse::bad_request("to must be after from");
    }

    let schedulers = match table::schedulers::list_by_group(&group_id).await {
        Ok(schedulers) => schedulers,
        Err(e) => return MetaHttpResponse::from_error(&e),
    };
    let mut shifts = Vec::new();
    for scheduler in schedulers {
        match schedule::list_shifts(&scheduler.id, from, to).await {
            Ok(mut envelope) => shifts.append(&mut envelope),
            Err(e) => return MetaHttpResponse::from_error(&e),
        }
    }
    shifts.sort_by_key(|s| s.start_time);
    MetaHttpResponse::json(shifts)
}

#[derive(Debug, Deserialize)]
pub struct OnCallQuery {
    /// Lookup instant, microseconds; defaults to now
    #[serde(default)]
    pub at: Option<i64>,
}

/// currentOnCall
#[utoipa::path(
    get,
    path = "/schedulers/{scheduler_id}/oncall",
    context_path = "/api",
    tag = "Schedules",
    operation_id = "CurrentOnCall",
    security(("Authorization" = [])),
    params(
        ("scheduler_id" = String, Path, description = "Scheduler identifier"),
        ("at" = Option<i64>, Query, description = "Instant, microseconds; defaults to now"),
    ),
    responses(
        (status = 200, description = "Resolution or null", content_type = "application/json"),
    ),
)]
#[tracing::instrument(skip_all, fields(scheduler_id = %scheduler_id))]
pub async fn current_on_call(
    ExtractPrincipal(_principal): ExtractPrincipal,
    Path(scheduler_id): Path<String>,
    Query(query): Query<OnCallQuery>,
) -> Response {
    let at = query.at.unwrap_or_else(time::now_micros);
    match schedule::current_on_call(&scheduler_id, at).await {
        Ok(resolution) => MetaHttpResponse::json(resolution),
        Err(e) => MetaHttpResponse::from_error(&e),
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateSchedulerRequest {
    pub group_id: String,
    pub name: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default = "default_rotation_type")]
    pub rotation_type: String,
}

fn default_rotation_type() -> String {
    "weekly".to_string()
}

/// createScheduler
#[utoipa::path(
    post,
    path = "/schedulers",
    context_path = "/api",
    tag = "Schedules",
    operation_id = "CreateScheduler",
    security(("Authorization" = [])),
    request_body(content = CreateSchedulerRequest, content_type = "application/json"),
    responses(
        (status = 200, description = "Created", content_type = "application/json"),
    ),
)]
#[tracing::instrument(skip_all)]
pub async fn create_scheduler(
    ExtractPrincipal(principal): ExtractPrincipal,
    Json(req): Json<CreateSchedulerRequest>,
) -> Response {
    if !principal.role.is_admin() {
        return MetaHttpResponse::forbidden("only admins may create schedulers");
    }
    if let Err(response) = group_in_tenant(&principal, &req.group_id).await {
        return response;
    }
    let display_name = req.display_name.unwrap_or_else(|| req.name.clone());
    match table::schedulers::add(
        &principal.org_id,
        &req.group_id,
        &req.name,
        &display_name,
        &req.rotation_type,
    )
    .await
    {
        Ok(scheduler) => MetaHttpResponse::json(scheduler),
        Err(e) => MetaHttpResponse::from_error(&e),
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateRotationRequest {
    pub name: String,
    pub shift_length: String,
    pub handoff_day: String,
    /// "HH:MM" UTC
    pub handoff_time: String,
    /// Microseconds since epoch
    pub start_at: i64,
    #[serde(default)]
    pub end_at: Option<i64>,
    pub user_order: Vec<String>,
}

/// createRotation
#[utoipa::path(
    post,
    path = "/schedulers/{scheduler_id}/rotations",
    context_path = "/api",
    tag = "Schedules",
    operation_id = "CreateRotation",
    security(("Authorization" = [])),
    params(("scheduler_id" = String, Path, description = "Scheduler identifier")),
    request_body(content = CreateRotationRequest, content_type = "application/json"),
    responses(
        (status = 200, description = "Created", content_type = "application/json"),
        (status = 400, description = "Validation error", content_type = "application/json", body = MetaHttpResponse),
    ),
)]
#[tracing::instrument(skip_all, fields(scheduler_id = %scheduler_id))]
pub async fn create_rotation(
    ExtractPrincipal(principal): ExtractPrincipal,
    Path(scheduler_id): Path<String>,
    Json(req): Json<CreateRotationRequest>,
) -> Response {
    if !principal.role.is_admin() {
        return MetaHttpResponse::forbidden("only admins may create rotations");
    }
    if config::meta::schedule::parse_handoff_day(&req.handoff_day).is_err() {
        return MetaHttpResponse::bad_request(format!("invalid handoff_day {}", req.handoff_day));
    }
    if config::meta::schedule::parse_handoff_time(&req.handoff_time).is_err() {
        return MetaHttpResponse::bad_request(format!(
            "invalid handoff_time {}",
            req.handoff_time
        ));
    }
    if req.shift_length.parse::<config::meta::schedule::ShiftLength>().is_err() {
        return MetaHttpResponse::bad_request(format!(
            "invalid shift_length {}",
            req.shift_length
        ));
    }
    match table::schedulers::get(&scheduler_id).await {
        Ok(Some(scheduler)) if scheduler.org_id == principal.org_id => {}
        Ok(_) => return MetaHttpResponse::not_found(format!("scheduler {scheduler_id} not found")),
        Err(e) => return MetaHttpResponse::from_error(&e),
    }
    match table::schedulers::add_rotation(
        &scheduler_id,
        &req.name,
        &req.shift_length,
        &req.handoff_day,
        &req.handoff_time,
        req.start_at,
        req.end_at,
        &req.user_order,
    )
    .await
    {
        Ok(rotation) => MetaHttpResponse::json(rotation),
        Err(e) => MetaHttpResponse::from_error(&e),
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateOverrideRequest {
    pub shift_id: String,
    pub override_user_id: String,
    #[serde(default)]
    pub override_start: Option<i64>,
    #[serde(default)]
    pub override_end: Option<i64>,
    #[serde(default)]
    pub reason: String,
}

/// createOverride
#[utoipa::path(
    post,
    path = "/overrides",
    context_path = "/api",
    tag = "Schedules",
    operation_id = "CreateOverride",
    security(("Authorization" = [])),
    request_body(content = CreateOverrideRequest, content_type = "application/json"),
    responses(
        (status = 200, description = "Created", content_type = "application/json"),
        (status = 400, description = "Containment violated", content_type = "application/json", body = MetaHttpResponse),
    ),
)]
#[tracing::instrument(skip_all)]
pub async fn create_override(
    ExtractPrincipal(principal): ExtractPrincipal,
    Json(req): Json<CreateOverrideRequest>,
) -> Response {
    match overrides::create(
        &principal,
        &req.shift_id,
        &req.override_user_id,
        req.override_start,
        req.override_end,
        &req.reason,
    )
    .await
    {
        Ok(created) => MetaHttpResponse::json(created),
        Err(e) => MetaHttpResponse::from_error(&e),
    }
}

/// deleteOverride
#[utoipa::path(
    delete,
    path = "/overrides/{override_id}",
    context_path = "/api",
    tag = "Schedules",
    operation_id = "DeleteOverride",
    security(("Authorization" = [])),
    params(("override_id" = String, Path, description = "Override identifier")),
    responses(
        (status = 200, description = "Deleted", content_type = "application/json", body = MetaHttpResponse),
    ),
)]
#[tracing::instrument(skip_all, fields(override_id = %override_id))]
pub async fn delete_override(
    ExtractPrincipal(principal): ExtractPrincipal,
    Path(override_id): Path<String>,
) -> Response {
    match overrides::delete(&principal, &override_id).await {
        Ok(()) => MetaHttpResponse::ok("override removed"),
        Err(e) => MetaHttpResponse::from_error(&e),
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SwapRequest {
    pub shift_a: String,
    pub shift_b: String,
    #[serde(default = "default_swap_reason")]
    pub reason: String,
}

fn default_swap_reason() -> String {
    "shift swap".to_string()
}

/// swapShifts
#[utoipa::path(
    post,
    path = "/swaps",
    context_path = "/api",
    tag = "Schedules",
    operation_id = "SwapShifts",
    security(("Authorization" = [])),
    request_body(content = SwapRequest, content_type = "application/json"),
    responses(
        (status = 200, description = "Swapped", content_type = "application/json"),
    ),
)]
#[tracing::instrument(skip_all)]
pub async fn swap(
    ExtractPrincipal(principal): ExtractPrincipal,
    Json(req): Json<SwapRequest>,
) -> Response {
    match overrides::swap(&principal, &req.shift_a, &req.shift_b, &req.reason).await {
        Ok((override_a, override_b)) => MetaHttpResponse::json(vec![override_a, override_b]),
        Err(e) => MetaHttpResponse::from_error(&e),
    }
}
