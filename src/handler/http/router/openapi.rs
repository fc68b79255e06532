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

use axum::{Json, response::IntoResponse};
use utoipa::OpenApi;

use crate::handler::http::request::{
    groups, incidents, mobile, organizations, schedules, services, status, users, webhooks,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        status::healthz,
        webhooks::receive,
        incidents::list,
        incidents::get,
        incidents::events,
        incidents::create,
        incidents::acknowledge,
        incidents::resolve,
        incidents::reassign,
        groups::list,
        groups::create,
        groups::add_member,
        groups::list_members,
        schedules::list_schedulers,
        schedules::list_group_shifts,
        schedules::current_on_call,
        schedules::create_scheduler,
        schedules::create_rotation,
        schedules::create_override,
        schedules::delete_override,
        schedules::swap,
        services::list,
        services::create,
        services::list_integrations,
        services::create_integration,
        services::add_route,
        services::create_policy,
        services::add_level,
        organizations::create,
        organizations::create_project,
        organizations::list_projects,
        users::list,
        users::create,
        mobile::generate,
        mobile::verify,
    ),
    tags(
        (name = "Status", description = "Process health"),
        (name = "Webhooks", description = "Inbound vendor alert webhooks"),
        (name = "Incidents", description = "Incident lifecycle"),
        (name = "Groups", description = "On-call groups"),
        (name = "Schedules", description = "Schedulers, rotations, shifts and overrides"),
        (name = "Services", description = "Services, integrations and escalation policies"),
        (name = "Organizations", description = "Tenancy"),
        (name = "Users", description = "Users and memberships"),
        (name = "Mobile", description = "Mobile device pairing"),
    ),
    info(
        title = "PageWatch API",
        description = "Incident-response backend: webhook ingest, routing, on-call scheduling and incident lifecycle."
    )
)]
pub struct ApiDoc;

pub async fn openapi_json() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}
