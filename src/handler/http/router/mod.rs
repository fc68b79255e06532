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
    Router,
    routing::{delete, get, post, put},
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};

use super::request::{
    groups, incidents, mobile, organizations, schedules, services, status, users, webhooks,
};

pub mod openapi;

const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

pub fn create_router() -> Router {
    let api = Router::new()
        .route("/incidents", get(incidents::list).post(incidents::create))
        .route("/incidents/{incident_id}", get(incidents::get))
        .route("/incidents/{incident_id}/events", get(incidents::events))
        .route(
            "/incidents/{incident_id}/acknowledge",
            put(incidents::acknowledge),
        )
        .route("/incidents/{incident_id}/resolve", put(incidents::resolve))
        .route("/incidents/{incident_id}/reassign", put(incidents::reassign))
        .route("/groups", get(groups::list).post(groups::create))
        .route(
            "/groups/{group_id}/members",
            get(groups::list_members).post(groups::add_member),
        )
        .route(
            "/groups/{group_id}/schedulers",
            get(schedules::list_schedulers),
        )
        .route("/groups/{group_id}/shifts", get(schedules::list_group_shifts))
        .route("/schedulers", post(schedules::create_scheduler))
        .route(
            "/schedulers/{scheduler_id}/rotations",
            post(schedules::create_rotation),
        )
        .route(
            "/schedulers/{scheduler_id}/oncall",
            get(schedules::current_on_call),
        )
        .route("/overrides", post(schedules::create_override))
        .route("/overrides/{override_id}", delete(schedules::delete_override))
        .route("/swaps", post(schedules::swap))
        .route("/services", get(services::list).post(services::create))
        .route(
            "/integrations",
            get(services::list_integrations).post(services::create_integration),
        )
        .route(
            "/integrations/{integration_id}/routes",
            post(services::add_route),
        )
        .route("/escalation_policies", post(services::create_policy))
        .route(
            "/escalation_policies/{policy_id}/levels",
            post(services::add_level),
        )
        .route("/organizations", post(organizations::create))
        .route(
            "/organizations/{org_id}/projects",
            get(organizations::list_projects).post(organizations::create_project),
        )
        .route("/users", get(users::list).post(users::create))
        .route("/mobile/connect/generate", post(mobile::generate))
        .route("/mobile/connect/verify", post(mobile::verify));

    Router::new()
        .route("/healthz", get(status::healthz))
        .route(
            "/webhook/{integration_type}/{integration_id}",
            post(webhooks::receive),
        )
        .route("/api-doc/openapi.json", get(openapi::openapi_json))
        .nest("/api", api)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
                .layer(CorsLayer::permissive()),
        )
}
