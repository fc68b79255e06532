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

//! Services, integrations and escalation policies.

use axum::{Json, extract::Path, response::Response};
use config::meta::integrations::{IntegrationType, RoutingConditions};
use infra::table;
use serde::Deserialize;
use utoipa::ToSchema;

use crate::{
    common::meta::http::HttpResponse as MetaHttpResponse,
    handler::http::auth::ExtractPrincipal,
};

/// listServices
#[utoipa::path(
    get,
    path = "/services",
    context_path = "/api",
    tag = "Services",
    operation_id = "ListServices",
    security(("Authorization" = [])),
    responses((status = 200, description = "Success", content_type = "application/json")),
)]
#[tracing::instrument(skip_all)]
pub async fn list(ExtractPrincipal(principal): ExtractPrincipal) -> Response {
    match table::services::list(&principal.tenant()).await {
        Ok(services) => MetaHttpResponse::json(services),
        Err(e) => MetaHttpResponse::from_error(&e),
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateServiceRequest {
    pub group_id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub routing_key: Option<String>,
    #[serde(default)]
    pub escalation_policy_id: Option<String>,
}

/// createService
#[utoipa::path(
    post,
    path = "/services",
    context_path = "/api",
    tag = "Services",
    operation_id = "CreateService",
    security(("Authorization" = [])),
    request_body(content = CreateServiceRequest, content_type = "application/json"),
    responses((status = 200, description = "Created", content_type = "application/json")),
)]
#[tracing::instrument(skip_all)]
pub async fn create(
    ExtractPrincipal(principal): ExtractPrincipal,
    Json(req): Json<CreateServiceRequest>,
) -> Response {
    if !principal.role.is_admin() {
        return MetaHttpResponse::forbidden("only admins may create services");
    }
    let tenant = principal.tenant();
    match table::groups::get(&tenant, &req.group_id).await {
        Ok(Some(_)) => {}
        Ok(None) => return MetaHttpResponse::not_found(format!("group {} not found", req.group_id)),
        Err(e) => return MetaHttpResponse::from_error(&e),
    }
    let routing_key = req
        .routing_key
        .unwrap_or_else(|| config::utils::rand::generate_random_string(20));
    match table::services::add(
        &tenant,
        &req.group_id,
        &req.name,
        &req.description,
        &routing_key,
        req.escalation_policy_id,
    )
    .await
    {
        Ok(service) => MetaHttpResponse::json(service),
        Err(e) => MetaHttpResponse::from_error(&e),
    }
}

/// listIntegrations
#[utoipa::path(
    get,
    path = "/integrations",
    context_path = "/api",
    tag = "Services",
    operation_id = "ListIntegrations",
    security(("Authorization" = [])),
    responses((status = 200, description = "Success", content_type = "application/json")),
)]
#[tracing::instrument(skip_all)]
pub async fn list_integrations(ExtractPrincipal(principal): ExtractPrincipal) -> Response {
    match table::integrations::list(&principal.tenant()).await {
        Ok(integrations) => MetaHttpResponse::json(integrations),
        Err(e) => MetaHttpResponse::from_error(&e),
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateIntegrationRequest {
    pub name: String,
    pub integration_type: String,
    #[serde(default)]
    pub check_url: Option<String>,
}

/// createIntegration
#[utoipa::path(
    post,
    path = "/integrations",
    context_path = "/api",
    tag = "Services",
    operation_id = "CreateIntegration",
    security(("Authorization" = [])),
    request_body(content = CreateIntegrationRequest, content_type = "application/json"),
    responses((status = 200, description = "Created", content_type = "application/json")),
)]
#[tracing::instrument(skip_all)]
pub async fn create_integration(
    ExtractPrincipal(principal): ExtractPrincipal,
    Json(req): Json<CreateIntegrationRequest>,
) -> Response {
    if !principal.role.is_admin() {
        return MetaHttpResponse::forbidden("only admins may create integrations");
    }
    let Ok(integration_type) = req.integration_type.parse::<IntegrationType>() else {
        return MetaHttpResponse::bad_request(format!(
            "unknown integration type {}",
            req.integration_type
        ));
    };

    // webhook_url embeds the generated id, patched right after insert
    let cfg = config::get_config();
    match table::integrations::add(
        &principal.tenant(),
        &req.name,
        &integration_type.to_string(),
        "",
        req.check_url,
    )
    .await
    {
        Ok(mut integration) => {
            let webhook_url = format!(
                "{}/webhook/{}/{}",
                cfg.common.public_url, integration_type, integration.id
            );
            if let Err(e) =
                table::integrations::set_webhook_url(&integration.id, &webhook_url).await
            {
                return MetaHttpResponse::from_error(&e);
            }
            integration.webhook_url = webhook_url;
            MetaHttpResponse::json(integration)
        }
        Err(e) => MetaHttpResponse::from_error(&e),
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddRouteRequest {
    pub service_id: String,
    #[serde(default)]
    pub routing_conditions: RoutingConditions,
    #[serde(default)]
    pub position: i32,
}

/// addIntegrationRoute
#[utoipa::path(
    post,
    path = "/integrations/{integration_id}/routes",
    context_path = "/api",
    tag = "Services",
    operation_id = "AddIntegrationRoute",
    security(("Authorization" = [])),
    params(("integration_id" = String, Path, description = "Integration identifier")),
    request_body(content = AddRouteRequest, content_type = "application/json"),
    responses((status = 200, description = "Created", content_type = "application/json")),
)]
#[tracing::instrument(skip_all, fields(integration_id = %integration_id))]
pub async fn add_route(
    ExtractPrincipal(principal): ExtractPrincipal,
    Path(integration_id): Path<String>,
    Json(req): Json<AddRouteRequest>,
) -> Response {
    if !principal.role.is_admin() {
        return MetaHttpResponse::forbidden("only admins may edit routing");
    }
    let tenant = principal.tenant();
    match table::integrations::get_for_tenant(&tenant, &integration_id).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            return MetaHttpResponse::not_found(format!(
                "integration {integration_id} not found"
            ));
        }
        Err(e) => return MetaHttpResponse::from_error(&e),
    }
    match table::services::get(&tenant, &req.service_id).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            return MetaHttpResponse::not_found(format!("service {} not found", req.service_id));
        }
        Err(e) => return MetaHttpResponse::from_error(&e),
    }
    let conditions = match serde_json::to_value(&req.routing_conditions) {
        Ok(conditions) => conditions,
        Err(e) => return MetaHttpResponse::internal_error(e),
    };
    match table::services::add_route(&integration_id, &req.service_id, conditions, req.position)
        .await
    {
        Ok(route) => MetaHttpResponse::json(route),
        Err(e) => MetaHttpResponse::from_error(&e),
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreatePolicyRequest {
    pub group_id: String,
    pub name: String,
    #[serde(default = "default_max_levels")]
    pub max_escalation_levels: i32,
    #[serde(default = "default_timeout_secs")]
    pub escalation_timeout_secs: i32,
    #[serde(default)]
    pub severity_levels: Vec<String>,
}

fn default_max_levels() -> i32 {
    3
}

fn default_timeout_secs() -> i32 {
    300
}

/// createEscalationPolicy
#[utoipa::path(
    post,
    path = "/escalation_policies",
    context_path = "/api",
    tag = "Services",
    operation_id = "CreateEscalationPolicy",
    security(("Authorization" = [])),
    request_body(content = CreatePolicyRequest, content_type = "application/json"),
    responses((status = 200, description = "Created", content_type = "application/json")),
)]
#[tracing::instrument(skip_all)]
pub async fn create_policy(
    ExtractPrincipal(principal): ExtractPrincipal,
    Json(req): Json<CreatePolicyRequest>,
) -> Response {
    if !principal.role.is_admin() {
        return MetaHttpResponse::forbidden("only admins may create escalation policies");
    }
    let tenant = principal.tenant();
    match table::groups::get(&tenant, &req.group_id).await {
        Ok(Some(_)) => {}
        Ok(None) => return MetaHttpResponse::not_found(format!("group {} not found", req.group_id)),
        Err(e) => return MetaHttpResponse::from_error(&e),
    }
    match table::escalation::add_policy(
        &tenant,
        &req.group_id,
        &req.name,
        req.max_escalation_levels,
        req.escalation_timeout_secs,
        serde_json::json!(req.severity_levels),
    )
    .await
    {
        Ok(policy) => MetaHttpResponse::json(policy),
        Err(e) => MetaHttpResponse::from_error(&e),
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddLevelRequest {
    pub level_number: i32,
    pub target_type: String,
    #[serde(default)]
    pub target_id: Option<String>,
    #[serde(default = "default_level_timeout")]
    pub timeout_minutes: i32,
    #[serde(default)]
    pub notification_methods: Vec<String>,
    #[serde(default)]
    pub message_template: Option<String>,
}

fn default_level_timeout() -> i32 {
    5
}

/// addEscalationLevel
#[utoipa::path(
    post,
    path = "/escalation_policies/{policy_id}/levels",
    context_path = "/api",
    tag = "Services",
    operation_id = "AddEscalationLevel",
    security(("Authorization" = [])),
    params(("policy_id" = String, Path, description = "Policy identifier")),
    request_body(content = AddLevelRequest, content_type = "application/json"),
    responses((status = 200, description = "Created", content_type = "application/json")),
)]
#[tracing::instrument(skip_all, fields(policy_id = %policy_id))]
pub async fn add_level(
    ExtractPrincipal(principal): ExtractPrincipal,
    Path(policy_id): Path<String>,
    Json(req): Json<AddLevelRequest>,
) -> Response {
    if !principal.role.is_admin() {
        return MetaHttpResponse::forbidden("only admins may edit escalation policies");
    }
    if req
        .target_type
        .parse::<config::meta::escalation::EscalationTargetType>()
        .is_err()
    {
        return MetaHttpResponse::bad_request(format!(
            "invalid target type {}",
            req.target_type
        ));
    }
    match table::escalation::get_policy(&policy_id).await {
        Ok(Some(policy)) if policy.org_id == principal.org_id => {}
        Ok(_) => return MetaHttpResponse::not_found(format!("policy {policy_id} not found")),
        Err(e) => return MetaHttpResponse::from_error(&e),
    }
    match table::escalation::add_level(
        &policy_id,
        req.level_number,
        &req.target_type,
        req.target_id,
        req.timeout_minutes,
        serde_json::json!(req.notification_methods),
        req.message_template,
    )
    .await
    {
        Ok(level) => MetaHttpResponse::json(level),
        Err(e) => MetaHttpResponse::from_error(&e),
    }
}
