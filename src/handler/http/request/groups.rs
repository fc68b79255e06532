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

use axum::{Json, extract::Path, response::Response};
use infra::table;
use serde::Deserialize;
use utoipa::ToSchema;

use crate::{
    common::meta::http::HttpResponse as MetaHttpResponse,
    handler::http::auth::ExtractPrincipal,
};

/// listGroups
#[utoipa::path(
    get,
    path = "/groups",
    context_path = "/api",
    tag = "Groups",
    operation_id = "ListGroups",
    security(("Authorization" = [])),
    responses((status = 200, description = "Success", content_type = "application/json")),
)]
#[tracing::instrument(skip_all)]
pub async fn list(ExtractPrincipal(principal): ExtractPrincipal) -> Response {
    match table::groups::list(&principal.tenant()).await {
        Ok(groups) => MetaHttpResponse::json(groups),
        Err(e) => MetaHttpResponse::from_error(&e),
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateGroupRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_group_type")]
    pub group_type: String,
}

fn default_group_type() -> String {
    "escalation".to_string()
}

/// createGroup
#[utoipa::path(
    post,
    path = "/groups",
    context_path = "/api",
    tag = "Groups",
    operation_id = "CreateGroup",
    security(("Authorization" = [])),
    request_body(content = CreateGroupRequest, content_type = "application/json"),
    responses((status = 200, description = "Created", content_type = "application/json")),
)]
#[tracing::instrument(skip_all)]
pub async fn create(
    ExtractPrincipal(principal): ExtractPrincipal,
    Json(req): Json<CreateGroupRequest>,
) -> Response {
    if !principal.role.is_admin() {
        return MetaHttpResponse::forbidden("only admins may create groups");
    }
    if !matches!(
        req.group_type.as_str(),
        "escalation" | "notification" | "approval"
    ) {
        return MetaHttpResponse::bad_request(format!("invalid group type {}", req.group_type));
    }
    match table::groups::add(&principal.tenant(), &req.name, &req.description, &req.group_type)
        .await
    {
        Ok(group) => MetaHttpResponse::json(group),
        Err(e) => MetaHttpResponse::from_error(&e),
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddMemberRequest {
    pub user_id: String,
    #[serde(default = "default_member_role")]
    pub role: String,
    #[serde(default)]
    pub escalation_order: i32,
    #[serde(default)]
    pub notify_fcm: bool,
    #[serde(default = "default_true")]
    pub notify_email: bool,
    #[serde(default)]
    pub notify_sms: bool,
}

fn default_member_role() -> String {
    "member".to_string()
}

fn default_true() -> bool {
    true
}

/// addGroupMember
#[utoipa::path(
    post,
    path = "/groups/{group_id}/members",
    context_path = "/api",
    tag = "Groups",
    operation_id = "AddGroupMember",
    security(("Authorization" = [])),
    params(("group_id" = String, Path, description = "Group identifier")),
    request_body(content = AddMemberRequest, content_type = "application/json"),
    responses((status = 200, description = "Added", content_type = "application/json")),
)]
#[tracing::instrument(skip_all, fields(group_id = %group_id))]
pub async fn add_member(
    ExtractPrincipal(principal): ExtractPrincipal,
    Path(group_id): Path<String>,
    Json(req): Json<AddMemberRequest>,
) -> Response {
    let group = match table::groups::get(&principal.tenant(), &group_id).await {
        Ok(Some(group)) => group,
        Ok(None) => return MetaHttpResponse::not_found(format!("group {group_id} not found")),
        Err(e) => return MetaHttpResponse::from_error(&e),
    };
    let group_admin = match table::groups::is_group_admin(&group.id, &principal.user_id).await {
        Ok(is_admin) => is_admin,
        Err(e) => return MetaHttpResponse::from_error(&e),
    };
    if !principal.role.is_admin() && !group_admin {
        return MetaHttpResponse::forbidden("only admins may add group members");
    }
    match table::groups::add_member(
        &group_id,
        &req.user_id,
        &req.role,
        req.escalation_order,
        req.notify_fcm,
        req.notify_email,
        req.notify_sms,
    )
    .await
    {
        Ok(member) => MetaHttpResponse::json(member),
        Err(e) => MetaHttpResponse::from_error(&e),
    }
}

/// listGroupMembers
#[utoipa::path(
    get,
    path = "/groups/{group_id}/members",
    context_path = "/api",
    tag = "Groups",
    operation_id = "ListGroupMembers",
    security(("Authorization" = [])),
    params(("group_id" = String, Path, description = "Group identifier")),
    responses((status = 200, description = "Success", content_type = "application/json")),
)]
#[tracing::instrument(skip_all, fields(group_id = %group_id))]
pub async fn list_members(
    ExtractPrincipal(principal): ExtractPrincipal,
    Path(group_id): Path<String>,
) -> Response {
    match table::groups::get(&principal.tenant(), &group_id).await {
        Ok(Some(_)) => {}
        Ok(None) => return MetaHttpResponse::not_found(format!("group {group_id} not found")),
        Err(e) => return MetaHttpResponse::from_error(&e),
    }
    match table::groups::members(&group_id).await {
        Ok(members) => MetaHttpResponse::json(members),
        Err(e) => MetaHttpResponse::from_error(&e),
    }
}
