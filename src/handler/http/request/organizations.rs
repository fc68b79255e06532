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
    handler::http::auth::{AuthUser, ExtractPrincipal},
};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateOrgRequest {
    pub name: String,
    pub slug: String,
}

/// createOrganization
///
/// Bootstrap endpoint: the authenticated user becomes the owner.
#[utoipa::path(
    post,
    path = "/organizations",
    context_path = "/api",
    tag = "Organizations",
    operation_id = "CreateOrganization",
    security(("Authorization" = [])),
    request_body(content = CreateOrgRequest, content_type = "application/json"),
    responses(
        (status = 200, description = "Created", content_type = "application/json"),
        (status = 409, description = "Slug taken", content_type = "application/json", body = MetaHttpResponse),
    ),
)]
#[tracing::instrument(skip_all)]
pub async fn create(user: AuthUser, Json(req): Json<CreateOrgRequest>) -> Response {
    if req.name.trim().is_empty() || req.slug.trim().is_empty() {
        return MetaHttpResponse::bad_request("organization name and slug are required");
    }
    match table::organizations::get_by_slug(&req.slug).await {
        Ok(Some(_)) => {
            return MetaHttpResponse::conflict(format!("slug {} is taken", req.slug));
        }
        Ok(None) => {}
        Err(e) => return MetaHttpResponse::from_error(&e),
    }
    let org = match table::organizations::add(&req.name, &req.slug).await {
        Ok(org) => org,
        Err(e) => return MetaHttpResponse::from_error(&e),
    };
    if let Err(e) = table::users::add_org_member(&org.id, &user.user_id, "owner").await {
        return MetaHttpResponse::from_error(&e);
    }
    MetaHttpResponse::json(org)
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateProjectRequest {
    pub name: String,
}

/// createProject
#[utoipa::path(
    post,
    path = "/organizations/{org_id}/projects",
    context_path = "/api",
    tag = "Organizations",
    operation_id = "CreateProject",
    security(("Authorization" = [])),
    params(("org_id" = String, Path, description = "Organization identifier")),
    request_body(content = CreateProjectRequest, content_type = "application/json"),
    responses((status = 200, description = "Created", content_type = "application/json")),
)]
#[tracing::instrument(skip_all, fields(org_id = %org_id))]
pub async fn create_project(
    ExtractPrincipal(principal): ExtractPrincipal,
    Path(org_id): Path<String>,
    Json(req): Json<CreateProjectRequest>,
) -> Response {
    if principal.org_id != org_id {
        return MetaHttpResponse::forbidden("tenant mismatch");
    }
    if !principal.role.is_admin() {
        return MetaHttpResponse::forbidden("only admins may create projects");
    }
    match table::organizations::add_project(&org_id, &req.name).await {
        Ok(project) => MetaHttpResponse::json(project),
        Err(e) => MetaHttpResponse::from_error(&e),
    }
}

/// listProjects
#[utoipa::path(
    get,
    path = "/organizations/{org_id}/projects",
    context_path = "/api",
    tag = "Organizations",
    operation_id = "ListProjects",
    security(("Authorization" = [])),
    params(("org_id" = String, Path, description = "Organization identifier")),
    responses((status = 200, description = "Success", content_type = "application/json")),
)]
#[tracing::instrument(skip_all, fields(org_id = %org_id))]
pub async fn list_projects(
    ExtractPrincipal(principal): ExtractPrincipal,
    Path(org_id): Path<String>,
) -> Response {
    if principal.org_id != org_id {
        return MetaHttpResponse::forbidden("tenant mismatch");
    }
    match table::organizations::list_projects(&org_id).await {
        Ok(projects) => MetaHttpResponse::json(projects),
        Err(e) => MetaHttpResponse::from_error(&e),
    }
}
