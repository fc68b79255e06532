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

use axum::{Json, response::Response};
use config::meta::auth::UserRole;
use infra::table;
use serde::Deserialize;
use utoipa::ToSchema;

use crate::{
    common::meta::http::HttpResponse as MetaHttpResponse,
    handler::http::auth::ExtractPrincipal,
};

/// listUsers
#[utoipa::path(
    get,
    path = "/users",
    context_path = "/api",
    tag = "Users",
    operation_id = "ListUsers",
    security(("Authorization" = [])),
    responses((status = 200, description = "Success", content_type = "application/json")),
)]
#[tracing::instrument(skip_all)]
pub async fn list(ExtractPrincipal(principal): ExtractPrincipal) -> Response {
    match table::users::list_by_org(&principal.org_id).await {
        Ok(users) => MetaHttpResponse::json(users),
        Err(e) => MetaHttpResponse::from_error(&e),
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateUserRequest {
    pub email: String,
    pub name: String,
    #[serde(default = "default_role")]
    pub role: String,
    #[serde(default)]
    pub team: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

fn default_role() -> String {
    "member".to_string()
}

/// createUser
///
/// Creates the user record if the email is new and links it to the
/// caller's organization.
#[utoipa::path(
    post,
    path = "/users",
    context_path = "/api",
    tag = "Users",
    operation_id = "CreateUser",
    security(("Authorization" = [])),
    request_body(content = CreateUserRequest, content_type = "application/json"),
    responses((status = 200, description = "Created", content_type = "application/json")),
)]
#[tracing::instrument(skip_all)]
pub async fn create(
    ExtractPrincipal(principal): ExtractPrincipal,
    Json(req): Json<CreateUserRequest>,
) -> Response {
    if !principal.role.is_admin() {
        return MetaHttpResponse::forbidden("only admins may create users");
    }
    if req.role.parse::<UserRole>().is_err() {
        return MetaHttpResponse::bad_request(format!("invalid role {}", req.role));
    }

    let user = match table::users::get_by_email(&req.email).await {
        Ok(Some(existing)) => existing,
        Ok(None) => {
            match table::users::add(&req.email, &req.name, &req.role, req.team, req.phone).await {
                Ok(user) => user,
                Err(e) => return MetaHttpResponse::from_error(&e),
            }
        }
        Err(e) => return MetaHttpResponse::from_error(&e),
    };

    match table::users::get_org_role(&principal.org_id, &user.id).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            if let Err(e) =
                table::users::add_org_member(&principal.org_id, &user.id, &req.role).await
            {
                return MetaHttpResponse::from_error(&e);
            }
        }
        Err(e) => return MetaHttpResponse::from_error(&e),
    }
    MetaHttpResponse::json(user)
}
