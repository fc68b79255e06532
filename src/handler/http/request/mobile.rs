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

//! Mobile device pairing.

use axum::{Json, response::Response};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::{
    common::meta::http::HttpResponse as MetaHttpResponse,
    handler::http::auth::ExtractPrincipal,
    service::identity::connect,
};

/// generateConnectToken
#[utoipa::path(
    post,
    path = "/mobile/connect/generate",
    context_path = "/api",
    tag = "Mobile",
    operation_id = "GenerateConnectToken",
    security(("Authorization" = [])),
    responses(
        (status = 200, description = "Signed pairing payload", content_type = "application/json", body = connect::ConnectGrant),
    ),
)]
#[tracing::instrument(skip_all)]
pub async fn generate(ExtractPrincipal(principal): ExtractPrincipal) -> Response {
    match connect::generate(&principal.user_id).await {
        Ok(grant) => MetaHttpResponse::json(grant),
        Err(e) => MetaHttpResponse::from_error(&e),
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct VerifyRequest {
    pub connect_token: String,
    pub user_id: String,
}

/// verifyConnectToken
#[utoipa::path(
    post,
    path = "/mobile/connect/verify",
    context_path = "/api",
    tag = "Mobile",
    operation_id = "VerifyConnectToken",
    request_body(content = VerifyRequest, content_type = "application/json"),
    responses(
        (status = 200, description = "Mobile session", content_type = "application/json", body = connect::MobileSession),
        (status = 401, description = "Unknown, used or expired token", content_type = "application/json", body = MetaHttpResponse),
    ),
)]
#[tracing::instrument(skip_all)]
pub async fn verify(Json(req): Json<VerifyRequest>) -> Response {
    match connect::verify(&req.connect_token, &req.user_id).await {
        Ok(session) => MetaHttpResponse::json(session),
        Err(e) => MetaHttpResponse::from_error(&e),
    }
}
