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

//! Principal extraction.
//!
//! The core consumes verified principals, it never mints tokens. A
//! Supabase-issued HS256 JWT (or a mobile session token) identifies the
//! user; the tenant comes from the x-org-id / x-project-id headers or
//! the matching query parameters; the role comes from the membership
//! table.

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
    response::Response,
};
use config::meta::auth::{Principal, UserRole};
use infra::table;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::Deserialize;

use crate::{common::meta::http::HttpResponse as MetaHttpResponse, service::identity::connect};

#[derive(Debug, Deserialize)]
struct Claims {
    sub: String,
}

/// A verified user without tenant context, used by bootstrap endpoints
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: String,
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

fn header_value<'a>(parts: &'a Parts, name: &str) -> Option<&'a str> {
    parts.headers.get(name)?.to_str().ok().filter(|v| !v.is_empty())
}

fn query_value(parts: &Parts, name: &str) -> Option<String> {
    let query = parts.uri.query()?;
    query.split('&').find_map(|pair| {
        let (key, value) = pair.split_once('=')?;
        (key == name && !value.is_empty()).then(|| value.to_string())
    })
}

fn resolve_user(parts: &Parts) -> Result<String, Response> {
    let cfg = config::get_config();
    if let Some(token) = bearer_token(parts) {
        // a paired mobile device authenticates with its session token
        if let Some(user_id) = connect::session_user(token) {
            return Ok(user_id);
        }
        if !cfg.auth.supabase_jwt_secret.is_empty() {
            let key = DecodingKey::from_secret(cfg.auth.supabase_jwt_secret.as_bytes());
            let mut validation = Validation::new(Algorithm::HS256);
            validation.validate_aud = false;
            return match decode::<Claims>(token, &key, &validation) {
                Ok(data) => Ok(data.claims.sub),
                Err(e) => Err(MetaHttpResponse::unauthorized(format!("invalid token: {e}"))),
            };
        }
    }
    // dev mode: no verifier secret configured
    if cfg.auth.supabase_jwt_secret.is_empty()
        && let Some(user_id) = header_value(parts, "x-user-id")
    {
        return Ok(user_id.to_string());
    }
    Err(MetaHttpResponse::unauthorized("missing credentials"))
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(AuthUser {
            user_id: resolve_user(parts)?,
        })
    }
}

/// Extract the full principal: verified user + tenant + membership role
pub struct ExtractPrincipal(pub Principal);

impl<S> FromRequestParts<S> for ExtractPrincipal
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_id = resolve_user(parts)?;

        let org_id = header_value(parts, "x-org-id")
            .map(|v| v.to_string())
            .or_else(|| query_value(parts, "org_id"))
            .ok_or_else(|| MetaHttpResponse::bad_request("missing org_id"))?;
        let project_id = header_value(parts, "x-project-id")
            .map(|v| v.to_string())
            .or_else(|| query_value(parts, "project_id"));

        let role = table::users::get_org_role(&org_id, &user_id)
            .await
            .map_err(|e| MetaHttpResponse::internal_error(e))?
            .and_then(|role| role.parse::<UserRole>().ok())
            .ok_or_else(|| {
                MetaHttpResponse::forbidden(format!("user {user_id} is not a member of {org_id}"))
            })?;

        Ok(ExtractPrincipal(Principal {
            user_id,
            org_id,
            project_id,
            role,
        }))
    }
}

#[cfg(test)]
mod tests {
    use axum::http::Request;

    use super::*;

    fn parts_for(uri: &str) -> Parts {
        let (parts, ()) = Request::builder().uri(uri).body(()).unwrap().into_parts();
        parts
    }

    #[test]
    fn test_query_value() {
        let parts = parts_for("/api/incidents?org_id=org1&limit=10");
        assert_eq!(query_value(&parts, "org_id").as_deref(), Some("org1"));
        assert_eq!(query_value(&parts, "project_id"), None);
    }

    #[test]
    fn test_bearer_token() {
        let (parts, ()) = Request::builder()
            .uri("/")
            .header(header::AUTHORIZATION, "Bearer abc.def.ghi")
            .body(())
            .unwrap()
            .into_parts();
        assert_eq!(bearer_token(&parts), Some("abc.def.ghi"));
    }
}
