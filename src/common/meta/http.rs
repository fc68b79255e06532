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
    http::StatusCode,
    response::{IntoResponse, Response},
};
use infra::errors;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// HTTP response envelope for messages and errors
/// code 200 is success
/// code 400 is a validation error
/// code 404 is not found
/// code 409 is a conflict
/// code 500 is internal server error
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct HttpResponse {
    pub code: u16,
    pub message: String,
    /// Stable machine-readable error kind
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

impl HttpResponse {
    pub fn message(code: u16, message: impl ToString) -> Self {
        HttpResponse {
            code,
            message: message.to_string(),
            kind: None,
        }
    }

    pub fn error(code: u16, error: impl ToString) -> Self {
        HttpResponse {
            code,
            message: error.to_string(),
            kind: None,
        }
    }

    pub fn error_kind(code: u16, kind: &str, error: impl ToString) -> Self {
        HttpResponse {
            code,
            message: error.to_string(),
            kind: Some(kind.to_string()),
        }
    }

    /// Serialize any payload as a 200 response
    pub fn json<T: Serialize>(payload: T) -> Response {
        Json(payload).into_response()
    }

    pub fn ok(msg: impl ToString) -> Response {
        Self::message(StatusCode::OK.as_u16(), msg).into_response()
    }

    pub fn bad_request(error: impl ToString) -> Response {
        Self::error_kind(
            StatusCode::BAD_REQUEST.as_u16(),
            "validation_error",
            error,
        )
        .into_response()
    }

    pub fn unauthorized(error: impl ToString) -> Response {
        Self::error_kind(StatusCode::UNAUTHORIZED.as_u16(), "unauthenticated", error)
            .into_response()
    }

    pub fn forbidden(error: impl ToString) -> Response {
        Self::error_kind(StatusCode::FORBIDDEN.as_u16(), "forbidden", error).into_response()
    }

    pub fn not_found(error: impl ToString) -> Response {
        Self::error_kind(StatusCode::NOT_FOUND.as_u16(), "not_found", error).into_response()
    }

    pub fn conflict(error: impl ToString) -> Response {
        Self::error_kind(StatusCode::CONFLICT.as_u16(), "conflict", error).into_response()
    }

    pub fn too_many_requests(error: impl ToString) -> Response {
        Self::error_kind(
            StatusCode::TOO_MANY_REQUESTS.as_u16(),
            "rate_limited",
            error,
        )
        .into_response()
    }

    pub fn internal_error(error: impl ToString) -> Response {
        Self::error_kind(
            StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
            "internal",
            error,
        )
        .into_response()
    }

    /// Map a service error onto its status code and kind
    pub fn from_error(err: &errors::Error) -> Response {
        Self::error_kind(err.status_code(), err.kind(), err).into_response()
    }
}

impl IntoResponse for HttpResponse {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use infra::errors::HttpError;

    use super::*;

    #[test]
    fn test_error_envelope() {
        let resp = HttpResponse::error_kind(409, "conflict", "already resolved");
        assert_eq!(resp.code, 409);
        assert_eq!(resp.kind.as_deref(), Some("conflict"));
    }

    #[test]
    fn test_from_error_status() {
        let err = errors::Error::from(HttpError::RateLimited("slow down".to_string()));
        let resp = HttpResponse::from_error(&err);
        assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);
    }
}
