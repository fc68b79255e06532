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

use thiserror::Error as ThisError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(ThisError, Debug)]
pub enum Error {
    #[error("IoError# {0}")]
    IoError(#[from] std::io::Error),
    #[error("DbError# {0}")]
    DbError(#[from] DbError),
    #[error("SerdeJsonError# {0}")]
    SerdeJsonError(#[from] serde_json::Error),
    #[error("{0}")]
    HttpError(#[from] HttpError),
    #[error("Error# {0}")]
    Message(String),
}

#[derive(ThisError, Debug)]
pub enum DbError {
    #[error("key {0} does not exist")]
    KeyNotExists(String),
    #[error("unique constraint violated on {0}")]
    UniqueViolation(String),
    #[error("SeaORMError# {0}")]
    SeaORMError(String),
}

/// Errors that cross the HTTP boundary. Each carries a stable
/// machine-readable kind plus a human message.
#[derive(ThisError, Debug)]
pub enum HttpError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Unauthenticated(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    RateLimited(String),
    #[error("{0}")]
    UpstreamUnavailable(String),
    #[error("{0}")]
    Internal(String),
}

impl HttpError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_error",
            Self::Unauthenticated(_) => "unauthenticated",
            Self::Forbidden(_) => "forbidden",
            Self::NotFound(_) => "not_found",
            Self::Conflict(_) => "conflict",
            Self::RateLimited(_) => "rate_limited",
            Self::UpstreamUnavailable(_) => "upstream_unavailable",
            Self::Internal(_) => "internal",
        }
    }

    pub fn status_code(&self) -> u16 {
        match self {
            Self::Validation(_) => 400,
            Self::Unauthenticated(_) => 401,
            Self::Forbidden(_) => 403,
            Self::NotFound(_) => 404,
            Self::Conflict(_) => 409,
            Self::RateLimited(_) => 429,
            Self::UpstreamUnavailable(_) => 503,
            Self::Internal(_) => 500,
        }
    }
}

impl Error {
    /// Status code the error maps to at the HTTP boundary
    pub fn status_code(&self) -> u16 {
        match self {
            Error::HttpError(e) => e.status_code(),
            Error::DbError(DbError::KeyNotExists(_)) => 404,
            Error::DbError(DbError::UniqueViolation(_)) => 409,
            _ => 500,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Error::HttpError(e) => e.kind(),
            Error::DbError(DbError::KeyNotExists(_)) => "not_found",
            Error::DbError(DbError::UniqueViolation(_)) => "conflict",
            _ => "internal",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::Message("boom".to_string());
        assert_eq!("Error# boom", &err.to_string());

        let err = Error::from(DbError::KeyNotExists("/incident/x".to_string()));
        assert_eq!("DbError# key /incident/x does not exist", &err.to_string());
    }

    #[test]
    fn test_http_error_mapping() {
        let cases = [
            (HttpError::Validation("v".into()), 400, "validation_error"),
            (HttpError::Unauthenticated("u".into()), 401, "unauthenticated"),
            (HttpError::Forbidden("f".into()), 403, "forbidden"),
            (HttpError::NotFound("n".into()), 404, "not_found"),
            (HttpError::Conflict("c".into()), 409, "conflict"),
            (HttpError::RateLimited("r".into()), 429, "rate_limited"),
            (
                HttpError::UpstreamUnavailable("up".into()),
                503,
                "upstream_unavailable",
            ),
            (HttpError::Internal("i".into()), 500, "internal"),
        ];
        for (err, status, kind) in cases {
            assert_eq!(err.status_code(), status);
            assert_eq!(err.kind(), kind);
        }
    }

    #[test]
    fn test_error_status_from_db() {
        let err = Error::from(DbError::UniqueViolation("incidents_fingerprint".into()));
        assert_eq!(err.status_code(), 409);
        assert_eq!(err.kind(), "conflict");
    }
}
