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

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Role within an organization, strongest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Owner,
    Admin,
    Member,
    Viewer,
}

impl UserRole {
    /// Owner satisfies Admin, Admin satisfies Member, and so on
    pub fn satisfies(&self, required: UserRole) -> bool {
        *self <= required
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Self::Owner | Self::Admin)
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Owner => write!(f, "owner"),
            Self::Admin => write!(f, "admin"),
            Self::Member => write!(f, "member"),
            Self::Viewer => write!(f, "viewer"),
        }
    }
}

impl std::str::FromStr for UserRole {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "owner" => Ok(Self::Owner),
            "admin" => Ok(Self::Admin),
            "member" => Ok(Self::Member),
            "viewer" => Ok(Self::Viewer),
            _ => Err("invalid user role"),
        }
    }
}

/// Verified caller identity. Built by the HTTP auth layer; the core
/// never mints principals itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub user_id: String,
    pub org_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    pub role: UserRole,
}

impl Principal {
    pub fn tenant(&self) -> TenantFilter {
        TenantFilter::new(&self.org_id, self.project_id.as_deref())
    }
}

/// Tenant scope threaded through every repository read and write.
/// Constructing one without an org id is a programmer error, not a
/// request error, hence the panic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TenantFilter {
    pub org_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
}

impl TenantFilter {
    pub fn new(org_id: &str, project_id: Option<&str>) -> Self {
        assert!(!org_id.is_empty(), "tenant filter requires a non-empty org_id");
        Self {
            org_id: org_id.to_string(),
            project_id: project_id.map(|p| p.to_string()),
        }
    }

    pub fn org_only(org_id: &str) -> Self {
        Self::new(org_id, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_ordering() {
        assert!(UserRole::Owner.satisfies(UserRole::Admin));
        assert!(UserRole::Admin.satisfies(UserRole::Member));
        assert!(UserRole::Member.satisfies(UserRole::Member));
        assert!(!UserRole::Viewer.satisfies(UserRole::Member));
        assert!(!UserRole::Member.satisfies(UserRole::Admin));
    }

    #[test]
    fn test_is_admin() {
        assert!(UserRole::Owner.is_admin());
        assert!(UserRole::Admin.is_admin());
        assert!(!UserRole::Member.is_admin());
    }

    #[test]
    #[should_panic(expected = "non-empty org_id")]
    fn test_tenant_filter_requires_org() {
        let _ = TenantFilter::new("", None);
    }
}
