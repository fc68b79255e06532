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

pub mod escalation_levels;
pub mod escalation_policies;
pub mod group_members;
pub mod groups;
pub mod incident_events;
pub mod incidents;
pub mod instance_identity;
pub mod integrations;
pub mod notification_tasks;
pub mod org_users;
pub mod organizations;
pub mod projects;
pub mod rotations;
pub mod schedulers;
pub mod service_integrations;
pub mod services;
pub mod shift_overrides;
pub mod shifts;
pub mod users;
