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

pub mod health;
pub mod notifier;
pub mod uptime;

/// Spawn the background loops
pub async fn init() -> Result<(), anyhow::Error> {
    tokio::task::spawn(async move {
        if let Err(e) = notifier::run().await {
            log::error!("[JOB] notifier loop exited: {e}");
        }
    });
    tokio::task::spawn(async move {
        if let Err(e) = health::run().await {
            log::error!("[JOB] integration health loop exited: {e}");
        }
    });
    tokio::task::spawn(async move {
        if let Err(e) = uptime::run().await {
            log::error!("[JOB] uptime checker loop exited: {e}");
        }
    });
    Ok(())
}
