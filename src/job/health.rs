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

//! Marks integrations degraded or unhealthy when their heartbeat goes
//! stale.

use config::{get_config, utils::time};
use infra::table;
use tokio::time as tokio_time;

pub async fn run() -> Result<(), anyhow::Error> {
    let mut interval = tokio_time::interval(tokio_time::Duration::from_secs(60));
    interval.tick().await;
    loop {
        interval.tick().await;
        if let Err(e) = check_once().await {
            log::error!("[HEALTH] check error: {e}");
        }
    }
}

async fn check_once() -> Result<(), anyhow::Error> {
    let cfg = get_config();
    let now = time::now_micros();
    for integration in table::integrations::list_active().await? {
        // no heartbeat yet: leave it at unknown
        let Some(last_heartbeat) = integration.last_heartbeat else {
            continue;
        };
        let stale_secs = (now - last_heartbeat) / time::MICROS_PER_SEC;
        let status = if stale_secs >= cfg.limit.heartbeat_unhealthy_secs {
            "unhealthy"
        } else if stale_secs >= cfg.limit.heartbeat_degraded_secs {
            "degraded"
        } else {
            "healthy"
        };
        if status != integration.health_status {
            log::info!(
                "[HEALTH] integration {} {} -> {status} ({}s since heartbeat)",
                integration.id,
                integration.health_status,
                stale_secs
            );
            table::integrations::set_health(&integration.id, status).await?;
        }
    }
    Ok(())
}
