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

//! Drains pending notification tasks with exponential backoff.

use config::{get_config, utils::time};
use infra::table;
use tokio::time as tokio_time;

use crate::service::notifications::{self, Notification};

const DRAIN_BATCH: u64 = 50;

pub async fn run() -> Result<(), anyhow::Error> {
    let mut interval = tokio_time::interval(tokio_time::Duration::from_secs(2));
    interval.tick().await;
    loop {
        interval.tick().await;
        if let Err(e) = drain_once().await {
            log::error!("[NOTIFY] drain error: {e}");
        }
    }
}

async fn drain_once() -> Result<(), anyhow::Error> {
    let cfg = get_config();
    let now = time::now_micros();
    let due = table::notification_tasks::list_due(now, DRAIN_BATCH).await?;
    for task in due {
        let notification = Notification {
            org_id: task.org_id.clone(),
            user_id: task.user_id.clone(),
            incident_id: task.incident_id.clone(),
            event_kind: task.event_kind.clone(),
        };
        match notifications::deliver(&notification).await {
            Ok(()) => {
                table::notification_tasks::mark_sent(&task.id).await?;
            }
            Err(e) => {
                let attempts = task.attempts + 1;
                if attempts >= cfg.limit.notify_max_attempts {
                    log::error!(
                        "[NOTIFY] task {} exhausted {attempts} attempts: {e}",
                        task.id
                    );
                    table::notification_tasks::mark_failed(&task.id, &e.to_string()).await?;
                } else {
                    let next = time::now_micros() + notifications::backoff_micros(task.attempts);
                    table::notification_tasks::mark_retry(&task.id, attempts, next, &e.to_string())
                        .await?;
                }
            }
        }
    }
    Ok(())
}
