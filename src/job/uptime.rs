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

//! Simple HTTP uptime checker. Integrations may carry a check_url; a
//! down transition raises a normalized alert through the regular
//! pipeline and recovery resolves it again.

use std::collections::HashMap;

use config::{
    get_config,
    meta::alerts::{AlertSeverity, AlertStatus, NormalizedAlert},
    utils::time,
};
use infra::table::{self, entity::integrations};
use once_cell::sync::Lazy;
use tokio::time as tokio_time;

use crate::service::incidents;

static CHECK_CLIENT: Lazy<reqwest::Client> = Lazy::new(|| {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(10))
        .build()
        .expect("http client build failed")
});

pub async fn run() -> Result<(), anyhow::Error> {
    let cfg = get_config();
    let mut interval =
        tokio_time::interval(tokio_time::Duration::from_secs(cfg.limit.uptime_check_interval_secs));
    interval.tick().await;
    loop {
        interval.tick().await;
        if let Err(e) = check_once().await {
            log::error!("[UPTIME] check error: {e}");
        }
    }
}

async fn check_once() -> Result<(), anyhow::Error> {
    for integration in table::integrations::list_with_check_url().await? {
        let Some(check_url) = integration.check_url.clone() else {
            continue;
        };
        let up = match CHECK_CLIENT.get(&check_url).send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                log::warn!("[UPTIME] {} unreachable: {e}", check_url);
                false
            }
        };
        let alert = uptime_alert(&integration, &check_url, up);
        if let Err(e) = incidents::ingest_alert(&integration, alert).await {
            log::error!(
                "[UPTIME] alert ingest failed for integration {}: {e}",
                integration.id
            );
        }
    }
    Ok(())
}

/// Down fires, up resolves; the shared fingerprint makes recovery close
/// the incident the outage opened
fn uptime_alert(integration: &integrations::Model, check_url: &str, up: bool) -> NormalizedAlert {
    let status = if up {
        AlertStatus::Resolved
    } else {
        AlertStatus::Firing
    };
    let severity = if up {
        AlertSeverity::Info
    } else {
        AlertSeverity::High
    };
    NormalizedAlert {
        alert_name: format!("UptimeCheckFailed-{}", integration.name),
        severity,
        status,
        summary: format!("{check_url} is down"),
        description: format!("HTTP uptime check for integration {}", integration.name),
        labels: HashMap::from([
            ("alertname".to_string(), "UptimeCheckFailed".to_string()),
            ("check_url".to_string(), check_url.to_string()),
        ]),
        annotations: HashMap::new(),
        starts_at: time::now_micros(),
        ends_at: None,
        fingerprint: format!("uptime-{}", integration.id),
        priority: severity.priority(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn integration() -> integrations::Model {
        integrations::Model {
            id: "int1".to_string(),
            org_id: "org1".to_string(),
            project_id: None,
            name: "edge".to_string(),
            integration_type: "webhook".to_string(),
            is_active: true,
            health_status: "unknown".to_string(),
            last_heartbeat: None,
            webhook_url: String::new(),
            check_url: Some("https://edge.example.com/healthz".to_string()),
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn test_down_and_up_share_fingerprint() {
        let integration = integration();
        let down = uptime_alert(&integration, "https://edge.example.com/healthz", false);
        let up = uptime_alert(&integration, "https://edge.example.com/healthz", true);
        assert_eq!(down.status, AlertStatus::Firing);
        assert_eq!(down.severity, AlertSeverity::High);
        assert_eq!(up.status, AlertStatus::Resolved);
        assert_eq!(down.fingerprint, up.fingerprint);
    }
}
