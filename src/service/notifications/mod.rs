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

//! Notification sinks.
//!
//! Delivery is an async handoff of `(user_id, incident_id, event_kind)`.
//! Sink failures never fail the request that caused them; the notifier
//! job retries with exponential backoff.

use async_trait::async_trait;
use config::{get_config, utils::time};
use infra::errors::{self, HttpError};
use once_cell::sync::Lazy;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct Notification {
    pub org_id: String,
    pub user_id: String,
    pub incident_id: String,
    pub event_kind: String,
}

#[async_trait]
pub trait NotificationSink: Send + Sync {
    fn name(&self) -> &'static str;
    async fn deliver(&self, notification: &Notification) -> Result<(), errors::Error>;
}

/// Always-on sink that lands in the server log
struct LogSink;

#[async_trait]
impl NotificationSink for LogSink {
    fn name(&self) -> &'static str {
        "log"
    }

    async fn deliver(&self, n: &Notification) -> Result<(), errors::Error> {
        log::info!(
            "[NOTIFY] user={} incident={} event={}",
            n.user_id,
            n.incident_id,
            n.event_kind
        );
        Ok(())
    }
}

/// Slack chat.postMessage, enabled iff SLACK_BOT_TOKEN is set
struct SlackSink {
    client: reqwest::Client,
}

#[async_trait]
impl NotificationSink for SlackSink {
    fn name(&self) -> &'static str {
        "slack"
    }

    async fn deliver(&self, n: &Notification) -> Result<(), errors::Error> {
        let cfg = get_config();
        let text = format!(
            "Incident {} is now *{}* (assignee <@{}>)",
            n.incident_id, n.event_kind, n.user_id
        );
        let response = self
            .client
            .post("https://slack.com/api/chat.postMessage")
            .bearer_auth(&cfg.slack.bot_token)
            .json(&serde_json::json!({
                "channel": cfg.slack.channel,
                "text": text,
            }))
            .send()
            .await
            .map_err(|e| HttpError::UpstreamUnavailable(format!("slack: {e}")))?;
        if !response.status().is_success() {
            return Err(HttpError::UpstreamUnavailable(format!(
                "slack returned {}",
                response.status()
            ))
            .into());
        }
        Ok(())
    }
}

/// Cloud notification gateway (FCM/email fan-out happens there)
struct CloudSink {
    client: reqwest::Client,
}

#[async_trait]
impl NotificationSink for CloudSink {
    fn name(&self) -> &'static str {
        "cloud"
    }

    async fn deliver(&self, n: &Notification) -> Result<(), errors::Error> {
        let cfg = get_config();
        let url = format!("{}/api/notify", cfg.cloud.url);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&cfg.cloud.token)
            .json(n)
            .send()
            .await
            .map_err(|e| HttpError::UpstreamUnavailable(format!("cloud gateway: {e}")))?;
        if !response.status().is_success() {
            return Err(HttpError::UpstreamUnavailable(format!(
                "cloud gateway returned {}",
                response.status()
            ))
            .into());
        }
        Ok(())
    }
}

static SINKS: Lazy<Vec<Box<dyn NotificationSink>>> = Lazy::new(|| {
    let cfg = get_config();
    let mut sinks: Vec<Box<dyn NotificationSink>> = vec![Box::new(LogSink)];
    if !cfg.slack.bot_token.is_empty() {
        sinks.push(Box::new(SlackSink {
            client: reqwest::Client::new(),
        }));
    }
    if !cfg.cloud.url.is_empty() && !cfg.cloud.token.is_empty() {
        sinks.push(Box::new(CloudSink {
            client: reqwest::Client::new(),
        }));
    }
    sinks
});

/// Deliver through every enabled sink; the first failure aborts so the
/// task is retried as a whole
pub async fn deliver(notification: &Notification) -> Result<(), errors::Error> {
    for sink in SINKS.iter() {
        sink.deliver(notification).await.map_err(|e| {
            log::warn!("[NOTIFY] sink {} failed: {e}", sink.name());
            e
        })?;
    }
    Ok(())
}

/// Exponential backoff: base * 2^attempt, capped
pub fn backoff_micros(attempt: i32) -> i64 {
    let cfg = get_config();
    let base = cfg.limit.notify_retry_base_secs as i64;
    let cap = cfg.limit.notify_retry_cap_secs as i64;
    let exp = attempt.clamp(0, 30) as u32;
    let delay_secs = base.saturating_mul(1i64 << exp).min(cap);
    delay_secs * time::MICROS_PER_SEC
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_doubles_and_caps() {
        // defaults: base 1s, cap 60s
        assert_eq!(backoff_micros(0), time::MICROS_PER_SEC);
        assert_eq!(backoff_micros(1), 2 * time::MICROS_PER_SEC);
        assert_eq!(backoff_micros(2), 4 * time::MICROS_PER_SEC);
        assert_eq!(backoff_micros(5), 32 * time::MICROS_PER_SEC);
        assert_eq!(backoff_micros(6), 60 * time::MICROS_PER_SEC);
        assert_eq!(backoff_micros(30), 60 * time::MICROS_PER_SEC);
    }

    #[tokio::test]
    async fn test_log_sink_always_succeeds() {
        let n = Notification {
            org_id: "o".to_string(),
            user_id: "u".to_string(),
            incident_id: "i".to_string(),
            event_kind: "created".to_string(),
        };
        assert!(LogSink.deliver(&n).await.is_ok());
    }
}
