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

use dotenv_config::EnvConfig;
use dotenvy::dotenv_override;
use once_cell::sync::Lazy;

static CONFIG: Lazy<Config> = Lazy::new(init);

pub fn get_config() -> &'static Config {
    &CONFIG
}

#[derive(EnvConfig)]
pub struct Config {
    pub common: Common,
    pub http: Http,
    pub auth: Auth,
    pub database: Database,
    pub limit: Limit,
    pub slack: Slack,
    pub cloud: Cloud,
}

#[derive(EnvConfig)]
pub struct Common {
    #[env_config(name = "INSTANCE_ID", default = "default")]
    pub instance_id: String,
    #[env_config(name = "PW_DATA_DIR", default = "./data/pagewatch/")]
    pub data_dir: String,
    /// Base URL used to build integration webhook URLs shown to users
    #[env_config(name = "PUBLIC_URL", default = "http://localhost:5080")]
    pub public_url: String,
}

#[derive(EnvConfig)]
pub struct Http {
    #[env_config(name = "PW_HTTP_PORT", default = 5080)]
    pub port: u16,
    #[env_config(name = "PW_HTTP_ADDR", default = "0.0.0.0")]
    pub addr: String,
}

#[derive(EnvConfig)]
pub struct Auth {
    /// Verification secret for Supabase-issued JWTs. The core never mints
    /// tokens; an empty secret disables signature verification (dev mode).
    #[env_config(name = "SUPABASE_JWT_SECRET", default = "")]
    pub supabase_jwt_secret: String,
    #[env_config(name = "PW_CONNECT_TOKEN_TTL_SECS", default = 300)]
    pub connect_token_ttl_secs: u64,
}

#[derive(EnvConfig)]
pub struct Database {
    /// Postgres/MySQL/SQLite connection string. Empty selects an SQLite
    /// file under the data dir.
    #[env_config(name = "DATABASE_URL", default = "")]
    pub url: String,
    #[env_config(name = "PW_SQL_MAX_CONNECTIONS", default = 10)]
    pub max_connections: u32,
}

#[derive(EnvConfig)]
pub struct Limit {
    /// Horizon in days for rotation expansion
    #[env_config(name = "PW_SHIFT_HORIZON_DAYS", default = 90)]
    pub shift_horizon_days: i64,
    /// Per-integration webhook rate limit, requests per second
    #[env_config(name = "PW_WEBHOOK_RATE_LIMIT", default = 100)]
    pub webhook_rate_limit: u32,
    #[env_config(name = "PW_WEBHOOK_RATE_BURST", default = 200)]
    pub webhook_rate_burst: u32,
    /// Deadline for one webhook request, seconds
    #[env_config(name = "PW_WEBHOOK_DEADLINE_SECS", default = 30)]
    pub webhook_deadline_secs: u64,
    #[env_config(name = "PW_NOTIFY_MAX_ATTEMPTS", default = 5)]
    pub notify_max_attempts: i32,
    #[env_config(name = "PW_NOTIFY_RETRY_BASE_SECS", default = 1)]
    pub notify_retry_base_secs: u64,
    #[env_config(name = "PW_NOTIFY_RETRY_CAP_SECS", default = 60)]
    pub notify_retry_cap_secs: u64,
    /// Integration heartbeat staleness thresholds, seconds
    #[env_config(name = "PW_HEARTBEAT_DEGRADED_SECS", default = 300)]
    pub heartbeat_degraded_secs: i64,
    #[env_config(name = "PW_HEARTBEAT_UNHEALTHY_SECS", default = 900)]
    pub heartbeat_unhealthy_secs: i64,
    /// Interval for the HTTP uptime checker, seconds
    #[env_config(name = "PW_UPTIME_CHECK_INTERVAL_SECS", default = 60)]
    pub uptime_check_interval_secs: u64,
}

#[derive(EnvConfig)]
pub struct Slack {
    /// Slack sink is disabled when the token is empty
    #[env_config(name = "SLACK_BOT_TOKEN", default = "")]
    pub bot_token: String,
    #[env_config(name = "PW_SLACK_CHANNEL", default = "#incidents")]
    pub channel: String,
}

#[derive(EnvConfig)]
pub struct Cloud {
    /// Optional notification gateway
    #[env_config(name = "CLOUD_URL", default = "")]
    pub url: String,
    #[env_config(name = "CLOUD_TOKEN", default = "")]
    pub token: String,
}

pub fn init() -> Config {
    dotenv_override().ok();
    let mut cfg = Config::init().expect("config load failed");
    if let Err(e) = check_config(&mut cfg) {
        panic!("config error: {e}");
    }
    cfg
}

fn check_config(cfg: &mut Config) -> Result<(), String> {
    if cfg.common.instance_id.is_empty() {
        cfg.common.instance_id = "default".to_string();
    }
    if !cfg.common.data_dir.ends_with('/') {
        cfg.common.data_dir = format!("{}/", cfg.common.data_dir);
    }
    if cfg.common.public_url.ends_with('/') {
        cfg.common.public_url = cfg.common.public_url.trim_end_matches('/').to_string();
    }
    if cfg.limit.shift_horizon_days <= 0 {
        cfg.limit.shift_horizon_days = 90;
    }
    if cfg.limit.webhook_rate_limit == 0 {
        cfg.limit.webhook_rate_limit = 100;
    }
    if cfg.limit.webhook_rate_burst < cfg.limit.webhook_rate_limit {
        cfg.limit.webhook_rate_burst = cfg.limit.webhook_rate_limit * 2;
    }
    if cfg.limit.notify_max_attempts <= 0 {
        cfg.limit.notify_max_attempts = 5;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let cfg = init();
        assert_eq!(cfg.common.instance_id, "default");
        assert!(cfg.common.data_dir.ends_with('/'));
        assert_eq!(cfg.limit.shift_horizon_days, 90);
        assert!(cfg.limit.webhook_rate_burst >= cfg.limit.webhook_rate_limit);
    }
}
