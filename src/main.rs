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

use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cfg = config::get_config();

    // database, tables and indexes
    infra::init().await?;

    // instance keypair: db row, disk backup, or fresh
    pagewatch::service::identity::init().await?;

    // notifier, integration health and uptime checker loops
    pagewatch::job::init().await?;

    let app = pagewatch::handler::http::router::create_router();
    let addr = format!("{}:{}", cfg.http.addr, cfg.http.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    log::info!(
        "starting PageWatch instance {} on http://{addr}",
        cfg.common.instance_id
    );
    axum::serve(listener, app).await?;
    Ok(())
}
