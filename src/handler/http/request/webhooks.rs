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

use axum::{body::Bytes, extract::Path, response::Response};
use config::{meta::integrations::IntegrationType, utils::json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{common::meta::http::HttpResponse as MetaHttpResponse, service::incidents};

#[derive(Serialize, ToSchema)]
pub struct WebhookResponse {
    pub message: String,
    pub alerts_count: usize,
    pub integration_id: String,
    /// Microseconds since epoch
    pub timestamp: i64,
}

/// receiveWebhook
#[utoipa::path(
    post,
    path = "/webhook/{integration_type}/{integration_id}",
    tag = "Webhooks",
    operation_id = "ReceiveWebhook",
    params(
        ("integration_type" = String, Path, description = "Vendor type, e.g. prometheus"),
        ("integration_id" = String, Path, description = "Integration identifier"),
    ),
    request_body(content = String, description = "Vendor webhook payload, raw JSON", content_type = "application/json"),
    responses(
        (status = 200, description = "Accepted", content_type = "application/json", body = WebhookResponse),
        (status = 400, description = "Invalid JSON or type mismatch", content_type = "application/json", body = MetaHttpResponse),
        (status = 403, description = "Integration inactive", content_type = "application/json", body = MetaHttpResponse),
        (status = 404, description = "Integration missing", content_type = "application/json", body = MetaHttpResponse),
        (status = 429, description = "Rate limited", content_type = "application/json", body = MetaHttpResponse),
    ),
)]
#[tracing::instrument(skip_all, fields(integration_type = %integration_type, integration_id = %integration_id))]
pub async fn receive(
    Path((integration_type, integration_id)): Path<(String, String)>,
    body: Bytes,
) -> Response {
    let Ok(integration_type) = integration_type.parse::<IntegrationType>() else {
        return MetaHttpResponse::bad_request(format!(
            "unknown integration type {integration_type}"
        ));
    };
    let payload: json::Value = match json::from_slice(&body) {
        Ok(payload) => payload,
        Err(e) => return MetaHttpResponse::bad_request(format!("invalid JSON payload: {e}")),
    };

    match incidents::process_webhook(integration_type, &integration_id, payload).await {
        Ok(alerts_count) => MetaHttpResponse::json(WebhookResponse {
            message: "webhook processed".to_string(),
            alerts_count,
            integration_id,
            timestamp: config::utils::time::now_micros(),
        }),
        Err(e) => {
            log::warn!("[WEBHOOK] {integration_type}/{integration_id} rejected: {e}");
            MetaHttpResponse::from_error(&e)
        }
    }
}
