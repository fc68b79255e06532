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

//! End-to-end pipeline tests against a throwaway SQLite database.
//!
//! Everything runs inside one test function: the configuration and the
//! ORM client are process-wide singletons, so the environment has to be
//! fixed before anything touches them.

use config::meta::{
    auth::{Principal, TenantFilter, UserRole},
    incidents::IncidentStatus,
    integrations::IntegrationType,
    schedule::ShiftResolution,
};
use infra::{
    errors::{Error, HttpError},
    table,
};
use pagewatch::service::{identity, incidents, schedule};
use serde_json::json;

// 2025-01-06 00:00 UTC, a Monday
const MON_JAN6: i64 = 1736121600000000;
const HOUR: i64 = 3600 * 1_000_000;
const DAY: i64 = 24 * HOUR;
const WEEK: i64 = 7 * DAY;

fn prom_payload(status: &str) -> serde_json::Value {
    let mut alert = json!({
        "status": status,
        "labels": {
            "alertname": "HighCPU",
            "instance": "h1:9100",
            "job": "node",
            "severity": "critical"
        },
        "annotations": {"summary": "CPU above 95% for 10m"},
        "startsAt": "2025-01-02T03:04:05Z"
    });
    if status == "resolved" {
        alert["endsAt"] = json!("2025-01-02T03:04:07Z");
    }
    json!({ "alerts": [alert] })
}

#[tokio::test(flavor = "multi_thread")]
async fn end_to_end_pipeline() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("pagewatch-test.db");
    unsafe {
        std::env::set_var(
            "DATABASE_URL",
            format!("sqlite://{}?mode=rwc", db_path.display()),
        );
        std::env::set_var("PW_DATA_DIR", dir.path().display().to_string());
    }

    infra::init().await.unwrap();
    identity::init().await.unwrap();

    // ---- seed tenant 1 ----
    let org = table::organizations::add("Acme", "acme").await.unwrap();
    let tenant = TenantFilter::org_only(&org.id);

    let u1 = table::users::add("u1@acme.io", "User One", "member", None, None)
        .await
        .unwrap();
    let u2 = table::users::add("u2@acme.io", "User Two", "member", None, None)
        .await
        .unwrap();
    let u3 = table::users::add("u3@acme.io", "User Three", "member", None, None)
        .await
        .unwrap();
    let admin = table::users::add("admin@acme.io", "Admin", "admin", None, None)
        .await
        .unwrap();
    for (user, role) in [(&u1, "member"), (&u2, "member"), (&u3, "member"), (&admin, "admin")] {
        table::users::add_org_member(&org.id, &user.id, role)
            .await
            .unwrap();
    }

    let group = table::groups::add(&tenant, "core-oncall", "", "escalation")
        .await
        .unwrap();
    for (i, user) in [&u1, &u2, &u3].into_iter().enumerate() {
        table::groups::add_member(&group.id, &user.id, "member", i as i32, false, true, false)
            .await
            .unwrap();
    }

    let scheduler = table::schedulers::add(&org.id, &group.id, "primary", "Primary", "weekly")
        .await
        .unwrap();
    let rotation = table::schedulers::add_rotation(
        &scheduler.id,
        "weekly",
        "one_week",
        "monday",
        "00:00",
        MON_JAN6,
        None,
        &[u1.id.clone(), u2.id.clone()],
    )
    .await
    .unwrap();

    // end_at before start_at is rejected at persistence
    let invalid = table::schedulers::add_rotation(
        &scheduler.id,
        "broken",
        "one_week",
        "monday",
        "00:00",
        MON_JAN6,
        Some(MON_JAN6 - DAY),
        &[u1.id.clone()],
    )
    .await;
    assert!(matches!(
        invalid,
        Err(Error::HttpError(HttpError::Validation(_)))
    ));

    let policy = table::escalation::add_policy(&tenant, &group.id, "default", 3, 300, json!([]))
        .await
        .unwrap();
    table::escalation::add_level(
        &policy.id,
        1,
        "current_schedule",
        None,
        5,
        json!(["email"]),
        None,
    )
    .await
    .unwrap();

    let s1 = table::services::add(&tenant, &group.id, "api", "", "rk-api", Some(policy.id.clone()))
        .await
        .unwrap();
    let s2 = table::services::add(&tenant, &group.id, "batch", "", "rk-batch", None)
        .await
        .unwrap();

    let integration = table::integrations::add(&tenant, "prom-main", "prometheus", "", None)
        .await
        .unwrap();
    table::services::add_route(
        &integration.id,
        &s1.id,
        json!({"severity": ["critical", "high"], "alertname": ["*"]}),
        0,
    )
    .await
    .unwrap();
    table::services::add_route(&integration.id, &s2.id, json!({"severity": ["warning"]}), 1)
        .await
        .unwrap();

    // ---- scheduler: current on-call and overrides ----
    // Wed 2025-01-08 10:00 falls in u1's first shift
    let wed_10 = MON_JAN6 + 2 * DAY + 10 * HOUR;
    let resolution = schedule::current_on_call(&scheduler.id, wed_10)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(
        resolution,
        ShiftResolution::Scheduled {
            user_id: u1.id.clone()
        }
    );
    // second week belongs to u2
    let next_week = schedule::current_on_call(&scheduler.id, wed_10 + WEEK)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(next_week.effective_user(), u2.id);

    // override 08:00-12:00 to u3
    let admin_principal = Principal {
        user_id: admin.id.clone(),
        org_id: org.id.clone(),
        project_id: None,
        role: UserRole::Admin,
    };
    let shift = table::shifts::find_by_start(&rotation.id, MON_JAN6)
        .await
        .unwrap()
        .unwrap();
    let created_override = schedule::overrides::create(
        &admin_principal,
        &shift.id,
        &u3.id,
        Some(MON_JAN6 + 2 * DAY + 8 * HOUR),
        Some(MON_JAN6 + 2 * DAY + 12 * HOUR),
        "covering a doctor visit",
    )
    .await
    .unwrap();

    // containment is enforced
    let outside = schedule::overrides::create(
        &admin_principal,
        &shift.id,
        &u3.id,
        Some(MON_JAN6 - HOUR),
        Some(MON_JAN6 + HOUR),
        "bad",
    )
    .await;
    assert!(matches!(
        outside,
        Err(Error::HttpError(HttpError::Validation(_)))
    ));

    // inside the window the override wins, outside it the schedule holds
    let at_10 = schedule::current_on_call(&scheduler.id, wed_10)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(at_10.effective_user(), u3.id);
    assert!(at_10.is_overridden());
    let at_13 = schedule::current_on_call(&scheduler.id, MON_JAN6 + 2 * DAY + 13 * HOUR)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(at_13.effective_user(), u1.id);

    // envelope swap: effective user up front, scheduled user preserved
    let shifts = schedule::list_shifts(&scheduler.id, MON_JAN6, MON_JAN6 + WEEK)
        .await
        .unwrap();
    let enveloped = shifts.iter().find(|s| s.shift_id == shift.id).unwrap();
    assert!(enveloped.is_overridden);
    assert_eq!(enveloped.user_id, u3.id);
    assert_eq!(enveloped.original_user_id, u1.id);
    assert_eq!(enveloped.override_id.as_deref(), Some(created_override.id.as_str()));

    // deleting the override restores the scheduled user
    schedule::overrides::delete(&admin_principal, &created_override.id)
        .await
        .unwrap();
    let restored = schedule::current_on_call(&scheduler.id, wed_10)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(restored.effective_user(), u1.id);

    // expansion determinism straight through the persisted path
    let first = schedule::list_shifts(&scheduler.id, MON_JAN6, MON_JAN6 + 4 * WEEK)
        .await
        .unwrap();
    let second = schedule::list_shifts(&scheduler.id, MON_JAN6, MON_JAN6 + 4 * WEEK)
        .await
        .unwrap();
    let triples = |shifts: &[schedule::ShiftEnvelope]| {
        shifts
            .iter()
            .map(|s| (s.start_time, s.end_time, s.original_user_id.clone()))
            .collect::<Vec<_>>()
    };
    assert_eq!(triples(&first), triples(&second));

    // ---- firing path: routing, assignment, dedup ----
    let accepted = incidents::process_webhook(
        IntegrationType::Prometheus,
        &integration.id,
        prom_payload("firing"),
    )
    .await
    .unwrap();
    assert_eq!(accepted, 1);

    let open = table::incidents::find_open_by_fingerprint(&tenant, "HighCPU-h1:9100-node")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(open.severity, "critical");
    assert_eq!(open.urgency, "high");
    assert_eq!(open.priority, "P1");
    assert_eq!(open.alert_count, 1);
    assert_eq!(open.service_id.as_deref(), Some(s1.id.as_str()));
    assert_eq!(open.labels["fingerprint"], "HighCPU-h1:9100-node");
    // assignee came from the group's current schedule
    let expected_assignee = schedule::group_on_call(&group.id, config::utils::time::now_micros())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(
        open.assigned_to.as_deref(),
        Some(expected_assignee.effective_user())
    );
    assert!(open.assigned_at.is_some());

    // the atomic create left an audit event and a notification task
    let events = table::incident_events::list(&tenant, &open.id).await.unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].kind, "created");
    assert_eq!(events[0].actor, "system-prometheus");
    let due = table::notification_tasks::list_due(config::utils::time::now_micros(), 100)
        .await
        .unwrap();
    assert!(due.iter().any(|t| t.incident_id == open.id));

    // dedup: concurrent and sequential duplicates fold into one row
    let mut handles = Vec::new();
    for _ in 0..10 {
        let id = integration.id.clone();
        handles.push(tokio::spawn(async move {
            incidents::process_webhook(IntegrationType::Prometheus, &id, prom_payload("firing"))
                .await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }
    for _ in 0..10 {
        incidents::process_webhook(
            IntegrationType::Prometheus,
            &integration.id,
            prom_payload("firing"),
        )
        .await
        .unwrap();
    }
    let open_incidents = table::incidents::list_open(&tenant).await.unwrap();
    assert_eq!(open_incidents.len(), 1);
    assert_eq!(open_incidents[0].alert_count, 21);

    // ---- resolved path ----
    incidents::process_webhook(
        IntegrationType::Prometheus,
        &integration.id,
        prom_payload("resolved"),
    )
    .await
    .unwrap();
    let resolved = table::incidents::get(&tenant, &open.id).await.unwrap().unwrap();
    assert_eq!(resolved.status, "resolved");
    assert_eq!(resolved.resolved_by.as_deref(), Some("system-prometheus"));
    assert!(resolved.resolved_at.is_some());

    // resolved with no open incident is a no-op
    let before = table::incidents::list(&tenant, &Default::default()).await.unwrap().len();
    incidents::process_webhook(
        IntegrationType::Prometheus,
        &integration.id,
        prom_payload("resolved"),
    )
    .await
    .unwrap();
    let after = table::incidents::list(&tenant, &Default::default()).await.unwrap().len();
    assert_eq!(before, after);

    // illegal transition: resolving twice conflicts
    let conflict =
        table::incidents::transition(&tenant, &open.id, IncidentStatus::Resolved, "system-webhook")
            .await;
    match conflict {
        Err(e) => assert_eq!(e.status_code(), 409),
        Ok(_) => panic!("resolved -> resolved must conflict"),
    }

    // ---- tenant isolation ----
    let org2 = table::organizations::add("Globex", "globex").await.unwrap();
    let tenant2 = TenantFilter::org_only(&org2.id);
    let integration2 = table::integrations::add(&tenant2, "prom-globex", "prometheus", "", None)
        .await
        .unwrap();
    incidents::process_webhook(
        IntegrationType::Prometheus,
        &integration2.id,
        prom_payload("firing"),
    )
    .await
    .unwrap();

    let list1 = table::incidents::list(&tenant, &Default::default()).await.unwrap();
    let list2 = table::incidents::list(&tenant2, &Default::default()).await.unwrap();
    assert!(!list1.is_empty());
    assert_eq!(list2.len(), 1);
    for incident in &list1 {
        assert!(list2.iter().all(|other| other.id != incident.id));
    }
    // cross-org read fails closed
    assert!(
        table::incidents::get(&tenant, &list2[0].id)
            .await
            .unwrap()
            .is_none()
    );

    // ---- webhook contract errors ----
    let missing = incidents::process_webhook(
        IntegrationType::Prometheus,
        "does-not-exist",
        prom_payload("firing"),
    )
    .await;
    assert_eq!(missing.unwrap_err().status_code(), 404);

    let mismatched = incidents::process_webhook(
        IntegrationType::Datadog,
        &integration.id,
        prom_payload("firing"),
    )
    .await;
    assert_eq!(mismatched.unwrap_err().status_code(), 400);

    // ---- mobile pairing ----
    let grant = identity::connect::generate(&u1.id).await.unwrap();
    assert_eq!(grant.signature.len(), 128);
    let canonical = config::utils::json::canonical_string(&grant.payload);
    assert!(identity::verify(canonical.as_bytes(), &grant.signature).unwrap());

    let token = grant.payload["connect_token"].as_str().unwrap();
    let session = identity::connect::verify(token, &u1.id).await.unwrap();
    assert_eq!(session.user_id, u1.id);
    // single use
    assert!(identity::connect::verify(token, &u1.id).await.is_err());

    // identity.key landed on disk with owner-only permissions
    let key_path = dir.path().join("identity.key");
    assert!(key_path.exists());
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = std::fs::metadata(&key_path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
