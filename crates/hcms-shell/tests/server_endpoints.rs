use std::sync::Arc;
use std::time::Duration;

use assert_json_diff::assert_json_include;
use axum::Router;
use hcms_federation::KnownRemote;
use hcms_shell::{AppConfig, AppState, DashboardSlotConfig, PortalShell, build_app, router};
use serde_json::{Value, json};
use tokio::task::JoinHandle;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn serve(app: Router) -> (String, tokio::sync::oneshot::Sender<()>, JoinHandle<()>) {
    // Bind to an ephemeral port
    let listener = tokio::net::TcpListener::bind((std::net::Ipv4Addr::LOCALHOST, 0))
        .await
        .expect("bind");
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = tokio::sync::oneshot::channel::<()>();

    let server = tokio::spawn(async move {
        let _ = axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = rx.await;
            })
            .await;
    });

    (format!("http://{addr}"), tx, server)
}

async fn mount_manifest(remotes: &MockServer, name: &str, body: Value) {
    Mock::given(method("GET"))
        .and(path(format!("/{name}/assets/manifest.json")))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(remotes)
        .await;
}

async fn mount_entry(remotes: &MockServer, name: &str, status: u16) {
    let mut response = ResponseTemplate::new(status);
    if status == 200 {
        response = response
            .insert_header("content-type", "application/javascript")
            .set_body_string(format!("var remote = '{name}';"));
    }
    Mock::given(method("GET"))
        .and(path(format!("/{name}/remoteEntry.js")))
        .respond_with(response)
        .mount(remotes)
        .await;
}

/// Three portal remotes: two publish manifests, demographics is down.
async fn portal_remotes() -> MockServer {
    let remotes = MockServer::start().await;
    mount_manifest(
        &remotes,
        "patient-records",
        json!({
            "remoteName": "patient-records",
            "exposedModule": "./Routes",
            "displayName": "Patient Records",
            "routePath": "patients",
            "version": "2.1.0"
        }),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/demographics/assets/manifest.json"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&remotes)
        .await;
    mount_manifest(
        &remotes,
        "appointment-scheduling",
        json!({ "displayName": "Appointment Scheduling" }),
    )
    .await;

    mount_entry(&remotes, "patient-records", 200).await;
    mount_entry(&remotes, "demographics", 404).await;
    mount_entry(&remotes, "appointment-scheduling", 200).await;
    remotes
}

fn portal_config(remotes: &MockServer) -> AppConfig {
    let base = |name: &str| format!("{}/{}", remotes.uri(), name);
    let mut cfg = AppConfig::default();
    cfg.registry.fetch_timeout_ms = 5_000;
    cfg.loader.timeout_ms = 5_000;
    cfg.registry.remotes = vec![
        KnownRemote::new("patient-records", base("patient-records")),
        KnownRemote::new("demographics", base("demographics")),
        KnownRemote::new("appointment-scheduling", base("appointment-scheduling")),
    ];
    cfg.dashboard.slots = vec![
        DashboardSlotConfig {
            slot: "patientRecordsContainer".into(),
            remote: "patient-records".into(),
            exposed_module: "./Module".into(),
            base_url: None,
        },
        DashboardSlotConfig {
            slot: "demographicsContainer".into(),
            remote: "demographics".into(),
            exposed_module: "./Module".into(),
            base_url: None,
        },
    ];
    cfg
}

#[tokio::test]
async fn portal_endpoints_work() {
    let remotes = portal_remotes().await;
    let app = build_app(&portal_config(&remotes)).await.expect("build app");
    let (base, shutdown_tx, handle) = serve(app).await;
    let client = reqwest::Client::new();

    // GET / renders the home view
    let resp = client.get(format!("{base}/")).send().await.unwrap();
    assert!(resp.status().is_success());
    assert!(resp.headers().contains_key("x-request-id"));
    let html = resp.text().await.unwrap();
    assert!(html.contains("<a href=\"/patients\">Patient Records</a>"));
    assert!(html.contains("<a href=\"/demographics\">Demographics</a>"));

    // GET /healthz and /readyz
    let body: Value = client
        .get(format!("{base}/healthz"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["status"], "ok");
    let resp = client.get(format!("{base}/readyz")).send().await.unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "ready");

    // GET /api/remotes keeps registration order and falls back for demographics
    let body: Value = client
        .get(format!("{base}/api/remotes"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_json_include!(
        actual: body,
        expected: json!([
            {
                "key": "patient-records",
                "routePath": "patients",
                "version": "2.1.0",
                "origin": "manifest",
                "entryUrl": format!("{}/patient-records/remoteEntry.js", remotes.uri())
            },
            {
                "key": "demographics",
                "displayName": "Demographics",
                "routePath": "demographics",
                "exposedModule": "./Routes",
                "origin": "fallback",
                "entryUrl": format!("{}/demographics/remoteEntry.js", remotes.uri())
            },
            {
                "key": "appointment-scheduling",
                "routePath": "appointments",
                "origin": "manifest"
            }
        ])
    );

    // GET /api/v2/remotes is keyed by registry key
    let body: Value = client
        .get(format!("{base}/api/v2/remotes"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["demographics"]["routePath"], "demographics");
    assert_eq!(body.as_object().unwrap().len(), 3);

    // GET /api/routes: home first, then one route per remote
    let body: Value = client
        .get(format!("{base}/api/routes"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let paths: Vec<_> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["path"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(paths, ["", "patients", "demographics", "appointments"]);
    assert_eq!(body[0]["target"]["type"], "home");
    assert_eq!(body[1]["target"]["key"], "patient-records");

    // Navigation: loaded remote, failed load, unknown path
    let resp = client
        .get(format!("{base}/patients/42"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let html = resp.text().await.unwrap();
    assert!(html.contains(&format!("{}/patient-records/remoteEntry.js", remotes.uri())));
    assert!(html.contains("data-export=\"routes\""));

    let resp = client
        .get(format!("{base}/demographics"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 502);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "load-failed");

    let resp = client.get(format!("{base}/billing")).send().await.unwrap();
    assert_eq!(resp.status(), 404);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "not-found");

    // Lookup and explicit load
    let resp = client
        .get(format!("{base}/api/remotes/billing"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);

    let resp = client
        .post(format!("{base}/api/remotes/billing/load"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);

    let resp = client
        .post(format!("{base}/api/remotes/appointment-scheduling/load"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_json_include!(
        actual: body,
        expected: json!({
            "exposedModule": "./Routes",
            "export": { "kind": "routes", "name": "routes" },
            "contentType": "application/javascript"
        })
    );

    // Shared dashboard mounts each slot independently
    let body: Value = client
        .get(format!("{base}/api/dashboard"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body[0]["slot"], "patientRecordsContainer");
    assert_eq!(body[0]["component"], "RemoteEntryComponent");
    assert!(body[0].get("error").is_none());
    assert_eq!(body[1]["slot"], "demographicsContainer");
    assert!(body[1]["error"].as_str().unwrap().contains("404"));

    let html = client
        .get(format!("{base}/dashboard"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(html.contains("id=\"patientRecordsContainer\""));
    assert!(html.contains("class=\"mount-failed\""));

    let _ = shutdown_tx.send(());
    let _ = handle.await;
}

#[tokio::test]
async fn registration_api_updates_routes() {
    let remotes = portal_remotes().await;
    mount_manifest(
        &remotes,
        "billing",
        json!({ "displayName": "Billing", "routePath": "invoices" }),
    )
    .await;
    let app = build_app(&portal_config(&remotes)).await.expect("build app");
    let (base, shutdown_tx, handle) = serve(app).await;
    let client = reqwest::Client::new();

    // PUT /api/remotes/{key} registers verbatim and rebuilds routes
    let resp = client
        .put(format!("{base}/api/remotes/lab-results"))
        .json(&json!({ "entryUrl": "http://localhost:4400/remoteEntry.js" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_json_include!(
        actual: body,
        expected: json!({
            "key": "lab-results",
            "displayName": "Lab Results",
            "routePath": "lab-results",
            "origin": "explicit"
        })
    );

    let resp = client
        .put(format!("{base}/api/remotes/broken"))
        .json(&json!({ "entryUrl": "not a url" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "invalid");

    // POST /api/remotes/register is fire-and-forget
    let resp = client
        .post(format!("{base}/api/remotes/register"))
        .json(&json!({ "name": "billing", "baseUrl": format!("{}/billing", remotes.uri()) }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 202);

    let resp = client
        .post(format!("{base}/api/remotes/register"))
        .json(&json!({ "name": "billing", "baseUrl": "ftp://billing" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    let mut paths = Vec::new();
    for _ in 0..50 {
        let body: Value = client
            .get(format!("{base}/api/routes"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        paths = body
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r["path"].as_str().unwrap().to_string())
            .collect();
        if paths.iter().any(|p| p == "invoices") {
            break;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    assert_eq!(
        paths,
        ["", "patients", "demographics", "appointments", "lab-results", "invoices"]
    );

    // Refresh re-runs initialization and keeps runtime registrations
    let resp = client
        .post(format!("{base}/api/registry/refresh"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["generation"], 2);
    assert_eq!(body["remotes"].as_array().unwrap().len(), 3);

    let body: Value = client
        .get(format!("{base}/api/remotes"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body.as_array().unwrap().len(), 5);

    let _ = shutdown_tx.send(());
    let _ = handle.await;
}

#[tokio::test]
async fn readyz_waits_for_routes() {
    let remotes = portal_remotes().await;
    let cfg = portal_config(&remotes);
    let shell = Arc::new(PortalShell::from_config(&cfg).expect("shell"));
    let (base, shutdown_tx, handle) = serve(router(AppState::new(Arc::clone(&shell), cfg))).await;
    let client = reqwest::Client::new();

    let resp = client.get(format!("{base}/readyz")).send().await.unwrap();
    assert_eq!(resp.status(), 503);

    shell.start().await;

    let resp = client.get(format!("{base}/readyz")).send().await.unwrap();
    assert_eq!(resp.status(), 200);

    let _ = shutdown_tx.send(());
    let _ = handle.await;
}

#[tokio::test]
async fn request_id_is_preserved() {
    let remotes = portal_remotes().await;
    let app = build_app(&portal_config(&remotes)).await.expect("build app");
    let (base, shutdown_tx, handle) = serve(app).await;

    let resp = reqwest::Client::new()
        .get(format!("{base}/healthz"))
        .header("x-request-id", "req-123")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.headers()["x-request-id"], "req-123");

    let _ = shutdown_tx.send(());
    let _ = handle.await;
}
