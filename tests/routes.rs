mod common;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use common::{listing, policy, ScriptedApi};
use seller_inventory::models::RowQuery;
use seller_inventory::{controllers, AppState};

async fn app(api: Arc<ScriptedApi>) -> Router {
    let state = AppState::new(api, policy());
    state.inventory.load(RowQuery::first_page(20)).await.unwrap();
    Router::new()
        .nest("/api", controllers::routes::<ScriptedApi>())
        .with_state(state)
}

async fn call(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(match body {
            Some(v) => Body::from(v.to_string()),
            None => Body::empty(),
        })
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

#[tokio::test]
async fn table_view_exposes_gate_and_action_bar() {
    let app = app(ScriptedApi::with_rows(vec![listing(1, false), listing(2, false)])).await;

    let (status, view) = call(&app, "GET", "/api/inventory/table", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["flags"]["totalCount"], 2);
    assert_eq!(view["gate"]["selectAllDisabled"], false);
    assert_eq!(view["gate"]["deselectDisabled"], true);

    let (_, view) = call(&app, "POST", "/api/inventory/selection/all", None).await;
    assert_eq!(view["selectedIds"], json!([1, 2]));
    assert_eq!(view["gate"]["editLabel"], "Bulk Edit");
}

#[tokio::test]
async fn bulk_edit_over_http() {
    let api = ScriptedApi::with_rows(vec![listing(1, false), listing(2, false), listing(3, false)]);
    let app = app(api.clone()).await;

    call(&app, "POST", "/api/inventory/selection/toggle", Some(json!({ "id": 1 }))).await;
    call(&app, "POST", "/api/inventory/selection/toggle", Some(json!({ "id": 3 }))).await;
    let (_, view) = call(&app, "POST", "/api/inventory/edit/open", None).await;
    assert_eq!(view["editSession"]["mode"], "editing");
    assert_eq!(view["editSession"]["bulk"], true);

    let (status, _) = call(
        &app,
        "POST",
        "/api/inventory/edit/field",
        Some(json!({ "field": "price", "value": "abc" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, view) = call(
        &app,
        "POST",
        "/api/inventory/edit/field",
        Some(json!({ "field": "price", "value": "50" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["editSession"]["pendingFieldChanges"]["price"], 50.0);

    let (status, view) = call(&app, "POST", "/api/inventory/edit/save", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["editSession"]["mode"], "normal");
    assert_eq!(view["rows"][0]["price"], 50.0);
    assert_eq!(view["rows"][1]["price"], 100.0);
    assert_eq!(view["rows"][2]["price"], 50.0);
    assert_eq!(view["notices"][0]["level"], "success");
}

#[tokio::test]
async fn failed_delete_returns_bad_gateway_with_notice() {
    let api = ScriptedApi::with_rows(vec![listing(1, false), listing(2, false)]);
    let app = app(api.clone()).await;
    api.fail("delete");

    call(&app, "POST", "/api/inventory/selection/all", None).await;
    let (_, view) = call(&app, "POST", "/api/inventory/delete/request", None).await;
    assert_eq!(view["deleteModal"]["visible"], true);
    assert_eq!(view["deleteModal"]["targetIds"], json!([1, 2]));

    let (status, view) = call(&app, "POST", "/api/inventory/delete/confirm", None).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(view["deleteModal"]["visible"], true);
    assert_eq!(view["deleteModal"]["loading"], false);
    assert_eq!(view["notices"][0]["level"], "error");

    let (_, view) = call(&app, "POST", "/api/inventory/delete/cancel", None).await;
    assert_eq!(view["deleteModal"]["visible"], false);
    assert_eq!(view["selectedIds"], json!([1, 2]));
}

#[tokio::test]
async fn invalid_page_query_is_rejected() {
    let app = app(ScriptedApi::with_rows(vec![listing(1, false)])).await;
    let (status, _) = call(
        &app,
        "POST",
        "/api/inventory/rows/load",
        Some(json!({ "page": 1, "pageSize": 500 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_field_is_rejected() {
    let app = app(ScriptedApi::with_rows(vec![listing(1, false)])).await;
    call(&app, "POST", "/api/inventory/selection/all", None).await;
    call(&app, "POST", "/api/inventory/edit/open", None).await;

    let (status, _) = call(
        &app,
        "POST",
        "/api/inventory/edit/field",
        Some(json!({ "field": "colour", "value": "red" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
