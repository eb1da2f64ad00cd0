use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

use crate::error::ApiError;
use crate::models::{ListingField, RowId, RowQuery};
use crate::services::InventoryApi;
use crate::table::TableView;
use crate::AppState;

pub fn routes<A: InventoryApi + 'static>() -> Router<Arc<AppState<A>>> {
    Router::new()
        .route("/inventory/table", get(get_table::<A>))
        .route("/inventory/rows/load", post(load_rows::<A>))
        .route("/inventory/rows/refresh", post(refresh_rows::<A>))
        .route("/inventory/selection/all", post(select_all::<A>))
        .route("/inventory/selection/none", post(deselect_all::<A>))
        .route("/inventory/selection/toggle", post(toggle_row::<A>))
        .route("/inventory/clone", post(clone_selected::<A>))
        .route("/inventory/publish", post(publish_live::<A>))
        .route("/inventory/publish-cloned", post(publish_cloned::<A>))
        .route("/inventory/edit/open", post(open_edit::<A>))
        .route("/inventory/edit/field", post(set_field::<A>))
        .route("/inventory/edit/save", post(save_edit::<A>))
        .route("/inventory/edit/cancel", post(cancel_edit::<A>))
        .route("/inventory/delete/request", post(request_delete::<A>))
        .route("/inventory/delete/confirm", post(confirm_delete::<A>))
        .route("/inventory/delete/cancel", post(cancel_delete::<A>))
}

/* ---------- helpers ---------- */

async fn table_response<A: InventoryApi + 'static>(state: &AppState<A>, status: StatusCode) -> Response {
    let view: TableView = state.inventory.view().await;
    (status, Json(view)).into_response()
}

// Ошибка коллаборатора уже залогирована и лежит в уведомлениях таблицы.
fn outcome_status<T>(result: &Result<T, ApiError>) -> StatusCode {
    match result {
        Ok(_) => StatusCode::OK,
        Err(_) => StatusCode::BAD_GATEWAY,
    }
}

/* ---------- TABLE ---------- */

// GET /api/inventory/table
async fn get_table<A: InventoryApi + 'static>(State(state): State<Arc<AppState<A>>>) -> Response {
    table_response(&state, StatusCode::OK).await
}

// POST /api/inventory/rows/load
async fn load_rows<A: InventoryApi + 'static>(
    State(state): State<Arc<AppState<A>>>,
    Json(query): Json<RowQuery>,
) -> Response {
    if let Err(e) = query.validate() {
        return (StatusCode::BAD_REQUEST, e.to_string()).into_response();
    }
    let status = outcome_status(&state.inventory.load(query).await);
    table_response(&state, status).await
}

// POST /api/inventory/rows/refresh
async fn refresh_rows<A: InventoryApi + 'static>(State(state): State<Arc<AppState<A>>>) -> Response {
    let status = outcome_status(&state.inventory.refresh().await);
    table_response(&state, status).await
}

/* ---------- SELECTION ---------- */

#[derive(Debug, Deserialize)]
struct ToggleRequest {
    id: RowId,
}

// POST /api/inventory/selection/all
async fn select_all<A: InventoryApi + 'static>(State(state): State<Arc<AppState<A>>>) -> Response {
    state.inventory.select_all().await;
    table_response(&state, StatusCode::OK).await
}

// POST /api/inventory/selection/none
async fn deselect_all<A: InventoryApi + 'static>(State(state): State<Arc<AppState<A>>>) -> Response {
    state.inventory.deselect_all().await;
    table_response(&state, StatusCode::OK).await
}

// POST /api/inventory/selection/toggle
async fn toggle_row<A: InventoryApi + 'static>(
    State(state): State<Arc<AppState<A>>>,
    Json(req): Json<ToggleRequest>,
) -> Response {
    state.inventory.toggle(req.id).await;
    table_response(&state, StatusCode::OK).await
}

/* ---------- CLONE / PUBLISH ---------- */

// POST /api/inventory/clone
async fn clone_selected<A: InventoryApi + 'static>(State(state): State<Arc<AppState<A>>>) -> Response {
    let status = outcome_status(&state.inventory.clone_selected().await);
    table_response(&state, status).await
}

// POST /api/inventory/publish
async fn publish_live<A: InventoryApi + 'static>(State(state): State<Arc<AppState<A>>>) -> Response {
    let status = outcome_status(&state.inventory.publish_live().await);
    table_response(&state, status).await
}

// POST /api/inventory/publish-cloned
async fn publish_cloned<A: InventoryApi + 'static>(State(state): State<Arc<AppState<A>>>) -> Response {
    let status = outcome_status(&state.inventory.publish_cloned().await);
    table_response(&state, status).await
}

/* ---------- EDIT SESSION ---------- */

#[derive(Debug, Deserialize)]
struct SetFieldRequest {
    field: String,
    value: String,
}

// POST /api/inventory/edit/open
async fn open_edit<A: InventoryApi + 'static>(State(state): State<Arc<AppState<A>>>) -> Response {
    state.inventory.open_edit().await;
    table_response(&state, StatusCode::OK).await
}

// POST /api/inventory/edit/field
async fn set_field<A: InventoryApi + 'static>(
    State(state): State<Arc<AppState<A>>>,
    Json(req): Json<SetFieldRequest>,
) -> Response {
    let field = match req.field.parse::<ListingField>() {
        Ok(field) => field,
        Err(e) => return (StatusCode::BAD_REQUEST, e.to_string()).into_response(),
    };
    match state.inventory.set_field(field, &req.value).await {
        Ok(_) => table_response(&state, StatusCode::OK).await,
        Err(e) => (StatusCode::BAD_REQUEST, e.to_string()).into_response(),
    }
}

// POST /api/inventory/edit/save
async fn save_edit<A: InventoryApi + 'static>(State(state): State<Arc<AppState<A>>>) -> Response {
    let status = outcome_status(&state.inventory.save_edit().await);
    table_response(&state, status).await
}

// POST /api/inventory/edit/cancel
async fn cancel_edit<A: InventoryApi + 'static>(State(state): State<Arc<AppState<A>>>) -> Response {
    state.inventory.cancel_edit().await;
    table_response(&state, StatusCode::OK).await
}

/* ---------- DELETE ---------- */

// POST /api/inventory/delete/request
async fn request_delete<A: InventoryApi + 'static>(State(state): State<Arc<AppState<A>>>) -> Response {
    state.inventory.request_delete().await;
    table_response(&state, StatusCode::OK).await
}

// POST /api/inventory/delete/confirm
async fn confirm_delete<A: InventoryApi + 'static>(State(state): State<Arc<AppState<A>>>) -> Response {
    let status = outcome_status(&state.inventory.confirm_delete().await);
    table_response(&state, status).await
}

// POST /api/inventory/delete/cancel
async fn cancel_delete<A: InventoryApi + 'static>(State(state): State<Arc<AppState<A>>>) -> Response {
    state.inventory.cancel_delete().await;
    table_response(&state, StatusCode::OK).await
}
