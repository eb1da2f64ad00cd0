pub mod inventory;

use axum::Router;
use std::sync::Arc;

use crate::services::InventoryApi;

pub fn routes<A: InventoryApi + 'static>() -> Router<Arc<crate::AppState<A>>> {
    Router::new().merge(inventory::routes())
}
