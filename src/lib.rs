pub mod config;
pub mod controllers;
pub mod error;
pub mod models;
pub mod services;
pub mod table;

use std::sync::Arc;

use config::TablePolicy;
use services::{HttpInventoryApi, InventoryApi, InventoryTable};

// Shared state для всего приложения
pub struct AppState<A = HttpInventoryApi> {
    pub inventory: InventoryTable<A>,
}

impl<A: InventoryApi + 'static> AppState<A> {
    pub fn new(api: Arc<A>, policy: TablePolicy) -> Arc<Self> {
        Arc::new(Self {
            inventory: InventoryTable::new(api, policy),
        })
    }
}
