pub mod circuit_breaker;
pub mod inventory_api;
pub mod table_actions;

pub use inventory_api::{HttpInventoryApi, InventoryApi};
pub use table_actions::InventoryTable;
