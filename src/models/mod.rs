pub mod listing;
pub mod query;

pub use listing::{FieldChanges, FieldValue, InventoryRow, ListingField, ListingStatus, RowId};
pub use query::{RowPage, RowQuery};
