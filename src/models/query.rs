use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{InventoryRow, ListingStatus};

/// Параметры выборки страницы инвентаря.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct RowQuery {
    #[validate(range(min = 1))]
    pub page: u32,
    #[serde(rename = "pageSize")]
    #[validate(range(min = 1, max = 100))]
    pub page_size: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 200))]
    pub search: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ListingStatus>,
}

impl RowQuery {
    pub fn first_page(page_size: u32) -> Self {
        Self {
            page: 1,
            page_size,
            search: None,
            status: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowPage {
    pub rows: Vec<InventoryRow>,
    #[serde(rename = "totalCount")]
    pub total_count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_size_is_bounded() {
        let mut q = RowQuery::first_page(20);
        assert!(q.validate().is_ok());

        q.page_size = 0;
        assert!(q.validate().is_err());

        q.page_size = 101;
        assert!(q.validate().is_err());
    }

    #[test]
    fn page_starts_at_one() {
        let q = RowQuery {
            page: 0,
            ..RowQuery::first_page(20)
        };
        assert!(q.validate().is_err());
    }
}
