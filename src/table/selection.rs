//! Хранилище выделенных строк таблицы инвентаря.

use serde::Serialize;
use std::collections::BTreeSet;

use crate::models::{InventoryRow, RowId};

/// Производные флаги выделения. Никогда не хранятся, всегда пересчитываются.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionFlags {
    pub selected_count: usize,
    pub total_count: usize,
    pub selected_cloned_count: usize,
}

impl SelectionFlags {
    pub fn all_selected(&self) -> bool {
        self.selected_count == self.total_count && self.total_count > 0
    }

    pub fn are_all_selected_cloned(&self) -> bool {
        self.selected_cloned_count == self.selected_count && self.selected_count > 0
    }

    pub fn has_any_cloned_selected(&self) -> bool {
        self.selected_cloned_count > 0
    }

    /// В выделении одновременно есть и скопированные, и обычные строки.
    pub fn is_mixed(&self) -> bool {
        self.has_any_cloned_selected() && !self.are_all_selected_cloned()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionStore {
    ids: BTreeSet<RowId>,
}

impl SelectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn contains(&self, id: RowId) -> bool {
        self.ids.contains(&id)
    }

    pub fn ids(&self) -> Vec<RowId> {
        self.ids.iter().copied().collect()
    }

    pub fn contains_all(&self, ids: &[RowId]) -> bool {
        ids.iter().all(|id| self.ids.contains(id))
    }

    /// Выделяет все строки. Возвращает `false`, если делать нечего.
    pub fn select_all(&mut self, rows: &[InventoryRow]) -> bool {
        if rows.is_empty() || self.ids.len() == rows.len() {
            return false;
        }
        self.ids = rows.iter().map(|r| r.id).collect();
        true
    }

    pub fn deselect_all(&mut self) -> bool {
        if self.ids.is_empty() {
            return false;
        }
        self.ids.clear();
        true
    }

    /// Переключает одну строку. Идентификаторы, которых нет в таблице, игнорируются.
    pub fn toggle(&mut self, id: RowId, rows: &[InventoryRow]) -> bool {
        if self.ids.remove(&id) {
            return true;
        }
        if rows.iter().any(|r| r.id == id) {
            self.ids.insert(id);
            return true;
        }
        false
    }

    /// Убирает из выделения строки, которых больше нет в таблице.
    pub fn retain_present(&mut self, rows: &[InventoryRow]) -> bool {
        let before = self.ids.len();
        self.ids.retain(|id| rows.iter().any(|r| r.id == *id));
        before != self.ids.len()
    }

    pub fn flags(&self, rows: &[InventoryRow]) -> SelectionFlags {
        let selected_cloned_count = rows
            .iter()
            .filter(|r| r.is_cloned && self.ids.contains(&r.id))
            .count();

        SelectionFlags {
            selected_count: self.ids.len(),
            total_count: rows.len(),
            selected_cloned_count,
        }
    }

    /// Выделенные строки, которые являются копиями.
    pub fn cloned_ids(&self, rows: &[InventoryRow]) -> Vec<RowId> {
        rows.iter()
            .filter(|r| r.is_cloned && self.ids.contains(&r.id))
            .map(|r| r.id)
            .collect()
    }
}
