#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use seller_inventory::config::{CommitMode, TablePolicy};
use seller_inventory::error::ApiError;
use seller_inventory::models::{
    FieldChanges, InventoryRow, ListingStatus, RowId, RowPage, RowQuery,
};
use seller_inventory::services::InventoryApi;
use tokio::sync::Notify;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Fetch(u32),
    Clone(Vec<RowId>),
    Delete(Vec<RowId>),
    PublishLive(Vec<RowId>),
    PublishCloned(Vec<RowId>),
    SaveEdit(Vec<RowId>),
}

/// In-memory backend: behaves like the REST API and can be told to fail.
#[derive(Default)]
pub struct ScriptedApi {
    rows: Mutex<Vec<InventoryRow>>,
    calls: Mutex<Vec<Call>>,
    failing: Mutex<HashSet<&'static str>>,
    failing_rows: Mutex<HashSet<RowId>>,
    holds: Mutex<HashMap<&'static str, Arc<Notify>>>,
}

pub fn listing(id: i64, cloned: bool) -> InventoryRow {
    InventoryRow {
        id: RowId(id),
        quantity: 2,
        price: 100.0,
        category: "Floor".into(),
        section: "B".into(),
        row_label: id.to_string(),
        notes: String::new(),
        is_cloned: cloned,
        status: if cloned {
            ListingStatus::Clone
        } else {
            ListingStatus::Draft
        },
    }
}

pub fn policy() -> TablePolicy {
    TablePolicy {
        clear_selection_after_save: false,
        strict_mixed_edit: false,
        commit_mode: CommitMode::Batch,
        default_page_size: 20,
    }
}

impl ScriptedApi {
    pub fn with_rows(rows: Vec<InventoryRow>) -> Arc<Self> {
        Arc::new(Self {
            rows: Mutex::new(rows),
            ..Default::default()
        })
    }

    pub fn rows(&self) -> Vec<InventoryRow> {
        self.rows.lock().unwrap().clone()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn fail(&self, op: &'static str) {
        self.failing.lock().unwrap().insert(op);
    }

    pub fn recover(&self, op: &'static str) {
        self.failing.lock().unwrap().remove(op);
    }

    pub fn fail_row(&self, id: RowId) {
        self.failing_rows.lock().unwrap().insert(id);
    }

    /// Calls of `op` wait until [`ScriptedApi::release`] is called.
    pub fn hold(&self, op: &'static str) {
        self.holds.lock().unwrap().insert(op, Arc::new(Notify::new()));
    }

    /// Lets the held call of `op` through and stops holding new ones.
    pub fn release(&self, op: &'static str) {
        if let Some(notify) = self.holds.lock().unwrap().remove(op) {
            notify.notify_one();
        }
    }

    async fn wait_if_held(&self, op: &'static str) {
        let held = self.holds.lock().unwrap().get(op).cloned();
        if let Some(notify) = held {
            notify.notified().await;
        }
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn check(&self, op: &'static str) -> Result<(), ApiError> {
        if self.failing.lock().unwrap().contains(op) {
            return Err(ApiError::Rejected(format!("{op} failed")));
        }
        Ok(())
    }
}

impl InventoryApi for ScriptedApi {
    async fn fetch_rows(&self, query: &RowQuery) -> Result<RowPage, ApiError> {
        self.record(Call::Fetch(query.page));
        self.check("fetch")?;
        let rows = self.rows.lock().unwrap();
        let start = ((query.page - 1) * query.page_size) as usize;
        Ok(RowPage {
            rows: rows
                .iter()
                .skip(start)
                .take(query.page_size as usize)
                .cloned()
                .collect(),
            total_count: rows.len() as u64,
        })
    }

    async fn clone_rows(&self, ids: &[RowId]) -> Result<(), ApiError> {
        self.record(Call::Clone(ids.to_vec()));
        self.wait_if_held("clone").await;
        self.check("clone")?;
        let mut rows = self.rows.lock().unwrap();
        let mut next = rows.iter().map(|r| r.id.0).max().unwrap_or(0) + 1;
        let copies: Vec<InventoryRow> = rows
            .iter()
            .filter(|r| ids.contains(&r.id))
            .map(|r| {
                let copy = InventoryRow {
                    id: RowId(next),
                    is_cloned: true,
                    status: ListingStatus::Clone,
                    ..r.clone()
                };
                next += 1;
                copy
            })
            .collect();
        rows.extend(copies);
        Ok(())
    }

    async fn delete_rows(&self, ids: &[RowId]) -> Result<(), ApiError> {
        self.record(Call::Delete(ids.to_vec()));
        self.wait_if_held("delete").await;
        self.check("delete")?;
        self.rows.lock().unwrap().retain(|r| !ids.contains(&r.id));
        Ok(())
    }

    async fn publish_live(&self, ids: &[RowId]) -> Result<(), ApiError> {
        self.record(Call::PublishLive(ids.to_vec()));
        self.check("publish")?;
        for row in self.rows.lock().unwrap().iter_mut().filter(|r| ids.contains(&r.id)) {
            row.status = ListingStatus::Published;
        }
        Ok(())
    }

    async fn publish_cloned(&self, ids: &[RowId]) -> Result<(), ApiError> {
        self.record(Call::PublishCloned(ids.to_vec()));
        self.check("publish_cloned")?;
        for row in self.rows.lock().unwrap().iter_mut().filter(|r| ids.contains(&r.id)) {
            row.is_cloned = false;
            row.status = ListingStatus::Published;
        }
        Ok(())
    }

    async fn save_edit(&self, changes: &FieldChanges, ids: &[RowId]) -> Result<(), ApiError> {
        self.record(Call::SaveEdit(ids.to_vec()));
        self.wait_if_held("save").await;
        self.check("save")?;
        if ids.iter().any(|id| self.failing_rows.lock().unwrap().contains(id)) {
            return Err(ApiError::Rejected("row is locked".into()));
        }
        for row in self.rows.lock().unwrap().iter_mut().filter(|r| ids.contains(&r.id)) {
            row.apply_all(changes);
        }
        Ok(())
    }
}
