//! Асинхронный слой над [`TableController`].
//!
//! Каждое действие с коллаборатором выполняется в две фазы: под блокировкой
//! выдаётся билет, блокировка отпускается на время запроса, затем результат
//! применяется под блокировкой снова. Пока запрос в полёте, остальные
//! операции (чтение состояния, выделение) не ждут его завершения.
//! Все три фазы идут в одной задаче `tokio::spawn`, поэтому обрыв запроса
//! клиента не оставляет таблицу в промежуточном состоянии.

use futures::future::join_all;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

use super::inventory_api::InventoryApi;
use crate::config::{CommitMode, TablePolicy};
use crate::error::{ApiError, FieldError};
use crate::models::{FieldChanges, ListingField, RowId, RowQuery};
use crate::table::{Dispatch, TableController, TableView};

pub struct InventoryTable<A> {
    api: Arc<A>,
    table: Arc<Mutex<TableController>>,
}

impl<A> Clone for InventoryTable<A> {
    fn clone(&self) -> Self {
        Self {
            api: self.api.clone(),
            table: self.table.clone(),
        }
    }
}

impl<A: InventoryApi + 'static> InventoryTable<A> {
    pub fn new(api: Arc<A>, policy: TablePolicy) -> Self {
        Self {
            api,
            table: Arc::new(Mutex::new(TableController::new(policy))),
        }
    }

    pub fn api(&self) -> &Arc<A> {
        &self.api
    }

    pub fn controller(&self) -> &Arc<Mutex<TableController>> {
        &self.table
    }

    pub async fn view(&self) -> TableView {
        self.table.lock().await.view()
    }

    /// Действие с коллаборатором целиком (begin, запрос, finish) выполняется
    /// отдельной задачей. Если вызывающий future отброшен (клиент отключился),
    /// задача всё равно доходит до finish и таблица не зависает в загрузке.
    async fn detached<T, F, Fut>(&self, action: F) -> Result<T, ApiError>
    where
        F: FnOnce(Self) -> Fut,
        Fut: Future<Output = Result<T, ApiError>> + Send + 'static,
        T: Send + 'static,
    {
        tokio::spawn(action(self.clone())).await?
    }

    /* ---------- rows ---------- */

    /// Загружает страницу по новому запросу. Выделение при этом сбрасывается.
    pub async fn load(&self, query: RowQuery) -> Result<(), ApiError> {
        match self.api.fetch_rows(&query).await {
            Ok(page) => {
                self.table.lock().await.replace_rows(query, page);
                Ok(())
            }
            Err(e) => {
                self.table.lock().await.report_load_failure(&e);
                Err(e)
            }
        }
    }

    /// Перечитывает текущую страницу, сохраняя выделение уцелевших строк.
    pub async fn refresh(&self) -> Result<(), ApiError> {
        let (query, epoch) = {
            let table = self.table.lock().await;
            (table.query().clone(), table.epoch())
        };

        let result = self.api.fetch_rows(&query).await;

        let mut table = self.table.lock().await;
        match result {
            Ok(page) if table.epoch() == epoch => {
                table.refresh_rows(page);
                Ok(())
            }
            Ok(_) => {
                warn!("refresh skipped: row list was replaced meanwhile");
                Ok(())
            }
            Err(e) => {
                table.report_load_failure(&e);
                Err(e)
            }
        }
    }

    // Ошибка обновления уже залогирована и показана пользователю.
    async fn refresh_after_action(&self) {
        let _ = self.refresh().await;
    }

    /* ---------- selection ---------- */

    pub async fn select_all(&self) -> Dispatch {
        self.table.lock().await.select_all()
    }

    pub async fn deselect_all(&self) -> Dispatch {
        self.table.lock().await.deselect_all()
    }

    pub async fn toggle(&self, id: RowId) -> Dispatch {
        self.table.lock().await.toggle(id)
    }

    /* ---------- clone / publish ---------- */

    pub async fn clone_selected(&self) -> Result<Dispatch, ApiError> {
        self.detached(|table| async move { table.run_clone().await }).await
    }

    pub async fn publish_live(&self) -> Result<Dispatch, ApiError> {
        self.detached(|table| async move { table.run_publish_live().await }).await
    }

    pub async fn publish_cloned(&self) -> Result<Dispatch, ApiError> {
        self.detached(|table| async move { table.run_publish_cloned().await }).await
    }

    async fn run_clone(&self) -> Result<Dispatch, ApiError> {
        let Some(ticket) = self.table.lock().await.begin_clone() else {
            return Ok(Dispatch::Ignored);
        };
        let result = self.api.clone_rows(&ticket.payload).await;
        let applied = self.table.lock().await.finish_clone(ticket, result.as_ref().map(|_| ()));
        self.after_action(applied, result).await
    }

    async fn run_publish_live(&self) -> Result<Dispatch, ApiError> {
        let Some(ticket) = self.table.lock().await.begin_publish_live() else {
            return Ok(Dispatch::Ignored);
        };
        let result = self.api.publish_live(&ticket.payload).await;
        let applied = self
            .table
            .lock()
            .await
            .finish_publish_live(ticket, result.as_ref().map(|_| ()));
        self.after_action(applied, result).await
    }

    async fn run_publish_cloned(&self) -> Result<Dispatch, ApiError> {
        let Some(ticket) = self.table.lock().await.begin_publish_cloned() else {
            return Ok(Dispatch::Ignored);
        };
        let result = self.api.publish_cloned(&ticket.payload).await;
        let applied = self
            .table
            .lock()
            .await
            .finish_publish_cloned(ticket, result.as_ref().map(|_| ()));
        self.after_action(applied, result).await
    }

    async fn after_action(&self, applied: bool, result: Result<(), ApiError>) -> Result<Dispatch, ApiError> {
        result?;
        if !applied {
            return Ok(Dispatch::Ignored);
        }
        self.refresh_after_action().await;
        Ok(Dispatch::Applied)
    }

    /* ---------- edit session ---------- */

    pub async fn open_edit(&self) -> Dispatch {
        self.table.lock().await.open_edit()
    }

    pub async fn set_field(&self, field: ListingField, raw: &str) -> Result<Dispatch, FieldError> {
        self.table.lock().await.set_field(field, raw)
    }

    pub async fn cancel_edit(&self) -> Dispatch {
        self.table.lock().await.cancel_edit()
    }

    pub async fn save_edit(&self) -> Result<Dispatch, ApiError> {
        self.detached(|table| async move { table.run_save().await }).await
    }

    async fn run_save(&self) -> Result<Dispatch, ApiError> {
        let (ticket, mode) = {
            let mut table = self.table.lock().await;
            let Some(ticket) = table.begin_save() else {
                return Ok(Dispatch::Ignored);
            };
            (ticket, table.policy().commit_mode)
        };

        let (changes, ids) = &ticket.payload;
        let (result, partially_committed) = match mode {
            CommitMode::Batch => (self.api.save_edit(changes, ids).await, false),
            CommitMode::PerRow => self.save_per_row(changes, ids).await,
        };

        let applied = self.table.lock().await.finish_save(ticket, result.as_ref().map(|_| ()));
        if partially_committed {
            // Часть строк уже сохранена на сервере - показываем актуальные данные.
            self.refresh_after_action().await;
        }
        result?;
        Ok(Dispatch::from(applied))
    }

    /// Один запрос на строку; все запросы несут один и тот же набор изменений.
    async fn save_per_row(&self, changes: &FieldChanges, ids: &[RowId]) -> (Result<(), ApiError>, bool) {
        let results = join_all(
            ids.iter()
                .map(|id| self.api.save_edit(changes, std::slice::from_ref(id))),
        )
        .await;

        let total = results.len();
        let mut first_error = None;
        let mut failed = 0usize;
        for result in results {
            if let Err(e) = result {
                failed += 1;
                first_error.get_or_insert(e);
            }
        }

        match first_error {
            None => (Ok(()), false),
            Some(e) => {
                info!(failed, total, "per-row commit finished with failures");
                (Err(e), failed < total)
            }
        }
    }

    /* ---------- delete ---------- */

    pub async fn request_delete(&self) -> Dispatch {
        self.table.lock().await.request_delete()
    }

    pub async fn cancel_delete(&self) -> Dispatch {
        self.table.lock().await.cancel_delete()
    }

    pub async fn confirm_delete(&self) -> Result<Dispatch, ApiError> {
        self.detached(|table| async move { table.run_delete().await }).await
    }

    async fn run_delete(&self) -> Result<Dispatch, ApiError> {
        let Some(ticket) = self.table.lock().await.begin_delete() else {
            return Ok(Dispatch::Ignored);
        };
        let result = self.api.delete_rows(&ticket.payload).await;
        let applied = self.table.lock().await.finish_delete(ticket, result.as_ref().map(|_| ()));
        self.after_action(applied, result).await
    }
}
