//! Table controller: единственный владелец строк, выделения, окна удаления и
//! сессии редактирования.
//!
//! Асинхронные действия разбиты на две фазы. `begin_*` проверяет гейт,
//! переводит состояние и выдаёт [`Ticket`] с целями; `finish_*` применяет
//! результат коллаборатора. Между фазами блокировка не удерживается, поэтому
//! билет несёт эпоху таблицы: результат, полученный после смены страницы или
//! фильтра, отбрасывается.

use serde::Serialize;
use tracing::{debug, error, info, warn};

use super::action_bar::ActionBar;
use super::delete_flow::{DeleteFlow, DeleteModal};
use super::edit_session::{EditSession, EditSessionView};
use super::gate::{ActionGate, EditMode, TableAction};
use super::notice::Notice;
use super::selection::{SelectionFlags, SelectionStore};
use crate::config::TablePolicy;
use crate::error::{ApiError, FieldError};
use crate::models::{FieldChanges, InventoryRow, ListingField, ListingStatus, RowId, RowPage, RowQuery};

/// Результат синхронного действия. Заблокированное действие - не ошибка, а no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Dispatch {
    Applied,
    Ignored,
}

impl From<bool> for Dispatch {
    fn from(applied: bool) -> Self {
        if applied {
            Dispatch::Applied
        } else {
            Dispatch::Ignored
        }
    }
}

/// Пропуск на вызов коллаборатора, выданный фазой `begin_*`.
#[derive(Debug, Clone, PartialEq)]
pub struct Ticket<T> {
    pub epoch: u64,
    pub action: TableAction,
    pub payload: T,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableView {
    pub query: RowQuery,
    pub rows: Vec<InventoryRow>,
    pub total_available: u64,
    pub selected_ids: Vec<RowId>,
    pub flags: SelectionFlags,
    pub gate: ActionGate,
    pub action_bar: ActionBar,
    pub delete_modal: DeleteModal,
    pub edit_session: EditSessionView,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub in_flight: Option<TableAction>,
    pub notices: Vec<Notice>,
}

#[derive(Debug)]
pub struct TableController {
    rows: Vec<InventoryRow>,
    query: RowQuery,
    total_available: u64,
    epoch: u64,
    selection: SelectionStore,
    delete: DeleteFlow,
    edit: EditSession,
    in_flight: Option<TableAction>,
    policy: TablePolicy,
    notices: Vec<Notice>,
}

impl TableController {
    pub fn new(policy: TablePolicy) -> Self {
        Self {
            rows: Vec::new(),
            query: RowQuery::first_page(policy.default_page_size),
            total_available: 0,
            epoch: 0,
            selection: SelectionStore::new(),
            delete: DeleteFlow::Idle,
            edit: EditSession::Normal,
            in_flight: None,
            policy,
            notices: Vec::new(),
        }
    }

    pub fn rows(&self) -> &[InventoryRow] {
        &self.rows
    }

    pub fn query(&self) -> &RowQuery {
        &self.query
    }

    pub fn policy(&self) -> &TablePolicy {
        &self.policy
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn selected_ids(&self) -> Vec<RowId> {
        self.selection.ids()
    }

    pub fn delete_flow(&self) -> &DeleteFlow {
        &self.delete
    }

    pub fn edit_session(&self) -> &EditSession {
        &self.edit
    }

    pub fn flags(&self) -> SelectionFlags {
        self.selection.flags(&self.rows)
    }

    pub fn gate(&self) -> ActionGate {
        ActionGate::compute(self.flags(), self.edit.mode(), self.policy.strict_mixed_edit)
    }

    /// Проверка гейта плюс взаимное исключение: пока открыто окно удаления или
    /// выполняется другое действие, новые действия над строками не запускаются.
    pub fn is_enabled(&self, action: TableAction) -> bool {
        if !self.gate().is_enabled(action) {
            return false;
        }
        match action {
            TableAction::SelectAll | TableAction::DeselectAll => true,
            TableAction::SaveEdit | TableAction::CancelEdit => self.in_flight.is_none(),
            TableAction::Clone
            | TableAction::Edit
            | TableAction::Delete
            | TableAction::PublishLive
            | TableAction::PublishCloned => self.delete.is_idle() && self.in_flight.is_none(),
        }
    }

    pub fn action_bar(&self) -> ActionBar {
        let flags = self.flags();
        let mut bar = ActionBar::build(flags, &self.gate(), self.edit.mode());
        for control in &mut bar.controls {
            control.enabled = control.enabled && self.is_enabled(control.action);
        }
        bar
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    /// Снимок состояния для слоя отрисовки. Уведомления при этом забираются.
    pub fn view(&mut self) -> TableView {
        TableView {
            query: self.query.clone(),
            rows: self.rows.clone(),
            total_available: self.total_available,
            selected_ids: self.selection.ids(),
            flags: self.flags(),
            gate: self.gate(),
            action_bar: self.action_bar(),
            delete_modal: self.delete.modal(),
            edit_session: self.edit.view(),
            in_flight: self.in_flight,
            notices: self.take_notices(),
        }
    }

    /* ---------- rows ---------- */

    /// Новая страница или фильтр: выделение и все незавершённые сессии сбрасываются.
    pub fn replace_rows(&mut self, query: RowQuery, page: RowPage) {
        self.epoch += 1;
        self.query = query;
        self.rows = page.rows;
        self.total_available = page.total_count;
        self.selection = SelectionStore::new();
        self.delete = DeleteFlow::Idle;
        self.edit = EditSession::Normal;
        self.in_flight = None;
        debug!(epoch = self.epoch, rows = self.rows.len(), "inventory rows replaced");
    }

    /// Перечитали ту же выборку: выделение сохраняется для строк, которые остались.
    pub fn refresh_rows(&mut self, page: RowPage) {
        self.rows = page.rows;
        self.total_available = page.total_count;
        if self.selection.retain_present(&self.rows) {
            self.after_selection_change();
        }
    }

    /* ---------- selection ---------- */

    pub fn select_all(&mut self) -> Dispatch {
        if !self.is_enabled(TableAction::SelectAll) {
            debug!("select all ignored");
            return Dispatch::Ignored;
        }
        let changed = self.selection.select_all(&self.rows);
        self.after_selection_change();
        changed.into()
    }

    pub fn deselect_all(&mut self) -> Dispatch {
        if !self.is_enabled(TableAction::DeselectAll) {
            debug!("deselect all ignored");
            return Dispatch::Ignored;
        }
        let changed = self.selection.deselect_all();
        self.after_selection_change();
        changed.into()
    }

    pub fn toggle(&mut self, id: RowId) -> Dispatch {
        if self.edit.mode() == EditMode::Saving {
            debug!(%id, "toggle ignored while saving");
            return Dispatch::Ignored;
        }
        let changed = self.selection.toggle(id, &self.rows);
        if changed {
            self.after_selection_change();
        }
        changed.into()
    }

    fn after_selection_change(&mut self) {
        let count = self.selection.len();
        if count == 0 && self.edit.cancel() {
            info!("edit session closed: selection became empty");
        }
        self.edit.selection_resized(count);

        let selection = &self.selection;
        if self.delete.invalidate_unless(|targets| selection.contains_all(targets)) {
            info!("delete confirmation dropped: targets no longer selected");
        }
    }

    /* ---------- clone / publish ---------- */

    pub fn begin_clone(&mut self) -> Option<Ticket<Vec<RowId>>> {
        let ids = self.selection.ids();
        self.begin_simple(TableAction::Clone, ids)
    }

    pub fn finish_clone(&mut self, ticket: Ticket<Vec<RowId>>, result: Result<(), &ApiError>) -> bool {
        self.finish_simple(ticket, result, |_, ids| format!("{} listing(s) cloned", ids.len()))
    }

    pub fn begin_publish_live(&mut self) -> Option<Ticket<Vec<RowId>>> {
        let ids = self.selection.ids();
        self.begin_simple(TableAction::PublishLive, ids)
    }

    pub fn finish_publish_live(
        &mut self,
        ticket: Ticket<Vec<RowId>>,
        result: Result<(), &ApiError>,
    ) -> bool {
        self.finish_simple(ticket, result, |rows, ids| {
            for row in rows.iter_mut().filter(|r| ids.contains(&r.id)) {
                row.status = ListingStatus::Published;
            }
            format!("{} listing(s) published", ids.len())
        })
    }

    /// Публикуются только скопированные строки из выделения.
    pub fn begin_publish_cloned(&mut self) -> Option<Ticket<Vec<RowId>>> {
        let ids = self.selection.cloned_ids(&self.rows);
        self.begin_simple(TableAction::PublishCloned, ids)
    }

    pub fn finish_publish_cloned(
        &mut self,
        ticket: Ticket<Vec<RowId>>,
        result: Result<(), &ApiError>,
    ) -> bool {
        self.finish_simple(ticket, result, |rows, ids| {
            for row in rows.iter_mut().filter(|r| ids.contains(&r.id)) {
                row.is_cloned = false;
                row.status = ListingStatus::Published;
            }
            format!("{} cloned listing(s) published", ids.len())
        })
    }

    fn begin_simple(&mut self, action: TableAction, ids: Vec<RowId>) -> Option<Ticket<Vec<RowId>>> {
        if !self.is_enabled(action) || ids.is_empty() {
            debug!(?action, "action ignored by gate");
            return None;
        }
        self.in_flight = Some(action);
        Some(Ticket {
            epoch: self.epoch,
            action,
            payload: ids,
        })
    }

    fn finish_simple(
        &mut self,
        ticket: Ticket<Vec<RowId>>,
        result: Result<(), &ApiError>,
        on_success: impl FnOnce(&mut Vec<InventoryRow>, &[RowId]) -> String,
    ) -> bool {
        if !self.accepts(&ticket) {
            return false;
        }
        self.in_flight = None;
        match result {
            Ok(()) => {
                let message = on_success(&mut self.rows, &ticket.payload);
                info!(action = ?ticket.action, rows = ticket.payload.len(), "{}", message);
                self.notices.push(Notice::success(message));
            }
            Err(e) => self.report_failure(ticket.action, e),
        }
        true
    }

    /* ---------- edit session ---------- */

    pub fn open_edit(&mut self) -> Dispatch {
        if !self.is_enabled(TableAction::Edit) {
            debug!("edit ignored by gate");
            return Dispatch::Ignored;
        }
        self.edit.open(self.selection.len()).into()
    }

    pub fn set_field(&mut self, field: ListingField, raw: &str) -> Result<Dispatch, FieldError> {
        self.edit.set_field(field, raw).map(Dispatch::from)
    }

    pub fn cancel_edit(&mut self) -> Dispatch {
        if !self.is_enabled(TableAction::CancelEdit) {
            return Dispatch::Ignored;
        }
        self.edit.cancel().into()
    }

    pub fn begin_save(&mut self) -> Option<Ticket<(FieldChanges, Vec<RowId>)>> {
        if !self.is_enabled(TableAction::SaveEdit) {
            debug!("save ignored by gate");
            return None;
        }
        let payload = self.edit.begin_save(self.selection.ids())?;
        Some(Ticket {
            epoch: self.epoch,
            action: TableAction::SaveEdit,
            payload,
        })
    }

    pub fn finish_save(
        &mut self,
        ticket: Ticket<(FieldChanges, Vec<RowId>)>,
        result: Result<(), &ApiError>,
    ) -> bool {
        if !self.accepts(&ticket) {
            return false;
        }
        match result {
            Ok(()) => {
                let Some((changes, targets)) = self.edit.save_succeeded() else {
                    return false;
                };
                for row in self.rows.iter_mut().filter(|r| targets.contains(&r.id)) {
                    row.apply_all(&changes);
                }
                if self.policy.clear_selection_after_save {
                    self.selection.deselect_all();
                }
                info!(rows = targets.len(), fields = changes.len(), "edit session committed");
                self.notices
                    .push(Notice::success(format!("{} listing(s) updated", targets.len())));
            }
            Err(e) => {
                self.edit.save_failed();
                self.report_failure(TableAction::SaveEdit, e);
            }
        }
        true
    }

    /* ---------- delete ---------- */

    pub fn request_delete(&mut self) -> Dispatch {
        if !self.is_enabled(TableAction::Delete) {
            debug!("delete ignored by gate");
            return Dispatch::Ignored;
        }
        self.delete.request(self.selection.ids()).into()
    }

    pub fn cancel_delete(&mut self) -> Dispatch {
        self.delete.cancel().into()
    }

    pub fn begin_delete(&mut self) -> Option<Ticket<Vec<RowId>>> {
        let targets = self.delete.confirm()?;
        Some(Ticket {
            epoch: self.epoch,
            action: TableAction::Delete,
            payload: targets,
        })
    }

    pub fn finish_delete(&mut self, ticket: Ticket<Vec<RowId>>, result: Result<(), &ApiError>) -> bool {
        if !self.accepts(&ticket) {
            return false;
        }
        match result {
            Ok(()) => {
                if !self.delete.succeeded() {
                    return false;
                }
                let deleted = &ticket.payload;
                self.rows.retain(|r| !deleted.contains(&r.id));
                self.total_available = self.total_available.saturating_sub(deleted.len() as u64);
                self.selection.deselect_all();
                self.after_selection_change();
                info!(rows = deleted.len(), "listings deleted");
                self.notices
                    .push(Notice::success(format!("{} listing(s) deleted", deleted.len())));
            }
            Err(e) => {
                self.delete.failed();
                self.report_failure(TableAction::Delete, e);
            }
        }
        true
    }

    /* ---------- helpers ---------- */

    fn accepts<T>(&self, ticket: &Ticket<T>) -> bool {
        if ticket.epoch != self.epoch {
            warn!(
                action = ?ticket.action,
                ticket_epoch = ticket.epoch,
                epoch = self.epoch,
                "discarding result for a replaced row list"
            );
            return false;
        }
        true
    }

    fn report_failure(&mut self, action: TableAction, e: &ApiError) {
        error!(?action, "inventory action failed: {}", e);
        let what = match action {
            TableAction::Clone => "clone listings",
            TableAction::SaveEdit => "save changes",
            TableAction::Delete => "delete listings",
            TableAction::PublishLive => "publish listings",
            TableAction::PublishCloned => "publish cloned listings",
            _ => "complete the action",
        };
        self.notices.push(Notice::error(format!("Could not {what}: {e}")));
    }

    /// Ошибка загрузки строк: состояние не меняется, пользователь видит уведомление.
    pub fn report_load_failure(&mut self, e: &ApiError) {
        error!("failed to load inventory rows: {}", e);
        self.notices.push(Notice::error(format!("Could not load listings: {e}")));
    }
}
