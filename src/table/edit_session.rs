//! Сессия массового редактирования.
//!
//! Во время редактирования существует ровно один набор изменений. Каждое поле
//! хранится один раз, при сохранении значение записывается во все выделенные строки.

use serde::Serialize;

use super::gate::EditMode;
use crate::error::FieldError;
use crate::models::{FieldChanges, ListingField, RowId};

#[derive(Debug, Clone, Default, PartialEq)]
pub enum EditSession {
    #[default]
    Normal,
    Editing {
        pending: FieldChanges,
        bulk: bool,
    },
    Saving {
        pending: FieldChanges,
        bulk: bool,
        targets: Vec<RowId>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditSessionView {
    pub mode: EditMode,
    pub bulk: bool,
    pub pending_field_changes: FieldChanges,
}

impl EditSession {
    pub fn mode(&self) -> EditMode {
        match self {
            EditSession::Normal => EditMode::Normal,
            EditSession::Editing { .. } => EditMode::Editing,
            EditSession::Saving { .. } => EditMode::Saving,
        }
    }

    pub fn is_active(&self) -> bool {
        !matches!(self, EditSession::Normal)
    }

    pub fn pending(&self) -> Option<&FieldChanges> {
        match self {
            EditSession::Normal => None,
            EditSession::Editing { pending, .. } | EditSession::Saving { pending, .. } => {
                Some(pending)
            }
        }
    }

    pub fn open(&mut self, selected_count: usize) -> bool {
        if self.is_active() || selected_count == 0 {
            return false;
        }
        *self = EditSession::Editing {
            pending: FieldChanges::new(),
            bulk: selected_count > 1,
        };
        true
    }

    /// Записывает значение поля в общий набор изменений.
    pub fn set_field(&mut self, field: ListingField, raw: &str) -> Result<bool, FieldError> {
        let EditSession::Editing { pending, .. } = self else {
            return Ok(false);
        };
        let value = field.parse(raw)?;
        pending.insert(field, value);
        Ok(true)
    }

    /// Выделение изменилось во время редактирования: обновляем признак bulk.
    pub fn selection_resized(&mut self, selected_count: usize) {
        if let EditSession::Editing { bulk, .. } = self {
            *bulk = selected_count > 1;
        }
    }

    pub fn begin_save(&mut self, targets: Vec<RowId>) -> Option<(FieldChanges, Vec<RowId>)> {
        if targets.is_empty() {
            return None;
        }
        match std::mem::take(self) {
            EditSession::Editing { pending, bulk } => {
                *self = EditSession::Saving {
                    pending: pending.clone(),
                    bulk,
                    targets: targets.clone(),
                };
                Some((pending, targets))
            }
            other => {
                *self = other;
                None
            }
        }
    }

    /// Коммит прошёл: сессия закрывается, возвращаются применённые изменения и цели.
    pub fn save_succeeded(&mut self) -> Option<(FieldChanges, Vec<RowId>)> {
        match std::mem::take(self) {
            EditSession::Saving {
                pending, targets, ..
            } => Some((pending, targets)),
            other => {
                *self = other;
                None
            }
        }
    }

    pub fn save_failed(&mut self) -> bool {
        match std::mem::take(self) {
            EditSession::Saving { pending, bulk, .. } => {
                *self = EditSession::Editing { pending, bulk };
                true
            }
            other => {
                *self = other;
                false
            }
        }
    }

    /// Отмена (или пустое выделение): изменения отбрасываются, строки не трогаются.
    pub fn cancel(&mut self) -> bool {
        if !matches!(self, EditSession::Editing { .. }) {
            return false;
        }
        *self = EditSession::Normal;
        true
    }

    pub fn view(&self) -> EditSessionView {
        let bulk = match self {
            EditSession::Normal => false,
            EditSession::Editing { bulk, .. } | EditSession::Saving { bulk, .. } => *bulk,
        };
        EditSessionView {
            mode: self.mode(),
            bulk,
            pending_field_changes: self.pending().cloned().unwrap_or_default(),
        }
    }
}
