//! Модальное окно подтверждения удаления.
//!
//! `Idle -> Confirming -> Deleting -> Idle`; при ошибке `Deleting -> Confirming`,
//! при отмене `Confirming -> Idle`. Пока запрос удаления в полёте, отмена
//! не принимается.

use serde::Serialize;

use crate::models::RowId;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DeleteFlow {
    #[default]
    Idle,
    Confirming { targets: Vec<RowId> },
    Deleting { targets: Vec<RowId> },
}

/// Состояние модального окна для слоя отрисовки.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteModal {
    pub visible: bool,
    pub loading: bool,
    pub target_ids: Vec<RowId>,
}

impl DeleteFlow {
    pub fn is_idle(&self) -> bool {
        matches!(self, DeleteFlow::Idle)
    }

    pub fn visible(&self) -> bool {
        !self.is_idle()
    }

    pub fn loading(&self) -> bool {
        matches!(self, DeleteFlow::Deleting { .. })
    }

    pub fn targets(&self) -> &[RowId] {
        match self {
            DeleteFlow::Idle => &[],
            DeleteFlow::Confirming { targets } | DeleteFlow::Deleting { targets } => targets,
        }
    }

    /// Открывает подтверждение, запоминая снимок выделения.
    pub fn request(&mut self, selection: Vec<RowId>) -> bool {
        if !self.is_idle() || selection.is_empty() {
            return false;
        }
        *self = DeleteFlow::Confirming { targets: selection };
        true
    }

    /// Пользователь подтвердил удаление: возвращает id для вызова коллаборатора.
    pub fn confirm(&mut self) -> Option<Vec<RowId>> {
        match std::mem::take(self) {
            DeleteFlow::Confirming { targets } => {
                *self = DeleteFlow::Deleting {
                    targets: targets.clone(),
                };
                Some(targets)
            }
            other => {
                *self = other;
                None
            }
        }
    }

    pub fn succeeded(&mut self) -> bool {
        if !self.loading() {
            return false;
        }
        *self = DeleteFlow::Idle;
        true
    }

    /// Ошибка удаления: окно остаётся открытым, индикатор загрузки снимается.
    pub fn failed(&mut self) -> bool {
        match std::mem::take(self) {
            DeleteFlow::Deleting { targets } => {
                *self = DeleteFlow::Confirming { targets };
                true
            }
            other => {
                *self = other;
                false
            }
        }
    }

    pub fn cancel(&mut self) -> bool {
        if !matches!(self, DeleteFlow::Confirming { .. }) {
            return false;
        }
        *self = DeleteFlow::Idle;
        true
    }

    /// Сбрасывает неподтверждённый запрос, если его цели больше не выделены целиком.
    pub fn invalidate_unless(&mut self, still_selected: impl Fn(&[RowId]) -> bool) -> bool {
        if let DeleteFlow::Confirming { targets } = self {
            if !still_selected(targets) {
                *self = DeleteFlow::Idle;
                return true;
            }
        }
        false
    }

    pub fn modal(&self) -> DeleteModal {
        DeleteModal {
            visible: self.visible(),
            loading: self.loading(),
            target_ids: self.targets().to_vec(),
        }
    }
}
