//! Гейт действий: какие массовые действия доступны для текущего выделения.
//!
//! Чистое вычисление без состояния и ошибок. Отключённое действие вызывающая
//! сторона обязана считать no-op.

use serde::{Deserialize, Serialize};

use super::selection::SelectionFlags;

pub const CANCEL_CLONE_TOOLTIP: &str =
    "Cloned listings cannot be cloned again. Publish or delete them instead";
pub const PUBLISH_CLONED_TOOLTIP: &str = "Publish the selected cloned listings as live listings";
pub const CANCEL_EDIT_TOOLTIP: &str = "Discard all changes made in this edit session";
pub const MIXED_EDIT_WARNING: &str =
    "Cloned listings cannot be edited together with regular listings";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableAction {
    SelectAll,
    DeselectAll,
    Clone,
    Edit,
    SaveEdit,
    CancelEdit,
    Delete,
    PublishLive,
    PublishCloned,
}

/// Режим таблицы с точки зрения сессии редактирования.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EditMode {
    #[default]
    Normal,
    Editing,
    Saving,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionGate {
    pub select_all_disabled: bool,
    pub deselect_disabled: bool,
    pub clone_disabled: bool,
    pub edit_disabled: bool,
    pub save_edit_disabled: bool,
    pub cancel_edit_disabled: bool,
    pub delete_disabled: bool,
    pub publish_disabled: bool,
    pub publish_hidden: bool,
    pub publish_cloned_disabled: bool,
    pub edit_label: &'static str,
    pub edit_warning: Option<&'static str>,
    pub cancel_clone_tooltip: &'static str,
    pub cancel_edit_tooltip: &'static str,
    pub publish_cloned_tooltip: &'static str,
}

impl ActionGate {
    /// `strict_mixed_edit` запрещает редактировать смесь копий и обычных строк,
    /// а не только предупреждает.
    pub fn compute(flags: SelectionFlags, mode: EditMode, strict_mixed_edit: bool) -> Self {
        let selected = flags.selected_count;
        let total = flags.total_count;
        let none_selected = selected == 0;
        let mixed = flags.is_mixed();
        let editing = mode != EditMode::Normal;
        let saving = mode == EditMode::Saving;

        Self {
            select_all_disabled: total == 0 || selected == total || saving,
            deselect_disabled: none_selected || saving,
            clone_disabled: none_selected || flags.are_all_selected_cloned() || editing,
            edit_disabled: none_selected || (strict_mixed_edit && mixed) || editing,
            save_edit_disabled: mode != EditMode::Editing,
            cancel_edit_disabled: mode != EditMode::Editing,
            delete_disabled: none_selected || editing,
            publish_disabled: none_selected || editing,
            publish_hidden: flags.has_any_cloned_selected(),
            publish_cloned_disabled: flags.selected_cloned_count == 0 || editing,
            edit_label: if selected > 1 { "Bulk Edit" } else { "Edit" },
            edit_warning: mixed.then_some(MIXED_EDIT_WARNING),
            cancel_clone_tooltip: CANCEL_CLONE_TOOLTIP,
            cancel_edit_tooltip: CANCEL_EDIT_TOOLTIP,
            publish_cloned_tooltip: PUBLISH_CLONED_TOOLTIP,
        }
    }

    pub fn is_enabled(&self, action: TableAction) -> bool {
        match action {
            TableAction::SelectAll => !self.select_all_disabled,
            TableAction::DeselectAll => !self.deselect_disabled,
            TableAction::Clone => !self.clone_disabled,
            TableAction::Edit => !self.edit_disabled,
            TableAction::SaveEdit => !self.save_edit_disabled,
            TableAction::CancelEdit => !self.cancel_edit_disabled,
            TableAction::Delete => !self.delete_disabled,
            TableAction::PublishLive => !self.publish_disabled && !self.publish_hidden,
            TableAction::PublishCloned => !self.publish_cloned_disabled,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn flags(selected: usize, total: usize, cloned: usize) -> SelectionFlags {
        SelectionFlags {
            selected_count: selected,
            total_count: total,
            selected_cloned_count: cloned,
        }
    }

    #[test]
    fn empty_table_disables_everything() {
        let gate = ActionGate::compute(flags(0, 0, 0), EditMode::Normal, false);
        assert!(gate.select_all_disabled);
        assert!(gate.deselect_disabled);
        assert!(gate.clone_disabled);
        assert!(gate.edit_disabled);
        assert!(gate.delete_disabled);
        assert!(gate.publish_disabled);
        assert!(gate.publish_cloned_disabled);
    }

    #[test]
    fn all_cloned_selection_cannot_be_cloned_again() {
        let gate = ActionGate::compute(flags(2, 5, 2), EditMode::Normal, false);
        assert!(gate.clone_disabled);
        assert!(gate.publish_hidden);
        assert!(!gate.publish_cloned_disabled);
        assert!(!gate.is_enabled(TableAction::PublishLive));
    }

    #[test]
    fn mixed_selection_warns_and_strict_mode_blocks_edit() {
        let lenient = ActionGate::compute(flags(3, 5, 1), EditMode::Normal, false);
        assert!(!lenient.edit_disabled);
        assert_eq!(lenient.edit_warning, Some(MIXED_EDIT_WARNING));

        let strict = ActionGate::compute(flags(3, 5, 1), EditMode::Normal, true);
        assert!(strict.edit_disabled);
        assert_eq!(strict.edit_warning, Some(MIXED_EDIT_WARNING));
    }

    #[test]
    fn edit_label_switches_to_bulk() {
        assert_eq!(ActionGate::compute(flags(1, 4, 0), EditMode::Normal, false).edit_label, "Edit");
        assert_eq!(
            ActionGate::compute(flags(2, 4, 0), EditMode::Normal, false).edit_label,
            "Bulk Edit"
        );
    }

    #[test]
    fn editing_blocks_other_bulk_actions() {
        let gate = ActionGate::compute(flags(2, 4, 0), EditMode::Editing, false);
        assert!(gate.clone_disabled);
        assert!(gate.delete_disabled);
        assert!(gate.publish_disabled);
        assert!(gate.edit_disabled);
        assert!(gate.is_enabled(TableAction::SaveEdit));
        assert!(gate.is_enabled(TableAction::CancelEdit));
        assert!(gate.is_enabled(TableAction::DeselectAll));

        let saving = ActionGate::compute(flags(2, 4, 0), EditMode::Saving, false);
        assert!(!saving.is_enabled(TableAction::SaveEdit));
        assert!(!saving.is_enabled(TableAction::CancelEdit));
        assert!(!saving.is_enabled(TableAction::DeselectAll));
    }

    proptest! {
        #[test]
        fn select_all_disabled_iff_empty_or_full(total in 0usize..50, pick in 0usize..50) {
            let selected = pick.min(total);
            let gate = ActionGate::compute(flags(selected, total, 0), EditMode::Normal, false);
            prop_assert_eq!(gate.select_all_disabled, total == 0 || selected == total);
        }

        #[test]
        fn all_cloned_implies_clone_disabled(
            total in 0usize..50,
            pick in 0usize..50,
            cloned in 0usize..50,
            strict in any::<bool>(),
        ) {
            let selected = pick.min(total);
            let cloned = cloned.min(selected);
            let f = flags(selected, total, cloned);
            let gate = ActionGate::compute(f, EditMode::Normal, strict);
            if f.are_all_selected_cloned() {
                prop_assert!(gate.clone_disabled);
            }
            prop_assert_eq!(gate.deselect_disabled, selected == 0);
            prop_assert_eq!(gate.delete_disabled, selected == 0);
            prop_assert_eq!(gate.publish_cloned_disabled, cloned == 0);
            prop_assert_eq!(gate.publish_hidden, cloned > 0);
        }
    }
}
