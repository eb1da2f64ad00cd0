//! Модель панели действий. Ничем не владеет, пересобирается из гейта при каждой отрисовке.

use serde::Serialize;

use super::gate::{ActionGate, EditMode, TableAction};
use super::selection::SelectionFlags;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Control {
    pub action: TableAction,
    pub label: &'static str,
    pub enabled: bool,
    pub visible: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tooltip: Option<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionBar {
    pub selected_count: usize,
    pub total_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<&'static str>,
    pub controls: Vec<Control>,
}

impl ActionBar {
    pub fn build(flags: SelectionFlags, gate: &ActionGate, mode: EditMode) -> Self {
        let control = |action: TableAction, label: &'static str, visible: bool| Control {
            action,
            label,
            enabled: visible && gate.is_enabled(action),
            visible,
            tooltip: None,
        };
        let editing = mode != EditMode::Normal;

        let mut controls = vec![
            control(TableAction::SelectAll, "Select All", true),
            control(TableAction::DeselectAll, "Deselect", true),
            Control {
                tooltip: flags.are_all_selected_cloned().then_some(gate.cancel_clone_tooltip),
                ..control(TableAction::Clone, "Clone", !editing)
            },
            control(TableAction::Edit, gate.edit_label, !editing),
            Control {
                tooltip: Some(gate.cancel_edit_tooltip),
                ..control(TableAction::CancelEdit, "Cancel", editing)
            },
            control(
                TableAction::SaveEdit,
                if mode == EditMode::Saving { "Saving..." } else { "Save" },
                editing,
            ),
            control(TableAction::Delete, "Delete", !editing),
            control(TableAction::PublishLive, "Publish Live", !editing && !gate.publish_hidden),
            Control {
                tooltip: Some(gate.publish_cloned_tooltip),
                ..control(
                    TableAction::PublishCloned,
                    "Publish Cloned",
                    !editing && flags.has_any_cloned_selected(),
                )
            },
        ];
        controls.retain(|c| c.visible);

        Self {
            selected_count: flags.selected_count,
            total_count: flags.total_count,
            warning: gate.edit_warning,
            controls,
        }
    }

    pub fn control(&self, action: TableAction) -> Option<&Control> {
        self.controls.iter().find(|c| c.action == action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::gate::{CANCEL_CLONE_TOOLTIP, PUBLISH_CLONED_TOOLTIP};

    fn bar(selected: usize, total: usize, cloned: usize, mode: EditMode) -> ActionBar {
        let flags = SelectionFlags {
            selected_count: selected,
            total_count: total,
            selected_cloned_count: cloned,
        };
        let gate = ActionGate::compute(flags, mode, false);
        ActionBar::build(flags, &gate, mode)
    }

    #[test]
    fn normal_mode_controls() {
        let bar = bar(2, 5, 0, EditMode::Normal);
        assert_eq!(bar.control(TableAction::Edit).unwrap().label, "Bulk Edit");
        assert!(bar.control(TableAction::Delete).unwrap().enabled);
        assert!(bar.control(TableAction::SaveEdit).is_none());
        assert!(bar.control(TableAction::PublishCloned).is_none());
        assert!(bar.control(TableAction::PublishLive).unwrap().enabled);
    }

    #[test]
    fn cloned_selection_hides_publish_live() {
        let bar = bar(2, 5, 1, EditMode::Normal);
        assert!(bar.control(TableAction::PublishLive).is_none());
        let publish_cloned = bar.control(TableAction::PublishCloned).unwrap();
        assert!(publish_cloned.enabled);
        assert_eq!(publish_cloned.tooltip, Some(PUBLISH_CLONED_TOOLTIP));
        assert!(bar.warning.is_some());
        assert_eq!(bar.control(TableAction::Clone).unwrap().tooltip, None);
    }

    #[test]
    fn all_cloned_selection_explains_disabled_clone() {
        let bar = bar(2, 5, 2, EditMode::Normal);
        let clone = bar.control(TableAction::Clone).unwrap();
        assert!(!clone.enabled);
        assert_eq!(clone.tooltip, Some(CANCEL_CLONE_TOOLTIP));
        assert_eq!(
            bar.control(TableAction::PublishCloned).unwrap().tooltip,
            Some(PUBLISH_CLONED_TOOLTIP)
        );
    }

    #[test]
    fn editing_swaps_edit_for_save_and_cancel() {
        let bar = bar(3, 5, 0, EditMode::Editing);
        assert!(bar.control(TableAction::Edit).is_none());
        assert!(bar.control(TableAction::Delete).is_none());
        assert!(bar.control(TableAction::SaveEdit).unwrap().enabled);
        assert!(bar.control(TableAction::CancelEdit).unwrap().tooltip.is_some());
    }

    #[test]
    fn saving_disables_save_button() {
        let bar = bar(3, 5, 0, EditMode::Saving);
        let save = bar.control(TableAction::SaveEdit).unwrap();
        assert_eq!(save.label, "Saving...");
        assert!(!save.enabled);
    }
}
