//! Массовое выделение и редактирование инвентаря.
//!
//! [`selection`] хранит выделенные строки, [`gate`] вычисляет доступные
//! действия. [`delete_flow`] и [`edit_session`] - две модальные машины
//! состояний, [`action_bar`] их отображает. [`controller`] владеет состоянием
//! и следит за общими инвариантами.

pub mod action_bar;
pub mod controller;
pub mod delete_flow;
pub mod edit_session;
pub mod gate;
pub mod notice;
pub mod selection;

pub use action_bar::{ActionBar, Control};
pub use controller::{Dispatch, TableController, TableView, Ticket};
pub use delete_flow::{DeleteFlow, DeleteModal};
pub use edit_session::{EditSession, EditSessionView};
pub use gate::{ActionGate, EditMode, TableAction};
pub use notice::{Notice, NoticeLevel};
pub use selection::{SelectionFlags, SelectionStore};
