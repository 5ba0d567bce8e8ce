pub mod controller;
pub mod row_view;
pub mod undo;

pub use controller::{GridController, GridError, Notice, NoticeLevel, VocabularyEditor};
pub use row_view::{Field, Focus, RowSlot, RowView};
pub use undo::{Action, History, HistoryError};
