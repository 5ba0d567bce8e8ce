use crate::model::task::{Task, View};

/// Interactive cells of a row, in tab order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    RowNumber,
    Title,
    Status,
    Category,
}

/// Where keyboard focus sits in the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Focus {
    /// 1-based row (never the header)
    pub row: usize,
    pub field: Field,
    /// Caret offset in bytes into the title
    pub caret: usize,
    pub selection: usize,
}

impl Focus {
    pub fn title(row: usize, caret: usize, selection: usize) -> Self {
        Focus {
            row,
            field: Field::Title,
            caret,
            selection,
        }
    }
}

/// Column visibility, driven by settings and the displayed view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Columns {
    pub show_ids: bool,
    pub show_categories: bool,
    /// Finished column, only meaningful for the inactive view
    pub show_finished: bool,
}

/// One rendered grid row. Holds display text and the id of the task it
/// renders; the task itself stays in the project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowSlot {
    pub task_id: u64,
    /// Editable row-number cell
    pub row_number: String,
    pub title: String,
    pub status: String,
    pub category: String,
    pub created: String,
    pub finished: String,
    /// Tab indexes for title, status and category
    pub tab_indexes: [usize; 3],
}

impl RowSlot {
    fn from_task(row: usize, task: &Task) -> Self {
        RowSlot {
            task_id: task.id,
            row_number: row.to_string(),
            title: task.description.clone(),
            status: task.status.clone(),
            category: task.category.clone(),
            created: task.created_text(),
            finished: task.completed_text(),
            tab_indexes: [0; 3],
        }
    }
}

/// The grid: a fixed header (row 0) followed by one slot per task of the
/// displayed view, in view order.
#[derive(Debug, Clone)]
pub struct RowView {
    slots: Vec<RowSlot>,
    pub view: View,
    pub columns: Columns,
    pub status_options: Vec<String>,
    pub category_options: Vec<String>,
    pub focus: Option<Focus>,
    layout_depth: usize,
    pending_rebuild: bool,
}

impl RowView {
    pub fn new(view: View) -> Self {
        RowView {
            slots: Vec::new(),
            view,
            columns: Columns {
                show_ids: false,
                show_categories: false,
                show_finished: view == View::Inactive,
            },
            status_options: Vec::new(),
            category_options: Vec::new(),
            focus: None,
            layout_depth: 0,
            pending_rebuild: false,
        }
    }

    /// Grid row count including the header
    pub fn row_count(&self) -> usize {
        self.slots.len() + 1
    }

    /// Number of task rows
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn slots(&self) -> &[RowSlot] {
        &self.slots
    }

    pub fn slot(&self, row: usize) -> Option<&RowSlot> {
        row.checked_sub(1).and_then(|i| self.slots.get(i))
    }

    fn slot_mut(&mut self, row: usize) -> Option<&mut RowSlot> {
        row.checked_sub(1).and_then(|i| self.slots.get_mut(i))
    }

    /// Drop every task row, keeping the header
    pub fn clear(&mut self) {
        self.slots.clear();
        self.focus = None;
    }

    // -----------------------------------------------------------------------
    // Structural changes
    // -----------------------------------------------------------------------

    /// Insert a slot for `task` at `row`, pushing later rows down
    pub fn insert_row_at(&mut self, row: usize, task: &Task) {
        let idx = row.saturating_sub(1).min(self.slots.len());
        self.slots.insert(idx, RowSlot::from_task(idx + 1, task));
        self.renumber_from(idx + 1);
        self.set_tab_indexes();
    }

    /// Remove the slot at `row`, pulling later rows up
    pub fn remove_row(&mut self, row: usize) -> Option<RowSlot> {
        let idx = row.checked_sub(1).filter(|i| *i < self.slots.len())?;
        let slot = self.slots.remove(idx);
        self.renumber_from(idx);
        self.set_tab_indexes();
        Some(slot)
    }

    /// Rewrite row-number cells from `start` (0-based) to the end
    fn renumber_from(&mut self, start: usize) {
        for (i, slot) in self.slots.iter_mut().enumerate().skip(start) {
            slot.row_number = (i + 1).to_string();
        }
    }

    pub fn set_tab_indexes(&mut self) {
        for (i, slot) in self.slots.iter_mut().enumerate() {
            let base = (i + 1) * 10;
            slot.tab_indexes = [base + 1, base + 2, base + 3];
        }
    }

    /// Title, status and category cells of every row, ordered by tab index
    pub fn tab_order(&self) -> Vec<(usize, Field)> {
        let mut stops: Vec<(usize, usize, Field)> = Vec::with_capacity(self.slots.len() * 3);
        for (i, slot) in self.slots.iter().enumerate() {
            let fields = [Field::Title, Field::Status, Field::Category];
            for (tab, field) in slot.tab_indexes.iter().zip(fields) {
                if field == Field::Category && !self.columns.show_categories {
                    continue;
                }
                stops.push((*tab, i + 1, field));
            }
        }
        stops.sort_by_key(|(tab, _, _)| *tab);
        stops.into_iter().map(|(_, row, field)| (row, field)).collect()
    }

    /// The tab stop after `(row, field)`, wrapping to the first one
    pub fn next_tab_stop(&self, row: usize, field: Field) -> Option<(usize, Field)> {
        let order = self.tab_order();
        let pos = order.iter().position(|stop| *stop == (row, field));
        match pos {
            Some(p) => order.get(p + 1).or(order.first()).copied(),
            None => order.first().copied(),
        }
    }

    // -----------------------------------------------------------------------
    // Cell updates
    // -----------------------------------------------------------------------

    pub fn set_title(&mut self, row: usize, text: &str) {
        if let Some(slot) = self.slot_mut(row) {
            slot.title = text.to_string();
        }
    }

    pub fn set_status(&mut self, row: usize, status: &str) {
        if let Some(slot) = self.slot_mut(row) {
            slot.status = status.to_string();
        }
    }

    pub fn set_category(&mut self, row: usize, category: &str) {
        if let Some(slot) = self.slot_mut(row) {
            slot.category = category.to_string();
        }
    }

    pub fn set_finished(&mut self, row: usize, text: &str) {
        if let Some(slot) = self.slot_mut(row) {
            slot.finished = text.to_string();
        }
    }

    /// Text typed into a row-number cell, not yet committed
    pub fn set_row_number_text(&mut self, row: usize, text: &str) {
        if let Some(slot) = self.slot_mut(row) {
            slot.row_number = text.to_string();
        }
    }

    /// Put the row's own number back into its row-number cell
    pub fn revert_row_number(&mut self, row: usize) {
        if let Some(slot) = self.slot_mut(row) {
            slot.row_number = row.to_string();
        }
    }

    // -----------------------------------------------------------------------
    // Layout bracketing
    // -----------------------------------------------------------------------

    pub fn suspend_layout(&mut self) {
        self.layout_depth += 1;
    }

    /// Release one suspend level. Returns true when layout is live again and
    /// a layout pass should run.
    pub fn resume_layout(&mut self) -> bool {
        self.layout_depth = self.layout_depth.saturating_sub(1);
        self.layout_depth == 0
    }

    pub fn layout_suspended(&self) -> bool {
        self.layout_depth > 0
    }

    /// Ask the next layout pass to repopulate rows
    pub fn request_rebuild(&mut self) {
        self.pending_rebuild = true;
    }

    pub fn rebuild_pending(&self) -> bool {
        self.pending_rebuild
    }

    /// One-shot: returns the pending flag and clears it
    pub fn take_pending_rebuild(&mut self) -> bool {
        std::mem::take(&mut self.pending_rebuild)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn task(id: u64, title: &str) -> Task {
        let created = NaiveDate::from_ymd_opt(2026, 2, 3)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();
        let mut t = Task::new(id, "Todo".into(), String::new(), created);
        t.description = title.into();
        t
    }

    fn numbers(view: &RowView) -> Vec<String> {
        view.slots().iter().map(|s| s.row_number.clone()).collect()
    }

    fn titles(view: &RowView) -> Vec<String> {
        view.slots().iter().map(|s| s.title.clone()).collect()
    }

    #[test]
    fn header_counts_as_a_row() {
        let mut view = RowView::new(View::Active);
        assert_eq!(view.row_count(), 1);
        view.insert_row_at(1, &task(1, "A"));
        assert_eq!(view.row_count(), 2);
        assert_eq!(view.slot(0), None);
        assert_eq!(view.slot(1).unwrap().created, "2026-02-03");
    }

    #[test]
    fn insert_renumbers_following_rows() {
        let mut view = RowView::new(View::Active);
        view.insert_row_at(1, &task(1, "A"));
        view.insert_row_at(2, &task(2, "B"));
        view.insert_row_at(1, &task(3, "C"));
        assert_eq!(titles(&view), vec!["C", "A", "B"]);
        assert_eq!(numbers(&view), vec!["1", "2", "3"]);
    }

    #[test]
    fn remove_renumbers_following_rows() {
        let mut view = RowView::new(View::Active);
        for (i, t) in ["A", "B", "C"].iter().enumerate() {
            view.insert_row_at(i + 1, &task(i as u64 + 1, t));
        }
        let removed = view.remove_row(2).unwrap();
        assert_eq!(removed.title, "B");
        assert_eq!(titles(&view), vec!["A", "C"]);
        assert_eq!(numbers(&view), vec!["1", "2"]);
        assert!(view.remove_row(0).is_none());
        assert!(view.remove_row(3).is_none());
    }

    #[test]
    fn tab_indexes_follow_rows() {
        let mut view = RowView::new(View::Active);
        view.insert_row_at(1, &task(1, "A"));
        view.insert_row_at(2, &task(2, "B"));
        assert_eq!(view.slot(1).unwrap().tab_indexes, [11, 12, 13]);
        assert_eq!(view.slot(2).unwrap().tab_indexes, [21, 22, 23]);
        assert_eq!(
            view.tab_order(),
            vec![(1, Field::Title), (1, Field::Status), (2, Field::Title), (2, Field::Status)]
        );
        view.columns.show_categories = true;
        assert_eq!(view.next_tab_stop(1, Field::Status), Some((1, Field::Category)));
        assert_eq!(view.next_tab_stop(2, Field::Category), Some((1, Field::Title)));
    }

    #[test]
    fn revert_row_number_restores_position() {
        let mut view = RowView::new(View::Active);
        view.insert_row_at(1, &task(1, "A"));
        view.set_row_number_text(1, "abc");
        assert_eq!(view.slot(1).unwrap().row_number, "abc");
        view.revert_row_number(1);
        assert_eq!(view.slot(1).unwrap().row_number, "1");
    }

    #[test]
    fn layout_suspend_nests() {
        let mut view = RowView::new(View::Active);
        view.suspend_layout();
        view.suspend_layout();
        assert!(!view.resume_layout());
        assert!(view.layout_suspended());
        assert!(view.resume_layout());
        assert!(!view.layout_suspended());
    }

    #[test]
    fn pending_rebuild_is_one_shot() {
        let mut view = RowView::new(View::Inactive);
        assert!(view.columns.show_finished);
        view.request_rebuild();
        assert!(view.take_pending_rebuild());
        assert!(!view.take_pending_rebuild());
    }
}
