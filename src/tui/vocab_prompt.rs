use crate::grid::controller::VocabularyEditor;

/// Vocabulary editor backed by one line of prompt text.
///
/// Statuses are written `Todo, Doing | Done, Dropped` (active before the
/// bar, inactive after). Categories are a comma list; a leading comma
/// keeps the empty "none" category.
pub struct TextVocabulary<'a> {
    text: &'a str,
    /// Set when the text could not be read; the edit is then cancelled
    pub error: Option<String>,
}

impl<'a> TextVocabulary<'a> {
    pub fn new(text: &'a str) -> Self {
        TextVocabulary { text, error: None }
    }
}

/// Prompt text for the current status lists
pub fn format_statuses(active: &[String], inactive: &[String]) -> String {
    format!("{} | {}", active.join(", "), inactive.join(", "))
}

/// Prompt text for the current categories
pub fn format_categories(categories: &[String]) -> String {
    categories.join(", ")
}

fn split_list(text: &str) -> Vec<String> {
    text.split(',').map(|s| s.trim().to_string()).collect()
}

impl VocabularyEditor for TextVocabulary<'_> {
    fn edit_statuses(
        &mut self,
        _active: &[String],
        _inactive: &[String],
    ) -> Option<(Vec<String>, Vec<String>)> {
        let Some((active, inactive)) = self.text.split_once('|') else {
            self.error = Some("expected active statuses, '|', then inactive statuses".into());
            return None;
        };
        if inactive.contains('|') {
            self.error = Some("only one '|' is allowed".into());
            return None;
        }
        Some((split_list(active), split_list(inactive)))
    }

    fn edit_categories(&mut self, _categories: &[String]) -> Option<Vec<String>> {
        if self.text.trim().is_empty() {
            return Some(vec![String::new()]);
        }
        Some(split_list(self.text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn statuses_split_on_bar() {
        let mut editor = TextVocabulary::new("Todo, Waiting | Done,Dropped");
        let (active, inactive) = editor.edit_statuses(&[], &[]).unwrap();
        assert_eq!(active, strings(&["Todo", "Waiting"]));
        assert_eq!(inactive, strings(&["Done", "Dropped"]));
    }

    #[test]
    fn statuses_need_one_bar() {
        let mut editor = TextVocabulary::new("Todo, Done");
        assert!(editor.edit_statuses(&[], &[]).is_none());
        assert!(editor.error.is_some());
        let mut editor = TextVocabulary::new("a | b | c");
        assert!(editor.edit_statuses(&[], &[]).is_none());
    }

    #[test]
    fn categories_keep_leading_empty_label() {
        let current = strings(&["", "Errands"]);
        let text = format_categories(&current);
        assert_eq!(text, ", Errands");
        let mut editor = TextVocabulary::new(&text);
        assert_eq!(editor.edit_categories(&current), Some(current.clone()));
        let mut blank = TextVocabulary::new("  ");
        assert_eq!(blank.edit_categories(&current), Some(strings(&[""])));
    }

    #[test]
    fn format_round_trips_statuses() {
        let text = format_statuses(&strings(&["Todo", "Doing"]), &strings(&["Done"]));
        assert_eq!(text, "Todo, Doing | Done");
    }
}
