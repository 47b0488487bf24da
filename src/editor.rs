/// Single-line text input used by the add and rename popups.
///
/// The cursor counts characters, not bytes.
#[derive(Debug, Clone, Default)]
pub struct LineEditor {
    pub content: String,
    pub cursor: usize,
    pub is_dirty: bool,
}

impl LineEditor {
    pub fn new(content: impl Into<String>) -> Self {
        let content = content.into();
        let cursor = content.chars().count();
        LineEditor {
            content,
            cursor,
            is_dirty: false,
        }
    }

    fn byte_offset(&self, char_index: usize) -> usize {
        self.content
            .char_indices()
            .nth(char_index)
            .map(|(offset, _)| offset)
            .unwrap_or(self.content.len())
    }

    pub fn len(&self) -> usize {
        self.content.chars().count()
    }

    pub fn insert_char(&mut self, c: char) {
        let offset = self.byte_offset(self.cursor);
        self.content.insert(offset, c);
        self.cursor += 1;
        self.is_dirty = true;
    }

    /// Backspace.
    pub fn delete_char(&mut self) {
        if self.cursor == 0 {
            return;
        }
        let offset = self.byte_offset(self.cursor - 1);
        self.content.remove(offset);
        self.cursor -= 1;
        self.is_dirty = true;
    }

    /// Delete key.
    pub fn delete_forward(&mut self) {
        if self.cursor >= self.len() {
            return;
        }
        let offset = self.byte_offset(self.cursor);
        self.content.remove(offset);
        self.is_dirty = true;
    }

    pub fn move_cursor_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_cursor_right(&mut self) {
        if self.cursor < self.len() {
            self.cursor += 1;
        }
    }

    pub fn move_to_start(&mut self) {
        self.cursor = 0;
    }

    pub fn move_to_end(&mut self) {
        self.cursor = self.len();
    }

    /// Text before and after the cursor, for rendering.
    pub fn split_at_cursor(&self) -> (&str, &str) {
        self.content.split_at(self.byte_offset(self.cursor))
    }

    pub fn get_content(&self) -> &str {
        &self.content
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_with_cursor_at_end() {
        let editor = LineEditor::new("héllo");
        assert_eq!(editor.cursor, 5);
        assert!(!editor.is_dirty);
    }

    #[test]
    fn edits_around_multibyte_characters() {
        let mut editor = LineEditor::new("héllo");
        editor.move_to_start();
        editor.move_cursor_right();
        editor.move_cursor_right();
        editor.delete_char();
        assert_eq!(editor.get_content(), "hllo");

        editor.insert_char('é');
        assert_eq!(editor.get_content(), "héllo");
        assert_eq!(editor.split_at_cursor(), ("hé", "llo"));

        editor.move_to_end();
        editor.delete_forward();
        assert_eq!(editor.get_content(), "héllo");
        assert!(editor.is_dirty);
    }

    #[test]
    fn backspace_at_start_is_ignored() {
        let mut editor = LineEditor::new("");
        editor.delete_char();
        editor.move_cursor_left();
        assert_eq!(editor.cursor, 0);
        assert_eq!(editor.get_content(), "");
    }
}
