use ropey::Rope;
use unicode_width::UnicodeWidthChar;

/// Every character ropey treats as a line break.
const LINE_BREAKS: &[char] = &[
    '\n', '\r', '\u{0B}', '\u{0C}', '\u{85}', '\u{2028}', '\u{2029}',
];

/// Cursor position in the source buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    /// Zero-based line index.
    pub line: usize,
    /// Zero-based column (byte offset within the line).
    pub col: usize,
    /// Remembered column for vertical movement (sticky column).
    col_memory: usize,
}

impl Cursor {
    /// Create a cursor at line 0, column 0.
    pub const fn new() -> Self {
        Self {
            line: 0,
            col: 0,
            col_memory: 0,
        }
    }

    /// Create a cursor at a specific position.
    pub const fn at(line: usize, col: usize) -> Self {
        Self {
            line,
            col,
            col_memory: col,
        }
    }

    const fn set_col(&mut self, col: usize) {
        self.col = col;
        self.col_memory = col;
    }
}

impl Default for Cursor {
    fn default() -> Self {
        Self::new()
    }
}

/// Direction for cursor movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// The markdown source being edited, backed by a rope.
///
/// This is the only piece of domain state in the editor. Every mutation
/// bumps [`revision`](Self::revision) so the preview can be checked for
/// staleness against the text it was rendered from.
pub struct EditorBuffer {
    rope: Rope,
    cursor: Cursor,
    revision: u64,
}

impl EditorBuffer {
    /// Create a new buffer from a string.
    pub fn from_text(text: &str) -> Self {
        Self {
            rope: Rope::from_str(text),
            cursor: Cursor::new(),
            revision: 0,
        }
    }

    /// Replace the whole source unconditionally.
    ///
    /// The cursor keeps its position where the new text allows it and is
    /// clamped otherwise.
    pub fn set_source(&mut self, text: &str) {
        self.rope = Rope::from_str(text);
        let Cursor { line, col, .. } = self.cursor;
        self.move_to(line, col);
        self.bump();
    }

    /// The current source text.
    pub fn source(&self) -> String {
        self.rope.to_string()
    }

    /// The current cursor position.
    pub const fn cursor(&self) -> Cursor {
        self.cursor
    }

    /// Monotonic counter incremented by every mutation.
    pub const fn revision(&self) -> u64 {
        self.revision
    }

    /// Total number of lines in the buffer.
    pub fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    /// Get the content of a line, without its line break.
    pub fn line_at(&self, line_idx: usize) -> Option<String> {
        if line_idx >= self.rope.len_lines() {
            return None;
        }
        let s = self.rope.line(line_idx).to_string();
        Some(s.trim_end_matches(LINE_BREAKS).to_string())
    }

    /// Length of a line in bytes (without trailing newline).
    pub fn line_len(&self, line_idx: usize) -> usize {
        self.line_at(line_idx).map_or(0, |s| s.len())
    }

    /// Display column of the cursor on its line, in terminal cells.
    pub fn cursor_display_col(&self) -> usize {
        let line = self.line_at(self.cursor.line).unwrap_or_default();
        let end = floor_boundary(&line, self.cursor.col);
        line[..end]
            .chars()
            .map(|ch| ch.width().unwrap_or(0))
            .sum()
    }

    /// Insert a character at the cursor position.
    pub fn insert_char(&mut self, ch: char) {
        let char_idx = self.cursor_char_idx();
        self.rope.insert_char(char_idx, ch);
        self.place_cursor(char_idx + 1);
        self.bump();
    }

    /// Insert a string at the cursor position (paste).
    ///
    /// Carriage returns are folded so pasted CRLF text does not leave
    /// stray `\r` in the source.
    pub fn insert_str(&mut self, s: &str) {
        if s.is_empty() {
            return;
        }
        let normalized = s.replace("\r\n", "\n").replace('\r', "\n");
        let char_idx = self.cursor_char_idx();
        self.rope.insert(char_idx, &normalized);
        self.place_cursor(char_idx + normalized.chars().count());
        self.bump();
    }

    /// Split the current line at the cursor (Enter key).
    pub fn split_line(&mut self) {
        let char_idx = self.cursor_char_idx();
        self.rope.insert_char(char_idx, '\n');
        self.place_cursor(char_idx + 1);
        self.bump();
    }

    /// Delete the character before the cursor (Backspace).
    ///
    /// Returns `true` if a character was deleted.
    pub fn delete_back(&mut self) -> bool {
        if self.cursor.col == 0 && self.cursor.line == 0 {
            return false;
        }

        let char_idx = self.cursor_char_idx();
        if self.cursor.col == 0 {
            // Remove the whole break, which is two chars for CRLF.
            let prev_end = self.content_end_char(self.cursor.line - 1);
            self.rope.remove(prev_end..char_idx);
            self.place_cursor(prev_end);
        } else {
            self.rope.remove(char_idx - 1..char_idx);
            self.place_cursor(char_idx - 1);
        }
        self.bump();
        true
    }

    /// Delete the character at the cursor (Delete key).
    ///
    /// Returns `true` if a character was deleted.
    pub fn delete_forward(&mut self) -> bool {
        let line_len = self.line_len(self.cursor.line);
        if self.cursor.col >= line_len && self.cursor.line + 1 >= self.line_count() {
            return false;
        }

        let char_idx = self.cursor_char_idx();
        if char_idx >= self.rope.len_chars() {
            return false;
        }
        if self.cursor.col >= line_len {
            let next_start = self.rope.line_to_char(self.cursor.line + 1);
            self.rope.remove(char_idx..next_start);
        } else {
            self.rope.remove(char_idx..=char_idx);
        }
        // A lone CR can fuse with a following LF into one break.
        self.place_cursor(char_idx);
        self.bump();
        true
    }

    /// Move the cursor in the given direction.
    pub fn move_cursor(&mut self, direction: Direction) {
        match direction {
            Direction::Left => self.move_left(),
            Direction::Right => self.move_right(),
            Direction::Up => self.move_up(),
            Direction::Down => self.move_down(),
        }
    }

    /// Move cursor to the beginning of the line (Home).
    pub const fn move_home(&mut self) {
        self.cursor.set_col(0);
    }

    /// Move cursor to the end of the line (End).
    pub fn move_end(&mut self) {
        let len = self.line_len(self.cursor.line);
        self.cursor.set_col(len);
    }

    /// Move cursor one word to the left (Ctrl+Left).
    pub fn move_word_left(&mut self) {
        if self.cursor.col == 0 {
            if self.cursor.line > 0 {
                self.cursor.line -= 1;
                self.cursor.set_col(self.line_len(self.cursor.line));
            }
            return;
        }

        let line = self.line_at(self.cursor.line).unwrap_or_default();
        let trimmed = line[..floor_boundary(&line, self.cursor.col)].trim_end();
        let pos = trimmed
            .rfind(|c: char| !c.is_alphanumeric() && c != '_')
            .map_or(0, |i| i + trimmed[i..].chars().next().map_or(1, char::len_utf8));
        self.cursor.set_col(pos);
    }

    /// Move cursor one word to the right (Ctrl+Right).
    pub fn move_word_right(&mut self) {
        let line_len = self.line_len(self.cursor.line);
        if self.cursor.col >= line_len {
            if self.cursor.line + 1 < self.line_count() {
                self.cursor.line += 1;
                self.cursor.set_col(0);
            }
            return;
        }

        let line = self.line_at(self.cursor.line).unwrap_or_default();
        let after = &line[floor_boundary(&line, self.cursor.col)..];
        let word_end = after
            .find(|c: char| !c.is_alphanumeric() && c != '_')
            .unwrap_or(after.len());
        let rest = &after[word_end..];
        let space_end = rest
            .find(|c: char| c.is_alphanumeric() || c == '_')
            .unwrap_or(rest.len());

        self.cursor.set_col(self.cursor.col + word_end + space_end);
    }

    /// Move cursor to a specific line and byte column, clamped to the text.
    pub fn move_to(&mut self, line: usize, col: usize) {
        let max_line = self.line_count().saturating_sub(1);
        self.cursor.line = line.min(max_line);
        let text = self.line_at(self.cursor.line).unwrap_or_default();
        self.cursor.set_col(floor_boundary(&text, col));
    }

    /// Move cursor to a line and a display column (mouse click).
    pub fn move_to_display(&mut self, line: usize, display_col: usize) {
        let max_line = self.line_count().saturating_sub(1);
        let line = line.min(max_line);
        let text = self.line_at(line).unwrap_or_default();
        let mut width = 0usize;
        let mut byte_col = text.len();
        for (idx, ch) in text.char_indices() {
            let ch_width = ch.width().unwrap_or(0);
            if width + ch_width > display_col {
                byte_col = idx;
                break;
            }
            width += ch_width;
        }
        self.move_to(line, byte_col);
    }

    /// Move cursor to the start of the buffer (Ctrl+Home).
    pub const fn move_to_start(&mut self) {
        self.cursor.line = 0;
        self.cursor.set_col(0);
    }

    /// Move cursor to the end of the buffer (Ctrl+End).
    pub fn move_to_end(&mut self) {
        let last_line = self.line_count().saturating_sub(1);
        self.cursor.line = last_line;
        self.cursor.set_col(self.line_len(last_line));
    }

    // --- Private helpers ---

    const fn bump(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }

    /// Convert cursor position to a ropey char index.
    fn cursor_char_idx(&self) -> usize {
        let line_start = self.rope.line_to_char(self.cursor.line);
        let text = self.line_at(self.cursor.line).unwrap_or_default();
        line_start + text[..floor_boundary(&text, self.cursor.col)].chars().count()
    }

    /// Char index just past the content of a line, before its break.
    fn content_end_char(&self, line_idx: usize) -> usize {
        let content = self.line_at(line_idx).unwrap_or_default();
        self.rope.line_to_char(line_idx) + content.chars().count()
    }

    /// Put the cursor at a ropey char index.
    ///
    /// An index inside a two-char break lands at the end of that line.
    fn place_cursor(&mut self, char_idx: usize) {
        let char_idx = char_idx.min(self.rope.len_chars());
        let line = self.rope.char_to_line(char_idx);
        let line_start = self.rope.line_to_char(line);
        let col: usize = self
            .rope
            .slice(line_start..char_idx)
            .chars()
            .map(char::len_utf8)
            .sum();
        let text = self.line_at(line).unwrap_or_default();
        self.cursor.line = line;
        self.cursor.set_col(floor_boundary(&text, col));
    }

    fn move_left(&mut self) {
        if self.cursor.col > 0 {
            let line = self.line_at(self.cursor.line).unwrap_or_default();
            let before = &line[..floor_boundary(&line, self.cursor.col)];
            let prev_char_len = before.chars().next_back().map_or(1, char::len_utf8);
            self.cursor.set_col(self.cursor.col - prev_char_len);
        } else if self.cursor.line > 0 {
            self.cursor.line -= 1;
            self.cursor.set_col(self.line_len(self.cursor.line));
        }
    }

    fn move_right(&mut self) {
        let line_len = self.line_len(self.cursor.line);
        if self.cursor.col < line_len {
            let line = self.line_at(self.cursor.line).unwrap_or_default();
            let next_char_len = line[floor_boundary(&line, self.cursor.col)..]
                .chars()
                .next()
                .map_or(1, char::len_utf8);
            self.cursor.set_col(self.cursor.col + next_char_len);
        } else if self.cursor.line + 1 < self.line_count() {
            self.cursor.line += 1;
            self.cursor.set_col(0);
        }
    }

    fn move_up(&mut self) {
        if self.cursor.line > 0 {
            self.cursor.line -= 1;
            self.clamp_to_memory();
        }
    }

    fn move_down(&mut self) {
        if self.cursor.line + 1 < self.line_count() {
            self.cursor.line += 1;
            self.clamp_to_memory();
        }
    }

    fn clamp_to_memory(&mut self) {
        let text = self.line_at(self.cursor.line).unwrap_or_default();
        self.cursor.col = floor_boundary(&text, self.cursor.col_memory);
    }
}

/// Clamp `col` to `text` and back off to a char boundary.
fn floor_boundary(text: &str, col: usize) -> usize {
    let mut col = col.min(text.len());
    while !text.is_char_boundary(col) {
        col -= 1;
    }
    col
}

impl std::fmt::Debug for EditorBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditorBuffer")
            .field(
                "rope",
                &format_args!("Rope({} lines)", self.rope.len_lines()),
            )
            .field("cursor", &self.cursor)
            .field("revision", &self.revision)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    // --- Source holder ---

    #[test]
    fn test_source_returns_initial_text() {
        let buf = EditorBuffer::from_text("# Test\n- One\n");
        assert_eq!(buf.source(), "# Test\n- One\n");
    }

    #[test]
    fn test_set_source_replaces_everything() {
        let mut buf = EditorBuffer::from_text("old text\nmore");
        buf.set_source("new");
        assert_eq!(buf.source(), "new");
        assert_eq!(buf.line_count(), 1);
    }

    #[test]
    fn test_set_source_accepts_empty_text() {
        let mut buf = EditorBuffer::from_text("something");
        buf.move_end();
        buf.set_source("");
        assert_eq!(buf.source(), "");
        assert_eq!(buf.cursor(), Cursor::at(0, 0));
    }

    #[test]
    fn test_set_source_clamps_cursor() {
        let mut buf = EditorBuffer::from_text("one\ntwo\nthree");
        buf.move_to_end();
        buf.set_source("x");
        assert_eq!(buf.cursor(), Cursor::at(0, 1));
    }

    #[test]
    fn test_set_source_bumps_revision_even_when_unchanged() {
        let mut buf = EditorBuffer::from_text("same");
        let before = buf.revision();
        buf.set_source("same");
        assert!(buf.revision() > before);
    }

    // --- Revision tracking ---

    #[test]
    fn test_new_buffer_starts_at_revision_zero() {
        assert_eq!(EditorBuffer::from_text("hello").revision(), 0);
    }

    #[test]
    fn test_each_edit_bumps_revision() {
        let mut buf = EditorBuffer::from_text("hello");
        buf.insert_char('!');
        buf.split_line();
        buf.delete_back();
        assert_eq!(buf.revision(), 3);
    }

    #[test]
    fn test_noop_edits_keep_revision() {
        let mut buf = EditorBuffer::from_text("hello");
        buf.insert_str("");
        assert!(!buf.delete_back());
        buf.move_end();
        assert!(!buf.delete_forward());
        assert_eq!(buf.revision(), 0);
    }

    #[test]
    fn test_cursor_movement_keeps_revision() {
        let mut buf = EditorBuffer::from_text("hello\nworld");
        buf.move_cursor(Direction::Down);
        buf.move_word_right();
        buf.move_to_end();
        assert_eq!(buf.revision(), 0);
    }

    // --- Construction and basic queries ---

    #[test]
    fn test_empty_buffer_has_one_line() {
        let buf = EditorBuffer::from_text("");
        assert_eq!(buf.line_count(), 1);
        assert_eq!(buf.line_at(0), Some(String::new()));
    }

    #[test]
    fn test_from_text_trailing_newline() {
        let buf = EditorBuffer::from_text("hello\n");
        assert_eq!(buf.line_count(), 2);
        assert_eq!(buf.line_at(1), Some(String::new()));
    }

    #[test]
    fn test_line_at_out_of_bounds_returns_none() {
        let buf = EditorBuffer::from_text("hello");
        assert_eq!(buf.line_at(1), None);
    }

    // --- Insertion ---

    #[test]
    fn test_insert_char_in_middle() {
        let mut buf = EditorBuffer::from_text("hllo");
        buf.move_cursor(Direction::Right);
        buf.insert_char('e');
        assert_eq!(buf.line_at(0), Some("hello".to_string()));
        assert_eq!(buf.cursor(), Cursor::at(0, 2));
    }

    #[test]
    fn test_insert_multibyte_char() {
        let mut buf = EditorBuffer::from_text("hello");
        buf.move_end();
        buf.insert_char('é');
        assert_eq!(buf.line_at(0), Some("helloé".to_string()));
        assert_eq!(buf.cursor().col, 7);
    }

    #[test]
    fn test_insert_str_multiline_moves_cursor_to_end_of_paste() {
        let mut buf = EditorBuffer::from_text("ab");
        buf.move_cursor(Direction::Right);
        buf.insert_str("1\n22\n333");
        assert_eq!(buf.source(), "a1\n22\n333b");
        assert_eq!(buf.cursor(), Cursor::at(2, 3));
    }

    #[test]
    fn test_insert_str_folds_crlf() {
        let mut buf = EditorBuffer::from_text("");
        buf.insert_str("one\r\ntwo\rthree");
        assert_eq!(buf.source(), "one\ntwo\nthree");
        assert_eq!(buf.cursor(), Cursor::at(2, 5));
    }

    #[test]
    fn test_insert_str_with_unicode_line_separator() {
        let mut buf = EditorBuffer::from_text("");
        buf.insert_str("ab\u{2028}cd");
        assert_eq!(buf.line_count(), 2);
        assert_eq!(buf.line_at(0), Some("ab".to_string()));
        assert_eq!(buf.cursor(), Cursor::at(1, 2));

        buf.move_cursor(Direction::Left);
        buf.move_cursor(Direction::Left);
        buf.move_cursor(Direction::Left);
        assert_eq!(buf.cursor(), Cursor::at(0, 2));
        assert_eq!(buf.cursor_display_col(), 2);
    }

    #[test]
    fn test_insert_char_form_feed_starts_new_line() {
        let mut buf = EditorBuffer::from_text("ab");
        buf.move_to(0, 1);
        buf.insert_char('\u{0C}');
        assert_eq!(buf.line_count(), 2);
        assert_eq!(buf.cursor(), Cursor::at(1, 0));
        assert_eq!(buf.line_at(1), Some("b".to_string()));
    }

    #[test]
    fn test_line_at_strips_every_break_kind() {
        let buf = EditorBuffer::from_text("a\r\nb\u{85}c\u{2029}d");
        assert_eq!(buf.line_count(), 4);
        let lines: Vec<String> = (0..4).filter_map(|i| buf.line_at(i)).collect();
        assert_eq!(lines, ["a", "b", "c", "d"]);
    }

    // --- Line splitting and deletion ---

    #[test]
    fn test_split_line_in_middle() {
        let mut buf = EditorBuffer::from_text("hello world");
        buf.move_to(0, 5);
        buf.split_line();
        assert_eq!(buf.line_at(0), Some("hello".to_string()));
        assert_eq!(buf.line_at(1), Some(" world".to_string()));
        assert_eq!(buf.cursor(), Cursor::at(1, 0));
    }

    #[test]
    fn test_delete_back_at_start_is_noop() {
        let mut buf = EditorBuffer::from_text("hello");
        assert!(!buf.delete_back());
        assert_eq!(buf.source(), "hello");
    }

    #[test]
    fn test_delete_back_joins_lines() {
        let mut buf = EditorBuffer::from_text("hello\nworld");
        buf.move_to(1, 0);
        assert!(buf.delete_back());
        assert_eq!(buf.source(), "helloworld");
        assert_eq!(buf.cursor(), Cursor::at(0, 5));
    }

    #[test]
    fn test_delete_back_multibyte() {
        let mut buf = EditorBuffer::from_text("café");
        buf.move_end();
        buf.delete_back();
        assert_eq!(buf.line_at(0), Some("caf".to_string()));
    }

    #[test]
    fn test_delete_back_removes_whole_crlf() {
        let mut buf = EditorBuffer::from_text("one\r\ntwo");
        buf.move_to(1, 0);
        assert!(buf.delete_back());
        assert_eq!(buf.source(), "onetwo");
        assert_eq!(buf.cursor(), Cursor::at(0, 3));
    }

    #[test]
    fn test_delete_forward_removes_whole_crlf() {
        let mut buf = EditorBuffer::from_text("one\r\ntwo");
        buf.move_end();
        assert!(buf.delete_forward());
        assert_eq!(buf.source(), "onetwo");
    }

    #[test]
    fn test_delete_forward_joins_lines() {
        let mut buf = EditorBuffer::from_text("hello\nworld");
        buf.move_to(0, 5);
        assert!(buf.delete_forward());
        assert_eq!(buf.source(), "helloworld");
        assert_eq!(buf.cursor(), Cursor::at(0, 5));
    }

    // --- Cursor movement ---

    #[test]
    fn test_move_left_wraps_to_prev_line() {
        let mut buf = EditorBuffer::from_text("hello\nworld");
        buf.move_to(1, 0);
        buf.move_cursor(Direction::Left);
        assert_eq!(buf.cursor(), Cursor::at(0, 5));
    }

    #[test]
    fn test_move_right_wraps_to_next_line() {
        let mut buf = EditorBuffer::from_text("hello\nworld");
        buf.move_to(0, 5);
        buf.move_cursor(Direction::Right);
        assert_eq!(buf.cursor(), Cursor::at(1, 0));
    }

    #[test]
    fn test_column_memory_across_short_line() {
        let mut buf = EditorBuffer::from_text("hello\nhi\nworld");
        buf.move_to(0, 4);
        buf.move_cursor(Direction::Down);
        assert_eq!(buf.cursor().col, 2);
        buf.move_cursor(Direction::Down);
        assert_eq!(buf.cursor().line, 2);
        assert_eq!(buf.cursor().col, 4);
    }

    #[test]
    fn test_vertical_move_lands_on_char_boundary() {
        let mut buf = EditorBuffer::from_text("abcd\néé");
        buf.move_to(0, 3);
        buf.move_cursor(Direction::Down);
        assert_eq!(buf.cursor().col, 2);
    }

    #[test]
    fn test_move_word_left_from_middle_of_word() {
        let mut buf = EditorBuffer::from_text("hello world");
        buf.move_to(0, 8);
        buf.move_word_left();
        assert_eq!(buf.cursor().col, 6);
    }

    #[test]
    fn test_move_word_right_from_start() {
        let mut buf = EditorBuffer::from_text("hello world");
        buf.move_word_right();
        assert_eq!(buf.cursor().col, 6);
    }

    #[test]
    fn test_move_to_clamps_line_and_col() {
        let mut buf = EditorBuffer::from_text("hello");
        buf.move_to(100, 100);
        assert_eq!(buf.cursor(), Cursor::at(0, 5));
    }

    #[test]
    fn test_move_to_display_handles_wide_chars() {
        let mut buf = EditorBuffer::from_text("日本語");
        buf.move_to_display(0, 3);
        assert_eq!(buf.cursor().col, 3);
        assert_eq!(buf.cursor_display_col(), 2);
    }

    #[test]
    fn test_move_to_display_past_end_goes_to_end() {
        let mut buf = EditorBuffer::from_text("hi\nthere");
        buf.move_to_display(0, 40);
        assert_eq!(buf.cursor(), Cursor::at(0, 2));
    }

    #[test]
    fn test_move_to_start_and_end() {
        let mut buf = EditorBuffer::from_text("hello\nworld");
        buf.move_to_end();
        assert_eq!(buf.cursor(), Cursor::at(1, 5));
        buf.move_to_start();
        assert_eq!(buf.cursor(), Cursor::at(0, 0));
    }

    proptest! {
        #[test]
        fn test_random_edits_keep_cursor_inside_text(
            ops in proptest::collection::vec(0u8..8, 0..64),
            seed in "[a-zé\n\r\u{2028}\u{0C}\u{85} ]{0,40}",
        ) {
            let mut buf = EditorBuffer::from_text(&seed);
            for op in ops {
                match op {
                    0 => buf.insert_char('x'),
                    1 => buf.split_line(),
                    2 => { buf.delete_back(); }
                    3 => { buf.delete_forward(); }
                    4 => buf.move_cursor(Direction::Left),
                    5 => buf.move_cursor(Direction::Down),
                    6 => buf.move_word_right(),
                    _ => buf.insert_str("é\u{2028}z\n"),
                }
                let _ = buf.cursor_display_col();
                let cursor = buf.cursor();
                prop_assert!(cursor.line < buf.line_count());
                let line = buf.line_at(cursor.line).unwrap_or_default();
                prop_assert!(cursor.col <= line.len());
                prop_assert!(line.is_char_boundary(cursor.col));
            }
        }
    }
}
