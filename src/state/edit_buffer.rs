//! Scratch copy of a document being edited
//!
//! The buffer is independent of the document's source text until it is
//! explicitly saved. It remembers the text it started from so the session
//! can tell whether leaving edit mode would lose work.

use ropey::Rope;
use std::ops::Range;

/// Text being edited in a tab
#[derive(Debug, Clone)]
pub struct EditBuffer {
    content: Rope,
    original: String,
}

impl EditBuffer {
    /// Snapshot the given text
    pub fn new(text: &str) -> Self {
        Self {
            content: Rope::from_str(text),
            original: text.to_string(),
        }
    }

    /// Current buffer contents
    pub fn text(&self) -> String {
        self.content.to_string()
    }

    /// Text the buffer was created from
    pub fn original(&self) -> &str {
        &self.original
    }

    /// Whether the buffer differs from its snapshot
    pub fn is_modified(&self) -> bool {
        self.content != self.original.as_str()
    }

    /// Insert text at a character index, clamped to the end of the buffer
    pub fn insert(&mut self, char_idx: usize, text: &str) {
        let idx = char_idx.min(self.content.len_chars());
        self.content.insert(idx, text);
    }

    /// Remove a character range, clamped to the buffer
    pub fn remove(&mut self, range: Range<usize>) {
        let len = self.content.len_chars();
        let start = range.start.min(len);
        let end = range.end.min(len);
        if start < end {
            self.content.remove(start..end);
        }
    }

    /// Append text at the end of the buffer
    pub fn push_str(&mut self, text: &str) {
        let end = self.content.len_chars();
        self.content.insert(end, text);
    }

    /// Replace the entire contents (e.g. from an editor widget)
    pub fn set_text(&mut self, text: &str) {
        self.content = Rope::from_str(text);
    }

    pub fn len_chars(&self) -> usize {
        self.content.len_chars()
    }

    pub fn len_lines(&self) -> usize {
        self.content.len_lines()
    }

    pub fn is_empty(&self) -> bool {
        self.content.len_chars() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_buffer_is_clean() {
        let buffer = EditBuffer::new("# Notes\n");
        assert_eq!(buffer.text(), "# Notes\n");
        assert!(!buffer.is_modified());
        assert_eq!(buffer.len_lines(), 2);
    }

    #[test]
    fn test_insert_and_remove() {
        let mut buffer = EditBuffer::new("hello world");
        buffer.insert(5, ",");
        assert_eq!(buffer.text(), "hello, world");
        assert!(buffer.is_modified());

        buffer.remove(5..6);
        assert_eq!(buffer.text(), "hello world");
        assert!(!buffer.is_modified());
    }

    #[test]
    fn test_out_of_range_edits_are_clamped() {
        let mut buffer = EditBuffer::new("abc");
        buffer.insert(100, "d");
        assert_eq!(buffer.text(), "abcd");

        buffer.remove(2..100);
        assert_eq!(buffer.text(), "ab");

        buffer.remove(10..20);
        assert_eq!(buffer.text(), "ab");
    }

    #[test]
    fn test_set_text_keeps_original() {
        let mut buffer = EditBuffer::new("draft");
        buffer.set_text("final");
        buffer.push_str("!");
        assert_eq!(buffer.text(), "final!");
        assert_eq!(buffer.original(), "draft");
        assert!(!buffer.is_empty());
    }

    #[test]
    fn test_multibyte_indices_are_chars() {
        let mut buffer = EditBuffer::new("héllo");
        buffer.insert(2, "X");
        assert_eq!(buffer.text(), "héXllo");
        assert_eq!(buffer.len_chars(), 6);
    }
}
