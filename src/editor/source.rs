use std::ops::Range;

/// A text-edit command target: the raw source string plus the cursor's byte
/// offset. Every operation returns a new value; callers compare old and new
/// for equality to decide whether a history entry is needed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SourceEditor {
    text: String,
    cursor: usize,
}

impl SourceEditor {
    pub fn new(text: impl Into<String>, cursor: usize) -> Self {
        let text = text.into();
        let cursor = clamp_boundary(&text, cursor);
        Self { text, cursor }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn insert(&self, input: &str) -> Self {
        let mut text = self.text.clone();
        text.insert_str(self.cursor, input);
        Self {
            text,
            cursor: self.cursor + input.len(),
        }
    }

    pub fn type_newline(&self) -> Self {
        self.insert("\n")
    }

    /// Remove a source range and leave the cursor at its start.
    pub fn delete_selection(&self, range: &Range<usize>) -> Self {
        let start = clamp_boundary(&self.text, range.start.min(range.end));
        let end = clamp_boundary(&self.text, range.end.max(range.start));
        let mut text = self.text.clone();
        text.drain(start..end);
        Self { text, cursor: start }
    }

    pub fn delete_before(&self, count: usize) -> Self {
        let start = step_back(&self.text, self.cursor, count);
        self.delete_selection(&(start..self.cursor))
    }

    pub fn delete_after(&self, count: usize) -> Self {
        let end = step_forward(&self.text, self.cursor, count);
        let mut text = self.text.clone();
        text.drain(self.cursor..end);
        Self {
            text,
            cursor: self.cursor,
        }
    }

    pub fn delete_word_before(&self) -> Self {
        let boundary = previous_word_boundary(&self.text, self.cursor);
        self.delete_selection(&(boundary..self.cursor))
    }

    pub fn delete_word_after(&self) -> Self {
        let boundary = next_word_boundary(&self.text, self.cursor);
        let mut text = self.text.clone();
        text.drain(self.cursor..boundary);
        Self {
            text,
            cursor: self.cursor,
        }
    }

    /// Replace a source range, placing the cursor `cursor_offset` bytes into
    /// the replacement.
    pub fn replace_range(&self, range: &Range<usize>, replacement: &str, cursor_offset: usize) -> Self {
        let start = clamp_boundary(&self.text, range.start.min(range.end));
        let end = clamp_boundary(&self.text, range.end.max(range.start));
        let mut text = self.text.clone();
        text.replace_range(start..end, replacement);
        let cursor = clamp_boundary(&text, start + cursor_offset.min(replacement.len()));
        Self { text, cursor }
    }

    pub fn with_cursor(&self, cursor: usize) -> Self {
        Self {
            text: self.text.clone(),
            cursor: clamp_boundary(&self.text, cursor),
        }
    }
}

/// Clamp a byte offset into the text and onto a char boundary.
pub(crate) fn clamp_boundary(text: &str, offset: usize) -> usize {
    let mut offset = offset.min(text.len());
    while offset > 0 && !text.is_char_boundary(offset) {
        offset -= 1;
    }
    offset
}

fn step_back(text: &str, offset: usize, count: usize) -> usize {
    let mut offset = clamp_boundary(text, offset);
    for _ in 0..count {
        let Some(previous) = text[..offset].char_indices().next_back() else {
            break;
        };
        offset = previous.0;
    }
    offset
}

fn step_forward(text: &str, offset: usize, count: usize) -> usize {
    let mut offset = clamp_boundary(text, offset);
    for _ in 0..count {
        let Some(ch) = text[offset..].chars().next() else {
            break;
        };
        offset += ch.len_utf8();
    }
    offset
}

pub(crate) fn is_word_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_'
}

/// Byte offset of the previous word boundary: skips whitespace, then the
/// run of word characters (or punctuation) before the cursor.
pub(crate) fn previous_word_boundary(text: &str, offset: usize) -> usize {
    let offset = clamp_boundary(text, offset);
    let mut chars: Vec<(usize, char)> = text[..offset].char_indices().collect();

    while let Some(&(_, ch)) = chars.last() {
        if ch.is_whitespace() {
            chars.pop();
        } else {
            break;
        }
    }
    let Some(&(_, last)) = chars.last() else {
        return 0;
    };
    if is_word_char(last) {
        while let Some(&(_, ch)) = chars.last() {
            if is_word_char(ch) {
                chars.pop();
            } else {
                break;
            }
        }
    } else {
        while let Some(&(_, ch)) = chars.last() {
            if !is_word_char(ch) && !ch.is_whitespace() {
                chars.pop();
            } else {
                break;
            }
        }
    }
    chars.last().map(|&(index, ch)| index + ch.len_utf8()).unwrap_or(0)
}

/// Byte offset of the next word boundary: the end of the current run plus
/// any trailing whitespace, i.e. the start of the next word.
pub(crate) fn next_word_boundary(text: &str, offset: usize) -> usize {
    let mut offset = clamp_boundary(text, offset);
    let len = text.len();

    let Some(first) = text[offset..].chars().next() else {
        return len;
    };
    if first.is_whitespace() {
        while let Some(ch) = text[offset..].chars().next() {
            if ch.is_whitespace() {
                offset += ch.len_utf8();
            } else {
                break;
            }
        }
        return offset;
    }
    if is_word_char(first) {
        while let Some(ch) = text[offset..].chars().next() {
            if is_word_char(ch) {
                offset += ch.len_utf8();
            } else {
                break;
            }
        }
    } else {
        while let Some(ch) = text[offset..].chars().next() {
            if !is_word_char(ch) && !ch.is_whitespace() {
                offset += ch.len_utf8();
            } else {
                break;
            }
        }
    }
    while let Some(ch) = text[offset..].chars().next() {
        if ch.is_whitespace() {
            offset += ch.len_utf8();
        } else {
            break;
        }
    }
    offset
}

/// Start of the word around a char offset in rendered text, for word
/// selection.
pub(crate) fn word_start_boundary(chars: &[char], offset: usize) -> usize {
    let mut idx = offset.min(chars.len());
    if idx == 0 {
        return 0;
    }
    if idx < chars.len() && chars[idx].is_whitespace() {
        while idx > 0 && chars[idx - 1].is_whitespace() {
            idx -= 1;
        }
        if idx == 0 {
            return 0;
        }
    }
    let check = if idx < chars.len() { idx } else { idx - 1 };
    if is_word_char(chars[check]) {
        while idx > 0 && is_word_char(chars[idx - 1]) {
            idx -= 1;
        }
    } else if !chars[check].is_whitespace() {
        while idx > 0 && !chars[idx - 1].is_whitespace() && !is_word_char(chars[idx - 1]) {
            idx -= 1;
        }
    }
    idx
}

/// End of the word around a char offset in rendered text.
pub(crate) fn word_end_boundary(chars: &[char], offset: usize) -> usize {
    let len = chars.len();
    let mut idx = offset.min(len);
    if idx >= len {
        return len;
    }
    if chars[idx].is_whitespace() {
        while idx < len && chars[idx].is_whitespace() {
            idx += 1;
        }
        if idx >= len {
            return len;
        }
    }
    if is_word_char(chars[idx]) {
        while idx < len && is_word_char(chars[idx]) {
            idx += 1;
        }
    } else {
        while idx < len && !chars[idx].is_whitespace() && !is_word_char(chars[idx]) {
            idx += 1;
        }
    }
    idx
}
