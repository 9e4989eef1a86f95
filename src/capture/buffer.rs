//! Line-oriented capture buffer with a single editing cursor.

/// Literal token marking fields the human still has to fill in.
pub const PLACEHOLDER_MARKER: &str = "???";
/// First non-blank character of a line that is dropped on commit.
pub const COMMENT_PREFIX: char = ';';

/// Zero-based line/column position inside a [`CaptureBuffer`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Position {
    pub line: usize,
    /// Column in characters, not bytes.
    pub column: usize,
}

impl Position {
    pub const START: Position = Position { line: 0, column: 0 };

    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

/// The entry under edit, as an ordered list of lines.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CaptureBuffer {
    lines: Vec<String>,
    cursor: Position,
}

impl CaptureBuffer {
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
            cursor: Position::START,
        }
    }

    /// Split file text into lines. A trailing newline does not produce an
    /// extra empty line; CRLF endings are normalized.
    pub fn from_text(text: &str) -> Self {
        Self::from_lines(text.lines().map(|line| line.trim_end_matches('\r')))
    }

    /// Serialize back to file text. Empty buffers serialize to zero bytes.
    pub fn to_text(&self) -> String {
        if self.lines.is_empty() {
            return String::new();
        }
        let mut out = self.lines.join("\n");
        out.push('\n');
        out
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn line(&self, index: usize) -> Option<&str> {
        self.lines.get(index).map(String::as_str)
    }

    pub fn line_mut(&mut self, index: usize) -> Option<&mut String> {
        self.lines.get_mut(index)
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn cursor(&self) -> Position {
        self.cursor
    }

    /// Move the cursor, clamping it to the buffer contents.
    pub fn set_cursor(&mut self, position: Position) {
        self.cursor = self.clamp(position);
    }

    pub fn move_to_start(&mut self) {
        self.cursor = Position::START;
    }

    /// Replace every line while keeping the cursor as close as possible to
    /// where it was.
    pub fn replace_lines(&mut self, lines: Vec<String>) {
        self.lines = lines;
        self.cursor = self.clamp(self.cursor);
    }

    pub fn clear(&mut self) {
        self.lines.clear();
        self.cursor = Position::START;
    }

    /// Remove every occurrence of `marker`, leaving the surrounding text
    /// untouched. Returns how many occurrences were removed.
    pub fn remove_marker(&mut self, marker: &str) -> usize {
        if marker.is_empty() {
            return 0;
        }
        let mut removed = 0;
        for line in &mut self.lines {
            let hits = line.matches(marker).count();
            if hits > 0 {
                removed += hits;
                *line = line.replace(marker, "");
            }
        }
        self.cursor = self.clamp(self.cursor);
        removed
    }

    /// Drop every line whose first non-blank character is `prefix`, keeping
    /// the relative order of the rest. Returns how many lines were dropped.
    pub fn strip_comment_lines(&mut self, prefix: char) -> usize {
        let before = self.lines.len();
        self.lines.retain(|line| !is_comment_line(line, prefix));
        self.cursor = self.clamp(self.cursor);
        before - self.lines.len()
    }

    fn clamp(&self, position: Position) -> Position {
        let Some(last) = self.lines.len().checked_sub(1) else {
            return Position::START;
        };
        let line = position.line.min(last);
        let width = self.lines[line].chars().count();
        Position {
            line,
            column: position.column.min(width),
        }
    }
}

/// True when the first non-whitespace character of `line` is `prefix`.
pub fn is_comment_line(line: &str, prefix: char) -> bool {
    line.trim_start().starts_with(prefix)
}
