use std::convert::TryFrom;

/// The working line array with an explicit cursor. Directive expansion
/// inserts lines at the cursor and advances past them, so resuming a
/// scan never re-triggers the same expansion.
pub struct SourceLines {
    lines: Vec<String>,
    cursor: usize,
}

impl SourceLines {
    pub fn from_str(s: &str) -> SourceLines {
        SourceLines {
            lines: s
                .split(|c| c == '\r' || c == '\n')
                .filter(|l| !l.is_empty())
                .map(|l| l.trim().to_string())
                .collect(),
            cursor: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// 1-based position of the cursor, for error reporting.
    pub fn line_number(&self) -> Option<u16> {
        u16::try_from(self.cursor + 1).ok()
    }

    pub fn get(&self) -> Option<&str> {
        self.lines.get(self.cursor).map(|l| l.as_str())
    }

    pub fn set(&mut self, line: &str) {
        if let Some(slot) = self.lines.get_mut(self.cursor) {
            *slot = line.trim().to_string();
        }
    }

    /// Removes the current line. The cursor stays put, so the next line
    /// slides into the current position.
    pub fn remove(&mut self) -> String {
        self.lines.remove(self.cursor)
    }

    /// Inserts at the cursor and advances past the insertion.
    pub fn insert(&mut self, line: &str) {
        self.lines.insert(self.cursor, line.trim().to_string());
        self.cursor += 1;
    }

    pub fn insert_many<'a, T: IntoIterator<Item = &'a str>>(&mut self, lines: T) {
        for line in lines {
            self.insert(line);
        }
    }

    /// Inserts at a fixed index, keeping the cursor on the same line it
    /// was on before the splice.
    pub fn insert_at(&mut self, index: usize, line: &str) {
        self.lines.insert(index, line.trim().to_string());
        if self.cursor >= index {
            self.cursor += 1;
        }
    }

    /// Appends after the last line.
    pub fn push(&mut self, line: &str) {
        self.lines.push(line.trim().to_string());
    }

    pub fn advance(&mut self) -> bool {
        if self.cursor < self.lines.len() {
            self.cursor += 1;
            return true;
        }
        false
    }

    pub fn rewind(&mut self) {
        self.cursor = 0;
    }

    pub fn retain_nonempty(&mut self) {
        self.lines.retain(|l| !l.is_empty());
        self.cursor = 0;
    }

    /// Consumes the worklist, yielding the surviving lines in order.
    pub fn into_lines(self) -> Vec<String> {
        self.lines
    }
}
