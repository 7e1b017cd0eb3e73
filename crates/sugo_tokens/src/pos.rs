//! Source positions and the position bases they are reported relative to.
//!
//! A [Pos] always records the *physical* line and column within a source file. The
//! [PosBase] it refers to decides how that physical location is presented: the file base
//! reports it as-is, while a base created by a `//line` directive remaps it onto another
//! filename and line.

use std::cmp::Ordering;
use std::fmt::{Display, Formatter};
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Largest line or column number a position can carry.
pub const POS_MAX: u32 = 1 << 30;

/// A trait for anything that is located at a [Pos].
pub trait Positioned {
    fn pos(&self) -> Pos;
}

/// The base positions are reported relative to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PosBase {
    file: Arc<str>,
    filename: String,
    line: u32,
    col: u32,
    /// Physical line and column immediately following the directive that created this base.
    origin: Option<(u32, u32)>,
    trimmed: bool,
}

impl PosBase {
    /// Creates the base for a file with the given name.
    pub fn file(filename: impl AsRef<str>) -> Arc<Self> {
        let filename = filename.as_ref();
        Arc::new(Self {
            file: Arc::from(filename),
            filename: filename.to_string(),
            line: 1,
            col: 1,
            origin: None,
            trimmed: false,
        })
    }

    /// Creates a base for a line directive. `origin` is the position immediately after the
    /// directive; it is reported as `filename:line:col`. A `col` of 0 means the directive did
    /// not specify a column.
    pub fn line_directive(
        origin: &Pos,
        filename: impl Into<String>,
        trimmed: bool,
        line: u32,
        col: u32,
    ) -> Arc<Self> {
        Arc::new(Self {
            file: origin.base.file.clone(),
            filename: filename.into(),
            line,
            col,
            origin: Some((origin.line, origin.col)),
            trimmed,
        })
    }

    /// The name of the physical file this base belongs to
    pub fn physical_file(&self) -> &str {
        &self.file
    }

    /// The (possibly remapped) filename.
    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn line(&self) -> u32 {
        self.line
    }

    pub fn col(&self) -> u32 {
        self.col
    }

    pub fn trimmed(&self) -> bool {
        self.trimmed
    }

    /// Whether this is the base of a file rather than of a line directive.
    pub fn is_file_base(&self) -> bool {
        self.origin.is_none()
    }
}

/// A physical position within a file.
#[derive(Debug, Clone)]
pub struct Pos {
    base: Arc<PosBase>,
    line: u32,
    col: u32,
}

impl Pos {
    pub fn new(base: Arc<PosBase>, line: u32, col: u32) -> Self {
        Self { base, line, col }
    }

    pub fn base(&self) -> &Arc<PosBase> {
        &self.base
    }

    /// The physical line, starting at 1
    pub fn line(&self) -> u32 {
        self.line
    }

    /// The physical column in bytes, starting at 1
    pub fn col(&self) -> u32 {
        self.col
    }

    /// A position on the same line `n` bytes to the right.
    pub fn offset_col(&self, n: u32) -> Self {
        Self {
            base: self.base.clone(),
            line: self.line,
            col: self.col + n,
        }
    }

    /// Returns a copy of this position reported relative to another base.
    pub fn with_base(&self, base: Arc<PosBase>) -> Self {
        Self {
            base,
            line: self.line,
            col: self.col,
        }
    }

    pub fn rel_filename(&self) -> &str {
        self.base.filename()
    }

    pub fn rel_line(&self) -> u32 {
        match self.base.origin {
            None => self.line,
            Some((origin_line, _)) => self.base.line + self.line.saturating_sub(origin_line),
        }
    }

    pub fn rel_col(&self) -> u32 {
        match self.base.origin {
            None => self.col,
            Some(_) if self.base.col == 0 => 0,
            Some((origin_line, origin_col)) => {
                if self.line == origin_line {
                    self.base.col + self.col.saturating_sub(origin_col)
                } else {
                    self.col
                }
            }
        }
    }
}

impl PartialEq for Pos {
    fn eq(&self, other: &Self) -> bool {
        self.base.file == other.base.file && self.line == other.line && self.col == other.col
    }
}

impl Eq for Pos {}

impl Hash for Pos {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.base.file.hash(state);
        self.line.hash(state);
        self.col.hash(state);
    }
}

impl PartialOrd for Pos {
    /// Positions are only ordered within the same physical file.
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        if self.base.file != other.base.file {
            return None;
        }
        Some((self.line, self.col).cmp(&(other.line, other.col)))
    }
}

impl Display for Pos {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let filename = self.rel_filename();
        let filename = if filename.is_empty() { "<unknown>" } else { filename };
        match self.rel_col() {
            0 => write!(f, "{}:{}", filename, self.rel_line()),
            col => write!(f, "{}:{}:{}", filename, self.rel_line(), col),
        }
    }
}

impl Positioned for Pos {
    fn pos(&self) -> Pos {
        self.clone()
    }
}

/// A line reader that gets lines of source text surrounding a position
#[derive(Debug, Default)]
pub struct LineReader {
    before: usize,
    after: usize,
}

impl LineReader {
    /// Creates a new line reader that gets `before` number of lines before a position and
    /// `after` number of lines after.
    pub fn new(before: usize, after: usize) -> Self {
        Self { before, after }
    }

    /// Gets the physical lines of `src` around `pos`.
    pub fn lines(&self, src: &str, pos: &Pos) -> Vec<Line> {
        let base_line = pos.line() as usize;
        let first = base_line.saturating_sub(self.before).max(1);
        let last = base_line.saturating_add(self.after);
        src.lines()
            .enumerate()
            .map(|(idx, line)| (idx + 1, line))
            .filter(|(n, _)| (first..=last).contains(n))
            .map(|(n, line)| Line {
                line: n,
                col: if n == base_line { pos.col() as usize } else { 0 },
                src: line.to_string(),
            })
            .collect()
    }

    /// Renders the lines around `pos` with a caret under its column.
    pub fn snippet(&self, src: &str, pos: &Pos) -> String {
        let lines = self.lines(src, pos);
        let width = lines.iter().map(|line| line.line).max().unwrap_or(0).to_string().len();
        let mut out = String::new();
        for line in &lines {
            out.push_str(&format!("{:width$} | {}\n", line.line, line.src.trim_end()));
            if line.line == pos.line() as usize {
                let col = line.col.saturating_sub(1);
                out.push_str(&format!("{} | {}^\n", " ".repeat(width), " ".repeat(col)));
            }
        }
        out
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub line: usize,
    pub col: usize,
    pub src: String,
}
