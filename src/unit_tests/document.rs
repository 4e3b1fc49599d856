//! Line-oriented text files that keep their on-disk formatting

use std::path::Path;
use crate::Result;

const BOM: char = '\u{feff}';

/// A text file split into lines.
///
/// Remembers the newline style, the trailing newline and a leading UTF-8 BOM
/// so that rendering an unmodified document reproduces the original bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextDocument {
    pub lines: Vec<String>,
    crlf: bool,
    trailing_newline: bool,
    bom: bool,
}

impl TextDocument {
    pub fn parse(content: &str) -> Self {
        let (bom, content) = match content.strip_prefix(BOM) {
            Some(rest) => (true, rest),
            None => (false, content),
        };

        Self {
            lines: content.lines().map(str::to_string).collect(),
            crlf: content.contains("\r\n"),
            trailing_newline: content.ends_with('\n'),
            bom,
        }
    }

    pub fn read(path: &Path) -> Result<Self> {
        Ok(Self::parse(&std::fs::read_to_string(path)?))
    }

    pub fn render(&self) -> String {
        let newline = if self.crlf { "\r\n" } else { "\n" };
        let mut out = String::new();
        if self.bom {
            out.push(BOM);
        }
        out.push_str(&self.lines.join(newline));
        if self.trailing_newline && !self.lines.is_empty() {
            out.push_str(newline);
        }
        out
    }
}

/// Leading whitespace of `line`
pub fn indent_of(line: &str) -> &str {
    &line[..line.len() - line.trim_start().len()]
}
