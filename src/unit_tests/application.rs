//! Registration of main categories in the unit-test application.
//!
//! The application imports every `UnitTests_<Category>` module and logs the
//! result of each `RunUnitTests_<Category>()` from `Init()`. New categories are
//! added next to the existing ones.

use std::path::{Path, PathBuf};
use crate::error::Error;
use crate::Result;
use super::document::{indent_of, TextDocument};

const CATEGORY_IMPORT_PREFIX: &str = "import UnitTests_";
const IMPORT_PREFIX: &str = "import ";
const RESULT_LOG_PATTERN: &str = "Unit Tests %s";
const RETURN_LINE: &str = "return true;";

/// The application source file that runs every category
#[derive(Debug, Clone)]
pub struct ApplicationFile {
    path: PathBuf,
    document: TextDocument,
}

impl ApplicationFile {
    pub fn load(path: &Path) -> Result<Self> {
        Ok(Self {
            path: path.to_path_buf(),
            document: TextDocument::read(path)?,
        })
    }

    pub fn from_document(path: &Path, document: TextDocument) -> Self {
        Self {
            path: path.to_path_buf(),
            document,
        }
    }

    fn lines(&self) -> &[String] {
        &self.document.lines
    }

    fn has_import(&self, category: &str) -> bool {
        let import = import_line(category);
        self.lines().iter().any(|line| line.trim() == import)
    }

    fn has_log(&self, category: &str) -> bool {
        let run = format!("RunUnitTests_{}()", category);
        self.lines().iter().any(|line| line.contains(&run))
    }

    pub fn is_registered(&self, category: &str) -> bool {
        self.has_import(category) && self.has_log(category)
    }

    /// Import `UnitTests_<category>` and log its result from `Init()`, adding
    /// whichever of the two is missing. Returns false when both were present.
    pub fn register(&mut self, category: &str) -> Result<bool> {
        let import_at = if self.has_import(category) {
            None
        } else {
            Some(self.import_anchor()?)
        };
        let log_at = if self.has_log(category) {
            None
        } else {
            Some(self.log_anchor()?)
        };

        // Anchors are located before touching anything; insert the lower one first
        let lines = &mut self.document.lines;
        let mut shift = 0;
        if let Some((at, indent)) = &log_at {
            lines.insert(*at, format!("{}{}", indent, log_line(category)));
            shift = 1;
        }
        if let Some(at) = import_at {
            let at = match &log_at {
                Some((log_at, _)) if *log_at <= at => at + shift,
                _ => at,
            };
            lines.insert(at + 1, import_line(category));
        }

        Ok(import_at.is_some() || log_at.is_some())
    }

    /// Index of the line the category import goes after
    fn import_anchor(&self) -> Result<usize> {
        self.last_line_starting_with(CATEGORY_IMPORT_PREFIX)
            .or_else(|| self.last_line_starting_with(IMPORT_PREFIX))
            .ok_or_else(|| Error::missing_marker(&self.path, IMPORT_PREFIX.trim()))
    }

    /// Index the log line is inserted at, and its indentation
    fn log_anchor(&self) -> Result<(usize, String)> {
        match self.last_line_containing(RESULT_LOG_PATTERN) {
            Some(at) => Ok((at + 1, indent_of(&self.lines()[at]).to_string())),
            None => {
                let at = self
                    .lines()
                    .iter()
                    .position(|line| line.trim() == RETURN_LINE)
                    .ok_or_else(|| Error::missing_marker(&self.path, RESULT_LOG_PATTERN))?;
                Ok((at, indent_of(&self.lines()[at]).to_string()))
            }
        }
    }

    fn last_line_starting_with(&self, prefix: &str) -> Option<usize> {
        self.lines()
            .iter()
            .rposition(|line| line.trim_start().starts_with(prefix))
    }

    fn last_line_containing(&self, pattern: &str) -> Option<usize> {
        self.lines().iter().rposition(|line| line.contains(pattern))
    }

    pub fn render(&self) -> String {
        self.document.render()
    }

    pub fn save(&self) -> Result<()> {
        std::fs::write(&self.path, self.render())?;
        Ok(())
    }
}

fn import_line(category: &str) -> String {
    format!("{}{};", CATEGORY_IMPORT_PREFIX, category)
}

fn log_line(category: &str) -> String {
    format!(
        "JPT_LOG(\"{0} Unit Tests %s\", RunUnitTests_{0}() ? \"Succeeded\" : \"Failed\");",
        category
    )
}
