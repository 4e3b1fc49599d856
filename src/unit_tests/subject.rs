//! The thing a new unit test is written for

use regex::Regex;
use std::path::PathBuf;
use std::sync::LazyLock;
use crate::Result;
use crate::error::Error;

/// A test subject: a type name and the category it lives under
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestSubject {
    name: String,
    categories: Vec<String>,
}

static IDENTIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("identifier pattern is valid"));

static CATEGORY_SEGMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_]+$").expect("category pattern is valid"));

impl TestSubject {
    /// Validate a subject name and a `/`-separated category path such as `Core/Types`
    pub fn new(name: &str, category_path: &str) -> Result<Self> {
        let name = name.trim();
        if !IDENTIFIER.is_match(name) {
            return Err(Error::InvalidSubject(format!(
                "'{}' is not a valid identifier",
                name
            )));
        }

        let normalized = category_path.trim().replace('\\', "/");
        let categories: Vec<String> = normalized
            .split('/')
            .map(str::trim)
            .filter(|segment| !segment.is_empty())
            .map(str::to_string)
            .collect();

        if categories.is_empty() {
            return Err(Error::InvalidSubject("category path is empty".to_string()));
        }

        if let Some(bad) = categories.iter().find(|c| !CATEGORY_SEGMENT.is_match(c)) {
            return Err(Error::InvalidSubject(format!(
                "'{}' is not a valid category in '{}'",
                bad, category_path
            )));
        }

        Ok(Self {
            name: name.to_string(),
            categories,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Category segments, outermost first
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    /// Selects the aggregation file
    pub fn main_category(&self) -> &str {
        &self.categories[0]
    }

    pub fn sub_category(&self) -> Option<&str> {
        self.categories.get(1).map(String::as_str)
    }

    /// Group the subject is listed under; the main category when there is no subcategory
    pub fn group_key(&self) -> &str {
        self.sub_category().unwrap_or_else(|| self.main_category())
    }

    /// Category path relative to the source tree
    pub fn category_dir(&self) -> PathBuf {
        self.categories.iter().collect()
    }

    pub fn module_name(&self) -> String {
        format!("{}UnitTests", self.name)
    }

    pub fn import_line(&self) -> String {
        format!("import {};", self.module_name())
    }

    pub fn invocation_line(&self) -> String {
        format!(
            "JPT_RETURN_FALSE_IF_ERROR(!Run{0}UnitTests(), \"{0} Tests Failed\");",
            self.name
        )
    }
}
