//! Per-category aggregation modules.
//!
//! An aggregation file imports every unit-test module of one main category
//! and runs them from a single `RunUnitTests_<Category>()` function. Both
//! places are introduced by a marker comment and organized into groups, one
//! `// <SubCategory>` comment per subcategory:
//!
//! ```text
//! /** Unit Test Modules */
//!
//! // Containers
//! import DynamicArrayUnitTests;
//!
//! export bool RunUnitTests_Core()
//! {
//!     /** Unit Test Functions */
//!
//!     // Containers
//!     JPT_RETURN_FALSE_IF_ERROR(!RunDynamicArrayUnitTests(), "DynamicArray Tests Failed");
//!
//!     return true;
//! }
//! ```

use std::path::{Path, PathBuf};
use crate::config::Layout;
use crate::error::Error;
use crate::templates;
use crate::Result;
use super::document::{indent_of, TextDocument};

/// Header of the import region
pub const MODULES_MARKER: &str = "/** Unit Test Modules */";

/// Header of the invocation region
pub const FUNCTIONS_MARKER: &str = "/** Unit Test Functions */";

const MARKERS: [&str; 2] = [MODULES_MARKER, FUNCTIONS_MARKER];

/// A `// <key>` comment and the lines directly below it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    pub key: String,
    header: String,
    pub lines: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Entry {
    Line(String),
    Group(Group),
}

impl Entry {
    fn is_blank(&self) -> bool {
        matches!(self, Entry::Line(line) if line.trim().is_empty())
    }
}

/// Everything from one marker line up to the next marker (or end of file)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    marker: String,
    entries: Vec<Entry>,
}

impl Section {
    fn new(marker: String) -> Self {
        Self { marker, entries: Vec::new() }
    }

    pub fn marker(&self) -> &str {
        self.marker.trim()
    }

    pub fn groups(&self) -> impl Iterator<Item = &Group> {
        self.entries.iter().filter_map(|entry| match entry {
            Entry::Group(group) => Some(group),
            Entry::Line(_) => None,
        })
    }

    pub fn group(&self, key: &str) -> Option<&Group> {
        self.groups().find(|group| group.key == key)
    }

    fn push_line(&mut self, line: String) {
        if let Some(key) = group_key_of(&line) {
            self.entries.push(Entry::Group(Group {
                key: key.to_string(),
                header: line,
                lines: Vec::new(),
            }));
            return;
        }

        // Entry lines right below a group belong to it; anything else ends it
        if self.is_entry(&line) {
            if let Some(Entry::Group(group)) = self.entries.last_mut() {
                group.lines.push(line);
                return;
            }
        }

        self.entries.push(Entry::Line(line));
    }

    /// Whether `line` is something a group in this section lists: an
    /// `import ...;` in the modules region, a `JPT_...;` call in the functions region
    fn is_entry(&self, line: &str) -> bool {
        let line = line.trim();
        if !line.ends_with(';') {
            return false;
        }
        match self.marker() {
            MODULES_MARKER => line.starts_with("import "),
            _ => line.starts_with("JPT_"),
        }
    }

    /// Whether `line` already appears anywhere in this section
    pub fn contains(&self, line: &str) -> bool {
        let line = line.trim();
        self.entries.iter().any(|entry| match entry {
            Entry::Line(existing) => existing.trim() == line,
            Entry::Group(group) => group.lines.iter().any(|existing| existing.trim() == line),
        })
    }

    /// Append `new_line` to the group `group_key`, creating the group first
    /// if it does not exist yet.
    ///
    /// A new group goes right after the blank spacer line that follows the
    /// marker. Lines are indented like the marker.
    pub fn insert_grouped_line(&mut self, group_key: &str, new_line: &str) {
        let indent = indent_of(&self.marker).to_string();
        let new_line = format!("{}{}", indent, new_line.trim());

        let existing = self.entries.iter_mut().find_map(|entry| match entry {
            Entry::Group(group) if group.key == group_key => Some(group),
            _ => None,
        });
        if let Some(group) = existing {
            group.lines.push(new_line);
            return;
        }

        let at = match self.entries.first() {
            Some(first) if first.is_blank() => 1,
            _ => 0,
        };
        let group = Entry::Group(Group {
            key: group_key.to_string(),
            header: format!("{}// {}", indent, group_key),
            lines: vec![new_line],
        });
        self.entries.insert(at, group);

        // Keep the group visually separate from whatever followed the spacer
        if self.entries.get(at + 1).is_some_and(|next| !next.is_blank()) {
            self.entries.insert(at + 1, Entry::Line(String::new()));
        }
    }

    fn write_lines(&self, out: &mut Vec<String>) {
        out.push(self.marker.clone());
        for entry in &self.entries {
            match entry {
                Entry::Line(line) => out.push(line.clone()),
                Entry::Group(group) => {
                    out.push(group.header.clone());
                    out.extend(group.lines.iter().cloned());
                }
            }
        }
    }
}

/// Key of a `// <key>` group comment
fn group_key_of(line: &str) -> Option<&str> {
    let key = line.trim().strip_prefix("// ")?.trim();
    (!key.is_empty()).then_some(key)
}

fn is_marker(line: &str) -> bool {
    MARKERS.contains(&line.trim())
}

/// Lines of an aggregation file, parsed into marker sections and groups
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sections {
    preamble: Vec<String>,
    sections: Vec<Section>,
}

impl Sections {
    pub fn parse<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut preamble = Vec::new();
        let mut sections: Vec<Section> = Vec::new();

        for line in lines {
            let line = line.into();
            if is_marker(&line) {
                sections.push(Section::new(line));
                continue;
            }
            match sections.last_mut() {
                Some(section) => section.push_line(line),
                None => preamble.push(line),
            }
        }

        Self { preamble, sections }
    }

    pub fn section(&self, marker: &str) -> Option<&Section> {
        self.sections.iter().find(|section| section.marker() == marker)
    }

    pub fn section_mut(&mut self, marker: &str) -> Option<&mut Section> {
        self.sections.iter_mut().find(|section| section.marker() == marker)
    }

    pub fn to_lines(&self) -> Vec<String> {
        let mut out = self.preamble.clone();
        for section in &self.sections {
            section.write_lines(&mut out);
        }
        out
    }
}

/// Insert `new_line` under `// <group_key>` in the section opened by
/// `section_marker`. Returns `None` when the marker is not in `lines`.
pub fn insert_grouped_line(
    lines: Vec<String>,
    section_marker: &str,
    group_key: &str,
    new_line: &str,
) -> Option<Vec<String>> {
    let mut sections = Sections::parse(lines);
    sections.section_mut(section_marker)?.insert_grouped_line(group_key, new_line);
    Some(sections.to_lines())
}

/// Path of the aggregation file for `main_category`
pub fn aggregation_path(layout: &Layout, main_category: &str) -> PathBuf {
    layout
        .application_layer_dir
        .join(format!("UnitTests_{}.{}", main_category, layout.module_extension))
}

/// Create the aggregation file for `main_category` from the template if it
/// does not exist. Returns whether the file was created.
pub fn ensure_aggregation_file(layout: &Layout, main_category: &str) -> Result<bool> {
    let path = aggregation_path(layout, main_category);
    if path.exists() {
        return Ok(false);
    }

    std::fs::create_dir_all(&layout.application_layer_dir)?;
    std::fs::write(&path, templates::unit_tests_category(main_category))?;
    tracing::info!("Created aggregation file {:?}", path);
    Ok(true)
}

/// An aggregation file loaded for editing
#[derive(Debug, Clone)]
pub struct AggregationFile {
    path: PathBuf,
    document: TextDocument,
    sections: Sections,
}

impl AggregationFile {
    /// Load and validate an aggregation file. Both markers must be present.
    pub fn load(path: &Path) -> Result<Self> {
        Self::from_document(path, TextDocument::read(path)?)
    }

    pub fn from_document(path: &Path, document: TextDocument) -> Result<Self> {
        let sections = Sections::parse(document.lines.iter().cloned());
        for marker in MARKERS {
            if sections.section(marker).is_none() {
                return Err(Error::missing_marker(path, marker));
            }
        }

        Ok(Self {
            path: path.to_path_buf(),
            document,
            sections,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn sections(&self) -> &Sections {
        &self.sections
    }

    /// Add `new_line` to group `group_key` of the `marker` section unless the
    /// section already has it. Returns whether a line was inserted.
    pub fn register(&mut self, marker: &str, group_key: &str, new_line: &str) -> Result<bool> {
        let section = self
            .sections
            .section_mut(marker)
            .ok_or_else(|| Error::missing_marker(&self.path, marker))?;

        if section.contains(new_line) {
            tracing::debug!("{:?} already contains '{}'", self.path, new_line.trim());
            return Ok(false);
        }

        section.insert_grouped_line(group_key, new_line);
        Ok(true)
    }

    pub fn render(&self) -> String {
        let mut document = self.document.clone();
        document.lines = self.sections.to_lines();
        document.render()
    }

    /// Overwrite the file with the current contents
    pub fn save(&self) -> Result<()> {
        std::fs::write(&self.path, self.render())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use tempfile::TempDir;

    fn template_lines() -> Vec<String> {
        templates::unit_tests_category("Core")
            .lines()
            .map(str::to_string)
            .collect()
    }

    fn position(lines: &[String], needle: &str) -> usize {
        lines
            .iter()
            .position(|line| line == needle)
            .unwrap_or_else(|| panic!("'{}' not found in {:#?}", needle, lines))
    }

    #[test]
    fn test_parse_round_trip() {
        let lines = template_lines();
        assert_eq!(Sections::parse(lines.clone()).to_lines(), lines);
    }

    #[test]
    fn test_insert_into_empty_region() {
        let lines = insert_grouped_line(
            template_lines(),
            MODULES_MARKER,
            "Containers",
            "import DynamicArrayUnitTests;",
        )
        .unwrap();

        let marker = position(&lines, MODULES_MARKER);
        assert_eq!(lines[marker + 1], "");
        assert_eq!(lines[marker + 2], "// Containers");
        assert_eq!(lines[marker + 3], "import DynamicArrayUnitTests;");
        assert_eq!(lines[marker + 4], "");
        assert_eq!(lines[marker + 5], "export bool RunUnitTests_Core()");
    }

    #[test]
    fn test_invocation_lines_follow_marker_indent() {
        let lines = insert_grouped_line(
            template_lines(),
            FUNCTIONS_MARKER,
            "Containers",
            "JPT_RETURN_FALSE_IF_ERROR(!RunDynamicArrayUnitTests(), \"DynamicArray Tests Failed\");",
        )
        .unwrap();

        let marker = position(&lines, "\t/** Unit Test Functions */");
        assert_eq!(lines[marker + 2], "\t// Containers");
        assert!(lines[marker + 3].starts_with("\tJPT_RETURN_FALSE_IF_ERROR"));
        assert_eq!(lines[marker + 4], "");
        assert_eq!(lines[marker + 5], "\treturn true;");
    }

    #[test]
    fn test_existing_group_is_reused() {
        let lines = insert_grouped_line(template_lines(), MODULES_MARKER, "Types", "import A;").unwrap();
        let lines = insert_grouped_line(lines, MODULES_MARKER, "Types", "import B;").unwrap();

        assert_eq!(lines.iter().filter(|line| *line == "// Types").count(), 1);
        let header = position(&lines, "// Types");
        assert_eq!(lines[header + 1], "import A;");
        assert_eq!(lines[header + 2], "import B;");
        assert_eq!(lines[header + 3], "");
    }

    #[test]
    fn test_groups_keep_their_own_lines() {
        let mut lines = template_lines();
        for (group, line) in [("Types", "import A;"), ("Containers", "import B;"), ("Types", "import C;")] {
            lines = insert_grouped_line(lines, MODULES_MARKER, group, line).unwrap();
        }

        let sections = Sections::parse(lines);
        let section = sections.section(MODULES_MARKER).unwrap();
        assert_eq!(section.group("Types").unwrap().lines, vec!["import A;", "import C;"]);
        assert_eq!(section.group("Containers").unwrap().lines, vec!["import B;"]);
        assert_eq!(section.groups().count(), 2);
    }

    #[test]
    fn test_missing_marker() {
        let lines = vec!["module;".to_string(), "".to_string()];
        assert!(insert_grouped_line(lines, MODULES_MARKER, "Types", "import A;").is_none());
    }

    #[test]
    fn test_markers_inside_group_comments_are_not_groups() {
        assert_eq!(group_key_of("\t// Containers"), Some("Containers"));
        assert_eq!(group_key_of("//"), None);
        assert_eq!(group_key_of("/** Unit Test Modules */"), None);
    }

    #[test]
    fn test_ensure_aggregation_file() {
        let tmp = TempDir::new().unwrap();
        let layout = Layout::new(&Config::default(), tmp.path());

        assert!(ensure_aggregation_file(&layout, "Core").unwrap());
        assert!(!ensure_aggregation_file(&layout, "Core").unwrap());

        let path = aggregation_path(&layout, "Core");
        assert!(path.ends_with("Source/ApplicationLayer/UnitTests_Core.ixx"));
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains(MODULES_MARKER));
        assert!(content.contains(FUNCTIONS_MARKER));
    }

    #[test]
    fn test_register_is_idempotent() {
        let path = Path::new("UnitTests_Core.ixx");
        let document = TextDocument::parse(&templates::unit_tests_category("Core"));
        let mut file = AggregationFile::from_document(path, document).unwrap();

        assert!(file.register(MODULES_MARKER, "Types", "import A;").unwrap());
        let once = file.render();
        assert!(!file.register(MODULES_MARKER, "Types", "import A;").unwrap());
        assert_eq!(file.render(), once);
    }

    #[test]
    fn test_load_rejects_file_without_markers() {
        let document = TextDocument::parse("module;\n\nexport bool RunUnitTests_Core()\n{\n\t/** Unit Test Functions */\n}\n");
        let err = AggregationFile::from_document(Path::new("UnitTests_Core.ixx"), document).unwrap_err();

        match err {
            Error::MissingMarker { marker, .. } => assert_eq!(marker, MODULES_MARKER),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_group_followed_directly_by_code() {
        let compact = "/** Unit Test Modules */\n\
                       \n\
                       // Types\n\
                       import StringUnitTests;\n\
                       export bool RunUnitTests_Core()\n\
                       {\n\
                       \t/** Unit Test Functions */\n\
                       \n\
                       \t// Types\n\
                       \tJPT_RETURN_FALSE_IF_ERROR(!RunStringUnitTests(), \"String Tests Failed\");\n\
                       \treturn true;\n\
                       }\n";
        let mut file = AggregationFile::from_document(
            Path::new("UnitTests_Core.ixx"),
            TextDocument::parse(compact),
        )
        .unwrap();

        let section = file.sections().section(MODULES_MARKER).unwrap();
        assert_eq!(section.group("Types").unwrap().lines, vec!["import StringUnitTests;"]);

        file.register(MODULES_MARKER, "Types", "import HashMapUnitTests;").unwrap();
        file.register(
            FUNCTIONS_MARKER,
            "Types",
            "JPT_RETURN_FALSE_IF_ERROR(!RunHashMapUnitTests(), \"HashMap Tests Failed\");",
        )
        .unwrap();

        let expected = "/** Unit Test Modules */\n\
                        \n\
                        // Types\n\
                        import StringUnitTests;\n\
                        import HashMapUnitTests;\n\
                        export bool RunUnitTests_Core()\n\
                        {\n\
                        \t/** Unit Test Functions */\n\
                        \n\
                        \t// Types\n\
                        \tJPT_RETURN_FALSE_IF_ERROR(!RunStringUnitTests(), \"String Tests Failed\");\n\
                        \tJPT_RETURN_FALSE_IF_ERROR(!RunHashMapUnitTests(), \"HashMap Tests Failed\");\n\
                        \treturn true;\n\
                        }\n";
        assert_eq!(file.render(), expected);
    }

    #[test]
    fn test_render_keeps_crlf() {
        let content = templates::unit_tests_category("Core").replace('\n', "\r\n");
        let mut file = AggregationFile::from_document(
            Path::new("UnitTests_Core.ixx"),
            TextDocument::parse(&content),
        )
        .unwrap();
        file.register(MODULES_MARKER, "Types", "import A;").unwrap();

        let rendered = file.render();
        assert!(rendered.contains("// Types\r\nimport A;\r\n"));
        assert!(!rendered.replace("\r\n", "").contains('\n'));
    }
}
