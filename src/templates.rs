//! Source templates for generated unit-test files.
//!
//! Templates are embedded at compile time from the `templates/` directory.
//! This ensures they're always available and versioned with the codebase.

/// Placeholder replaced with the test subject's name
pub const SUBJECT_PLACEHOLDER: &str = "<SubjectName>";

/// Placeholder replaced with the main category's name
pub const CATEGORY_PLACEHOLDER: &str = "<CategoryName>";

/// A single unit-test module for one subject
pub const UNIT_TEST_MODULE: &str = include_str!("../templates/UnitTestModule.ixx");

/// Per-category aggregation module, with empty import and invocation regions
pub const UNIT_TESTS_CATEGORY: &str = include_str!("../templates/UnitTestsCategory.ixx");

/// Substitute every `(placeholder, value)` pair into `template`.
pub fn render(template: &str, substitutions: &[(&str, &str)]) -> String {
    substitutions
        .iter()
        .fold(template.to_string(), |acc, (placeholder, value)| {
            acc.replace(placeholder, value)
        })
}

/// Render the unit-test module for `subject_name`
pub fn unit_test_module(subject_name: &str) -> String {
    render(UNIT_TEST_MODULE, &[(SUBJECT_PLACEHOLDER, subject_name)])
}

/// Render the aggregation module for `category`
pub fn unit_tests_category(category: &str) -> String {
    render(UNIT_TESTS_CATEGORY, &[(CATEGORY_PLACEHOLDER, category)])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::unit_tests::aggregation::{FUNCTIONS_MARKER, MODULES_MARKER};

    #[test]
    fn test_templates_not_empty() {
        assert!(!UNIT_TEST_MODULE.is_empty());
        assert!(!UNIT_TESTS_CATEGORY.is_empty());
    }

    #[test]
    fn test_category_template_has_markers() {
        assert!(UNIT_TESTS_CATEGORY.contains(MODULES_MARKER));
        assert!(UNIT_TESTS_CATEGORY.contains(FUNCTIONS_MARKER));
    }

    #[test]
    fn test_unit_test_module_substitutes_every_placeholder() {
        let content = unit_test_module("DynamicArray");

        assert!(!content.contains(SUBJECT_PLACEHOLDER));
        assert!(content.contains("export module DynamicArrayUnitTests;"));
        assert!(content.contains("jpt::DynamicArray instance;"));
        assert!(content.contains("bool UnitTest_DynamicArray()"));
        assert!(content.contains("export bool RunDynamicArrayUnitTests()"));
        assert!(content.contains("\"UnitTest_DynamicArray Failed\""));
    }

    #[test]
    fn test_unit_tests_category() {
        let content = unit_tests_category("Core");

        assert!(!content.contains(CATEGORY_PLACEHOLDER));
        assert!(content.contains("export module UnitTests_Core;"));
        assert!(content.contains("export bool RunUnitTests_Core()"));
    }

    #[test]
    fn test_render_leaves_unknown_placeholders() {
        let rendered = render("<A> and <B>", &[("<A>", "x")]);
        assert_eq!(rendered, "x and <B>");
    }
}
