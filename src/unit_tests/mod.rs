//! Unit-test scaffolding.
//!
//! Adding a unit test writes a new module for the subject and lists it in the
//! aggregation file of its main category, so that the category's
//! `RunUnitTests_<Category>()` runs it.

pub mod aggregation;
pub mod application;
mod document;
mod subject;

pub use aggregation::{AggregationFile, FUNCTIONS_MARKER, MODULES_MARKER};
pub use application::ApplicationFile;
pub use document::TextDocument;
pub use subject::TestSubject;

use std::path::PathBuf;
use crate::config::Layout;
use crate::error::Error;
use crate::regenerate::Regenerator;
use crate::templates;
use crate::Result;

/// Everything one scaffold run needs
#[derive(Debug, Clone)]
pub struct UnitTestRequest {
    pub subject: TestSubject,
    pub layout: Layout,
}

impl UnitTestRequest {
    pub fn new(subject: TestSubject, layout: Layout) -> Self {
        Self { subject, layout }
    }

    /// `<source>/<categories>/<Subject>UnitTests.<ext>`
    pub fn module_path(&self) -> PathBuf {
        self.layout
            .source_dir
            .join(self.subject.category_dir())
            .join(format!(
                "{}.{}",
                self.subject.module_name(),
                self.layout.module_extension
            ))
    }

    pub fn aggregation_path(&self) -> PathBuf {
        aggregation::aggregation_path(&self.layout, self.subject.main_category())
    }
}

/// What a successful run changed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddedUnitTest {
    pub module_path: PathBuf,
    pub aggregation_path: PathBuf,
    pub aggregation_created: bool,
    /// Lines added to the aggregation file (0 to 2)
    pub lines_inserted: usize,
    /// Set when the category was newly added to the application file
    pub registered_in: Option<PathBuf>,
}

/// Write the subject's module and list it in its aggregation file.
///
/// Fails with [`Error::AlreadyExists`] before writing anything if the module
/// exists. Every edit is prepared in memory first, so a malformed aggregation
/// or application file leaves the tree as it was (apart from a freshly
/// created aggregation file).
pub fn add_unit_test(request: &UnitTestRequest) -> Result<AddedUnitTest> {
    let subject = &request.subject;
    let module_path = request.module_path();

    if module_path.exists() {
        return Err(Error::AlreadyExists(module_path));
    }
    tracing::info!("Adding <{}>", subject.module_name());

    let aggregation_created =
        aggregation::ensure_aggregation_file(&request.layout, subject.main_category())?;
    let aggregation_path = request.aggregation_path();

    let mut aggregation = AggregationFile::load(&aggregation_path)?;
    let group = subject.group_key();
    let mut lines_inserted = 0;
    if aggregation.register(MODULES_MARKER, group, &subject.import_line())? {
        lines_inserted += 1;
    }
    if aggregation.register(FUNCTIONS_MARKER, group, &subject.invocation_line())? {
        lines_inserted += 1;
    }

    let application = prepare_application(request)?;

    if let Some(dir) = module_path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    std::fs::write(&module_path, templates::unit_test_module(subject.name()))?;
    tracing::debug!("Wrote {:?}", module_path);

    if lines_inserted > 0 {
        aggregation.save()?;
        tracing::debug!("Updated {:?} (+{} lines)", aggregation_path, lines_inserted);
    }

    let registered_in = match application {
        Some(application) => {
            application.save()?;
            Some(request.layout.application_file.clone())
        }
        None => None,
    };

    Ok(AddedUnitTest {
        module_path,
        aggregation_path,
        aggregation_created,
        lines_inserted,
        registered_in,
    })
}

/// Load the application file and register the main category in memory.
/// `None` when there is nothing to write.
fn prepare_application(request: &UnitTestRequest) -> Result<Option<ApplicationFile>> {
    let path = &request.layout.application_file;
    if !path.is_file() {
        tracing::warn!("No unit-test application at {:?}, skipping category registration", path);
        return Ok(None);
    }

    let mut application = ApplicationFile::load(path)?;
    let registered = application.register(request.subject.main_category())?;
    Ok(registered.then_some(application))
}

/// [`add_unit_test`], then regenerate the project files.
///
/// A regeneration failure is returned as [`Error::Collaborator`] but the
/// files written before it stay in place.
pub fn scaffold(request: &UnitTestRequest, regenerator: &dyn Regenerator) -> Result<AddedUnitTest> {
    let added = add_unit_test(request)?;
    regenerator.regenerate(&request.layout.scripts_dir)?;
    Ok(added)
}
