//! jpt-tools - developer tooling for the Jupiter engine
//!
//! This library scaffolds unit tests: it writes a new test module from a
//! template and lists it in the aggregation file of its category.

pub mod config;
pub mod error;
pub mod regenerate;
pub mod templates;
pub mod ui;
pub mod unit_tests;

pub use error::{Error, Result};
