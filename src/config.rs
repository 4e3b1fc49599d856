//! Configuration management

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use crate::Result;
use crate::error::Error;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Unit-test project root (the directory holding `Source` and `Scripts`)
    #[serde(default)]
    pub unit_tests_root: Option<PathBuf>,

    /// Source tree, relative to the root
    #[serde(default = "default_source_dir")]
    pub source_dir: String,

    /// Scripts directory, relative to the root
    #[serde(default = "default_scripts_dir")]
    pub scripts_dir: String,

    /// Where aggregation files live, relative to the source tree
    #[serde(default = "default_application_layer_dir")]
    pub application_layer_dir: String,

    /// Extension of generated module files
    #[serde(default = "default_module_extension")]
    pub module_extension: String,

    /// Unit-test application that runs every category, relative to the source tree
    #[serde(default = "default_application_file")]
    pub application_file: String,

    /// Project regeneration command, run from the scripts directory
    #[serde(default = "default_regenerate_command")]
    pub regenerate_command: Vec<String>,
}

fn default_source_dir() -> String {
    "Source".to_string()
}

fn default_scripts_dir() -> String {
    "Scripts".to_string()
}

fn default_application_layer_dir() -> String {
    "ApplicationLayer".to_string()
}

fn default_module_extension() -> String {
    "ixx".to_string()
}

fn default_application_file() -> String {
    "ApplicationLayer/Application_JupiterUnitTests.cpp".to_string()
}

fn default_regenerate_command() -> Vec<String> {
    vec!["GenerateProjects.bat".to_string()]
}

impl Default for Config {
    fn default() -> Self {
        Self {
            unit_tests_root: None,
            source_dir: default_source_dir(),
            scripts_dir: default_scripts_dir(),
            application_layer_dir: default_application_layer_dir(),
            module_extension: default_module_extension(),
            application_file: default_application_file(),
            regenerate_command: default_regenerate_command(),
        }
    }
}

/// Get the config directory path
pub fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".jupiter")
}

/// Get the config file path
pub fn config_path() -> PathBuf {
    config_dir().join("tools.json")
}

/// Load configuration, falling back to defaults when no file exists
pub fn load() -> Result<Config> {
    load_from(&config_path())
}

/// Load configuration from a specific file
pub fn load_from(path: &Path) -> Result<Config> {
    if !path.exists() {
        tracing::debug!("No config at {:?}, using defaults", path);
        return Ok(Config::default());
    }

    let content = std::fs::read_to_string(path)?;
    let config: Config = serde_json::from_str(&content)?;
    Ok(config)
}

/// Save configuration to file
pub fn save(config: &Config) -> Result<()> {
    save_to(config, &config_path())
}

/// Save configuration to a specific file
pub fn save_to(config: &Config, path: &Path) -> Result<()> {
    // Create parent directory
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let content = serde_json::to_string_pretty(config)?;
    std::fs::write(path, content)?;
    Ok(())
}

/// Resolved filesystem locations for one unit-test project
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    pub root: PathBuf,
    pub source_dir: PathBuf,
    pub scripts_dir: PathBuf,
    pub application_layer_dir: PathBuf,
    pub application_file: PathBuf,
    pub module_extension: String,
}

impl Layout {
    /// Build a layout rooted at `root` without touching the filesystem
    pub fn new(config: &Config, root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let source_dir = root.join(&config.source_dir);

        Self {
            scripts_dir: root.join(&config.scripts_dir),
            application_layer_dir: source_dir.join(&config.application_layer_dir),
            application_file: source_dir.join(&config.application_file),
            module_extension: config.module_extension.trim_start_matches('.').to_string(),
            source_dir,
            root,
        }
    }

    /// Resolve the project root and check that its source tree exists.
    ///
    /// Precedence: `root_override`, then `unit_tests_root` from the config,
    /// then the current directory with a trailing `Scripts` component stripped.
    pub fn resolve(config: &Config, root_override: Option<&Path>) -> Result<Self> {
        let root = match (root_override, &config.unit_tests_root) {
            (Some(root), _) => root.to_path_buf(),
            (None, Some(root)) => root.clone(),
            (None, None) => project_root_from(&std::env::current_dir()?, &config.scripts_dir),
        };

        let layout = Self::new(config, root);
        if !layout.source_dir.is_dir() {
            return Err(Error::Config(format!(
                "Source directory not found at {:?}. Run from the Scripts folder or pass --root.",
                layout.source_dir
            )));
        }

        tracing::debug!("Resolved project root {:?}", layout.root);
        Ok(layout)
    }
}

/// Strip a trailing scripts component from `dir`, if present
pub fn project_root_from(dir: &Path, scripts_dir: &str) -> PathBuf {
    match (dir.file_name(), dir.parent()) {
        (Some(name), Some(parent)) if name == scripts_dir => parent.to_path_buf(),
        _ => dir.to_path_buf(),
    }
}
