//! Project regeneration - rebuild IDE project files after sources change

use std::path::{Path, PathBuf};
use std::process::Command;
use crate::Result;
use crate::error::Error;

/// Regenerator trait - interface for the project-file generator
pub trait Regenerator {
    /// Short description used in progress output
    fn describe(&self) -> String;

    /// Run the generator from `scripts_dir`, blocking until it exits
    fn regenerate(&self, scripts_dir: &Path) -> Result<()>;
}

/// Runs an external command such as `GenerateProjects.bat`
pub struct CommandRegenerator {
    program: String,
    args: Vec<String>,
}

impl CommandRegenerator {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Build from a config `regenerate_command` entry: program followed by its arguments
    pub fn from_command(command: &[String]) -> Result<Self> {
        let (program, args) = command
            .split_first()
            .ok_or_else(|| Error::Config("regenerate_command is empty".to_string()))?;
        Ok(Self::new(program.clone(), args.to_vec()))
    }

    /// Scripts shipped next to the tool are resolved against the scripts dir;
    /// anything else is left to the PATH lookup.
    fn resolve_program(&self, scripts_dir: &Path) -> PathBuf {
        let local = scripts_dir.join(&self.program);
        if local.is_file() {
            local
        } else {
            PathBuf::from(&self.program)
        }
    }
}

impl Regenerator for CommandRegenerator {
    fn describe(&self) -> String {
        std::iter::once(&self.program)
            .chain(&self.args)
            .cloned()
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn regenerate(&self, scripts_dir: &Path) -> Result<()> {
        let program = self.resolve_program(scripts_dir);
        tracing::info!("Running {:?} {:?} in {:?}", program, self.args, scripts_dir);

        let status = Command::new(&program)
            .args(&self.args)
            .current_dir(scripts_dir)
            .status()
            .map_err(|e| Error::Collaborator(format!("Failed to start {:?}: {}", program, e)))?;

        if !status.success() {
            return Err(Error::Collaborator(format!(
                "{} exited with code {}",
                self.describe(),
                status.code().unwrap_or(-1)
            )));
        }
        Ok(())
    }
}

/// Skips regeneration entirely
pub struct SkipRegeneration;

impl Regenerator for SkipRegeneration {
    fn describe(&self) -> String {
        "skip".to_string()
    }

    fn regenerate(&self, _scripts_dir: &Path) -> Result<()> {
        tracing::debug!("Project regeneration skipped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_from_empty_command() {
        assert!(matches!(
            CommandRegenerator::from_command(&[]),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_describe() {
        let regen = CommandRegenerator::from_command(&[
            "premake5".to_string(),
            "vs2022".to_string(),
        ])
        .unwrap();
        assert_eq!(regen.describe(), "premake5 vs2022");
    }

    #[test]
    fn test_resolve_local_script() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("GenerateProjects.bat"), "").unwrap();

        let local = CommandRegenerator::new("GenerateProjects.bat", vec![]);
        assert_eq!(local.resolve_program(tmp.path()), tmp.path().join("GenerateProjects.bat"));

        let on_path = CommandRegenerator::new("premake5", vec![]);
        assert_eq!(on_path.resolve_program(tmp.path()), PathBuf::from("premake5"));
    }

    #[test]
    fn test_missing_program_is_collaborator_failure() {
        let tmp = TempDir::new().unwrap();
        let regen = CommandRegenerator::new("jpt-tools-no-such-program", vec![]);
        assert!(matches!(
            regen.regenerate(tmp.path()),
            Err(Error::Collaborator(_))
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_exit_status_is_observed() {
        let tmp = TempDir::new().unwrap();

        let ok = CommandRegenerator::new("sh", vec!["-c".to_string(), "exit 0".to_string()]);
        assert!(ok.regenerate(tmp.path()).is_ok());

        let failing = CommandRegenerator::new("sh", vec!["-c".to_string(), "exit 3".to_string()]);
        match failing.regenerate(tmp.path()) {
            Err(Error::Collaborator(msg)) => assert!(msg.contains("code 3")),
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
