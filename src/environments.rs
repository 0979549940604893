//! # Base Environments
//!
//! Content declares the environment it runs in by naming a previously
//! published *base environment*. The base is consulted read-only during the
//! inheritance pass (machine defaults) and the expansion pass (init tasks a
//! content task may depend on).
//!
//! Fetching is behind the [`BaseEnvironmentSource`] trait:
//!
//! - [`CommandEnvironmentSource`] runs an external command
//!   (`labctl playground manifest <name>` by default) and parses its stdout.
//! - [`DirectoryEnvironmentSource`] reads `<dir>/<name>.yaml`.
//! - [`StaticEnvironmentSource`] serves environments registered in memory.
//!
//! Any failure is fatal to the compilation.

use serde::Deserialize;
use std::collections::HashMap;
use std::path::PathBuf;

use crate::command::ExternalCommand;
use crate::error::{Error, Result};
use crate::manifest::{EnvironmentSpec, MachineSpec};

/// A fetched base environment.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct BaseEnvironment {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub playground: EnvironmentSpec,
}

impl BaseEnvironment {
    pub fn parse(yaml: &str, name: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(|e| Error::BaseEnvironment {
            name: name.to_string(),
            message: format!("invalid manifest: {}", e),
        })
    }

    pub fn machine(&self, name: &str) -> Option<&MachineSpec> {
        self.playground.machine(name)
    }
}

/// Looks up base environments by name.
pub trait BaseEnvironmentSource {
    fn fetch(&self, name: &str) -> Result<BaseEnvironment>;
}

/// Fetches base environments by running an external command.
#[derive(Debug, Clone)]
pub struct CommandEnvironmentSource {
    command: ExternalCommand,
}

impl CommandEnvironmentSource {
    pub fn new(command_line: &str) -> Result<Self> {
        let command = ExternalCommand::parse(command_line).ok_or_else(|| Error::BaseEnvironment {
            name: String::new(),
            message: "empty base environment command".to_string(),
        })?;
        Ok(Self { command })
    }
}

impl BaseEnvironmentSource for CommandEnvironmentSource {
    fn fetch(&self, name: &str) -> Result<BaseEnvironment> {
        let stdout = self.command.run(name).map_err(|message| Error::BaseEnvironment {
            name: name.to_string(),
            message,
        })?;
        BaseEnvironment::parse(&stdout, name)
    }
}

/// Reads base environments from `<dir>/<name>.yaml`.
#[derive(Debug, Clone)]
pub struct DirectoryEnvironmentSource {
    dir: PathBuf,
}

impl DirectoryEnvironmentSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl BaseEnvironmentSource for DirectoryEnvironmentSource {
    fn fetch(&self, name: &str) -> Result<BaseEnvironment> {
        let path = self.dir.join(format!("{}.yaml", name));
        let text = std::fs::read_to_string(&path).map_err(|e| Error::BaseEnvironment {
            name: name.to_string(),
            message: format!("{}: {}", path.display(), e),
        })?;
        BaseEnvironment::parse(&text, name)
    }
}

/// Serves base environments from memory.
#[derive(Debug, Clone, Default)]
pub struct StaticEnvironmentSource {
    environments: HashMap<String, BaseEnvironment>,
}

impl StaticEnvironmentSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &str, environment: BaseEnvironment) -> Self {
        self.environments.insert(name.to_string(), environment);
        self
    }
}

impl BaseEnvironmentSource for StaticEnvironmentSource {
    fn fetch(&self, name: &str) -> Result<BaseEnvironment> {
        self.environments
            .get(name)
            .cloned()
            .ok_or_else(|| Error::BaseEnvironment {
                name: name.to_string(),
                message: "not found".to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const UBUNTU: &str = r#"
kind: playground
name: ubuntu-24-04
playground:
  machines:
    - name: ubuntu-01
      users:
        - name: root
        - name: laborant
          default: true
      resources:
        cpuCount: 2
        ramSize: 4Gi
  initTasks:
    init_git_clone:
      name: init_git_clone
      machine: ubuntu-01
      init: true
      user: laborant
      run: git clone https://example.com/repo
"#;

    #[test]
    fn test_parse_base_environment() {
        let base = BaseEnvironment::parse(UBUNTU, "ubuntu-24-04").unwrap();
        assert_eq!(base.name, "ubuntu-24-04");
        let machine = base.machine("ubuntu-01").unwrap();
        assert_eq!(machine.users.len(), 2);
        assert_eq!(machine.resources.ram_size, "4Gi");
        assert!(base.playground.init_tasks.contains_key("init_git_clone"));
        assert!(base.machine("missing").is_none());
    }

    #[test]
    fn test_directory_source() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("ubuntu.yaml"), UBUNTU).unwrap();

        let source = DirectoryEnvironmentSource::new(temp.path());
        let base = source.fetch("ubuntu").unwrap();
        assert_eq!(base.playground.machines.len(), 1);

        let err = source.fetch("alpine").unwrap_err();
        assert!(matches!(err, Error::BaseEnvironment { ref name, .. } if name == "alpine"));
    }

    #[test]
    fn test_static_source() {
        let source = StaticEnvironmentSource::new().with("flexbox", BaseEnvironment::default());
        assert!(source.fetch("flexbox").is_ok());
        assert!(source.fetch("ubuntu").is_err());
    }

    #[test]
    fn test_command_source_requires_command() {
        assert!(CommandEnvironmentSource::new("").is_err());
    }

    #[test]
    #[cfg(unix)]
    fn test_command_source_failure_is_error() {
        let source = CommandEnvironmentSource::new("false").unwrap();
        let err = source.fetch("ubuntu").unwrap_err();
        assert!(err.to_string().contains("Failed to fetch base environment 'ubuntu'"));
    }
}
