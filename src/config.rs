// Netrun
// Copyright (C) 2023 - Michael DeHaan <michael@michaeldehaan.net> + contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// at your option) any later version.
// 
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
// 
// You should have received a copy of the GNU General Public License
// long with this program.  If not, see <http://www.gnu.org/licenses/>.

use std::path::{Path, PathBuf};
use serde::{Deserialize, Serialize};
use crate::error::{NetrunError, Result};
use crate::runners::threaded::DEFAULT_NUM_WORKERS;
use crate::util::io::{read_local_file, resolve_path};
use crate::util::yaml::{from_optional_str, yaml_error_in_context};

/// Configuration for a netrun handle. Loaded from YAML or built in code; every
/// section may be omitted.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NetrunConfig {
    #[serde(default)]
    pub core: CoreConfig,
    #[serde(default)]
    pub inventory: InventoryConfig,
    #[serde(default)]
    pub runner: RunnerConfig,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CoreConfig {
    /// Turn any failed host into an error returned from `run`.
    #[serde(default)]
    pub raise_on_error: bool,
    /// Passed to every task; tasks decide what a dry run means for them.
    #[serde(default)]
    pub dry_run: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InventoryConfig {
    #[serde(default = "default_inventory_plugin")]
    pub plugin: String,
    #[serde(default)]
    pub options: InventoryOptions,
}

/// Options for the inventory plugin. Keys other than the three file paths are kept
/// in `extras` for plugins that need them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InventoryOptions {
    #[serde(default = "default_host_file")]
    pub host_file: PathBuf,
    #[serde(default = "default_group_file")]
    pub group_file: PathBuf,
    #[serde(default = "default_defaults_file")]
    pub defaults_file: PathBuf,
    #[serde(flatten)]
    pub extras: serde_yaml::Mapping,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunnerConfig {
    #[serde(default = "default_runner_plugin")]
    pub plugin: String,
    #[serde(default)]
    pub options: RunnerOptions,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunnerOptions {
    #[serde(default = "default_num_workers")]
    pub num_workers: usize,
    #[serde(default)]
    pub abort_on_failure: bool,
}

fn default_inventory_plugin() -> String { String::from("SimpleInventory") }
fn default_runner_plugin() -> String { String::from("threaded") }
fn default_host_file() -> PathBuf { PathBuf::from("hosts.yaml") }
fn default_group_file() -> PathBuf { PathBuf::from("groups.yaml") }
fn default_defaults_file() -> PathBuf { PathBuf::from("defaults.yaml") }
fn default_num_workers() -> usize { DEFAULT_NUM_WORKERS }

impl Default for InventoryConfig {
    fn default() -> Self {
        Self {
            plugin: default_inventory_plugin(),
            options: InventoryOptions::default(),
        }
    }
}

impl Default for InventoryOptions {
    fn default() -> Self {
        Self {
            host_file: default_host_file(),
            group_file: default_group_file(),
            defaults_file: default_defaults_file(),
            extras: serde_yaml::Mapping::new(),
        }
    }
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            plugin: default_runner_plugin(),
            options: RunnerOptions::default(),
        }
    }
}

impl Default for RunnerOptions {
    fn default() -> Self {
        Self {
            num_workers: default_num_workers(),
            abort_on_failure: false,
        }
    }
}

impl NetrunConfig {

    pub fn new() -> Self {
        Self::default()
    }

    /// Load a config file. Relative inventory paths are taken relative to the
    /// directory holding the file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = read_local_file(path).map_err(|e| NetrunError::Config(e.to_string()))?;
        let mut config = Self::parse(&contents, path)?;
        let base = path.parent().map(Path::to_path_buf);
        config.resolve_paths(base.as_deref());
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml_str(contents: &str) -> Result<Self> {
        let config = Self::parse(contents, Path::new("<config>"))?;
        config.validate()?;
        Ok(config)
    }

    fn parse(contents: &str, path: &Path) -> Result<Self> {
        from_optional_str(contents).map_err(|e| NetrunError::Config(yaml_error_in_context(&e, path, contents)))
    }

    pub fn validate(&self) -> Result<()> {
        if self.runner.options.num_workers == 0 {
            return Err(NetrunError::Config(String::from("runner.options.num_workers must be a positive integer")));
        }
        if self.inventory.plugin.is_empty() {
            return Err(NetrunError::Config(String::from("inventory.plugin must not be empty")));
        }
        if self.runner.plugin.is_empty() {
            return Err(NetrunError::Config(String::from("runner.plugin must not be empty")));
        }
        Ok(())
    }

    /// Expand `~` in the inventory paths and anchor relative ones at `base`.
    pub fn resolve_paths(&mut self, base: Option<&Path>) {
        let options = &mut self.inventory.options;
        options.host_file = resolve_path(&options.host_file, base);
        options.group_file = resolve_path(&options.group_file, base);
        options.defaults_file = resolve_path(&options.defaults_file, base);
    }

    // builder style overrides, applied after loading

    pub fn raise_on_error(mut self, raise: bool) -> Self {
        self.core.raise_on_error = raise;
        self
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.core.dry_run = dry_run;
        self
    }

    pub fn inventory_plugin(mut self, plugin: impl Into<String>) -> Self {
        self.inventory.plugin = plugin.into();
        self
    }

    pub fn host_file<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.inventory.options.host_file = path.into();
        self
    }

    pub fn group_file<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.inventory.options.group_file = path.into();
        self
    }

    pub fn defaults_file<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.inventory.options.defaults_file = path.into();
        self
    }

    pub fn runner(mut self, plugin: impl Into<String>) -> Self {
        self.runner.plugin = plugin.into();
        self
    }

    pub fn num_workers(mut self, num_workers: usize) -> Self {
        self.runner.options.num_workers = num_workers;
        self
    }

    pub fn abort_on_failure(mut self, abort: bool) -> Self {
        self.runner.options.abort_on_failure = abort;
        self
    }

    pub fn serial(self) -> Self {
        self.runner("serial")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = NetrunConfig::from_yaml_str("").unwrap();
        assert_eq!(config, NetrunConfig::default());
        assert_eq!(config.runner.plugin, "threaded");
        assert_eq!(config.runner.options.num_workers, 20);
        assert_eq!(config.inventory.plugin, "SimpleInventory");
        assert_eq!(config.inventory.options.host_file, PathBuf::from("hosts.yaml"));
        assert!(!config.core.raise_on_error);
    }

    #[test]
    fn test_full_document() {
        let yaml = "\
core:
  raise_on_error: true
inventory:
  plugin: SimpleInventory
  options:
    host_file: inv/hosts.yaml
    source: netbox
runner:
  plugin: serial
  options:
    num_workers: 5
    abort_on_failure: true
";
        let config = NetrunConfig::from_yaml_str(yaml).unwrap();
        assert!(config.core.raise_on_error);
        assert_eq!(config.runner.plugin, "serial");
        assert_eq!(config.runner.options.num_workers, 5);
        assert!(config.runner.options.abort_on_failure);
        assert_eq!(config.inventory.options.host_file, PathBuf::from("inv/hosts.yaml"));
        assert_eq!(config.inventory.options.group_file, PathBuf::from("groups.yaml"));
        assert_eq!(config.inventory.options.extras.get("source").and_then(|v| v.as_str()), Some("netbox"));
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        assert!(matches!(NetrunConfig::from_yaml_str("logging:\n  enabled: false\n"), Err(NetrunError::Config(_))));
        assert!(NetrunConfig::from_yaml_str("runner:\n  options:\n    workers: 4\n").is_err());
    }

    #[test]
    fn test_zero_workers_is_rejected() {
        let result = NetrunConfig::from_yaml_str("runner:\n  options:\n    num_workers: 0\n");
        assert!(matches!(result, Err(NetrunError::Config(ref msg)) if msg.contains("num_workers")));
    }

    #[test]
    fn test_from_file_resolves_relative_paths() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.yaml");
        fs::write(&config_path, "inventory:\n  options:\n    host_file: inventory/hosts.yaml\n    group_file: /etc/netrun/groups.yaml\n").unwrap();

        let config = NetrunConfig::from_file(&config_path).unwrap();
        assert_eq!(config.inventory.options.host_file, temp_dir.path().join("inventory/hosts.yaml"));
        assert_eq!(config.inventory.options.group_file, PathBuf::from("/etc/netrun/groups.yaml"));
        assert_eq!(config.inventory.options.defaults_file, temp_dir.path().join("defaults.yaml"));
    }

    #[test]
    fn test_missing_config_file() {
        let temp_dir = TempDir::new().unwrap();
        assert!(matches!(NetrunConfig::from_file(&temp_dir.path().join("nope.yaml")), Err(NetrunError::Config(_))));
    }

    #[test]
    fn test_builder_overrides() {
        let config = NetrunConfig::new().num_workers(4).serial().raise_on_error(true).dry_run(true);
        assert_eq!(config.runner.options.num_workers, 4);
        assert_eq!(config.runner.plugin, "serial");
        assert!(config.core.raise_on_error);
        assert!(config.core.dry_run);
    }
}
