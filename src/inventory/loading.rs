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

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use indexmap::IndexMap;
use crate::config::InventoryOptions;
use crate::error::{NetrunError, Result};
use crate::inventory::attributes::{Attributes, DefaultsSpec, GroupSpec, HostSpec};
use crate::inventory::groups::{Defaults, Group};
use crate::inventory::hosts::Host;
use crate::inventory::inventory::Inventory;
use crate::util::io::{read_local_file, read_optional_file};
use crate::util::yaml::{from_optional_str, yaml_error_in_context};

/// Anything that can produce an inventory at configuration load time.
pub trait InventoryPlugin: Send + Sync {
    fn load(&self) -> Result<Inventory>;
}

/// Reads hosts, groups and defaults from three YAML files. The hosts file is required,
/// the other two may be absent.
pub struct SimpleInventory {
    pub host_file     : PathBuf,
    pub group_file    : PathBuf,
    pub defaults_file : PathBuf,
}

impl SimpleInventory {

    pub fn new(options: &InventoryOptions) -> Self {
        Self {
            host_file: options.host_file.clone(),
            group_file: options.group_file.clone(),
            defaults_file: options.defaults_file.clone(),
        }
    }
}

impl InventoryPlugin for SimpleInventory {

    fn load(&self) -> Result<Inventory> {
        let hosts = read_local_file(&self.host_file)?;
        let groups = read_optional_file(&self.group_file)?;
        let defaults = read_optional_file(&self.defaults_file)?;

        let host_docs : IndexMap<String, Option<HostSpec>> = parse(&hosts, &self.host_file)?;
        let group_docs : IndexMap<String, Option<GroupSpec>> = parse(&groups, &self.group_file)?;
        let defaults_doc : DefaultsSpec = parse(&defaults, &self.defaults_file)?;

        build_inventory(host_docs, group_docs, defaults_doc)
    }
}

impl Inventory {

    /// Build an inventory from the three documents directly, mostly useful for tests and embedding.
    pub fn from_yaml_str(hosts: &str, groups: &str, defaults: &str) -> Result<Inventory> {
        let host_docs : IndexMap<String, Option<HostSpec>> = parse(hosts, Path::new("<hosts>"))?;
        let group_docs : IndexMap<String, Option<GroupSpec>> = parse(groups, Path::new("<groups>"))?;
        let defaults_doc : DefaultsSpec = parse(defaults, Path::new("<defaults>"))?;
        build_inventory(host_docs, group_docs, defaults_doc)
    }
}

fn parse<T>(contents: &str, path: &Path) -> Result<T>
where
    T: serde::de::DeserializeOwned + Default,
{
    from_optional_str(contents).map_err(|e| NetrunError::Inventory(yaml_error_in_context(&e, path, contents)))
}

// ==============================================================================================================
// PRIVATE INTERNALS
// ==============================================================================================================

fn build_inventory(
    host_docs: IndexMap<String, Option<HostSpec>>,
    group_docs: IndexMap<String, Option<GroupSpec>>,
    defaults_doc: DefaultsSpec,
) -> Result<Inventory> {

    let defaults = Arc::new(Defaults::new(Attributes::from(defaults_doc)));

    let mut pending : IndexMap<String, (Attributes, Vec<String>)> = IndexMap::new();
    for (name, spec) in group_docs.into_iter() {
        pending.insert(name, spec.unwrap_or_default().split());
    }

    // groups are built parents first so every Group holds finished parent handles
    let mut groups : IndexMap<String, Arc<Group>> = IndexMap::new();
    let names : Vec<String> = pending.keys().cloned().collect();
    for name in names.iter() {
        let mut visiting : Vec<String> = Vec::new();
        build_group(name, &pending, &mut groups, &mut visiting)?;
    }
    // keep the declared order rather than the build order
    let groups : IndexMap<String, Arc<Group>> = names.iter()
        .filter_map(|n| groups.get(n).map(|g| (n.clone(), Arc::clone(g))))
        .collect();

    let mut hosts : IndexMap<String, Arc<Host>> = IndexMap::new();
    for (name, spec) in host_docs.into_iter() {
        let (attributes, group_names) = spec.unwrap_or_default().split();
        let host_groups = resolve_references(&group_names, &groups, |missing| {
            format!("host '{}' references undeclared group '{}'", name, missing)
        })?;
        let host = Host::new(&name, attributes, host_groups, Arc::clone(&defaults));
        hosts.insert(name, Arc::new(host));
    }

    tracing::debug!(hosts = hosts.len(), groups = groups.len(), "inventory loaded");
    Ok(Inventory::new(hosts, groups, defaults))
}

fn build_group(
    name: &str,
    pending: &IndexMap<String, (Attributes, Vec<String>)>,
    groups: &mut IndexMap<String, Arc<Group>>,
    visiting: &mut Vec<String>,
) -> Result<()> {

    if groups.contains_key(name) {
        return Ok(());
    }
    if visiting.iter().any(|v| v == name) {
        let mut cycle = visiting.clone();
        cycle.push(name.to_string());
        return Err(NetrunError::Inventory(format!("circular group reference: {}", cycle.join(" -> "))));
    }

    let parent_names = match pending.get(name) {
        Some((_attributes, parents)) => parents.clone(),
        None => return Err(NetrunError::Inventory(format!("undeclared group '{}'", name))),
    };

    visiting.push(name.to_string());
    let mut seen : HashSet<&str> = HashSet::new();
    for parent in parent_names.iter() {
        if !seen.insert(parent.as_str()) {
            continue;
        }
        if !pending.contains_key(parent) {
            return Err(NetrunError::Inventory(format!("group '{}' references undeclared parent group '{}'", name, parent)));
        }
        build_group(parent, pending, groups, visiting)?;
    }
    visiting.pop();

    let parents = resolve_references(&parent_names, groups, |missing| {
        format!("group '{}' references undeclared parent group '{}'", name, missing)
    })?;
    let attributes = match pending.get(name) {
        Some((attributes, _parents)) => attributes.clone(),
        None => Attributes::default(),
    };
    groups.insert(name.to_string(), Arc::new(Group::new(name, attributes, parents)));
    Ok(())
}

fn resolve_references<F>(names: &[String], groups: &IndexMap<String, Arc<Group>>, describe: F) -> Result<Vec<Arc<Group>>>
where
    F: Fn(&str) -> String,
{
    let mut results : Vec<Arc<Group>> = Vec::new();
    for group_name in names.iter() {
        if results.iter().any(|g| &g.name == group_name) {
            continue;
        }
        match groups.get(group_name) {
            Some(group) => results.push(Arc::clone(group)),
            None => return Err(NetrunError::Inventory(describe(group_name))),
        }
    }
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_undeclared_group_is_an_error() {
        let result = Inventory::from_yaml_str("sw1:\n  groups: [nope]\n", "", "");
        match result {
            Err(NetrunError::Inventory(msg)) => assert!(msg.contains("undeclared group 'nope'")),
            _ => panic!("expected an inventory error"),
        }
    }

    #[test]
    fn test_undeclared_parent_group_is_an_error() {
        let result = Inventory::from_yaml_str("sw1:\n  groups: [a]\n", "a:\n  groups: [b]\n", "");
        match result {
            Err(NetrunError::Inventory(msg)) => assert!(msg.contains("undeclared parent group 'b'")),
            _ => panic!("expected an inventory error"),
        }
    }

    #[test]
    fn test_group_cycle_is_an_error() {
        let groups = "a:\n  groups: [b]\nb:\n  groups: [c]\nc:\n  groups: [a]\n";
        let result = Inventory::from_yaml_str("sw1:\n  groups: [a]\n", groups, "");
        match result {
            Err(NetrunError::Inventory(msg)) => assert!(msg.contains("circular group reference: a -> b -> c -> a")),
            _ => panic!("expected an inventory error"),
        }
    }

    #[test]
    fn test_malformed_source_is_an_error() {
        let result = Inventory::from_yaml_str("sw1: [unclosed", "", "");
        assert!(matches!(result, Err(NetrunError::Inventory(ref msg)) if msg.contains("<hosts>")));
        let result = Inventory::from_yaml_str("sw1:\n  hostnme: 10.0.0.1\n", "", "");
        assert!(result.is_err());
    }

    #[test]
    fn test_unknown_field_shows_source_line() {
        let result = Inventory::from_yaml_str("sw1:\n  hostname: 1.1.1.1\nR1:\n  hostnme: 10.0.0.1\n", "", "");
        match result {
            Err(NetrunError::Inventory(msg)) => {
                assert!(msg.contains("<hosts>"));
                assert!(msg.contains("unknown field `hostnme`"));
                assert!(msg.lines().any(|l| l.contains(">>>") && l.contains("hostnme: 10.0.0.1")));
            },
            _ => panic!("expected an inventory error"),
        }
    }

    #[test]
    fn test_empty_host_entry_and_declared_order() {
        let inv = Inventory::from_yaml_str("zz:\naa:\n  hostname: 10.0.0.2\n", "g2: {}\ng1: {}\n", "").unwrap();
        assert_eq!(inv.host_names(), vec!["zz", "aa"]);
        assert_eq!(inv.get_host("zz").unwrap().hostname(), "zz");
        let group_names : Vec<String> = inv.groups().map(|g| g.name.clone()).collect();
        assert_eq!(group_names, vec!["g2", "g1"]);
    }

    #[test]
    fn test_parent_declared_after_child() {
        let groups = "child:\n  groups: [parent]\nparent:\n  data:\n    ntp: 1.1.1.1\n";
        let inv = Inventory::from_yaml_str("sw1:\n  groups: [child]\n", groups, "").unwrap();
        let host = inv.get_host("sw1").unwrap();
        assert_eq!(host.get("ntp").and_then(|v| v.as_str()), Some("1.1.1.1"));
        assert!(Arc::ptr_eq(&inv.get_group("child").unwrap().parents[0], inv.get_group("parent").unwrap()));
    }

    #[test]
    fn test_simple_inventory_from_files() {
        let temp_dir = TempDir::new().unwrap();
        let host_file = temp_dir.path().join("hosts.yaml");
        fs::write(&host_file, "R1:\n  hostname: 172.16.10.12\n").unwrap();

        let plugin = SimpleInventory {
            host_file,
            group_file: temp_dir.path().join("groups.yaml"),
            defaults_file: temp_dir.path().join("defaults.yaml"),
        };
        let inv = plugin.load().unwrap();
        assert_eq!(inv.len(), 1);
        assert_eq!(inv.groups().count(), 0);
    }

    #[test]
    fn test_simple_inventory_requires_host_file() {
        let temp_dir = TempDir::new().unwrap();
        let plugin = SimpleInventory {
            host_file: temp_dir.path().join("hosts.yaml"),
            group_file: temp_dir.path().join("groups.yaml"),
            defaults_file: temp_dir.path().join("defaults.yaml"),
        };
        assert!(plugin.load().is_err());
    }
}
