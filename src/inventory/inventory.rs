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

use std::fmt;
use std::sync::Arc;
use indexmap::IndexMap;
use serde_json::json;
use crate::error::Result;
use crate::inventory::attributes::Attributes;
use crate::inventory::filter::Filter;
use crate::inventory::groups::{Defaults, Group};
use crate::inventory::hosts::Host;

/// Hosts, groups and defaults. Never modified after loading: filtering builds a new
/// inventory that shares the same `Arc<Host>` objects.
#[derive(Clone, Default)]
pub struct Inventory {
    hosts    : IndexMap<String, Arc<Host>>,
    groups   : Arc<IndexMap<String, Arc<Group>>>,
    defaults : Arc<Defaults>,
}

impl Inventory {

    pub fn new(hosts: IndexMap<String, Arc<Host>>, groups: IndexMap<String, Arc<Group>>, defaults: Arc<Defaults>) -> Self {
        Self {
            hosts,
            groups: Arc::new(groups),
            defaults,
        }
    }

    pub fn len(&self) -> usize {
        self.hosts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }

    pub fn has_host(&self, host_name: &str) -> bool {
        self.hosts.contains_key(host_name)
    }

    pub fn get_host(&self, host_name: &str) -> Option<&Arc<Host>> {
        self.hosts.get(host_name)
    }

    /// Hosts in the order they were declared.
    pub fn hosts(&self) -> impl Iterator<Item = &Arc<Host>> {
        self.hosts.values()
    }

    pub fn host_names(&self) -> Vec<String> {
        self.hosts.keys().cloned().collect()
    }

    pub fn has_group(&self, group_name: &str) -> bool {
        self.groups.contains_key(group_name)
    }

    pub fn get_group(&self, group_name: &str) -> Option<&Arc<Group>> {
        self.groups.get(group_name)
    }

    pub fn groups(&self) -> impl Iterator<Item = &Arc<Group>> {
        self.groups.values()
    }

    pub fn defaults(&self) -> &Arc<Defaults> {
        &self.defaults
    }

    /// Host data first, then its groups in declared order, then the defaults.
    pub fn resolve_attribute<'a>(&self, host: &'a Host, key: &str) -> Option<&'a serde_yaml::Value> {
        host.get(key)
    }

    // ==============================================================================================================
    // FILTERING
    // ==============================================================================================================

    /// A narrower view over the same hosts. An empty result is not an error.
    pub fn filter<F>(&self, predicate: F) -> Inventory
    where
        F: Fn(&Host) -> bool,
    {
        let hosts : IndexMap<String, Arc<Host>> = self.hosts.iter()
            .filter(|(_k, host)| predicate(host.as_ref()))
            .map(|(k, v)| (k.clone(), Arc::clone(v)))
            .collect();
        tracing::debug!(before = self.hosts.len(), after = hosts.len(), "filtered inventory");
        Inventory {
            hosts,
            groups: Arc::clone(&self.groups),
            defaults: Arc::clone(&self.defaults),
        }
    }

    pub fn filter_with(&self, filter: &Filter) -> Inventory {
        self.filter(|host| filter.matches(host))
    }

    /// Keyword style filter, e.g. `filter_by("hostname", "172.16.10.11")`.
    pub fn filter_by(&self, key: &str, value: impl Into<serde_yaml::Value>) -> Inventory {
        self.filter_with(&Filter::attr(key, value))
    }

    /// Hosts that belong to the group directly or through a parent group.
    pub fn children_of_group(&self, group_name: &str) -> Vec<Arc<Host>> {
        self.hosts.values()
            .filter(|host| host.has_parent_group(group_name))
            .cloned()
            .collect()
    }

    // ==============================================================================================================
    // EXPORT
    // ==============================================================================================================

    /// The inventory in the same shape as the source documents.
    pub fn to_value(&self) -> Result<serde_json::Value> {
        let mut hosts = serde_json::Map::new();
        for (name, host) in self.hosts.iter() {
            let mut value = attributes_value(&host.attributes)?;
            value["groups"] = json!(host.get_group_names());
            hosts.insert(name.clone(), value);
        }
        let mut groups = serde_json::Map::new();
        for (name, group) in self.groups.iter() {
            let mut value = attributes_value(&group.attributes)?;
            value["groups"] = json!(group.get_parent_group_names());
            groups.insert(name.clone(), value);
        }
        Ok(json!({
            "hosts": hosts,
            "groups": groups,
            "defaults": attributes_value(&self.defaults.attributes)?,
        }))
    }
}

fn attributes_value(attributes: &Attributes) -> Result<serde_json::Value> {
    Ok(json!({
        "hostname": attributes.hostname,
        "port": attributes.port,
        "username": attributes.username,
        "password": attributes.password,
        "platform": attributes.platform,
        "data": serde_json::to_value(&attributes.data)?,
        "connection_options": serde_json::to_value(&attributes.connection_options)?,
    }))
}

impl fmt::Debug for Inventory {
    // hosts and groups are listed by name, each has its own Debug
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Inventory")
            .field("hosts", &self.hosts.keys().collect::<Vec<_>>())
            .field("groups", &self.groups.keys().collect::<Vec<_>>())
            .finish()
    }
}
