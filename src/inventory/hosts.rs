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
use crate::inventory::attributes::{Attributes, ConnectionOptions};
use crate::inventory::groups::{Defaults, Group, push_with_ancestors};
use crate::util::yaml::merge_missing;

pub struct Host {
    pub name       : String,
    pub attributes : Attributes,
    // groups in declared order, resolved at load time
    pub groups     : Vec<Arc<Group>>,
    pub defaults   : Arc<Defaults>,
}

impl Host {

    pub fn new(name: &str, attributes: Attributes, groups: Vec<Arc<Group>>, defaults: Arc<Defaults>) -> Self {
        Self {
            name: name.to_string(),
            attributes,
            groups,
            defaults,
        }
    }

    // ==============================================================================================================
    // ATTRIBUTE RESOLUTION: host, then each group (and its parents) in declared order, then defaults
    // ==============================================================================================================

    fn resolve<'a, T: ?Sized>(&'a self, pick: &dyn Fn(&'a Attributes) -> Option<&'a T>) -> Option<&'a T> {
        pick(&self.attributes)
            .or_else(|| self.groups.iter().find_map(|g| g.resolve(pick)))
            .or_else(|| pick(&self.defaults.attributes))
    }

    /// Resolved custom data attribute, `None` when no level defines it.
    pub fn get(&self, key: &str) -> Option<&serde_yaml::Value> {
        self.resolve(&|a| a.data.get(key))
    }

    pub fn get_or<'a>(&'a self, key: &str, default: &'a serde_yaml::Value) -> &'a serde_yaml::Value {
        self.get(key).unwrap_or(default)
    }

    pub fn has(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Address used to reach the device. Falls back to the inventory name.
    pub fn hostname(&self) -> &str {
        self.resolve(&|a| a.hostname.as_deref()).unwrap_or(self.name.as_str())
    }

    pub fn port(&self) -> Option<u16> {
        self.resolve(&|a| a.port.as_ref()).copied()
    }

    pub fn username(&self) -> Option<&str> {
        self.resolve(&|a| a.username.as_deref())
    }

    pub fn password(&self) -> Option<&str> {
        self.resolve(&|a| a.password.as_deref())
    }

    pub fn platform(&self) -> Option<&str> {
        self.resolve(&|a| a.platform.as_deref())
    }

    /// A connection attribute or data value as an owned YAML value, used by filters.
    pub fn field_value(&self, key: &str) -> Option<serde_yaml::Value> {
        match key {
            "name"     => Some(serde_yaml::Value::from(self.name.clone())),
            "hostname" => Some(serde_yaml::Value::from(self.hostname())),
            "port"     => self.port().map(serde_yaml::Value::from),
            "username" => self.username().map(serde_yaml::Value::from),
            "password" => self.password().map(serde_yaml::Value::from),
            "platform" => self.platform().map(serde_yaml::Value::from),
            _          => self.get(key).cloned(),
        }
    }

    // ==============================================================================================================
    // GROUPS
    // ==============================================================================================================

    pub fn get_group_names(&self) -> Vec<String> {
        self.groups.iter().map(|g| g.name.clone()).collect()
    }

    /// Direct groups and all their ancestors in resolution order, each listed once.
    pub fn extended_groups(&self) -> Vec<Arc<Group>> {
        let mut results : Vec<Arc<Group>> = Vec::new();
        for group in self.groups.iter() {
            push_with_ancestors(group, &mut results);
        }
        results
    }

    pub fn get_extended_group_names(&self) -> Vec<String> {
        self.extended_groups().iter().map(|g| g.name.clone()).collect()
    }

    pub fn has_parent_group(&self, group_name: &str) -> bool {
        self.extended_groups().iter().any(|g| g.name == group_name)
    }

    // ==============================================================================================================
    // MERGED VIEWS
    // ==============================================================================================================

    /// Every data key visible from this host with its winning value.
    pub fn extended_data(&self) -> serde_yaml::Mapping {
        let mut blended = self.attributes.data.clone();
        for group in self.extended_groups().iter() {
            merge_missing(&mut blended, &group.attributes.data);
        }
        merge_missing(&mut blended, &self.defaults.attributes.data);
        blended
    }

    pub fn keys(&self) -> Vec<String> {
        self.extended_data().keys().filter_map(|k| k.as_str().map(String::from)).collect()
    }

    /// Options for one connection plugin. Fields missing from every `connection_options`
    /// section fall back to the resolved top-level attributes.
    pub fn connection_options(&self, plugin: &str) -> ConnectionOptions {
        let hostname = self.resolve(&|a| a.connection_options(plugin).and_then(|c| c.hostname.as_deref()))
            .unwrap_or(self.hostname());
        let port = self.resolve(&|a| a.connection_options(plugin).and_then(|c| c.port.as_ref()))
            .copied()
            .or(self.port());
        let username = self.resolve(&|a| a.connection_options(plugin).and_then(|c| c.username.as_deref()))
            .or(self.username());
        let password = self.resolve(&|a| a.connection_options(plugin).and_then(|c| c.password.as_deref()))
            .or(self.password());
        let platform = self.resolve(&|a| a.connection_options(plugin).and_then(|c| c.platform.as_deref()))
            .or(self.platform());

        let mut extras = serde_yaml::Mapping::new();
        let mut levels : Vec<&Attributes> = vec![&self.attributes];
        let groups = self.extended_groups();
        levels.extend(groups.iter().map(|g| &g.attributes));
        levels.push(&self.defaults.attributes);
        for level in levels {
            if let Some(options) = level.connection_options(plugin) {
                merge_missing(&mut extras, &options.extras);
            }
        }

        ConnectionOptions {
            hostname: Some(hostname.to_string()),
            port,
            username: username.map(String::from),
            password: password.map(String::from),
            platform: platform.map(String::from),
            extras,
        }
    }
}

impl fmt::Display for Host {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

impl fmt::Debug for Host {
    // groups are shown by name, the defaults are shared by every host
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Host")
            .field("name", &self.name)
            .field("attributes", &self.attributes)
            .field("groups", &self.get_group_names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attributes(yaml: &str) -> Attributes {
        let spec: crate::inventory::attributes::HostSpec = serde_yaml::from_str(yaml).unwrap();
        spec.split().0
    }

    fn sample_host() -> Host {
        let defaults = Arc::new(Defaults::new(attributes("
username: admin
password: cisco
data:
  ntp: 10.0.0.1
  domain: example.net
  site: default
")));
        let parent = Arc::new(Group::new("cisco", attributes("
platform: ios
port: 22
data:
  site: parent
  vendor: cisco
connection_options:
  netmiko:
    extras:
      global_delay_factor: 2
"), vec![]));
        let group = Arc::new(Group::new("cisco_switch", attributes("
data:
  ntp: 10.0.0.2
  site: group
"), vec![parent]));
        Host::new("sw1", attributes("
hostname: 172.16.10.11
data:
  site: host
connection_options:
  netmiko:
    port: 2222
    extras:
      fast_cli: true
"), vec![group], defaults)
    }

    #[test]
    fn test_host_value_wins() {
        let host = sample_host();
        assert_eq!(host.get("site").and_then(|v| v.as_str()), Some("host"));
    }

    #[test]
    fn test_group_value_beats_defaults() {
        let host = sample_host();
        assert_eq!(host.get("ntp").and_then(|v| v.as_str()), Some("10.0.0.2"));
        assert_eq!(host.get("vendor").and_then(|v| v.as_str()), Some("cisco"));
        assert_eq!(host.get("domain").and_then(|v| v.as_str()), Some("example.net"));
        assert!(host.get("nope").is_none());
        assert!(!host.has("nope"));
    }

    #[test]
    fn test_connection_attributes_inherit() {
        let host = sample_host();
        assert_eq!(host.hostname(), "172.16.10.11");
        assert_eq!(host.platform(), Some("ios"));
        assert_eq!(host.port(), Some(22));
        assert_eq!(host.username(), Some("admin"));
        assert_eq!(host.password(), Some("cisco"));
    }

    #[test]
    fn test_hostname_falls_back_to_name() {
        let host = Host::new("R9", Attributes::default(), vec![], Arc::new(Defaults::default()));
        assert_eq!(host.hostname(), "R9");
        assert_eq!(host.port(), None);
    }

    #[test]
    fn test_extended_groups_and_data() {
        let host = sample_host();
        assert_eq!(host.get_group_names(), vec!["cisco_switch"]);
        assert_eq!(host.get_extended_group_names(), vec!["cisco_switch", "cisco"]);
        assert!(host.has_parent_group("cisco"));
        assert!(!host.has_parent_group("juniper"));

        let data = host.extended_data();
        assert_eq!(data.len(), 4);
        assert_eq!(data.get("site").and_then(|v| v.as_str()), Some("host"));
        let mut keys = host.keys();
        keys.sort();
        assert_eq!(keys, vec!["domain", "ntp", "site", "vendor"]);
    }

    #[test]
    fn test_connection_options_merge() {
        let host = sample_host();
        let options = host.connection_options("netmiko");
        assert_eq!(options.port, Some(2222));
        assert_eq!(options.hostname.as_deref(), Some("172.16.10.11"));
        assert_eq!(options.username.as_deref(), Some("admin"));
        assert_eq!(options.platform.as_deref(), Some("ios"));
        assert_eq!(options.extras.len(), 2);

        let other = host.connection_options("napalm");
        assert_eq!(other.port, Some(22));
        assert!(other.extras.is_empty());
    }

    #[test]
    fn test_field_value() {
        let host = sample_host();
        assert_eq!(host.field_value("hostname"), Some(serde_yaml::Value::from("172.16.10.11")));
        assert_eq!(host.field_value("port"), Some(serde_yaml::Value::from(22u16)));
        assert_eq!(host.field_value("vendor"), Some(serde_yaml::Value::from("cisco")));
        assert_eq!(format!("{}", host), "sw1");
    }
}
