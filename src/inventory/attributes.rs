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

use serde::{Deserialize, Serialize};
use indexmap::IndexMap;

// the attribute shape shared by hosts, groups and defaults

/// Per connection-plugin overrides, e.g. a different port for `netconf`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ConnectionOptions {
    pub hostname : Option<String>,
    pub port     : Option<u16>,
    pub username : Option<String>,
    pub password : Option<String>,
    pub platform : Option<String>,
    #[serde(default)]
    pub extras   : serde_yaml::Mapping,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Attributes {
    pub hostname           : Option<String>,
    pub port               : Option<u16>,
    pub username           : Option<String>,
    pub password           : Option<String>,
    pub platform           : Option<String>,
    pub data               : serde_yaml::Mapping,
    pub connection_options : IndexMap<String, ConnectionOptions>,
}

impl Attributes {

    pub fn get(&self, key: &str) -> Option<&serde_yaml::Value> {
        self.data.get(key)
    }

    pub fn connection_options(&self, plugin: &str) -> Option<&ConnectionOptions> {
        self.connection_options.get(plugin)
    }
}

// ==============================================================================================================
// SOURCE DOCUMENTS (one entry of the hosts, groups or defaults file)
// ==============================================================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HostSpec {
    pub hostname : Option<String>,
    pub port     : Option<u16>,
    pub username : Option<String>,
    pub password : Option<String>,
    pub platform : Option<String>,
    #[serde(default)]
    pub groups   : Vec<String>,
    #[serde(default)]
    pub data     : serde_yaml::Mapping,
    #[serde(default)]
    pub connection_options : IndexMap<String, ConnectionOptions>,
}

// groups use the same shape, their `groups` list names parent groups
pub type GroupSpec = HostSpec;

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DefaultsSpec {
    pub hostname : Option<String>,
    pub port     : Option<u16>,
    pub username : Option<String>,
    pub password : Option<String>,
    pub platform : Option<String>,
    #[serde(default)]
    pub data     : serde_yaml::Mapping,
    #[serde(default)]
    pub connection_options : IndexMap<String, ConnectionOptions>,
}

impl HostSpec {
    pub fn split(self) -> (Attributes, Vec<String>) {
        let attributes = Attributes {
            hostname: self.hostname,
            port: self.port,
            username: self.username,
            password: self.password,
            platform: self.platform,
            data: self.data,
            connection_options: self.connection_options,
        };
        (attributes, self.groups)
    }
}

impl From<DefaultsSpec> for Attributes {
    fn from(spec: DefaultsSpec) -> Self {
        Attributes {
            hostname: spec.hostname,
            port: spec.port,
            username: spec.username,
            password: spec.password,
            platform: spec.platform,
            data: spec.data,
            connection_options: spec.connection_options,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_spec_parses() {
        let spec: HostSpec = serde_yaml::from_str("
hostname: 172.16.10.11
platform: ios
groups:
  - cisco_switch
data:
  ntp: 1.1.1.1
connection_options:
  netmiko:
    port: 2222
    extras:
      fast_cli: true
").unwrap();
        let (attributes, groups) = spec.split();
        assert_eq!(attributes.hostname.as_deref(), Some("172.16.10.11"));
        assert_eq!(groups, vec![String::from("cisco_switch")]);
        assert_eq!(attributes.get("ntp").and_then(|v| v.as_str()), Some("1.1.1.1"));
        assert_eq!(attributes.connection_options("netmiko").and_then(|c| c.port), Some(2222));
    }

    #[test]
    fn test_unknown_fields_are_rejected() {
        let result: Result<HostSpec, _> = serde_yaml::from_str("hostnme: 10.0.0.1");
        assert!(result.is_err());
        let result: Result<DefaultsSpec, _> = serde_yaml::from_str("groups: [a]");
        assert!(result.is_err());
    }
}
