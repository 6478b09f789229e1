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

//! Composable host predicates.
//!
//! A [`Filter`] is evaluated against a host's *resolved* attributes, so a value
//! inherited from a group or from the defaults matches the same way as one set
//! on the host itself. Filters combine with `&`, `|` and `!`:
//!
//! ```ignore
//! let switches = Filter::group("cisco_switch") & !Filter::attr("site", "lab");
//! let view = inventory.filter_with(&switches);
//! ```

use std::fmt;
use std::ops::{BitAnd, BitOr, Not};
use std::sync::Arc;
use regex::Regex;
use crate::error::{NetrunError, Result};
use crate::inventory::hosts::Host;

pub type HostPredicate = Arc<dyn Fn(&Host) -> bool + Send + Sync>;

#[derive(Clone)]
pub enum Filter {
    /// Exact match on a connection attribute (`name`, `hostname`, `port`, ...) or a data key.
    Attr(String, serde_yaml::Value),
    /// The attribute resolves to anything at all.
    Has(String),
    /// The attribute is a sequence containing the value, or a string containing it.
    Contains(String, serde_yaml::Value),
    /// Member of the group, directly or through a parent group.
    Group(String),
    NameRegex(Regex),
    Custom(HostPredicate),
    And(Box<Filter>, Box<Filter>),
    Or(Box<Filter>, Box<Filter>),
    Not(Box<Filter>),
}

impl Filter {

    pub fn attr(key: &str, value: impl Into<serde_yaml::Value>) -> Self {
        Filter::Attr(key.to_string(), value.into())
    }

    pub fn name(name: &str) -> Self {
        Filter::attr("name", name)
    }

    pub fn hostname(hostname: &str) -> Self {
        Filter::attr("hostname", hostname)
    }

    pub fn platform(platform: &str) -> Self {
        Filter::attr("platform", platform)
    }

    pub fn group(group_name: &str) -> Self {
        Filter::Group(group_name.to_string())
    }

    pub fn has(key: &str) -> Self {
        Filter::Has(key.to_string())
    }

    pub fn attr_contains(key: &str, value: impl Into<serde_yaml::Value>) -> Self {
        Filter::Contains(key.to_string(), value.into())
    }

    pub fn name_regex(pattern: &str) -> Result<Self> {
        let regex = Regex::new(pattern).map_err(
            |e| NetrunError::Config(format!("invalid host name pattern '{}': {}", pattern, e))
        )?;
        Ok(Filter::NameRegex(regex))
    }

    pub fn custom<F>(predicate: F) -> Self
    where
        F: Fn(&Host) -> bool + Send + Sync + 'static,
    {
        Filter::Custom(Arc::new(predicate))
    }

    pub fn and(self, other: Filter) -> Self {
        Filter::And(Box::new(self), Box::new(other))
    }

    pub fn or(self, other: Filter) -> Self {
        Filter::Or(Box::new(self), Box::new(other))
    }

    pub fn negate(self) -> Self {
        Filter::Not(Box::new(self))
    }

    pub fn matches(&self, host: &Host) -> bool {
        match self {
            Filter::Attr(key, value) => host.field_value(key).as_ref() == Some(value),
            Filter::Has(key) => host.field_value(key).is_some(),
            Filter::Contains(key, value) => match host.field_value(key) {
                Some(serde_yaml::Value::Sequence(items)) => items.contains(value),
                Some(serde_yaml::Value::String(s)) => value.as_str().map(|v| s.contains(v)).unwrap_or(false),
                _ => false,
            },
            Filter::Group(group_name) => host.has_parent_group(group_name),
            Filter::NameRegex(regex) => regex.is_match(&host.name),
            Filter::Custom(predicate) => predicate(host),
            Filter::And(a, b) => a.matches(host) && b.matches(host),
            Filter::Or(a, b) => a.matches(host) || b.matches(host),
            Filter::Not(a) => !a.matches(host),
        }
    }
}

impl fmt::Debug for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Filter::Attr(k, v) => write!(f, "{} == {:?}", k, v),
            Filter::Has(k) => write!(f, "has {}", k),
            Filter::Contains(k, v) => write!(f, "{} contains {:?}", k, v),
            Filter::Group(g) => write!(f, "in group {}", g),
            Filter::NameRegex(r) => write!(f, "name =~ /{}/", r.as_str()),
            Filter::Custom(_) => write!(f, "<custom>"),
            Filter::And(a, b) => write!(f, "({:?} & {:?})", a, b),
            Filter::Or(a, b) => write!(f, "({:?} | {:?})", a, b),
            Filter::Not(a) => write!(f, "!{:?}", a),
        }
    }
}

impl BitAnd for Filter {
    type Output = Filter;
    fn bitand(self, rhs: Filter) -> Filter {
        self.and(rhs)
    }
}

impl BitOr for Filter {
    type Output = Filter;
    fn bitor(self, rhs: Filter) -> Filter {
        self.or(rhs)
    }
}

impl Not for Filter {
    type Output = Filter;
    fn not(self) -> Filter {
        self.negate()
    }
}
