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

use std::sync::Arc;
use crate::inventory::attributes::Attributes;

#[derive(Debug)]
pub struct Group {
    pub name       : String,
    pub attributes : Attributes,
    // parent groups in declared order, resolved at load time
    pub parents    : Vec<Arc<Group>>,
}

impl Group {

    pub fn new(name: &str, attributes: Attributes, parents: Vec<Arc<Group>>) -> Self {
        Self {
            name: name.to_string(),
            attributes,
            parents,
        }
    }

    /// Look a value up on this group, then on its parents in declared order, depth first.
    pub fn resolve<'a, T: ?Sized>(&'a self, pick: &dyn Fn(&'a Attributes) -> Option<&'a T>) -> Option<&'a T> {
        if let Some(found) = pick(&self.attributes) {
            return Some(found);
        }
        self.parents.iter().find_map(|parent| parent.resolve(pick))
    }

    pub fn get(&self, key: &str) -> Option<&serde_yaml::Value> {
        self.resolve(&|a| a.data.get(key))
    }

    pub fn get_parent_group_names(&self) -> Vec<String> {
        self.parents.iter().map(|p| p.name.clone()).collect()
    }

    /// Every ancestor of this group in resolution order, each listed once.
    pub fn get_ancestor_groups(&self) -> Vec<Arc<Group>> {
        let mut results : Vec<Arc<Group>> = Vec::new();
        for parent in self.parents.iter() {
            push_with_ancestors(parent, &mut results);
        }
        results
    }

    pub fn has_ancestor_group(&self, group_name: &str) -> bool {
        self.get_ancestor_groups().iter().any(|g| g.name == group_name)
    }
}

pub(crate) fn push_with_ancestors(group: &Arc<Group>, results: &mut Vec<Arc<Group>>) {
    if results.iter().any(|g| g.name == group.name) {
        return;
    }
    results.push(Arc::clone(group));
    for parent in group.parents.iter() {
        push_with_ancestors(parent, results);
    }
}

/// Global attributes with the lowest precedence.
#[derive(Debug, Default)]
pub struct Defaults {
    pub attributes : Attributes,
}

impl Defaults {

    pub fn new(attributes: Attributes) -> Self {
        Self { attributes }
    }

    pub fn get(&self, key: &str) -> Option<&serde_yaml::Value> {
        self.attributes.data.get(key)
    }
}
