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

//! Global registries mapping plugin names used in configuration files to constructors.

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};
use once_cell::sync::Lazy;
use crate::config::{InventoryOptions, RunnerOptions};
use crate::error::{NetrunError, Result};
use crate::inventory::loading::{InventoryPlugin, SimpleInventory};
use crate::runners::Runner;
use crate::runners::serial::SerialRunner;
use crate::runners::threaded::ThreadedRunner;

pub type InventoryConstructor = fn(&InventoryOptions) -> Result<Box<dyn InventoryPlugin>>;
pub type RunnerConstructor = fn(&RunnerOptions) -> Result<Arc<dyn Runner>>;

static INVENTORY_PLUGINS: Lazy<RwLock<Registry<InventoryConstructor>>> = Lazy::new(|| {
    let mut registry = Registry::new("inventory plugin");
    registry.entries.insert(String::from("SimpleInventory"), simple_inventory as InventoryConstructor);
    RwLock::new(registry)
});

static RUNNERS: Lazy<RwLock<Registry<RunnerConstructor>>> = Lazy::new(|| {
    let mut registry = Registry::new("runner");
    registry.entries.insert(String::from("threaded"), threaded_runner as RunnerConstructor);
    registry.entries.insert(String::from("serial"), serial_runner as RunnerConstructor);
    RwLock::new(registry)
});

struct Registry<T> {
    kind    : &'static str,
    entries : BTreeMap<String, T>,
}

impl<T: Copy> Registry<T> {

    fn new(kind: &'static str) -> Self {
        Self {
            kind,
            entries: BTreeMap::new(),
        }
    }

    fn register(&mut self, name: &str, item: T) -> Result<()> {
        if self.entries.contains_key(name) {
            return Err(NetrunError::Config(format!("{} '{}' is already registered", self.kind, name)));
        }
        self.entries.insert(name.to_string(), item);
        Ok(())
    }

    fn get(&self, name: &str) -> Result<T> {
        match self.entries.get(name) {
            Some(item) => Ok(*item),
            None => Err(NetrunError::Config(format!(
                "unknown {} '{}', expected one of: {}",
                self.kind,
                name,
                self.names().join(", ")
            ))),
        }
    }

    fn names(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }
}

// ==============================================================================================================
// PUBLIC API
// ==============================================================================================================

pub fn register_inventory_plugin(name: &str, constructor: InventoryConstructor) -> Result<()> {
    INVENTORY_PLUGINS.write().unwrap_or_else(|e| e.into_inner()).register(name, constructor)
}

pub fn register_runner(name: &str, constructor: RunnerConstructor) -> Result<()> {
    RUNNERS.write().unwrap_or_else(|e| e.into_inner()).register(name, constructor)
}

pub fn inventory_plugin(name: &str, options: &InventoryOptions) -> Result<Box<dyn InventoryPlugin>> {
    let constructor = INVENTORY_PLUGINS.read().unwrap_or_else(|e| e.into_inner()).get(name)?;
    constructor(options)
}

pub fn runner(name: &str, options: &RunnerOptions) -> Result<Arc<dyn Runner>> {
    let constructor = RUNNERS.read().unwrap_or_else(|e| e.into_inner()).get(name)?;
    constructor(options)
}

pub fn inventory_plugin_names() -> Vec<String> {
    INVENTORY_PLUGINS.read().unwrap_or_else(|e| e.into_inner()).names()
}

pub fn runner_names() -> Vec<String> {
    RUNNERS.read().unwrap_or_else(|e| e.into_inner()).names()
}

// ==============================================================================================================
// BUILT IN PLUGINS
// ==============================================================================================================

fn simple_inventory(options: &InventoryOptions) -> Result<Box<dyn InventoryPlugin>> {
    Ok(Box::new(SimpleInventory::new(options)))
}

fn threaded_runner(options: &RunnerOptions) -> Result<Arc<dyn Runner>> {
    Ok(Arc::new(ThreadedRunner::new(options.num_workers)?))
}

fn serial_runner(_options: &RunnerOptions) -> Result<Arc<dyn Runner>> {
    Ok(Arc::new(SerialRunner::new()))
}
