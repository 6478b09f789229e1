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
use std::path::Path;
use std::sync::{Arc, RwLock};
use indexmap::IndexSet;
use crate::config::NetrunConfig;
use crate::error::{NetrunError, Result};
use crate::inventory::filter::Filter;
use crate::inventory::hosts::Host;
use crate::inventory::inventory::Inventory;
use crate::processors::{ProcessorRef, Processors};
use crate::registry;
use crate::runners::{Dispatch, Runner};
use crate::tasks::aggregate::AggregatedResult;
use crate::tasks::task::{Params, Task};

/// State shared by every handle derived from the same initial one.
#[derive(Debug, Default)]
pub struct RunState {
    failed_hosts : RwLock<IndexSet<String>>,
}

impl RunState {

    pub fn new() -> Self {
        Self::default()
    }

    pub fn failed_hosts(&self) -> Vec<String> {
        self.failed_hosts.read().unwrap_or_else(|e| e.into_inner()).iter().cloned().collect()
    }

    pub fn is_failed(&self, host_name: &str) -> bool {
        self.failed_hosts.read().unwrap_or_else(|e| e.into_inner()).contains(host_name)
    }

    fn add_failed_hosts(&self, host_names: Vec<String>) {
        let mut failed = self.failed_hosts.write().unwrap_or_else(|e| e.into_inner());
        failed.extend(host_names);
    }

    fn recover_host(&self, host_name: &str) -> bool {
        self.failed_hosts.write().unwrap_or_else(|e| e.into_inner()).shift_remove(host_name)
    }

    fn reset(&self) {
        self.failed_hosts.write().unwrap_or_else(|e| e.into_inner()).clear();
    }
}

/// Per-call overrides for [`Netrun::run_with`]. Unset fields fall back to the configuration.
#[derive(Clone, Debug)]
pub struct RunOptions {
    pub name             : Option<String>,
    pub raise_on_error   : Option<bool>,
    pub dry_run          : Option<bool>,
    pub abort_on_failure : Option<bool>,
    /// Run hosts that have not failed before.
    pub on_good          : bool,
    /// Run hosts that failed in an earlier run. Set to false to leave them out.
    pub on_failed        : bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            name: None,
            raise_on_error: None,
            dry_run: None,
            abort_on_failure: None,
            on_good: true,
            on_failed: true,
        }
    }
}

impl RunOptions {

    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn raise_on_error(mut self, raise: bool) -> Self {
        self.raise_on_error = Some(raise);
        self
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = Some(dry_run);
        self
    }

    pub fn abort_on_failure(mut self, abort: bool) -> Self {
        self.abort_on_failure = Some(abort);
        self
    }

    pub fn on_good(mut self, on_good: bool) -> Self {
        self.on_good = on_good;
        self
    }

    pub fn on_failed(mut self, on_failed: bool) -> Self {
        self.on_failed = on_failed;
        self
    }
}

/// The entry point: configuration, an inventory view, processors and shared run state.
/// Filtering returns a new handle over a narrower view that shares the same state.
#[derive(Clone)]
pub struct Netrun {
    config     : Arc<NetrunConfig>,
    inventory  : Inventory,
    runner     : Arc<dyn Runner>,
    processors : Processors,
    state      : Arc<RunState>,
}

impl Netrun {

    pub fn new(config: NetrunConfig, inventory: Inventory) -> Result<Self> {
        config.validate()?;
        let runner = registry::runner(&config.runner.plugin, &config.runner.options)?;
        Ok(Self {
            config: Arc::new(config),
            inventory,
            runner,
            processors: Arc::new(Vec::new()),
            state: Arc::new(RunState::new()),
        })
    }

    /// Load the inventory through the configured plugin and build a handle.
    pub fn from_config(config: NetrunConfig) -> Result<Self> {
        config.validate()?;
        let plugin = registry::inventory_plugin(&config.inventory.plugin, &config.inventory.options)?;
        let inventory = plugin.load()?;
        tracing::info!(hosts = inventory.len(), plugin = %config.inventory.plugin, "inventory ready");
        Self::new(config, inventory)
    }

    pub fn from_config_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_config(NetrunConfig::from_file(path.as_ref())?)
    }

    pub fn config(&self) -> &NetrunConfig {
        &self.config
    }

    pub fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    pub fn runner_name(&self) -> &str {
        self.runner.name()
    }

    pub fn with_processors(&self, processors: Vec<ProcessorRef>) -> Self {
        let mut handle = self.clone();
        handle.processors = Arc::new(processors);
        handle
    }

    pub fn with_runner(&self, runner: Arc<dyn Runner>) -> Self {
        let mut handle = self.clone();
        handle.runner = runner;
        handle
    }

    // ==============================================================================================================
    // FILTERING
    // ==============================================================================================================

    pub fn filter<F>(&self, predicate: F) -> Self
    where
        F: Fn(&Host) -> bool,
    {
        self.with_inventory(self.inventory.filter(predicate))
    }

    pub fn filter_with(&self, filter: &Filter) -> Self {
        self.with_inventory(self.inventory.filter_with(filter))
    }

    pub fn filter_by(&self, key: &str, value: impl Into<serde_yaml::Value>) -> Self {
        self.with_inventory(self.inventory.filter_by(key, value))
    }

    fn with_inventory(&self, inventory: Inventory) -> Self {
        let mut handle = self.clone();
        handle.inventory = inventory;
        handle
    }

    // ==============================================================================================================
    // RUNNING
    // ==============================================================================================================

    pub fn run<T: Task>(&self, task: &T, params: &Params) -> Result<AggregatedResult> {
        self.run_with(task, params, &RunOptions::default())
    }

    /// Run `task` once for every host in the view. Host failures are recorded in the
    /// aggregate; only `raise_on_error` and `abort_on_failure` turn them into an `Err`.
    /// Hosts that failed earlier are left out only when `on_failed` is false.
    pub fn run_with<T: Task>(&self, task: &T, params: &Params, options: &RunOptions) -> Result<AggregatedResult> {

        let name = options.name.clone().unwrap_or_else(|| task.name().to_string());
        let raise_on_error = options.raise_on_error.unwrap_or(self.config.core.raise_on_error);
        let dry_run = options.dry_run.unwrap_or(self.config.core.dry_run);
        let abort_on_failure = options.abort_on_failure.unwrap_or(self.config.runner.options.abort_on_failure);

        let hosts : Vec<Arc<Host>> = self.inventory.hosts()
            .filter(|host| match self.state.is_failed(&host.name) {
                true => options.on_failed,
                false => options.on_good,
            })
            .cloned()
            .collect();
        let order : Vec<String> = hosts.iter().map(|h| h.name.clone()).collect();

        tracing::info!(task = %name, hosts = hosts.len(), runner = %self.runner.name(), dry_run, "running task");
        for processor in self.processors.iter() {
            processor.task_started(&name, &order);
        }

        let dispatch = Dispatch::new(task, &name, params, &self.processors)
            .dry_run(dry_run)
            .abort_on_failure(abort_on_failure);
        self.runner.run(&dispatch, &hosts)?;
        let (aggregate, aborted_by) = dispatch.finish(&order);

        let failed = aggregate.failed_hosts();
        tracing::info!(task = %name, hosts = aggregate.len(), failed = failed.len(), "task finished");
        self.state.add_failed_hosts(failed);

        for processor in self.processors.iter() {
            processor.task_completed(&name, &aggregate);
        }

        if let Some(host) = aborted_by {
            return Err(NetrunError::Aborted { host, aggregate: Box::new(aggregate) });
        }
        if raise_on_error {
            return aggregate.raise_on_error();
        }
        Ok(aggregate)
    }

    // ==============================================================================================================
    // FAILED HOSTS
    // ==============================================================================================================

    pub fn failed_hosts(&self) -> Vec<String> {
        self.state.failed_hosts()
    }

    /// Forget an earlier failure so the host is picked up by the next run. Returns
    /// false if the host was not marked failed.
    pub fn recover_host(&self, host_name: &str) -> bool {
        self.state.recover_host(host_name)
    }

    pub fn reset_failed_hosts(&self) {
        self.state.reset();
    }
}

impl fmt::Debug for Netrun {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Netrun")
            .field("config", &self.config)
            .field("inventory", &self.inventory)
            .field("runner", &self.runner.name())
            .field("processors", &self.processors.len())
            .field("failed_hosts", &self.state.failed_hosts())
            .finish()
    }
}
