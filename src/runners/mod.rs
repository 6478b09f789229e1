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

pub mod serial;
pub mod threaded;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use crate::error::Result;
use crate::inventory::hosts::Host;
use crate::processors::Processors;
use crate::tasks::aggregate::{AggregatedResult, ResultCollector};
use crate::tasks::context::execute;
use crate::tasks::task::{Params, Task};

/// Decides how the hosts of one run are scheduled. Every runner hands each host to
/// [`Dispatch::execute`] at most once; ordering and result shape are the dispatcher's job.
pub trait Runner: Send + Sync {
    fn name(&self) -> &str;
    fn run(&self, dispatch: &Dispatch<'_>, hosts: &[Arc<Host>]) -> Result<()>;
}

/// One task invocation spread over many hosts. Shared by reference between worker
/// threads; results land in a [`ResultCollector`].
pub struct Dispatch<'a> {
    task             : &'a dyn Task,
    name             : String,
    params           : &'a Params,
    dry_run          : bool,
    abort_on_failure : bool,
    processors       : Processors,
    aborted          : AtomicBool,
    first_failure    : Mutex<Option<String>>,
    collector        : ResultCollector,
}

impl<'a> Dispatch<'a> {

    pub fn new(task: &'a dyn Task, name: &str, params: &'a Params, processors: &Processors) -> Self {
        Self {
            task,
            name: name.to_string(),
            params,
            dry_run: false,
            abort_on_failure: false,
            processors: Arc::clone(processors),
            aborted: AtomicBool::new(false),
            first_failure: Mutex::new(None),
            collector: ResultCollector::new(),
        }
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn abort_on_failure(mut self, abort: bool) -> Self {
        self.abort_on_failure = abort;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Set once a host has failed while abort_on_failure is on. Runners must not start
    /// new hosts after this; hosts already running are left to finish.
    pub fn should_stop(&self) -> bool {
        self.aborted.load(Ordering::SeqCst)
    }

    /// Run the task for one host and record the result.
    pub fn execute(&self, host: &Arc<Host>) {
        if self.should_stop() {
            tracing::debug!(host = %host.name, task = %self.name, "skipped, run aborted");
            return;
        }
        tracing::debug!(host = %host.name, task = %self.name, "dispatching");

        for processor in self.processors.iter() {
            processor.task_instance_started(&self.name, host);
        }
        let result = execute(self.task, &self.name, host, self.params, self.dry_run, &self.processors);
        for processor in self.processors.iter() {
            processor.task_instance_completed(&self.name, host, &result);
        }

        if result.any_failed() {
            tracing::warn!(host = %host.name, task = %self.name, error = %result.report(), "task failed");
            if self.abort_on_failure {
                let mut first = self.first_failure.lock().unwrap_or_else(|e| e.into_inner());
                if first.is_none() {
                    *first = Some(host.name.clone());
                }
                self.aborted.store(true, Ordering::SeqCst);
            }
        }
        self.collector.insert(result);
    }

    /// The collected aggregate in `order`, plus the host that triggered an abort, if any.
    pub fn finish(self, order: &[String]) -> (AggregatedResult, Option<String>) {
        let first = self.first_failure.into_inner().unwrap_or_else(|e| e.into_inner());
        (self.collector.into_aggregate(&self.name, order), first)
    }
}
