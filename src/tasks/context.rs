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

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use crate::inventory::hosts::Host;
use crate::processors::Processors;
use crate::tasks::response::TaskResult;
use crate::tasks::task::{Params, Task, TaskError};

/// Binds one host to one task invocation. Sub-tasks started through [`TaskContext::run`]
/// share the host and become children of the current result.
pub struct TaskContext {
    name       : String,
    host       : Arc<Host>,
    dry_run    : bool,
    processors : Processors,
    results    : Vec<TaskResult>,
}

impl TaskContext {

    pub(crate) fn new(name: &str, host: &Arc<Host>, dry_run: bool, processors: &Processors) -> Self {
        Self {
            name: name.to_string(),
            host: Arc::clone(host),
            dry_run,
            processors: Arc::clone(processors),
            results: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn host(&self) -> &Arc<Host> {
        &self.host
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Sub-task results recorded so far, in invocation order.
    pub fn results(&self) -> &[TaskResult] {
        &self.results
    }

    /// A resolved host attribute, or an error naming the missing key.
    pub fn get(&self, key: &str) -> Result<&serde_yaml::Value, TaskError> {
        self.host.get(key).ok_or_else(|| TaskError::MissingAttribute(key.to_string()))
    }

    /// Run a nested task against the same host. The result is recorded as a child of the
    /// current task; a failed child is returned as `Err` so it can be propagated with `?`.
    pub fn run<T: Task + ?Sized>(&mut self, task: &T, params: &Params) -> Result<TaskResult, TaskError> {
        for processor in self.processors.iter() {
            processor.subtask_instance_started(task.name(), &self.host);
        }
        let result = execute(task, task.name(), &self.host, params, self.dry_run, &self.processors);
        for processor in self.processors.iter() {
            processor.subtask_instance_completed(task.name(), &self.host, &result);
        }
        self.results.push(result.clone());
        if result.failed {
            return Err(TaskError::SubTask {
                task: task.name().to_string(),
                host: self.host.name.clone(),
            });
        }
        Ok(result)
    }

    fn into_results(self) -> Vec<TaskResult> {
        self.results
    }
}

/// Run `task` for one host and turn whatever happens, including a panic, into a result node.
pub(crate) fn execute<T: Task + ?Sized>(
    task: &T,
    name: &str,
    host: &Arc<Host>,
    params: &Params,
    dry_run: bool,
    processors: &Processors,
) -> TaskResult {

    let mut ctx = TaskContext::new(name, host, dry_run, processors);
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| task.run(&mut ctx, params)));
    let children = ctx.into_results();

    match outcome {
        Ok(Ok(output)) => TaskResult::from_output(name, &host.name, output, children),
        Ok(Err(error)) => TaskResult::from_error(name, &host.name, &error, children),
        Err(payload) => {
            let msg = if let Some(s) = payload.downcast_ref::<&str>() {
                s.to_string()
            } else if let Some(s) = payload.downcast_ref::<String>() {
                s.clone()
            } else {
                String::from("unknown panic payload")
            };
            TaskResult::from_error(name, &host.name, &TaskError::Panicked(msg), children)
        }
    }
}
