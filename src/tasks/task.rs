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
use thiserror::Error;
use tracing::Level;
use crate::tasks::context::TaskContext;

/// Keyword parameters handed to a task, e.g. `config_commands: [...]`.
pub type Params = serde_yaml::Mapping;

/// Why a task failed on one host. Captured into that host's result, never raised to
/// the caller of `run`.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum TaskError {
    #[error("{0}")]
    Failed(String),

    #[error("missing attribute '{0}'")]
    MissingAttribute(String),

    #[error("missing parameter '{0}'")]
    MissingParameter(String),

    #[error("subtask '{task}' failed on host '{host}'")]
    SubTask { task: String, host: String },

    #[error("task panicked: {0}")]
    Panicked(String),

    #[error("{0}")]
    Other(String),
}

impl From<String> for TaskError {
    fn from(err: String) -> Self {
        TaskError::Other(err)
    }
}

impl From<&str> for TaskError {
    fn from(err: &str) -> Self {
        TaskError::Other(err.to_string())
    }
}

/// What a task returns on success. A task may still report `failed` here without
/// raising an error, e.g. when a device answered but rejected the change.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskOutput {
    pub result   : Option<serde_yaml::Value>,
    pub changed  : bool,
    pub diff     : String,
    pub failed   : bool,
    pub severity : Level,
}

impl Default for TaskOutput {
    fn default() -> Self {
        Self {
            result: None,
            changed: false,
            diff: String::new(),
            failed: false,
            severity: Level::INFO,
        }
    }
}

impl TaskOutput {

    pub fn new() -> Self {
        Self::default()
    }

    pub fn value(value: impl Into<serde_yaml::Value>) -> Self {
        Self {
            result: Some(value.into()),
            ..Self::default()
        }
    }

    pub fn changed(mut self, changed: bool) -> Self {
        self.changed = changed;
        self
    }

    pub fn diff(mut self, diff: impl Into<String>) -> Self {
        self.diff = diff.into();
        self
    }

    pub fn failed(mut self, failed: bool) -> Self {
        self.failed = failed;
        if failed {
            self.severity = Level::ERROR;
        }
        self
    }

    pub fn severity(mut self, severity: Level) -> Self {
        self.severity = severity;
        self
    }
}

/// A unit of work executed once per selected host.
pub trait Task: Send + Sync {
    fn name(&self) -> &str;
    fn run(&self, ctx: &mut TaskContext, params: &Params) -> Result<TaskOutput, TaskError>;
}

/// Adapts a closure into a [`Task`].
pub struct FnTask<F> {
    name : String,
    func : F,
}

impl<F> FnTask<F>
where
    F: Fn(&mut TaskContext, &Params) -> Result<TaskOutput, TaskError> + Send + Sync,
{
    pub fn new(name: impl Into<String>, func: F) -> Self {
        Self {
            name: name.into(),
            func,
        }
    }
}

impl<F> Task for FnTask<F>
where
    F: Fn(&mut TaskContext, &Params) -> Result<TaskOutput, TaskError> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn run(&self, ctx: &mut TaskContext, params: &Params) -> Result<TaskOutput, TaskError> {
        (self.func)(ctx, params)
    }
}

impl<F> fmt::Debug for FnTask<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnTask").field("name", &self.name).finish()
    }
}

/// Read a required parameter as a string.
pub fn require_str<'a>(params: &'a Params, key: &str) -> Result<&'a str, TaskError> {
    params.get(key)
        .and_then(|v| v.as_str())
        .ok_or_else(|| TaskError::MissingParameter(key.to_string()))
}
