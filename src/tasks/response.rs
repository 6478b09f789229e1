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

use serde::{Serialize, Serializer};
use tracing::Level;
use crate::tasks::task::{TaskError, TaskOutput};

/// Outcome of one task invocation on one host. Sub-task results hang off `children`
/// in the order they were started.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskResult {
    pub name      : String,
    pub host      : String,
    pub result    : Option<serde_yaml::Value>,
    // true when this node or any node below it changed something
    pub changed   : bool,
    pub diff      : String,
    pub failed    : bool,
    pub exception : Option<String>,
    #[serde(serialize_with = "serialize_level")]
    pub severity  : Level,
    pub children  : Vec<TaskResult>,
}

impl TaskResult {

    pub fn from_output(name: &str, host: &str, output: TaskOutput, children: Vec<TaskResult>) -> Self {
        let changed = output.changed || children.iter().any(|c| c.changed);
        Self {
            name: name.to_string(),
            host: host.to_string(),
            result: output.result,
            changed,
            diff: output.diff,
            failed: output.failed,
            exception: None,
            severity: output.severity,
            children,
        }
    }

    pub fn from_error(name: &str, host: &str, error: &TaskError, children: Vec<TaskResult>) -> Self {
        let changed = children.iter().any(|c| c.changed);
        Self {
            name: name.to_string(),
            host: host.to_string(),
            result: None,
            changed,
            diff: String::new(),
            failed: true,
            exception: Some(error.to_string()),
            severity: Level::ERROR,
            children,
        }
    }

    /// Human readable summary: the error when failed, otherwise the value.
    pub fn report(&self) -> String {
        if let Some(exception) = &self.exception {
            return exception.clone();
        }
        match &self.result {
            None => String::new(),
            Some(serde_yaml::Value::String(s)) => s.clone(),
            Some(value) => serde_yaml::to_string(value)
                .map(|s| s.trim_end().to_string())
                .unwrap_or_default(),
        }
    }

    /// True if this node or anything below it failed.
    pub fn any_failed(&self) -> bool {
        self.walk().any(|r| r.failed)
    }

    /// Depth-first, pre-order walk over this node and its descendants.
    pub fn walk(&self) -> Walk<'_> {
        Walk { stack: vec![self] }
    }
}

pub struct Walk<'a> {
    stack : Vec<&'a TaskResult>,
}

impl<'a> Iterator for Walk<'a> {
    type Item = &'a TaskResult;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

fn serialize_level<S: Serializer>(level: &Level, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(level)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(name: &str, changed: bool) -> TaskResult {
        TaskResult::from_output(name, "sw1", TaskOutput::value(name).changed(changed), Vec::new())
    }

    #[test]
    fn test_changed_bubbles_up() {
        let parent = TaskResult::from_output("parent", "sw1", TaskOutput::new(), vec![leaf("a", false), leaf("b", true)]);
        assert!(parent.changed);
        let quiet = TaskResult::from_output("parent", "sw1", TaskOutput::new(), vec![leaf("a", false)]);
        assert!(!quiet.changed);
    }

    #[test]
    fn test_report() {
        assert_eq!(leaf("Hello, sw1", false).report(), "Hello, sw1");

        let mapping = TaskResult::from_output("facts", "sw1", TaskOutput::value(serde_yaml::from_str::<serde_yaml::Value>("vendor: cisco").unwrap()), Vec::new());
        assert_eq!(mapping.report(), "vendor: cisco");

        let empty = TaskResult::from_output("noop", "sw1", TaskOutput::new(), Vec::new());
        assert_eq!(empty.report(), "");

        let failed = TaskResult::from_error("boom", "sw1", &TaskError::Failed(String::from("timed out")), Vec::new());
        assert_eq!(failed.report(), "timed out");
        assert_eq!(failed.severity, Level::ERROR);
    }

    #[test]
    fn test_walk_is_preorder() {
        let inner = TaskResult::from_output("b", "sw1", TaskOutput::new(), vec![leaf("c", false)]);
        let root = TaskResult::from_output("a", "sw1", TaskOutput::new(), vec![inner, leaf("d", false)]);
        let names : Vec<&str> = root.walk().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_any_failed_looks_at_children() {
        let failed = TaskResult::from_output("child", "sw1", TaskOutput::new().failed(true), Vec::new());
        let root = TaskResult::from_output("root", "sw1", TaskOutput::new(), vec![failed]);
        assert!(!root.failed);
        assert!(root.any_failed());
    }

    #[test]
    fn test_serializes_severity_as_text() {
        let value = serde_json::to_value(leaf("x", false)).unwrap();
        assert_eq!(value["severity"], "INFO");
        assert_eq!(value["result"], "x");
    }
}
