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

use std::ops::Index;
use std::sync::Mutex;
use indexmap::IndexMap;
use serde::Serialize;
use crate::error::{NetrunError, Result};
use crate::tasks::response::TaskResult;

/// The top-level results of one host for one run. Holds a single entry unless a
/// runner records more than one invocation for the host.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MultiResult {
    pub host    : String,
    results     : Vec<TaskResult>,
}

impl MultiResult {

    pub fn new(host: &str) -> Self {
        Self {
            host: host.to_string(),
            results: Vec::new(),
        }
    }

    pub fn push(&mut self, result: TaskResult) {
        self.results.push(result);
    }

    /// True if any node in any of the result trees failed.
    pub fn failed(&self) -> bool {
        self.results.iter().any(|r| r.any_failed())
    }

    pub fn changed(&self) -> bool {
        self.results.iter().any(|r| r.changed)
    }

    pub fn first(&self) -> Option<&TaskResult> {
        self.results.first()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TaskResult> {
        self.results.iter()
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

impl Index<usize> for MultiResult {
    type Output = TaskResult;

    fn index(&self, index: usize) -> &TaskResult {
        &self.results[index]
    }
}

/// Everything one call to `run` produced, keyed by host name in inventory order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregatedResult {
    pub name  : String,
    results   : IndexMap<String, MultiResult>,
}

impl AggregatedResult {

    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            results: IndexMap::new(),
        }
    }

    pub fn get(&self, host_name: &str) -> Option<&MultiResult> {
        self.results.get(host_name)
    }

    pub fn contains(&self, host_name: &str) -> bool {
        self.results.contains_key(host_name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &MultiResult)> {
        self.results.iter()
    }

    pub fn hosts(&self) -> Vec<String> {
        self.results.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn failed(&self) -> bool {
        self.results.values().any(|m| m.failed())
    }

    /// Hosts with at least one failed node anywhere in their result trees.
    pub fn failed_hosts(&self) -> Vec<String> {
        self.results.iter()
            .filter(|(_k, m)| m.failed())
            .map(|(k, _m)| k.clone())
            .collect()
    }

    /// Hand the aggregate back untouched, or as an error if any host failed.
    pub fn raise_on_error(self) -> Result<Self> {
        match self.failed() {
            true => Err(NetrunError::TaskExecution(Box::new(self))),
            false => Ok(self),
        }
    }

    pub(crate) fn push(&mut self, result: TaskResult) {
        let host = result.host.clone();
        self.results.entry(host.clone()).or_insert_with(|| MultiResult::new(&host)).push(result);
    }
}

impl Index<&str> for AggregatedResult {
    type Output = MultiResult;

    fn index(&self, host_name: &str) -> &MultiResult {
        &self.results[host_name]
    }
}

/// Collects per-host results from worker threads. Hosts finish in any order; the
/// final aggregate is put back into inventory order.
#[derive(Debug, Default)]
pub struct ResultCollector {
    results : Mutex<IndexMap<String, Vec<TaskResult>>>,
}

impl ResultCollector {

    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, result: TaskResult) {
        let mut results = self.results.lock().unwrap_or_else(|e| e.into_inner());
        results.entry(result.host.clone()).or_default().push(result);
    }

    pub fn len(&self) -> usize {
        self.results.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `order` is the inventory order of the hosts; hosts that never reported are left out.
    pub fn into_aggregate(self, name: &str, order: &[String]) -> AggregatedResult {
        let mut results = self.results.into_inner().unwrap_or_else(|e| e.into_inner());
        let mut aggregate = AggregatedResult::new(name);
        for host_name in order.iter() {
            if let Some(host_results) = results.shift_remove(host_name) {
                for result in host_results.into_iter() {
                    aggregate.push(result);
                }
            }
        }
        // anything not in the given order keeps its arrival order at the end
        for (_host, host_results) in results.into_iter() {
            for result in host_results.into_iter() {
                aggregate.push(result);
            }
        }
        aggregate
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tasks::task::{TaskError, TaskOutput};

    fn ok(host: &str) -> TaskResult {
        TaskResult::from_output("hello", host, TaskOutput::value(format!("Hello, {}", host)), Vec::new())
    }

    fn failed(host: &str) -> TaskResult {
        TaskResult::from_error("hello", host, &TaskError::Failed(String::from("nope")), Vec::new())
    }

    #[test]
    fn test_collector_restores_inventory_order() {
        let collector = ResultCollector::new();
        collector.insert(ok("R1"));
        collector.insert(ok("sw2"));
        collector.insert(ok("sw1"));
        assert_eq!(collector.len(), 3);

        let order = vec![String::from("sw1"), String::from("sw2"), String::from("R1")];
        let aggregate = collector.into_aggregate("hello", &order);
        assert_eq!(aggregate.hosts(), order);
        assert_eq!(aggregate.name, "hello");
        assert_eq!(aggregate["sw1"][0].report(), "Hello, sw1");
    }

    #[test]
    fn test_failed_hosts() {
        let collector = ResultCollector::new();
        collector.insert(ok("sw1"));
        collector.insert(failed("R1"));
        let aggregate = collector.into_aggregate("hello", &[String::from("sw1"), String::from("R1")]);

        assert!(aggregate.failed());
        assert_eq!(aggregate.failed_hosts(), vec![String::from("R1")]);
        assert!(aggregate.get("R1").unwrap().failed());
        assert!(!aggregate.get("sw1").unwrap().failed());
        assert!(aggregate.get("nope").is_none());
    }

    #[test]
    fn test_failed_child_marks_host_failed() {
        let child = TaskResult::from_output("child", "sw1", TaskOutput::new().failed(true), Vec::new());
        let root = TaskResult::from_output("root", "sw1", TaskOutput::new(), vec![child]);
        let mut aggregate = AggregatedResult::new("root");
        aggregate.push(root);
        assert_eq!(aggregate.failed_hosts(), vec![String::from("sw1")]);
    }

    #[test]
    fn test_raise_on_error() {
        let mut good = AggregatedResult::new("hello");
        good.push(ok("sw1"));
        assert!(good.raise_on_error().is_ok());

        let mut bad = AggregatedResult::new("hello");
        bad.push(ok("sw1"));
        bad.push(failed("R1"));
        match bad.raise_on_error() {
            Err(NetrunError::TaskExecution(aggregate)) => assert_eq!(aggregate.len(), 2),
            _ => panic!("expected a task execution error"),
        }
    }

    #[test]
    fn test_multi_result_queries() {
        let mut multi = MultiResult::new("sw1");
        assert!(multi.is_empty());
        assert!(multi.first().is_none());
        multi.push(TaskResult::from_output("a", "sw1", TaskOutput::new().changed(true), Vec::new()));
        assert!(multi.changed());
        assert!(!multi.failed());
        assert_eq!(multi.len(), 1);
        assert_eq!(multi.iter().count(), 1);
    }
}
