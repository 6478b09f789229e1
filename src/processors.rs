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
use inline_colorization::{color_red, color_green, color_yellow, color_reset};
use crate::inventory::hosts::Host;
use crate::tasks::aggregate::AggregatedResult;
use crate::tasks::response::TaskResult;

/// Hooks invoked around a run. Host-level hooks are called from worker threads, so
/// implementations must be thread-safe and cheap.
pub trait Processor: Send + Sync {
    fn task_started(&self, _task: &str, _hosts: &[String]) {}
    fn task_completed(&self, _task: &str, _aggregate: &AggregatedResult) {}

    fn task_instance_started(&self, _task: &str, _host: &Host) {}
    fn task_instance_completed(&self, _task: &str, _host: &Host, _result: &TaskResult) {}

    fn subtask_instance_started(&self, _task: &str, _host: &Host) {}
    fn subtask_instance_completed(&self, _task: &str, _host: &Host, _result: &TaskResult) {}
}

pub type ProcessorRef = Arc<dyn Processor>;

/// The processors attached to a handle, shared with every task context.
pub type Processors = Arc<Vec<ProcessorRef>>;

/// A processor that does nothing, for when output is not needed.
pub struct NullProcessor;

impl Processor for NullProcessor {}

/// Prints a banner per task and one status line per host.
pub struct TerminalProcessor {
    pub verbosity: u32,
}

impl TerminalProcessor {
    pub fn new(verbosity: u32) -> Self {
        Self { verbosity }
    }
}

impl Processor for TerminalProcessor {

    fn task_started(&self, task: &str, hosts: &[String]) {
        println!();
        crate::util::terminal::banner(&format!("TASK: {} => {}", task, hosts.join(", ")));
    }

    fn task_instance_completed(&self, _task: &str, host: &Host, result: &TaskResult) {
        println!("{} => {}", status_label(result), host.name);
        if self.verbosity > 0 || result.failed {
            let report = result.report();
            if !report.is_empty() {
                println!("  {}", report);
            }
        }
        if self.verbosity > 1 {
            for child in result.walk().skip(1) {
                println!("  {} {}", status_label(child), child.name);
            }
        }
    }

    fn task_completed(&self, _task: &str, aggregate: &AggregatedResult) {
        println!();
        crate::util::terminal::banner(&String::from("RECAP"));
        for (host, multi) in aggregate.iter() {
            let changed = multi.iter().filter(|r| r.changed).count();
            let failed = multi.iter().filter(|r| r.any_failed()).count();
            println!("{} : ok={} changed={} failed={}", host, multi.len() - failed, changed, failed);
        }
    }
}

fn status_label(result: &TaskResult) -> String {
    if result.failed {
        format!("{color_red}FAILED{color_reset}")
    } else if result.changed {
        format!("{color_yellow}CHANGED{color_reset}")
    } else {
        format!("{color_green}OK{color_reset}")
    }
}
