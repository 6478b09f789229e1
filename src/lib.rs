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

pub mod api;
pub mod config;
pub mod error;
pub mod inventory;
pub mod processors;
pub mod registry;
pub mod runners;
pub mod tasks;
pub mod util;

// Re-export commonly used types for library users
pub use api::{Netrun, RunOptions, RunState};
pub use config::{NetrunConfig, CoreConfig, InventoryConfig, InventoryOptions, RunnerConfig, RunnerOptions};
pub use error::{NetrunError, Result};
pub use inventory::filter::Filter;
pub use inventory::groups::{Defaults, Group};
pub use inventory::hosts::Host;
pub use inventory::inventory::Inventory;
pub use inventory::loading::{InventoryPlugin, SimpleInventory};
pub use processors::{Processor, ProcessorRef, NullProcessor, TerminalProcessor};
pub use runners::Runner;
pub use runners::serial::SerialRunner;
pub use runners::threaded::ThreadedRunner;
pub use tasks::aggregate::{AggregatedResult, MultiResult};
pub use tasks::context::TaskContext;
pub use tasks::response::TaskResult;
pub use tasks::task::{FnTask, Params, Task, TaskError, TaskOutput, require_str};
