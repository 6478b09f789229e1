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

use std::io;
use thiserror::Error;
use crate::tasks::aggregate::AggregatedResult;

/// Main error type for netrun operations
#[derive(Debug, Error)]
pub enum NetrunError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Inventory loading errors (bad references, cycles, unreadable sources)
    #[error("Inventory error: {0}")]
    Inventory(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON conversion errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// One or more hosts failed and the run was asked to raise on error
    #[error("Task execution error: {} of {} hosts failed running '{}'", .0.failed_hosts().len(), .0.len(), .0.name)]
    TaskExecution(Box<AggregatedResult>),

    /// The run stopped dispatching hosts after the first failure
    #[error("Run aborted: task '{}' failed on host '{host}'", .aggregate.name)]
    Aborted {
        host: String,
        aggregate: Box<AggregatedResult>,
    },

    /// Other errors
    #[error("Error: {0}")]
    Other(String),
}

impl NetrunError {

    /// True for the errors raised while loading configuration or inventory,
    /// before any task has run.
    pub fn is_config_error(&self) -> bool {
        matches!(self, NetrunError::Config(_) | NetrunError::Inventory(_) | NetrunError::Yaml(_))
    }

    /// The aggregate attached to a failed or aborted run, if any.
    pub fn aggregate(&self) -> Option<&AggregatedResult> {
        match self {
            NetrunError::TaskExecution(aggregate) => Some(aggregate),
            NetrunError::Aborted { aggregate, .. } => Some(aggregate),
            _ => None,
        }
    }
}

impl From<String> for NetrunError {
    fn from(err: String) -> Self {
        NetrunError::Other(err)
    }
}

impl From<&str> for NetrunError {
    fn from(err: &str) -> Self {
        NetrunError::Other(err.to_string())
    }
}

/// Result type alias for netrun operations
pub type Result<T> = std::result::Result<T, NetrunError>;
