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
use rayon::prelude::*;
use crate::error::{NetrunError, Result};
use crate::inventory::hosts::Host;
use crate::runners::{Dispatch, Runner};

pub const DEFAULT_NUM_WORKERS : usize = 20;

/// Runs hosts on a fixed-size worker pool. Hosts finish in any order; the dispatcher
/// puts results back into inventory order afterwards.
pub struct ThreadedRunner {
    num_workers : usize,
    pool        : rayon::ThreadPool,
}

impl ThreadedRunner {

    pub fn new(num_workers: usize) -> Result<Self> {
        if num_workers == 0 {
            return Err(NetrunError::Config(String::from("num_workers must be at least 1")));
        }
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(num_workers)
            .thread_name(|i| format!("netrun-worker-{}", i))
            .build()
            .map_err(|e| NetrunError::Config(format!("failed to build thread pool: {}", e)))?;
        Ok(Self { num_workers, pool })
    }

    pub fn num_workers(&self) -> usize {
        self.num_workers
    }
}

impl Runner for ThreadedRunner {

    fn name(&self) -> &str {
        "threaded"
    }

    fn run(&self, dispatch: &Dispatch<'_>, hosts: &[Arc<Host>]) -> Result<()> {
        // one host per job so an abort stops anything not yet picked up
        self.pool.install(|| {
            hosts.par_iter().with_max_len(1).for_each(|host| dispatch.execute(host));
        });
        Ok(())
    }
}
