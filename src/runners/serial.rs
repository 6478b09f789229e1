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
use crate::error::Result;
use crate::inventory::hosts::Host;
use crate::runners::{Dispatch, Runner};

/// Runs hosts one at a time on the calling thread, in inventory order.
#[derive(Debug, Default)]
pub struct SerialRunner;

impl SerialRunner {
    pub fn new() -> Self {
        Self
    }
}

impl Runner for SerialRunner {

    fn name(&self) -> &str {
        "serial"
    }

    fn run(&self, dispatch: &Dispatch<'_>, hosts: &[Arc<Host>]) -> Result<()> {
        for host in hosts.iter() {
            if dispatch.should_stop() {
                break;
            }
            dispatch.execute(host);
        }
        Ok(())
    }
}
