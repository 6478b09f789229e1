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

use std::path::{Path, PathBuf};
use std::io::Read;
use crate::error::{NetrunError, Result};

// open a file per the normal rust way, but name the path in the error
pub fn netrun_file_open(path: &Path) -> Result<std::fs::File> {
    return std::fs::File::open(path).map_err(
        |x| NetrunError::Inventory(format!("unable to open file: {}, {}", path.display(), x))
    );
}

pub fn read_local_file(path: &Path) -> Result<String> {
    let mut file = netrun_file_open(path)?;
    let mut buffer = String::new();
    file.read_to_string(&mut buffer).map_err(
        |x| NetrunError::Inventory(format!("unable to read file: {}, {}", path.display(), x))
    )?;
    return Ok(buffer);
}

// a missing optional source reads as an empty document
pub fn read_optional_file(path: &Path) -> Result<String> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "optional inventory source not found, using an empty one");
        return Ok(String::new());
    }
    read_local_file(path)
}

// expand a leading ~ and anchor relative paths at base
pub fn resolve_path(path: &Path, base: Option<&Path>) -> PathBuf {
    let expanded = match path.to_str() {
        Some(s) if s.starts_with('~') => expanduser::expanduser(s).unwrap_or_else(|_| path.to_path_buf()),
        _ => path.to_path_buf(),
    };
    match base {
        Some(base) if expanded.is_relative() => base.join(expanded),
        _ => expanded,
    }
}
