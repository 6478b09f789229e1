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

use std::path::Path;

const YAML_ERROR_SHOW_LINES:usize = 3;
const YAML_ERROR_WIDTH:usize = 180;

// ==============================================================================================================
// PUBLIC API
// ==============================================================================================================

/// Render a YAML parse error with the path and a few lines of the source around the error location.
pub fn yaml_error_in_context(yaml_error: &serde_yaml::Error, path: &Path, contents: &str) -> String {

    let mut yaml_error_str = format!("{}", yaml_error);
    if yaml_error_str.len() > YAML_ERROR_WIDTH {
        let cut = (0..=YAML_ERROR_WIDTH - 3).rev().find(|i| yaml_error_str.is_char_boundary(*i)).unwrap_or(0);
        yaml_error_str.truncate(cut);
        yaml_error_str.push_str("...");
    }

    let mut out = format!("error reading YAML file: {}, {}", path.display(), yaml_error_str);

    let location = match yaml_error.location() {
        Some(location) => location,
        None => return out,
    };
    let error_line = location.line();
    let error_column = location.column();

    let show_start = error_line.saturating_sub(YAML_ERROR_SHOW_LINES).max(1);
    let show_stop = error_line + YAML_ERROR_SHOW_LINES;

    for (index, line) in contents.lines().enumerate() {
        let count = index + 1;
        if count < show_start || count > show_stop {
            continue;
        }
        if count == error_line {
            out.push_str(&format!("\n     {count:5}:{error_column:5} | >>> | {}", line));
        } else {
            out.push_str(&format!("\n     {count:5}       |     | {}", line));
        }
    }
    out
}

/// Copy every key of `theirs` that `mine` does not define yet. Existing keys are never replaced,
/// so applying sources from highest to lowest precedence leaves the first definition in place.
pub fn merge_missing(mine: &mut serde_yaml::Mapping, theirs: &serde_yaml::Mapping) {
    for (k, v) in theirs.iter() {
        if !mine.contains_key(k) {
            mine.insert(k.clone(), v.clone());
        }
    }
}

/// Parse a document that may be empty. An empty file or a bare `~` counts as the default value.
pub fn from_optional_str<T>(contents: &str) -> Result<T, serde_yaml::Error>
where
    T: serde::de::DeserializeOwned + Default,
{
    if contents.trim().is_empty() {
        return Ok(T::default());
    }
    // schema errors only carry a location when deserialized from the text
    let value: serde_yaml::Value = serde_yaml::from_str(contents)?;
    match value {
        serde_yaml::Value::Null => Ok(T::default()),
        _ => serde_yaml::from_str(contents),
    }
}
