// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
// http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Snapshot store
//!
//! Persists mapping snapshots as JSON. The core only requires that the
//! snapshot structure round-trips exactly; validation against the mapping
//! invariants happens in `MappingState::from_snapshot` / `merge`, not here.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Error;
use crate::mapping::Snapshot;

/// Default location of the mapping file: `~/.sql_anonymizer/mappings.json`,
/// falling back to the current directory when no home is set.
pub fn default_mapping_path() -> PathBuf {
    let base = std::env::var_os("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
    base.join(".sql_anonymizer").join("mappings.json")
}

/// Read a snapshot from `path`. The file must exist and parse.
pub fn load(path: &Path) -> Result<Snapshot, Error> {
    let data = fs::read_to_string(path).map_err(|e| store_error(path, e))?;
    serde_json::from_str(&data).map_err(|e| store_error(path, e))
}

/// Read a snapshot from `path`, treating a missing file as an empty
/// snapshot. Used for session start, where no file simply means no history.
pub fn load_or_default(path: &Path) -> Result<Snapshot, Error> {
    if !path.exists() {
        return Ok(Snapshot::default());
    }
    load(path)
}

/// Write a snapshot to `path` as pretty JSON, creating parent directories
/// as needed.
pub fn save(path: &Path, snapshot: &Snapshot) -> Result<(), Error> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| store_error(path, e))?;
        }
    }
    let data = serde_json::to_string_pretty(snapshot).map_err(|e| store_error(path, e))?;
    fs::write(path, data).map_err(|e| store_error(path, e))
}

fn store_error(path: &Path, source: impl std::fmt::Display) -> Error {
    Error::Store {
        path: path.to_path_buf(),
        message: source.to_string(),
    }
}
