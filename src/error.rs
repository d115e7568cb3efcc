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

//! Error types.
//!
//! Every error is recoverable at the caller level: the CLI reports and
//! exits, an embedding library may retry with a fresh state. None of them
//! is ever swallowed inside the crate.

use std::path::PathBuf;

use thiserror::Error;

use crate::tokenizer::TokenizerError;

/// Errors surfaced by the anonymization pipeline.
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed input text, fatal for that input, no partial output
    #[error(transparent)]
    Tokenizer(#[from] TokenizerError),

    /// A placeholder-shaped token with no entry in the reverse maps
    #[error("unknown placeholder '{placeholder}': not produced by this mapping state")]
    UnknownPlaceholder { placeholder: String },

    /// The same placeholder claimed by two different originals during import
    #[error(
        "mapping conflict: '{placeholder}' is already '{existing}', incoming '{incoming}'"
    )]
    MappingConflict {
        placeholder: String,
        existing: String,
        incoming: String,
    },

    /// A snapshot whose forward/reverse maps are not exact inverses
    #[error("corrupt mapping state: {message}")]
    CorruptState { message: String },

    /// The snapshot store could not read or write its file
    #[error("mapping store error for {path}: {message}")]
    Store { path: PathBuf, message: String },
}
