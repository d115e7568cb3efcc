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

//! The anonymization session: one owned mapping state plus the pipeline
//! entry points. No process-wide singletons; a caller that wants mappings
//! to persist across invocations owns the export/import lifecycle and keeps
//! passing the same `Anonymizer` (or its snapshot) around.

use crate::classifier::classify;
use crate::dialect::GenericDialect;
use crate::error::Error;
use crate::mapping::{CategoryStats, MappingState, OnConflict, Snapshot};
use crate::render::{render_anonymized, render_deanonymized};
use crate::tokenizer::Tokenizer;

/// Anonymizes SQL queries and reverses the substitution, keeping table
/// names, identifiers and literals consistent across calls.
///
/// Single-threaded by design: each call runs to completion and mutates the
/// owned state. A multi-threaded host must serialize access to one
/// instance.
#[derive(Debug, Default)]
pub struct Anonymizer {
    dialect: GenericDialect,
    state: MappingState,
}

impl Anonymizer {
    /// A fresh session with an empty mapping state.
    pub fn new() -> Self {
        Self::default()
    }

    /// A session continuing from an existing state.
    pub fn with_state(state: MappingState) -> Self {
        Anonymizer {
            dialect: GenericDialect,
            state,
        }
    }

    /// A session restored from a snapshot; fails with `CorruptState` if the
    /// snapshot violates the forward/reverse invariants.
    pub fn from_snapshot(snapshot: &Snapshot) -> Result<Self, Error> {
        Ok(Self::with_state(MappingState::from_snapshot(snapshot)?))
    }

    /// Tokenize, classify and rewrite `query` with placeholders. Repeated
    /// calls against the same state give the same placeholder for the same
    /// original value.
    pub fn anonymize(&mut self, query: &str) -> Result<String, Error> {
        let tokens = Tokenizer::new(&self.dialect, query).tokenize()?;
        let classified = classify(&tokens);
        Ok(render_anonymized(&classified, &mut self.state))
    }

    /// Substitute the original values back into previously anonymized text.
    pub fn deanonymize(&self, query: &str) -> Result<String, Error> {
        render_deanonymized(query, &self.state)
    }

    /// Per-category mapping counts.
    pub fn stats(&self) -> CategoryStats {
        self.state.stats()
    }

    /// Drop every mapping and reset the counters.
    pub fn clear(&mut self) {
        self.state.clear();
    }

    /// Serialize the current state.
    pub fn export(&self) -> Snapshot {
        self.state.export()
    }

    /// Merge a snapshot into the current state; all-or-nothing per call.
    pub fn import(&mut self, snapshot: &Snapshot, on_conflict: OnConflict) -> Result<(), Error> {
        self.state.merge(snapshot, on_conflict)
    }

    pub fn state(&self) -> &MappingState {
        &self.state
    }
}
