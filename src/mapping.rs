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

//! Bidirectional mapping engine.
//!
//! Owns the forward (original → placeholder) and reverse (placeholder →
//! original) maps plus the per-category counters. Placeholders are
//! `{category}_{n}` with `n` starting at 1. For every category the two maps
//! are exact inverses at all times and `counter == forward.len() + 1`.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Substitution namespace. Closed set: the placeholder prefix is derived
/// from it and the de-anonymization scan recognizes exactly these three.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    Table,
    Identifier,
    Literal,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Table, Category::Identifier, Category::Literal];

    /// The placeholder prefix, e.g. `table` in `table_1`.
    pub fn prefix(&self) -> &'static str {
        match self {
            Category::Table => "table",
            Category::Identifier => "identifier",
            Category::Literal => "literal",
        }
    }

    /// Parse a category name as it appears in snapshots.
    pub fn from_name(name: &str) -> Option<Category> {
        match name {
            "table" => Some(Category::Table),
            "identifier" => Some(Category::Identifier),
            "literal" => Some(Category::Literal),
            _ => None,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

/// What `import` should do when a placeholder is already claimed by a
/// different original value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnConflict {
    /// Fail with `MappingConflict`, leaving the state untouched
    Abort,
    /// Let the incoming pair replace the existing one
    Overwrite,
}

/// Per-category mapping counts, for inspection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CategoryStats {
    pub tables: usize,
    pub identifiers: usize,
    pub literals: usize,
}

impl CategoryStats {
    pub fn total(&self) -> usize {
        self.tables + self.identifiers + self.literals
    }
}

/// The serialized form of a `MappingState`, as produced by `export` and
/// consumed by `import`. Maps are keyed by category name; `counters` hold
/// the next integer to assign per category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Snapshot {
    pub mappings: BTreeMap<String, BTreeMap<String, String>>,
    pub reverse_mappings: BTreeMap<String, BTreeMap<String, String>>,
    pub counters: BTreeMap<String, u64>,
}

#[derive(Debug, Clone, Default)]
struct CategoryMaps {
    forward: HashMap<String, String>,
    reverse: HashMap<String, String>,
    counter: u64,
}

impl CategoryMaps {
    fn new() -> Self {
        CategoryMaps {
            forward: HashMap::new(),
            reverse: HashMap::new(),
            counter: 1,
        }
    }
}

/// The only entity with cross-call lifetime: three parallel forward/reverse
/// maps plus counters, one set per category. Explicitly owned and passed by
/// the caller; persistence happens through `export`/`import` snapshots.
#[derive(Debug, Clone)]
pub struct MappingState {
    categories: HashMap<Category, CategoryMaps>,
}

impl Default for MappingState {
    fn default() -> Self {
        Self::new()
    }
}

impl MappingState {
    /// Create an empty state with all counters at 1.
    pub fn new() -> Self {
        let mut categories = HashMap::new();
        for category in Category::ALL {
            categories.insert(category, CategoryMaps::new());
        }
        MappingState { categories }
    }

    /// Rebuild a state from a snapshot. Forward and reverse must be exact
    /// inverses and every placeholder must carry the category's own prefix;
    /// fails with `CorruptState` otherwise.
    pub fn from_snapshot(snapshot: &Snapshot) -> Result<Self, Error> {
        validate_snapshot(snapshot)?;

        let mut state = MappingState::new();
        for category in Category::ALL {
            let maps = state.maps_mut(category);
            if let Some(forward) = snapshot.mappings.get(category.prefix()) {
                for (original, placeholder) in forward {
                    maps.forward.insert(original.clone(), placeholder.clone());
                    maps.reverse.insert(placeholder.clone(), original.clone());
                }
            }
            maps.counter = next_counter(&maps.forward);
        }
        Ok(state)
    }

    /// Return the placeholder for `original`, allocating a fresh one on
    /// first sight. Idempotent: repeated calls with the same input return
    /// the same placeholder and leave the counter alone.
    pub fn assign_or_reuse(&mut self, category: Category, original: &str) -> String {
        let maps = self.maps_mut(category);
        if let Some(existing) = maps.forward.get(original) {
            return existing.clone();
        }

        let placeholder = format!("{}_{}", category.prefix(), maps.counter);
        debug!("assign {} -> {}", original, placeholder);
        maps.counter += 1;
        maps.forward
            .insert(original.to_string(), placeholder.clone());
        maps.reverse
            .insert(placeholder.clone(), original.to_string());
        placeholder
    }

    /// Look up the original value behind a placeholder. Fails with
    /// `UnknownPlaceholder` for a placeholder this state never produced.
    pub fn resolve(&self, category: Category, placeholder: &str) -> Result<&str, Error> {
        self.maps(category)
            .reverse
            .get(placeholder)
            .map(String::as_str)
            .ok_or_else(|| Error::UnknownPlaceholder {
                placeholder: placeholder.to_string(),
            })
    }

    /// True if `original` already has a placeholder in `category`.
    pub fn contains(&self, category: Category, original: &str) -> bool {
        self.maps(category).forward.contains_key(original)
    }

    /// Merge the pairs of an incoming snapshot into this state.
    ///
    /// All-or-nothing: the incoming snapshot is validated and every pair is
    /// checked before anything is inserted. A placeholder claimed by two
    /// different originals fails with `MappingConflict` under
    /// `OnConflict::Abort`; under `OnConflict::Overwrite` the incoming pair
    /// wins and the old original is dropped.
    pub fn merge(&mut self, snapshot: &Snapshot, on_conflict: OnConflict) -> Result<(), Error> {
        validate_snapshot(snapshot)?;

        if on_conflict == OnConflict::Abort {
            for category in Category::ALL {
                let maps = self.maps(category);
                let incoming = match snapshot.mappings.get(category.prefix()) {
                    Some(forward) => forward,
                    None => continue,
                };
                for (original, placeholder) in incoming {
                    if maps.forward.contains_key(original) {
                        continue; // already mapped by original value
                    }
                    if let Some(existing) = maps.reverse.get(placeholder) {
                        if existing != original {
                            return Err(Error::MappingConflict {
                                placeholder: placeholder.clone(),
                                existing: existing.clone(),
                                incoming: original.clone(),
                            });
                        }
                    }
                }
            }
        }

        for category in Category::ALL {
            let maps = self.maps_mut(category);
            let incoming = match snapshot.mappings.get(category.prefix()) {
                Some(forward) => forward,
                None => continue,
            };
            for (original, placeholder) in incoming {
                if maps.forward.contains_key(original) {
                    continue;
                }
                if let Some(displaced) = maps.reverse.insert(placeholder.clone(), original.clone())
                {
                    // Overwrite mode: drop the forward entry of the loser
                    maps.forward.remove(&displaced);
                }
                maps.forward.insert(original.clone(), placeholder.clone());
            }
            maps.counter = next_counter(&maps.forward);
        }
        Ok(())
    }

    /// Empty all maps and reset all counters to 1. Irreversible without a
    /// prior `export`.
    pub fn clear(&mut self) {
        for maps in self.categories.values_mut() {
            maps.forward.clear();
            maps.reverse.clear();
            maps.counter = 1;
        }
    }

    /// Per-category mapping counts.
    pub fn stats(&self) -> CategoryStats {
        CategoryStats {
            tables: self.maps(Category::Table).forward.len(),
            identifiers: self.maps(Category::Identifier).forward.len(),
            literals: self.maps(Category::Literal).forward.len(),
        }
    }

    /// Serialize the full state into a snapshot.
    pub fn export(&self) -> Snapshot {
        let mut snapshot = Snapshot::default();
        for category in Category::ALL {
            let maps = self.maps(category);
            let forward: BTreeMap<String, String> = maps
                .forward
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect();
            let reverse: BTreeMap<String, String> = maps
                .reverse
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect();
            snapshot
                .mappings
                .insert(category.prefix().to_string(), forward);
            snapshot
                .reverse_mappings
                .insert(category.prefix().to_string(), reverse);
            snapshot
                .counters
                .insert(category.prefix().to_string(), maps.counter);
        }
        snapshot
    }

    /// Iterate the forward pairs of one category in placeholder order.
    pub fn forward_pairs(&self, category: Category) -> Vec<(String, String)> {
        let maps = self.maps(category);
        let mut pairs: Vec<(String, String)> = maps
            .forward
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        pairs.sort_by_key(|(_, placeholder)| placeholder_index(placeholder));
        pairs
    }

    fn maps(&self, category: Category) -> &CategoryMaps {
        // every category is inserted at construction
        &self.categories[&category]
    }

    fn maps_mut(&mut self, category: Category) -> &mut CategoryMaps {
        self.categories
            .get_mut(&category)
            .expect("category maps present from construction")
    }
}

/// Check the snapshot invariants: known category names, forward/reverse
/// exact inverses, placeholders shaped `{prefix}_{n}` with the right prefix.
fn validate_snapshot(snapshot: &Snapshot) -> Result<(), Error> {
    for name in snapshot
        .mappings
        .keys()
        .chain(snapshot.reverse_mappings.keys())
        .chain(snapshot.counters.keys())
    {
        if Category::from_name(name).is_none() {
            return Err(Error::CorruptState {
                message: format!("unknown category '{}'", name),
            });
        }
    }

    for category in Category::ALL {
        let empty = BTreeMap::new();
        let forward = snapshot.mappings.get(category.prefix()).unwrap_or(&empty);
        let reverse = snapshot
            .reverse_mappings
            .get(category.prefix())
            .unwrap_or(&empty);

        if forward.len() != reverse.len() {
            return Err(Error::CorruptState {
                message: format!(
                    "category '{}': {} forward entries but {} reverse entries",
                    category,
                    forward.len(),
                    reverse.len()
                ),
            });
        }

        for (original, placeholder) in forward {
            if placeholder_index(placeholder) == 0
                || !placeholder.starts_with(category.prefix())
                || placeholder.as_bytes().get(category.prefix().len()) != Some(&b'_')
            {
                return Err(Error::CorruptState {
                    message: format!(
                        "category '{}': malformed placeholder '{}'",
                        category, placeholder
                    ),
                });
            }
            match reverse.get(placeholder) {
                Some(back) if back == original => {}
                _ => {
                    return Err(Error::CorruptState {
                        message: format!(
                            "category '{}': '{}' -> '{}' has no matching reverse entry",
                            category, original, placeholder
                        ),
                    });
                }
            }
        }
    }
    Ok(())
}

/// The `n` of a `{prefix}_{n}` placeholder, or 0 when it has none.
fn placeholder_index(placeholder: &str) -> u64 {
    placeholder
        .rsplit('_')
        .next()
        .and_then(|n| n.parse().ok())
        .unwrap_or(0)
}

/// Next counter value after a merge: one past the highest allocated index.
fn next_counter(forward: &HashMap<String, String>) -> u64 {
    forward
        .values()
        .map(|p| placeholder_index(p))
        .max()
        .unwrap_or(0)
        + 1
}
