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

//! SQL query anonymizer / de-anonymizer in Rust
//!
//! This crate rewrites SQL query text into a structurally identical but
//! identifier-free form and reverses that rewrite exactly. Table names,
//! column names and literal values become stable typed placeholders
//! (`table_1`, `identifier_2`, `literal_3`); keywords, operators and
//! clause structure stay untouched. The same original value always gets
//! the same placeholder for as long as the mapping state lives, so the
//! output of one call can be safely fed back for de-anonymization later.
//!
//! ```rust
//! use sql_query_anonymizer::Anonymizer;
//!
//! # fn main() -> Result<(), sql_query_anonymizer::Error> {
//! let mut anonymizer = Anonymizer::new();
//!
//! let masked = anonymizer.anonymize("SELECT name, email FROM users WHERE id = 1")?;
//! assert_eq!(
//!     masked,
//!     "SELECT identifier_1 , identifier_2 FROM table_1 WHERE identifier_3 = literal_1"
//! );
//!
//! // Placeholders identify their own category, so reversing needs no
//! // re-classification, only the same mapping state.
//! let restored = anonymizer.deanonymize(&masked)?;
//! assert_eq!(restored, "SELECT name , email FROM users WHERE id = 1");
//! # Ok(())
//! # }
//! ```
//!
//! Horizontal whitespace is normalized to single spaces between tokens;
//! that is the only way a round trip differs from the input.

#![warn(clippy::all)]
#![forbid(unsafe_code)]

mod anonymizer;
mod classifier;
mod dialect;
mod error;
mod mapping;
mod render;
pub mod store;
mod tokenizer;

pub use anonymizer::Anonymizer;
pub use classifier::{alias_bindings, classify, AliasBinding, ClassifiedToken, Role};
pub use dialect::{Dialect, GenericDialect};
pub use error::Error;
pub use mapping::{Category, CategoryStats, MappingState, OnConflict, Snapshot};
pub use render::{render_anonymized, render_deanonymized};
pub use tokenizer::{Token, TokenKind, Tokenizer, TokenizerError};
