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

//! SQL dialect rules: which characters may form identifiers, and the fixed
//! reserved-word and function-name tables the tokenizer matches against.

pub mod keywords;

/// Character-level rules for recognizing identifiers.
pub trait Dialect {
    /// Determine if a character starts an identifier or keyword
    fn is_identifier_start(&self, ch: char) -> bool;
    /// Determine if a character may continue an identifier or keyword
    fn is_identifier_part(&self, ch: char) -> bool;
}

/// A permissive dialect covering the common SQL flavors.
#[derive(Debug, Default)]
pub struct GenericDialect;

impl Dialect for GenericDialect {
    fn is_identifier_start(&self, ch: char) -> bool {
        ch.is_ascii_alphabetic() || ch == '_'
    }

    fn is_identifier_part(&self, ch: char) -> bool {
        ch.is_ascii_alphanumeric() || ch == '_'
    }
}
