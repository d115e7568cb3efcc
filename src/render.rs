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

//! Renderer
//!
//! Emits the anonymized text from a classified token stream, and the
//! original text from anonymized input. Tokens are joined with single
//! spaces (dotted references are re-tightened); original horizontal
//! formatting is normalized, not preserved.
//!
//! De-anonymization never re-runs the tokenizer or classifier: placeholders
//! are self-describing through their `{category}_{n}` shape, so a plain
//! text scan suffices and anything placeholder-shaped that the state never
//! produced is a hard `UnknownPlaceholder` error.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::classifier::ClassifiedToken;
use crate::error::Error;
use crate::mapping::{Category, MappingState};

/// The exact lexical form of a placeholder. The category alternation is the
/// closed set from [`Category`]; the word boundaries keep identifiers like
/// `my_table_1` untouched.
static PLACEHOLDER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(table|identifier|literal)_([0-9]+)\b").expect("valid pattern"));

/// Replace every table/column/literal token by its placeholder, consulting
/// the mapping state, and join with normalized spacing.
pub fn render_anonymized(classified: &[ClassifiedToken], state: &mut MappingState) -> String {
    let mut out = String::new();
    for item in classified {
        let piece = match item.category() {
            Some(category) => state.assign_or_reuse(category, &item.token.text),
            None => item.token.text.clone(),
        };
        push_piece(&mut out, &piece);
    }
    out
}

/// Scan `text` for placeholder-shaped substrings and substitute the
/// original values back. Non-matching text passes through untouched; a
/// placeholder unknown to `state` fails the whole call.
pub fn render_deanonymized(text: &str, state: &MappingState) -> Result<String, Error> {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for caps in PLACEHOLDER_RE.captures_iter(text) {
        let matched = match caps.get(0) {
            Some(m) => m,
            None => continue,
        };
        let category = match Category::from_name(&caps[1]) {
            Some(category) => category,
            None => continue, // unreachable: the alternation is the category set
        };
        let original = state.resolve(category, matched.as_str())?;
        out.push_str(&text[last..matched.start()]);
        out.push_str(original);
        last = matched.end();
    }
    out.push_str(&text[last..]);
    Ok(out)
}

/// Single-space separation, except around `.` so qualified references come
/// out as `alias.column`.
fn push_piece(out: &mut String, piece: &str) {
    if !out.is_empty() && piece != "." && !out.ends_with('.') {
        out.push(' ');
    }
    out.push_str(piece);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::classify;
    use crate::dialect::GenericDialect;
    use crate::tokenizer::Tokenizer;
    use pretty_assertions::assert_eq;

    fn anonymize(sql: &str, state: &mut MappingState) -> String {
        let tokens = Tokenizer::new(&GenericDialect, sql)
            .tokenize()
            .expect("tokenize failed");
        render_anonymized(&classify(&tokens), state)
    }

    #[test]
    fn renders_the_reference_example() {
        let mut state = MappingState::new();
        let out = anonymize("SELECT name, email FROM users WHERE id = 1", &mut state);
        assert_eq!(
            out,
            "SELECT identifier_1 , identifier_2 FROM table_1 WHERE identifier_3 = literal_1"
        );
    }

    #[test]
    fn qualified_references_render_tight() {
        let mut state = MappingState::new();
        let out = anonymize("SELECT u.name FROM users u", &mut state);
        assert_eq!(out, "SELECT u.identifier_1 FROM table_1 u");
    }

    #[test]
    fn deanonymize_restores_originals() {
        let mut state = MappingState::new();
        let masked = anonymize("SELECT name, email FROM users WHERE id = 1", &mut state);
        let restored = render_deanonymized(&masked, &state).unwrap();
        assert_eq!(restored, "SELECT name , email FROM users WHERE id = 1");
    }

    #[test]
    fn unknown_placeholder_fails_closed() {
        let state = MappingState::new();
        let err = render_deanonymized("SELECT identifier_1 FROM table_9", &state).unwrap_err();
        assert!(matches!(
            err,
            Error::UnknownPlaceholder { ref placeholder } if placeholder == "identifier_1"
        ));
    }

    #[test]
    fn placeholder_lookalikes_pass_through() {
        let mut state = MappingState::new();
        state.assign_or_reuse(Category::Table, "users");
        // `my_table_1` and `table_x` are not placeholder-shaped
        let text = "SELECT a FROM my_table_1 , table_x , table_1";
        let out = render_deanonymized(text, &state).unwrap();
        assert_eq!(out, "SELECT a FROM my_table_1 , table_x , users");
    }

    #[test]
    fn comments_flow_through_both_directions() {
        let mut state = MappingState::new();
        let out = anonymize("SELECT a /* keep */ FROM t", &mut state);
        assert_eq!(out, "SELECT identifier_1 /* keep */ FROM table_1");
        let back = render_deanonymized(&out, &state).unwrap();
        assert_eq!(back, "SELECT a /* keep */ FROM t");
    }
}
