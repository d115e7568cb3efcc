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

//! SQL Classifier
//!
//! Assigns each token a semantic role (table, column, literal, structural)
//! from syntactic context alone: a pre-pass collects alias bindings from
//! `FROM`/`JOIN ... [AS] alias` shapes, then one forward pass walks the
//! tokens while tracking the current clause and whether the cursor sits in
//! table position.
//!
//! Classification never fails: a malformed clause (`FROM` with no following
//! name) simply leaves the offending region structural. When the same
//! spelling occurs once in table position and once as a bare column
//! reference, each occurrence is classified by position; the per-category
//! mapping namespaces keep the two from colliding.

use std::collections::HashMap;

use log::debug;

use crate::mapping::Category;
use crate::tokenizer::{Token, TokenKind};

/// Semantic role of a token after classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// A table reference, substituted from the `table` namespace
    Table,
    /// A column or other bare identifier, substituted from `identifier`
    Column,
    /// A string or number literal, substituted from `literal`
    Literal,
    /// Keywords, operators, punctuation, comments and aliases: passed
    /// through verbatim
    Structural,
}

/// A token plus its assigned role. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedToken {
    pub token: Token,
    pub role: Role,
}

impl ClassifiedToken {
    /// The mapping namespace this token substitutes through, if any.
    pub fn category(&self) -> Option<Category> {
        match self.role {
            Role::Table => Some(Category::Table),
            Role::Column => Some(Category::Identifier),
            Role::Literal => Some(Category::Literal),
            Role::Structural => None,
        }
    }
}

/// A query-local `alias -> table` association, e.g. `c -> customers` from
/// `FROM customers c`. Not persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasBinding {
    pub alias: String,
    pub table: String,
}

/// The clause the forward pass is currently inside. Updated on clause
/// keywords; a single mutable cursor rather than an explicit state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Clause {
    None,
    Select,
    From,
    Where,
    GroupBy,
    OrderBy,
    Having,
    Set,
    Values,
    On,
    Limit,
}

/// Collect alias bindings by scanning for `FROM`/`JOIN`/`UPDATE`/`INTO`
/// followed by a (possibly qualified) name and an optional `AS <alias>` or
/// bare trailing identifier.
pub fn alias_bindings(tokens: &[Token]) -> Vec<AliasBinding> {
    let mut bindings = Vec::new();
    for (i, token) in tokens.iter().enumerate() {
        if token.kind != TokenKind::Keyword {
            continue;
        }
        if !matches!(token.upper().as_str(), "FROM" | "JOIN" | "UPDATE" | "INTO") {
            continue;
        }
        let name = match next_meaningful(tokens, i) {
            Some(j) if tokens[j].kind == TokenKind::Identifier => j,
            _ => continue, // e.g. `FROM (` or a malformed clause
        };
        // step over `schema.table` style qualification to the last segment
        let mut last = name;
        while last + 2 < tokens.len()
            && tokens[last + 1].text == "."
            && tokens[last + 2].kind == TokenKind::Identifier
        {
            last += 2;
        }
        let table = tokens[last].text.clone();
        match next_meaningful(tokens, last) {
            Some(k) if tokens[k].kind == TokenKind::Keyword && tokens[k].upper() == "AS" => {
                if let Some(m) = next_meaningful(tokens, k) {
                    if tokens[m].kind == TokenKind::Identifier {
                        debug!("alias binding {} -> {}", tokens[m].text, table);
                        bindings.push(AliasBinding {
                            alias: tokens[m].text.clone(),
                            table,
                        });
                    }
                }
            }
            Some(k) if tokens[k].kind == TokenKind::Identifier => {
                debug!("alias binding {} -> {}", tokens[k].text, table);
                bindings.push(AliasBinding {
                    alias: tokens[k].text.clone(),
                    table,
                });
            }
            _ => {}
        }
    }
    bindings
}

/// Classify a token sequence. Infallible: only the tokenizer raises hard
/// errors, classification degrades to `Structural` on anything it cannot
/// place.
pub fn classify(tokens: &[Token]) -> Vec<ClassifiedToken> {
    let aliases: HashMap<String, String> = alias_bindings(tokens)
        .into_iter()
        .map(|b| (b.alias.to_ascii_lowercase(), b.table))
        .collect();

    let mut classified = Vec::with_capacity(tokens.len());
    let mut clause = Clause::None;
    // (clause, table_position) saved at each `(`, restored at `)`
    let mut paren_stack: Vec<(Clause, bool)> = Vec::new();
    let mut table_position = false;
    let mut expect_alias = false;
    let mut prev_text = String::new();
    let mut prev_role = Role::Structural;

    for (i, token) in tokens.iter().enumerate() {
        let role = match token.kind {
            TokenKind::Comment => Role::Structural,
            TokenKind::Keyword => {
                let upper = token.upper();
                table_position = false;
                expect_alias = false;
                match upper.as_str() {
                    "SELECT" => set_clause(&mut clause, Clause::Select),
                    "FROM" => {
                        set_clause(&mut clause, Clause::From);
                        table_position = true;
                    }
                    "JOIN" => {
                        set_clause(&mut clause, Clause::From);
                        table_position = true;
                    }
                    "UPDATE" | "INTO" => {
                        set_clause(&mut clause, Clause::From);
                        table_position = true;
                    }
                    "WHERE" => set_clause(&mut clause, Clause::Where),
                    "GROUP" => set_clause(&mut clause, Clause::GroupBy),
                    "ORDER" => set_clause(&mut clause, Clause::OrderBy),
                    "HAVING" => set_clause(&mut clause, Clause::Having),
                    "SET" => set_clause(&mut clause, Clause::Set),
                    "VALUES" => set_clause(&mut clause, Clause::Values),
                    "ON" => set_clause(&mut clause, Clause::On),
                    "LIMIT" | "OFFSET" => set_clause(&mut clause, Clause::Limit),
                    "AS" => expect_alias = true,
                    _ => {}
                }
                Role::Structural
            }
            TokenKind::StringLiteral | TokenKind::NumberLiteral => {
                table_position = false;
                expect_alias = false;
                Role::Literal
            }
            TokenKind::Operator => {
                table_position = false;
                expect_alias = false;
                Role::Structural
            }
            TokenKind::Punctuation => {
                match token.text.as_str() {
                    "(" => {
                        paren_stack.push((clause, table_position));
                        // the clause cursor restarts inside parentheses so a
                        // column or value list never inherits FROM semantics
                        clause = Clause::None;
                        table_position = false;
                        expect_alias = false;
                    }
                    ")" => {
                        if let Some((outer, was_table_position)) = paren_stack.pop() {
                            clause = outer;
                            // a derived table just closed; a trailing bare
                            // identifier names it
                            expect_alias = was_table_position;
                        }
                        table_position = false;
                    }
                    "," => {
                        // a FROM list re-enters table position after commas
                        table_position = clause == Clause::From;
                        expect_alias = false;
                    }
                    ";" => {
                        clause = Clause::None;
                        table_position = false;
                        expect_alias = false;
                    }
                    "." => {
                        // keep table position armed across `schema.table`
                        table_position = prev_role == Role::Table;
                    }
                    _ => {
                        table_position = false;
                        expect_alias = false;
                    }
                }
                Role::Structural
            }
            TokenKind::Identifier => {
                if table_position {
                    table_position = false;
                    expect_alias = true;
                    Role::Table
                } else if prev_text == "." {
                    // qualified reference: the member is a column, the
                    // qualifier was handled on its own turn
                    Role::Column
                } else if expect_alias {
                    expect_alias = false;
                    Role::Structural
                } else if is_alias_qualifier(tokens, i, &aliases) {
                    Role::Structural
                } else if is_implicit_alias(tokens, i, prev_role) {
                    Role::Structural
                } else {
                    Role::Column
                }
            }
        };

        if token.kind != TokenKind::Comment {
            prev_text = token.text.clone();
            prev_role = role;
        }
        classified.push(ClassifiedToken {
            token: token.clone(),
            role,
        });
    }
    classified
}

fn set_clause(clause: &mut Clause, next: Clause) {
    if *clause != next {
        debug!("clause {:?} -> {:?}", clause, next);
        *clause = next;
    }
}

/// `c` in `c.id` where `c` is a known alias: left untouched, it denotes a
/// relation already captured as a table elsewhere.
fn is_alias_qualifier(tokens: &[Token], i: usize, aliases: &HashMap<String, String>) -> bool {
    if !aliases.contains_key(&tokens[i].text.to_ascii_lowercase()) {
        return false;
    }
    matches!(next_meaningful(tokens, i), Some(j) if tokens[j].text == ".")
}

/// `dept` in `SELECT p.department dept FROM ...`: a bare identifier right
/// after a column, standing before `,` or `FROM`, aliases that column.
fn is_implicit_alias(tokens: &[Token], i: usize, prev_role: Role) -> bool {
    if prev_role != Role::Column {
        return false;
    }
    match next_meaningful(tokens, i) {
        Some(j) => tokens[j].text == "," || tokens[j].upper() == "FROM",
        None => true,
    }
}

/// Index of the next non-comment token after `i`.
fn next_meaningful(tokens: &[Token], i: usize) -> Option<usize> {
    tokens
        .iter()
        .enumerate()
        .skip(i + 1)
        .find(|(_, t)| t.kind != TokenKind::Comment)
        .map(|(j, _)| j)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::GenericDialect;
    use crate::tokenizer::Tokenizer;

    fn classify_sql(sql: &str) -> Vec<ClassifiedToken> {
        let tokens = Tokenizer::new(&GenericDialect, sql)
            .tokenize()
            .expect("tokenize failed");
        classify(&tokens)
    }

    fn role_of<'a>(classified: &'a [ClassifiedToken], text: &str) -> Role {
        classified
            .iter()
            .find(|c| c.token.text == text)
            .unwrap_or_else(|| panic!("token '{}' not found", text))
            .role
    }

    #[test]
    fn classifies_a_simple_select() {
        let c = classify_sql("SELECT name, email FROM users WHERE id = 1");
        assert_eq!(role_of(&c, "name"), Role::Column);
        assert_eq!(role_of(&c, "email"), Role::Column);
        assert_eq!(role_of(&c, "users"), Role::Table);
        assert_eq!(role_of(&c, "id"), Role::Column);
        assert_eq!(role_of(&c, "1"), Role::Literal);
        assert_eq!(role_of(&c, "SELECT"), Role::Structural);
        assert_eq!(role_of(&c, "="), Role::Structural);
    }

    #[test]
    fn collects_alias_bindings() {
        let tokens = Tokenizer::new(
            &GenericDialect,
            "SELECT u.name FROM users u JOIN posts AS p ON u.id = p.user_id",
        )
        .tokenize()
        .unwrap();
        let bindings = alias_bindings(&tokens);
        assert_eq!(
            bindings,
            vec![
                AliasBinding {
                    alias: "u".into(),
                    table: "users".into()
                },
                AliasBinding {
                    alias: "p".into(),
                    table: "posts".into()
                },
            ]
        );
    }

    #[test]
    fn alias_qualifiers_stay_structural_and_members_are_columns() {
        let c = classify_sql("SELECT u.name, p.title FROM users u JOIN posts p ON u.id = p.user_id");
        assert_eq!(role_of(&c, "u"), Role::Structural);
        assert_eq!(role_of(&c, "p"), Role::Structural);
        assert_eq!(role_of(&c, "name"), Role::Column);
        assert_eq!(role_of(&c, "title"), Role::Column);
        assert_eq!(role_of(&c, "user_id"), Role::Column);
        assert_eq!(role_of(&c, "users"), Role::Table);
        assert_eq!(role_of(&c, "posts"), Role::Table);
    }

    #[test]
    fn as_aliases_are_preserved() {
        let c = classify_sql("SELECT u.name AS username FROM users AS u");
        assert_eq!(role_of(&c, "username"), Role::Structural);
        assert_eq!(role_of(&c, "u"), Role::Structural);
        assert_eq!(role_of(&c, "users"), Role::Table);
    }

    #[test]
    fn from_list_commas_rearm_table_position() {
        let c = classify_sql("SELECT a FROM t1, t2 WHERE x = 1");
        assert_eq!(role_of(&c, "t1"), Role::Table);
        assert_eq!(role_of(&c, "t2"), Role::Table);
        assert_eq!(role_of(&c, "x"), Role::Column);
    }

    #[test]
    fn update_and_insert_take_table_position() {
        let c = classify_sql("UPDATE users SET active = 1 WHERE id = 2");
        assert_eq!(role_of(&c, "users"), Role::Table);
        assert_eq!(role_of(&c, "active"), Role::Column);

        let c = classify_sql("INSERT INTO logs (msg) VALUES ('hi')");
        assert_eq!(role_of(&c, "logs"), Role::Table);
        assert_eq!(role_of(&c, "msg"), Role::Column);
        assert_eq!(role_of(&c, "'hi'"), Role::Literal);
    }

    #[test]
    fn qualified_table_names_stay_in_table_position() {
        let c = classify_sql("SELECT a FROM warehouse.orders WHERE b = 1");
        assert_eq!(role_of(&c, "warehouse"), Role::Table);
        assert_eq!(role_of(&c, "orders"), Role::Table);
    }

    #[test]
    fn derived_table_alias_is_preserved() {
        let c = classify_sql("SELECT total FROM (SELECT amount FROM orders) sub WHERE total > 1");
        assert_eq!(role_of(&c, "orders"), Role::Table);
        assert_eq!(role_of(&c, "amount"), Role::Column);
        assert_eq!(role_of(&c, "sub"), Role::Structural);
    }

    #[test]
    fn name_reused_as_table_and_column_keeps_both_roles() {
        // positional rule on purpose: same spelling, two namespaces
        let c = classify_sql("SELECT audit FROM audit");
        let roles: Vec<Role> = c
            .iter()
            .filter(|t| t.token.text == "audit")
            .map(|t| t.role)
            .collect();
        assert_eq!(roles, vec![Role::Column, Role::Table]);
    }

    #[test]
    fn malformed_from_degrades_gracefully() {
        let c = classify_sql("SELECT a FROM WHERE b = 1");
        assert_eq!(role_of(&c, "a"), Role::Column);
        assert_eq!(role_of(&c, "b"), Role::Column);
        // no token was forced into a table role
        assert!(c.iter().all(|t| t.role != Role::Table));
    }

    #[test]
    fn comments_are_structural() {
        let c = classify_sql("SELECT a /* note */ FROM t -- tail");
        assert_eq!(role_of(&c, "/* note */"), Role::Structural);
        assert_eq!(role_of(&c, "-- tail"), Role::Structural);
        assert_eq!(role_of(&c, "t"), Role::Table);
    }

    #[test]
    fn implicit_column_alias_before_from_is_preserved() {
        let c = classify_sql("SELECT p.department dept FROM personnel p");
        assert_eq!(role_of(&c, "department"), Role::Column);
        assert_eq!(role_of(&c, "dept"), Role::Structural);
    }

    #[test]
    fn function_calls_keep_their_arguments_as_columns() {
        let c = classify_sql("SELECT COUNT(*), AVG(salary) FROM employees");
        assert_eq!(role_of(&c, "COUNT"), Role::Structural);
        assert_eq!(role_of(&c, "AVG"), Role::Structural);
        assert_eq!(role_of(&c, "salary"), Role::Column);
        assert_eq!(role_of(&c, "employees"), Role::Table);
    }
}
