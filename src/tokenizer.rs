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

//! SQL Tokenizer
//!
//! The tokenizer (a.k.a. lexer) converts a query string into a sequence of
//! typed tokens. It has no semantic knowledge: deciding whether an
//! identifier names a table or a column is the classifier's job.
//!
//! Whitespace collapses to token boundaries and is not emitted; comments are
//! preserved as tokens so a commented query survives a round trip.

use std::fmt;
use std::iter::Peekable;
use std::str::CharIndices;

use thiserror::Error;

use crate::dialect::keywords;
use crate::dialect::Dialect;

/// The lexical class of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// A reserved word or a known function name, matched case-insensitively
    Keyword,
    /// An unquoted word that is not a reserved word
    Identifier,
    /// A quoted string, e.g. `'active'` or `"north region"`
    StringLiteral,
    /// An integer or decimal number, possibly signed
    NumberLiteral,
    /// An operator such as `=`, `>=` or `<>`
    Operator,
    /// Punctuation such as `(`, `,`, `.` or `;`
    Punctuation,
    /// A `--` line comment or a `/* */` block comment, kept verbatim
    Comment,
}

impl TokenKind {
    /// True for string and number literals.
    pub fn is_literal(&self) -> bool {
        matches!(self, TokenKind::StringLiteral | TokenKind::NumberLiteral)
    }
}

/// A single token: its kind, the raw lexeme (quotes and comment delimiters
/// included), and the byte offset where it starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub offset: usize,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, offset: usize) -> Self {
        Self {
            kind,
            text: text.into(),
            offset,
        }
    }

    /// The lexeme uppercased, for case-insensitive keyword comparisons.
    pub fn upper(&self) -> String {
        self.text.to_ascii_uppercase()
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Tokenizer error: malformed input such as an unterminated string literal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("tokenizer error at line {line}, column {col}: {message}")]
pub struct TokenizerError {
    pub message: String,
    pub line: u64,
    pub col: u64,
}

/// SQL Tokenizer
pub struct Tokenizer<'a> {
    dialect: &'a dyn Dialect,
    chars: Peekable<CharIndices<'a>>,
    line: u64,
    col: u64,
    /// Kind of the last emitted token, used to tell a unary minus that
    /// starts a signed number from a binary minus operator.
    last_kind: Option<TokenKind>,
    last_text: String,
}

impl<'a> Tokenizer<'a> {
    /// Create a new tokenizer for the given query text.
    pub fn new(dialect: &'a dyn Dialect, query: &'a str) -> Self {
        Self {
            dialect,
            chars: query.char_indices().peekable(),
            line: 1,
            col: 1,
            last_kind: None,
            last_text: String::new(),
        }
    }

    /// Consume the whole input and return the token sequence. Empty input
    /// yields an empty sequence, not an error.
    pub fn tokenize(mut self) -> Result<Vec<Token>, TokenizerError> {
        let mut tokens = Vec::new();
        while let Some(token) = self.next_token()? {
            self.last_kind = Some(token.kind);
            self.last_text = token.text.clone();
            tokens.push(token);
        }
        Ok(tokens)
    }

    fn next_token(&mut self) -> Result<Option<Token>, TokenizerError> {
        self.skip_whitespace();

        let (offset, ch) = match self.chars.peek() {
            Some(&(i, c)) => (i, c),
            None => return Ok(None),
        };

        match ch {
            // identifier or keyword
            c if self.dialect.is_identifier_start(c) => {
                self.next_char();
                let word = self.tokenize_word(c);
                let upper = word.to_ascii_uppercase();
                let kind = if keywords::is_keyword(&upper) || keywords::is_function(&upper) {
                    TokenKind::Keyword
                } else {
                    TokenKind::Identifier
                };
                Ok(Some(Token::new(kind, word, offset)))
            }
            // string literal, single or double quoted
            '\'' | '"' => {
                let s = self.tokenize_quoted_string(ch)?;
                Ok(Some(Token::new(TokenKind::StringLiteral, s, offset)))
            }
            '0'..='9' => {
                let s = self.tokenize_number(String::new());
                Ok(Some(Token::new(TokenKind::NumberLiteral, s, offset)))
            }
            '-' => {
                self.next_char(); // consume the '-'
                match self.chars.peek().copied() {
                    Some((_, '-')) => {
                        self.next_char(); // second '-', starting a line comment
                        let body = self.peeking_take_while(|c| c != '\n');
                        let mut text = String::from("--");
                        text.push_str(&body);
                        Ok(Some(Token::new(TokenKind::Comment, text, offset)))
                    }
                    Some((_, '0'..='9')) if self.minus_starts_number() => {
                        let s = self.tokenize_number(String::from("-"));
                        Ok(Some(Token::new(TokenKind::NumberLiteral, s, offset)))
                    }
                    // a regular '-' operator
                    _ => Ok(Some(Token::new(TokenKind::Operator, "-", offset))),
                }
            }
            '/' => {
                self.next_char(); // consume the '/'
                match self.chars.peek() {
                    Some(&(_, '*')) => {
                        self.next_char(); // the '*', starting a block comment
                        let text = self.tokenize_multiline_comment()?;
                        Ok(Some(Token::new(TokenKind::Comment, text, offset)))
                    }
                    // a regular '/' operator
                    _ => Ok(Some(Token::new(TokenKind::Operator, "/", offset))),
                }
            }
            '<' => {
                self.next_char();
                match self.chars.peek() {
                    Some(&(_, '=')) => self.consume_operator("<=", offset),
                    Some(&(_, '>')) => self.consume_operator("<>", offset),
                    _ => Ok(Some(Token::new(TokenKind::Operator, "<", offset))),
                }
            }
            '>' => {
                self.next_char();
                match self.chars.peek() {
                    Some(&(_, '=')) => self.consume_operator(">=", offset),
                    _ => Ok(Some(Token::new(TokenKind::Operator, ">", offset))),
                }
            }
            '!' => {
                self.next_char();
                match self.chars.peek() {
                    Some(&(_, '=')) => self.consume_operator("!=", offset),
                    _ => Err(self.error("expected '=' after '!'")),
                }
            }
            ':' => {
                self.next_char();
                match self.chars.peek() {
                    Some(&(_, ':')) => self.consume_operator("::", offset),
                    _ => Ok(Some(Token::new(TokenKind::Operator, ":", offset))),
                }
            }
            '+' | '*' | '=' | '%' | '^' | '&' | '|' | '~' | '?' => {
                self.next_char();
                Ok(Some(Token::new(TokenKind::Operator, ch.to_string(), offset)))
            }
            '(' | ')' | ',' | ';' | '.' | '[' | ']' | '{' | '}' => {
                self.next_char();
                Ok(Some(Token::new(
                    TokenKind::Punctuation,
                    ch.to_string(),
                    offset,
                )))
            }
            other => Err(self.error(format!("unexpected character '{}'", other))),
        }
    }

    /// A leading '-' binds to the digits after it only where a value is
    /// expected: at the start of input, after an operator, after a keyword,
    /// or after `(` or `,`. After an identifier, a literal or `)` it is a
    /// binary minus.
    fn minus_starts_number(&self) -> bool {
        match self.last_kind {
            None | Some(TokenKind::Operator) | Some(TokenKind::Keyword) => true,
            Some(TokenKind::Punctuation) => matches!(self.last_text.as_str(), "(" | ","),
            _ => false,
        }
    }

    /// Tokenize an identifier or keyword, after the first char was consumed.
    fn tokenize_word(&mut self, first_char: char) -> String {
        let mut s = first_char.to_string();
        let dialect = self.dialect;
        s.push_str(&self.peeking_take_while(|ch| dialect.is_identifier_part(ch)));
        s
    }

    /// Integer and decimal digits; `prefix` carries an already consumed sign.
    fn tokenize_number(&mut self, prefix: String) -> String {
        let mut s = prefix;
        s.push_str(&self.peeking_take_while(|ch| matches!(ch, '0'..='9' | '.')));
        s
    }

    /// Read a quoted string, starting at the opening quote. The returned
    /// lexeme keeps the quotes and any escape sequences verbatim. A doubled
    /// quote (`''`) and a backslash escape both stay inside the literal.
    fn tokenize_quoted_string(&mut self, quote: char) -> Result<String, TokenizerError> {
        let mut s = quote.to_string();
        self.next_char(); // consume the opening quote
        loop {
            match self.chars.peek() {
                Some(&(_, ch)) if ch == quote => {
                    self.next_char(); // consume
                    let doubled = matches!(self.chars.peek(), Some(&(_, c)) if c == quote);
                    if doubled {
                        s.push(quote);
                        s.push(quote);
                        self.next_char();
                    } else {
                        s.push(quote);
                        return Ok(s);
                    }
                }
                Some(&(_, '\\')) => {
                    self.next_char(); // consume the backslash
                    s.push('\\');
                    if let Some(&(_, escaped)) = self.chars.peek() {
                        s.push(escaped);
                        self.next_char();
                    }
                }
                Some(&(_, ch)) => {
                    self.next_char(); // consume
                    s.push(ch);
                }
                None => {
                    return Err(self.error(format!("unterminated string literal ({})", quote)))
                }
            }
        }
    }

    fn tokenize_multiline_comment(&mut self) -> Result<String, TokenizerError> {
        let mut s = String::from("/*");
        let mut maybe_closing_comment = false;
        loop {
            match self.next_char() {
                Some(ch) => {
                    if maybe_closing_comment {
                        if ch == '/' {
                            s.push_str("*/");
                            return Ok(s);
                        }
                        s.push('*');
                    }
                    maybe_closing_comment = ch == '*';
                    if !maybe_closing_comment {
                        s.push(ch);
                    }
                }
                None => return Err(self.error("unterminated block comment")),
            }
        }
    }

    fn consume_operator(
        &mut self,
        text: &str,
        offset: usize,
    ) -> Result<Option<Token>, TokenizerError> {
        self.next_char();
        Ok(Some(Token::new(TokenKind::Operator, text, offset)))
    }

    fn skip_whitespace(&mut self) {
        while let Some(&(_, ch)) = self.chars.peek() {
            if ch.is_whitespace() {
                self.next_char();
            } else {
                break;
            }
        }
    }

    /// Advance one character, keeping line and column in sync.
    fn next_char(&mut self) -> Option<char> {
        match self.chars.next() {
            Some((_, '\n')) => {
                self.line += 1;
                self.col = 1;
                Some('\n')
            }
            Some((_, ch)) => {
                self.col += 1;
                Some(ch)
            }
            None => None,
        }
    }

    /// Read characters while `predicate` holds; the first non-matching char
    /// stays available for the next read.
    fn peeking_take_while(&mut self, mut predicate: impl FnMut(char) -> bool) -> String {
        let mut s = String::new();
        while let Some(&(_, ch)) = self.chars.peek() {
            if predicate(ch) {
                self.next_char(); // consume
                s.push(ch);
            } else {
                break;
            }
        }
        s
    }

    fn error(&self, message: impl Into<String>) -> TokenizerError {
        TokenizerError {
            message: message.into(),
            line: self.line,
            col: self.col,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::GenericDialect;

    fn tokenize(sql: &str) -> Vec<Token> {
        Tokenizer::new(&GenericDialect, sql)
            .tokenize()
            .expect("tokenize failed")
    }

    fn texts(tokens: &[Token]) -> Vec<&str> {
        tokens.iter().map(|t| t.text.as_str()).collect()
    }

    #[test]
    fn tokenizes_a_simple_select() {
        let tokens = tokenize("SELECT name, email FROM users WHERE id = 1");
        assert_eq!(
            texts(&tokens),
            vec!["SELECT", "name", ",", "email", "FROM", "users", "WHERE", "id", "=", "1"]
        );
        assert_eq!(tokens[0].kind, TokenKind::Keyword);
        assert_eq!(tokens[1].kind, TokenKind::Identifier);
        assert_eq!(tokens[2].kind, TokenKind::Punctuation);
        assert_eq!(tokens[9].kind, TokenKind::NumberLiteral);
    }

    #[test]
    fn empty_input_yields_no_tokens() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("   \n\t ").is_empty());
    }

    #[test]
    fn keywords_match_case_insensitively_and_keep_case() {
        let tokens = tokenize("select Name from Users");
        assert_eq!(tokens[0].kind, TokenKind::Keyword);
        assert_eq!(tokens[0].text, "select");
        assert_eq!(tokens[2].kind, TokenKind::Keyword);
        assert_eq!(tokens[2].text, "from");
    }

    #[test]
    fn function_names_are_not_identifiers() {
        let tokens = tokenize("SELECT COUNT(*) FROM t");
        assert_eq!(tokens[1].kind, TokenKind::Keyword);
        assert_eq!(tokens[1].text, "COUNT");
    }

    #[test]
    fn multi_char_operators_are_single_tokens() {
        let tokens = tokenize("a >= 1 AND b <= 2 AND c != 3 AND d <> 4");
        let ops: Vec<&str> = tokens
            .iter()
            .filter(|t| t.kind == TokenKind::Operator)
            .map(|t| t.text.as_str())
            .collect();
        assert_eq!(ops, vec![">=", "<=", "!=", "<>"]);
    }

    #[test]
    fn qualified_names_split_into_three_tokens() {
        let tokens = tokenize("c.id");
        assert_eq!(texts(&tokens), vec!["c", ".", "id"]);
        assert_eq!(tokens[1].kind, TokenKind::Punctuation);
    }

    #[test]
    fn string_literals_keep_quotes_and_escapes() {
        let tokens = tokenize("WHERE name = 'O''Brien'");
        assert_eq!(tokens[3].kind, TokenKind::StringLiteral);
        assert_eq!(tokens[3].text, "'O''Brien'");

        let tokens = tokenize(r"WHERE name = 'a\'b'");
        assert_eq!(tokens[3].text, r"'a\'b'");

        let tokens = tokenize(r#"SELECT "double quoted""#);
        assert_eq!(tokens[1].kind, TokenKind::StringLiteral);
        assert_eq!(tokens[1].text, r#""double quoted""#);
    }

    #[test]
    fn unterminated_string_is_an_error() {
        let err = Tokenizer::new(&GenericDialect, "SELECT 'oops")
            .tokenize()
            .unwrap_err();
        assert!(err.message.contains("unterminated string"));
    }

    #[test]
    fn unterminated_block_comment_is_an_error() {
        let err = Tokenizer::new(&GenericDialect, "SELECT /* oops")
            .tokenize()
            .unwrap_err();
        assert!(err.message.contains("unterminated block comment"));
    }

    #[test]
    fn comments_are_preserved_as_tokens() {
        let tokens = tokenize("SELECT a -- trailing note\nFROM t");
        assert_eq!(tokens[2].kind, TokenKind::Comment);
        assert_eq!(tokens[2].text, "-- trailing note");

        let tokens = tokenize("SELECT /* keep me */ a");
        assert_eq!(tokens[1].kind, TokenKind::Comment);
        assert_eq!(tokens[1].text, "/* keep me */");
    }

    #[test]
    fn signed_and_decimal_numbers() {
        let tokens = tokenize("WHERE delta > -1.5 AND total = 3.25");
        assert_eq!(tokens[3].kind, TokenKind::NumberLiteral);
        assert_eq!(tokens[3].text, "-1.5");
        assert_eq!(tokens[7].text, "3.25");

        // after an identifier a '-' is a binary operator
        let tokens = tokenize("a - 5");
        assert_eq!(tokens[1].kind, TokenKind::Operator);
        assert_eq!(tokens[2].text, "5");
    }

    #[test]
    fn offsets_point_into_the_input() {
        let sql = "SELECT id FROM t";
        let tokens = tokenize(sql);
        for token in &tokens {
            assert_eq!(&sql[token.offset..token.offset + token.text.len()], token.text);
        }
    }
}
